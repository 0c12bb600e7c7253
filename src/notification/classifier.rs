//! Call classification for inbound push payloads
//!
//! Decides whether a payload looks like a genuine waiter call and extracts
//! the normalized fields the notifier needs. The predicate is deliberately
//! permissive: any call hint (table number, call id, or a known call type)
//! promotes the message. Dropping a real call costs more than surfacing a
//! false positive.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::payload::InboundPayload;
use crate::config::NotifyConfig;

/// Call types that classify as actionable on their own (case-insensitive).
pub const DEFAULT_ALLOW_TYPES: [&str; 3] = ["waiter_call", "new_call", "unified"];

/// Body used when neither the transport nor the payload carries one.
const FALLBACK_BODY: &str = "New table call";

/// Normalized waiter call, produced only for actionable payloads.
///
/// The id fields keep the absent/empty/present distinction from the payload:
/// `None` means the key was missing, `Some("")` means present but empty. Code
/// that only cares about "is there a usable value" treats both the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCall {
    /// Semantic call category.
    pub call_type: Option<String>,
    /// Table identifier.
    pub table_number: Option<String>,
    /// Call identifier. Without one the notification carries no
    /// deduplication identity; that is accepted behavior.
    pub call_id: Option<String>,
    /// Display title, never empty.
    pub title: String,
    /// Display body, never empty.
    pub body: String,
}

/// Payload classifier with a configurable type allow-set.
#[derive(Debug, Clone)]
pub struct CallClassifier {
    allow_types: Vec<String>,
}

impl CallClassifier {
    /// Classifier with the built-in allow-set.
    pub fn new() -> Self {
        Self::with_allow_types(DEFAULT_ALLOW_TYPES)
    }

    /// Classifier with a custom allow-set. Entries are matched
    /// case-insensitively; they are lowercased once here.
    pub fn with_allow_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow_types: types
                .into_iter()
                .map(|t| t.into().to_lowercase())
                .collect(),
        }
    }

    /// Classifier configured from the runtime config.
    pub fn from_config(config: &NotifyConfig) -> Self {
        Self::with_allow_types(config.allow_types.iter().map(String::as_str))
    }

    /// Active allow-set (lowercased).
    pub fn allow_types(&self) -> &[String] {
        &self.allow_types
    }

    /// Decide actionability and extract normalized fields.
    ///
    /// Returns `None` for an absent payload and for payloads that do not
    /// look like a call. Neither case is an error; both are logged and
    /// dropped.
    pub fn classify(&self, payload: Option<&InboundPayload>) -> Option<NormalizedCall> {
        let Some(payload) = payload else {
            warn!("inbound message without payload, ignoring");
            return None;
        };

        if let Some(envelope) = &payload.envelope {
            debug!(
                from = ?envelope.from,
                message_id = ?envelope.message_id,
                collapse_key = ?envelope.collapse_key,
                sent_time = ?envelope.sent_time,
                ttl = ?envelope.ttl,
                "Push message received"
            );
        }
        debug!(keys = ?payload.data_keys(), "Classifying payload");

        let call_type = payload.get("type").map(str::to_string);
        let table_number = payload.get("table_number").map(str::to_string);
        let call_id = payload.get("callId").map(str::to_string);

        if !self.looks_like_call(
            call_type.as_deref(),
            table_number.as_deref(),
            call_id.as_deref(),
        ) {
            debug!(
                call_type = ?call_type,
                table = ?table_number,
                call_id = ?call_id,
                "Message ignored (does not look like a call)"
            );
            return None;
        }

        let table_display = non_empty(table_number.as_deref()).unwrap_or("?");
        let title = non_empty(payload.display_title.as_deref())
            .or_else(|| non_empty(payload.get("title")))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Table {} requests waiter", table_display));
        let body = non_empty(payload.display_body.as_deref())
            .or_else(|| non_empty(payload.get("message")))
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK_BODY.to_string());

        Some(NormalizedCall {
            call_type,
            table_number,
            call_id,
            title,
            body,
        })
    }

    /// Inclusive OR over all call hints.
    fn looks_like_call(
        &self,
        call_type: Option<&str>,
        table_number: Option<&str>,
        call_id: Option<&str>,
    ) -> bool {
        if non_empty(table_number).is_some() || non_empty(call_id).is_some() {
            return true;
        }
        match non_empty(call_type) {
            Some(t) => {
                let t = t.to_lowercase();
                self.allow_types.iter().any(|allowed| *allowed == t)
            }
            None => false,
        }
    }
}

impl Default for CallClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Treats absent and empty values the same.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
