//! Notification channel definitions
//!
//! Channels are OS-level notification categories with a fixed priority,
//! vibration and light profile. The set is provisioned once per process
//! start; this core never deletes a channel.

use serde::{Deserialize, Serialize};

/// Channel all call notifications are dispatched to.
///
/// The legacy id is kept so installs upgraded in place keep their sound and
/// vibration settings for it.
pub const PRIMARY_CHANNEL_ID: &str = "mozo_waiter";

/// Channel importance, mirroring the platform's levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Importance {
    High,
    Default,
    Low,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::High => "HIGH",
            Importance::Default => "DEFAULT",
            Importance::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static description of one notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: Importance,
    pub vibration: bool,
    pub lights: bool,
}

impl ChannelSpec {
    /// High-importance call channel with vibration and lights on.
    fn call(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            importance: Importance::High,
            vibration: true,
            lights: true,
        }
    }
}

/// The fixed ordered set provisioned at process start.
pub fn call_channels() -> Vec<ChannelSpec> {
    vec![
        ChannelSpec::call("waiter_normal", "Table calls", "Calls from tables (normal)"),
        ChannelSpec::call(
            "waiter_urgent",
            "Urgent calls",
            "Urgent / high priority calls",
        ),
        ChannelSpec::call(
            PRIMARY_CHANNEL_ID,
            "Waiter calls (legacy)",
            "Legacy waiter notification channel",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisioning_set_is_ordered_and_unique() {
        let channels = call_channels();
        let ids: Vec<&str> = channels.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["waiter_normal", "waiter_urgent", "mozo_waiter"]);
    }

    #[test]
    fn test_dispatch_channel_is_provisioned() {
        assert!(call_channels().iter().any(|c| c.id == PRIMARY_CHANNEL_ID));
    }

    #[test]
    fn test_call_channels_profile() {
        for channel in call_channels() {
            assert_eq!(channel.importance, Importance::High);
            assert!(channel.vibration);
            assert!(channel.lights);
        }
    }

    #[test]
    fn test_importance_display() {
        assert_eq!(format!("{}", Importance::High), "HIGH");
        assert_eq!(format!("{}", Importance::Low), "LOW");
    }
}
