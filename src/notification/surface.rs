//! OS notification surface seam
//!
//! The notification renderer is an external collaborator. The notifier needs
//! exactly three capabilities from it: check whether a channel exists, create
//! one, and post a request keyed by its id. Posting a request whose id is
//! already live replaces the previous notification; that replace-on-collision
//! behavior belongs to the platform, and surfaces here model it where they
//! can.

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::channel::ChannelSpec;
use super::dispatcher::NotificationRequest;

/// Notification surface trait
///
/// Implementations must tolerate redundant `create_channel` calls for an
/// already existing id as no-ops; the check-then-create provisioning pattern
/// relies on that rather than on a lock.
pub trait NotificationSurface: Send + Sync {
    /// Surface name for logs.
    fn name(&self) -> &str;

    /// Whether a channel with this id has been created.
    fn has_channel(&self, channel_id: &str) -> bool;

    /// Create a channel. No-op when the id already exists.
    fn create_channel(&self, spec: &ChannelSpec) -> Result<()>;

    /// Post a request keyed by `request.id`. A repeated id replaces the
    /// prior notification.
    fn post(&self, request: &NotificationRequest) -> Result<()>;
}

/// In-memory surface with platform-like replace semantics.
///
/// The testing seam for the dispatch pipeline; nothing leaves the process.
#[derive(Debug, Default)]
pub struct MemorySurface {
    channels: Mutex<Vec<ChannelSpec>>,
    active: Mutex<BTreeMap<u32, NotificationRequest>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of all created channels, in creation order.
    pub fn channel_ids(&self) -> Vec<String> {
        self.channels
            .lock()
            .expect("surface mutex poisoned")
            .iter()
            .map(|c| c.id.clone())
            .collect()
    }

    /// Currently visible notifications, in id order.
    pub fn posted(&self) -> Vec<NotificationRequest> {
        self.active
            .lock()
            .expect("surface mutex poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Number of currently visible notifications.
    pub fn active_count(&self) -> usize {
        self.active.lock().expect("surface mutex poisoned").len()
    }
}

impl NotificationSurface for MemorySurface {
    fn name(&self) -> &str {
        "memory"
    }

    fn has_channel(&self, channel_id: &str) -> bool {
        self.channels
            .lock()
            .expect("surface mutex poisoned")
            .iter()
            .any(|c| c.id == channel_id)
    }

    fn create_channel(&self, spec: &ChannelSpec) -> Result<()> {
        let mut channels = self.channels.lock().expect("surface mutex poisoned");
        if !channels.iter().any(|c| c.id == spec.id) {
            channels.push(spec.clone());
        }
        Ok(())
    }

    fn post(&self, request: &NotificationRequest) -> Result<()> {
        self.active
            .lock()
            .expect("surface mutex poisoned")
            .insert(request.id, request.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::channel::{call_channels, PRIMARY_CHANNEL_ID};
    use crate::notification::dispatcher::{NotificationRequest, Priority, RoutingMetadata};

    fn request(id: u32, title: &str) -> NotificationRequest {
        NotificationRequest {
            id,
            channel_id: PRIMARY_CHANNEL_ID.to_string(),
            title: title.to_string(),
            body: "New table call".to_string(),
            priority: Priority::High,
            auto_cancel: true,
            routing: RoutingMetadata::default(),
        }
    }

    #[test]
    fn test_create_channel_is_idempotent() {
        let surface = MemorySurface::new();
        let spec = &call_channels()[0];
        surface.create_channel(spec).unwrap();
        surface.create_channel(spec).unwrap();
        assert_eq!(surface.channel_ids(), vec![spec.id.clone()]);
    }

    #[test]
    fn test_post_with_new_id_adds_notification() {
        let surface = MemorySurface::new();
        surface.post(&request(1, "a")).unwrap();
        surface.post(&request(2, "b")).unwrap();
        assert_eq!(surface.active_count(), 2);
    }

    #[test]
    fn test_post_with_same_id_replaces() {
        let surface = MemorySurface::new();
        surface.post(&request(7, "first")).unwrap();
        surface.post(&request(7, "second")).unwrap();

        let posted = surface.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].title, "second");
    }
}
