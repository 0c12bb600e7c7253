//! Mozo Notify - 餐桌呼叫推送消息的分类与本地通知核心

pub mod config;
pub mod notification;

pub use config::NotifyConfig;
pub use notification::{
    call_channels, notification_id, CallClassifier, CallNotifier, ChannelSpec, DispatchRecord,
    Importance, InboundPayload, LocalFileSurface, MemorySurface, MessageEnvelope,
    NormalizedCall, NotificationRequest, NotificationStore, NotificationSurface, Priority,
    RoutingMetadata, DEFAULT_ALLOW_TYPES, NOTIFICATION_ID_MASK, PRIMARY_CHANNEL_ID,
};
