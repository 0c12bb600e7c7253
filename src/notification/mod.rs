//! 通知核心 - 呼叫消息分类与本地通知分发
//!
//! # 设计目标
//! 1. 分类与分发解耦：`CallClassifier` 只做判定与字段提取，`CallNotifier` 只做渲染与提交
//! 2. 表面注入：系统通知渲染器通过 `NotificationSurface` trait 注入，便于独立测试
//! 3. 宽松判定：带有任何呼叫线索的消息都会被提升为通知，宁可误报不可漏报
//!
//! # 使用示例
//! ```
//! use mozo_notify::notification::{CallClassifier, CallNotifier, InboundPayload, MemorySurface};
//! use std::sync::Arc;
//!
//! let classifier = CallClassifier::new();
//! let notifier = CallNotifier::new(Arc::new(MemorySurface::new()));
//! notifier.ensure_channels()?;
//!
//! let payload = InboundPayload::new().with_entry("table_number", "5");
//! if let Some(call) = classifier.classify(Some(&payload)) {
//!     notifier.dispatch(&call)?;
//! }
//! # anyhow::Ok(())
//! ```

pub mod channel;
pub mod classifier;
pub mod dispatcher;
pub mod payload;
pub mod store;
pub mod surface;

pub use channel::{call_channels, ChannelSpec, Importance, PRIMARY_CHANNEL_ID};
pub use classifier::{CallClassifier, NormalizedCall, DEFAULT_ALLOW_TYPES};
pub use dispatcher::{
    notification_id, CallNotifier, NotificationRequest, Priority, RoutingMetadata,
    NOTIFICATION_ID_MASK,
};
pub use payload::{InboundPayload, MessageEnvelope};
pub use store::{DispatchRecord, LocalFileSurface, NotificationStore};
pub use surface::{MemorySurface, NotificationSurface};
