//! 呼叫通知分发 - 将 NormalizedCall 渲染为通知请求并提交到系统表面

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::channel::{call_channels, PRIMARY_CHANNEL_ID};
use super::classifier::NormalizedCall;
use super::surface::NotificationSurface;

/// 通知 id 掩码：取墙钟毫秒的低 28 位
pub const NOTIFICATION_ID_MASK: u32 = 0x0FFF_FFFF;

/// 通知请求优先级，对应平台的 priority 级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Default,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Default => "DEFAULT",
            Priority::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 附在通知上的路由元数据
///
/// 宿主 shell 在用户点按时原样取回。缺失与空字符串是不同的状态，
/// shell 的导航逻辑依赖这个区分，所以这里不做归一化。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_type: Option<String>,
}

/// 提交给系统通知表面的结构化请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// 由墙钟毫秒推导，同一毫秒内会碰撞（见 [`notification_id`]）
    pub id: u32,
    pub channel_id: String,
    pub title: String,
    pub body: String,
    pub priority: Priority,
    pub auto_cancel: bool,
    pub routing: RoutingMetadata,
}

/// 从墙钟毫秒推导通知 id
///
/// 同一毫秒桶内的两次分发得到相同的 id，系统表面会用新通知替换旧通知，
/// 替换即隐式去重。沿用这一行为，不另做消歧。
pub fn notification_id(epoch_millis: i64) -> u32 {
    (epoch_millis as u64 & NOTIFICATION_ID_MASK as u64) as u32
}

/// 呼叫通知器
///
/// 持有注入的系统表面，负责渠道预配与单条分发。每条消息独立处理，
/// 无共享可变状态。
pub struct CallNotifier {
    surface: Arc<dyn NotificationSurface>,
    dry_run: bool,
}

impl CallNotifier {
    pub fn new(surface: Arc<dyn NotificationSurface>) -> Self {
        Self {
            surface,
            dry_run: false,
        }
    }

    /// 设置 dry-run 模式：渲染但不提交
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 幂等的渠道预配，进程启动时调用一次
    ///
    /// 对固定有序渠道集逐个 check-then-create。表面对重复创建宽容，
    /// 因此与启动期的分发并发调用也是安全的。
    pub fn ensure_channels(&self) -> Result<()> {
        for spec in call_channels() {
            if self.surface.has_channel(&spec.id) {
                continue;
            }
            if self.dry_run {
                eprintln!("[DRY-RUN] Would create channel: {}", spec.id);
                continue;
            }
            self.surface.create_channel(&spec)?;
            info!(channel = %spec.id, surface = self.surface.name(), "Notification channel created");
        }
        Ok(())
    }

    /// 渲染并提交一条呼叫通知
    ///
    /// 表面不可用时错误只影响本次分发，不污染后续消息。
    pub fn dispatch(&self, call: &NormalizedCall) -> Result<NotificationRequest> {
        let request = self.render(call, Utc::now().timestamp_millis());

        if self.dry_run {
            eprintln!(
                "[DRY-RUN] Would post notification {} to channel {}",
                request.id, request.channel_id
            );
            return Ok(request);
        }

        self.surface.post(&request)?;
        debug!(
            id = request.id,
            title = %request.title,
            call_id = ?request.routing.call_id,
            table = ?request.routing.table_number,
            "Notification shown"
        );
        Ok(request)
    }

    /// 渲染步骤单独拆出，便于用固定时间验证 id 推导
    fn render(&self, call: &NormalizedCall, epoch_millis: i64) -> NotificationRequest {
        NotificationRequest {
            id: notification_id(epoch_millis),
            channel_id: PRIMARY_CHANNEL_ID.to_string(),
            title: call.title.clone(),
            body: call.body.clone(),
            priority: Priority::High,
            auto_cancel: true,
            routing: RoutingMetadata {
                call_id: call.call_id.clone(),
                table_number: call.table_number.clone(),
                call_type: call.call_type.clone(),
            },
        }
    }
}
