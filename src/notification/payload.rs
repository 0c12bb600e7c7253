//! 入站 payload - 推送消息携带的键值数据与显示字段
//!
//! Transport 层交付的消息是一个扁平的 string -> string 映射，键不保证存在，
//! 外加可选的结构化显示字段（title/body，独立于键值数据）。本模块只承载数据，
//! 不做任何分类判断。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 入站推送 payload
///
/// 生命周期只覆盖一次分类调用。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundPayload {
    /// 键值数据
    #[serde(default)]
    pub data: HashMap<String, String>,
    /// Transport 附带的显示标题
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_title: Option<String>,
    /// Transport 附带的显示正文
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_body: Option<String>,
    /// 传输信封（仅用于诊断日志）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope: Option<MessageEnvelope>,
}

impl InboundPayload {
    /// 创建空 payload
    pub fn new() -> Self {
        Self::default()
    }

    /// 从键值映射创建
    pub fn from_data(data: HashMap<String, String>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// 添加一个键值对
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// 设置显示标题
    pub fn with_display_title(mut self, title: impl Into<String>) -> Self {
        self.display_title = Some(title.into());
        self
    }

    /// 设置显示正文
    pub fn with_display_body(mut self, body: impl Into<String>) -> Self {
        self.display_body = Some(body.into());
        self
    }

    /// 设置传输信封
    pub fn with_envelope(mut self, envelope: MessageEnvelope) -> Self {
        self.envelope = Some(envelope);
        self
    }

    /// 读取键值数据，键不存在时返回 None
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// 当前携带的所有键（诊断日志用）
    pub fn data_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.data.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// 传输信封元数据
///
/// 随消息一起到达，只进诊断日志，从不影响分类结果。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// 发送方
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// 消息 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Collapse key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapse_key: Option<String>,
    /// 发送时间（epoch 毫秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_time: Option<i64>,
    /// TTL（秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}
