//! 本地分发日志 - JSONL 读写与文件表面
//!
//! `LocalFileSurface` 把预配的渠道清单落到 channels.json，把每次提交的
//! 请求追加到 notifications.jsonl。真正的渲染由平台表面负责；这里的
//! 日志是诊断用的追加式记录。

use anyhow::Result;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::channel::ChannelSpec;
use super::dispatcher::NotificationRequest;
use super::surface::NotificationSurface;

/// 单条分发记录（JSONL 格式）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRecord {
    /// 分发时间
    pub ts: DateTime<Utc>,
    /// 提交的请求
    #[serde(flatten)]
    pub request: NotificationRequest,
}

const MAX_RECORDS: usize = 200;
const KEEP_AFTER_CLEANUP: usize = 100;
/// 估算行数用：平均每行约 150 字节
const ESTIMATED_BYTES_PER_RECORD: u64 = 150;

/// 分发日志存储
#[derive(Debug, Clone)]
pub struct NotificationStore {
    path: PathBuf,
}

impl NotificationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一条记录（带文件锁）
    pub fn append(&self, record: &DispatchRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;
        let mut file = file;
        writeln!(file, "{}", serde_json::to_string(record)?)?;
        file.unlock()?;

        self.maybe_cleanup();
        Ok(())
    }

    /// 读取最近 N 条记录
    pub fn read_recent(&self, n: usize) -> Vec<DispatchRecord> {
        if !self.path.exists() {
            return Vec::new();
        }

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };

        let reader = BufReader::new(file);
        let records: Vec<DispatchRecord> = reader
            .lines()
            .filter_map(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();

        let start = records.len().saturating_sub(n);
        records[start..].to_vec()
    }

    /// 文件超过阈值时触发清理
    fn maybe_cleanup(&self) {
        if let Ok(metadata) = fs::metadata(&self.path) {
            let estimated = metadata.len() / ESTIMATED_BYTES_PER_RECORD;
            if estimated as usize > MAX_RECORDS {
                if let Err(e) = self.cleanup() {
                    warn!(error = %e, "Dispatch log cleanup failed");
                }
            }
        }
    }

    /// 只保留最近的记录
    fn cleanup(&self) -> Result<()> {
        let file = File::open(&self.path)?;
        file.lock_exclusive()?;

        let reader = BufReader::new(&file);
        let records: Vec<DispatchRecord> = reader
            .lines()
            .filter_map(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();

        if records.len() <= MAX_RECORDS {
            file.unlock()?;
            return Ok(());
        }

        let start = records.len().saturating_sub(KEEP_AFTER_CLEANUP);
        let to_keep = &records[start..];

        let temp_path = self.path.with_extension("tmp");
        {
            let mut temp_file = File::create(&temp_path)?;
            for record in to_keep {
                writeln!(temp_file, "{}", serde_json::to_string(record)?)?;
            }
        }
        fs::rename(&temp_path, &self.path)?;

        file.unlock()?;
        Ok(())
    }
}

/// 文件表面 - 渠道清单与分发日志落盘
pub struct LocalFileSurface {
    dir: PathBuf,
    store: NotificationStore,
}

impl LocalFileSurface {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let store = NotificationStore::new(dir.join("notifications.jsonl"));
        Self { dir, store }
    }

    /// 底层分发日志
    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    fn channels_path(&self) -> PathBuf {
        self.dir.join("channels.json")
    }

    /// 读取已创建的渠道。文件缺失返回空集；解析失败按空集处理并告警。
    pub fn load_channels(&self) -> Vec<ChannelSpec> {
        let path = self.channels_path();
        if !path.exists() {
            return Vec::new();
        }
        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(channels) => channels,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Invalid channel registry, treating as empty");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read channel registry");
                Vec::new()
            }
        }
    }

    fn save_channels(&self, channels: &[ChannelSpec]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(
            self.channels_path(),
            serde_json::to_string_pretty(channels)?,
        )?;
        Ok(())
    }
}

impl NotificationSurface for LocalFileSurface {
    fn name(&self) -> &str {
        "local_file"
    }

    fn has_channel(&self, channel_id: &str) -> bool {
        self.load_channels().iter().any(|c| c.id == channel_id)
    }

    fn create_channel(&self, spec: &ChannelSpec) -> Result<()> {
        let mut channels = self.load_channels();
        if !channels.iter().any(|c| c.id == spec.id) {
            channels.push(spec.clone());
            self.save_channels(&channels)?;
        }
        Ok(())
    }

    fn post(&self, request: &NotificationRequest) -> Result<()> {
        let record = DispatchRecord {
            ts: Utc::now(),
            request: request.clone(),
        };
        self.store.append(&record)?;
        debug!(id = request.id, "Notification recorded to dispatch log");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::channel::call_channels;
    use crate::notification::dispatcher::{Priority, RoutingMetadata};

    fn sample_request(id: u32) -> NotificationRequest {
        NotificationRequest {
            id,
            channel_id: "mozo_waiter".to_string(),
            title: "Table 3 requests waiter".to_string(),
            body: "New table call".to_string(),
            priority: Priority::High,
            auto_cancel: true,
            routing: RoutingMetadata {
                call_id: Some("c-3".to_string()),
                table_number: Some("3".to_string()),
                call_type: None,
            },
        }
    }

    #[test]
    fn test_append_and_read_recent() {
        let dir = tempfile::tempdir().unwrap();
        let store = NotificationStore::new(dir.path().join("notifications.jsonl"));

        for id in 1..=3 {
            store
                .append(&DispatchRecord {
                    ts: Utc::now(),
                    request: sample_request(id),
                })
                .unwrap();
        }

        let recent = store.read_recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].request.id, 2);
        assert_eq!(recent[1].request.id, 3);
    }

    #[test]
    fn test_read_recent_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = NotificationStore::new(dir.path().join("missing.jsonl"));
        assert!(store.read_recent(10).is_empty());
    }

    #[test]
    fn test_record_roundtrip_keeps_routing() {
        let record = DispatchRecord {
            ts: Utc::now(),
            request: sample_request(42),
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: DispatchRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.request.id, 42);
        assert_eq!(parsed.request.routing.call_id.as_deref(), Some("c-3"));
        assert_eq!(parsed.request.routing.call_type, None);
    }

    #[test]
    fn test_file_surface_channel_registry_persists() {
        let dir = tempfile::tempdir().unwrap();
        let surface = LocalFileSurface::new(dir.path());
        let spec = &call_channels()[0];

        assert!(!surface.has_channel(&spec.id));
        surface.create_channel(spec).unwrap();
        surface.create_channel(spec).unwrap();
        assert!(surface.has_channel(&spec.id));

        // 新实例读取同一目录，模拟下一次进程启动
        let next_start = LocalFileSurface::new(dir.path());
        assert!(next_start.has_channel(&spec.id));
        assert_eq!(next_start.load_channels().len(), 1);
    }

    #[test]
    fn test_file_surface_post_appends_record() {
        let dir = tempfile::tempdir().unwrap();
        let surface = LocalFileSurface::new(dir.path());

        surface.post(&sample_request(1)).unwrap();
        surface.post(&sample_request(2)).unwrap();

        let recent = surface.store().read_recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].request.id, 2);
    }

    #[test]
    fn test_corrupt_channel_registry_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join("channels.json"), "not json").unwrap();

        let surface = LocalFileSurface::new(dir.path());
        assert!(surface.load_channels().is_empty());
        assert!(!surface.has_channel("mozo_waiter"));
    }
}
