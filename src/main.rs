//! Mozo Notify CLI
//!
//! 分类餐桌呼叫推送消息并发送本地通知

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use mozo_notify::{
    call_channels, CallClassifier, CallNotifier, InboundPayload, LocalFileSurface, NotifyConfig,
};

#[derive(Parser)]
#[command(name = "mozo")]
#[command(about = "Mozo Notify - 分类餐桌呼叫消息并发送本地通知")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 仅分类：打印归一化结果或丢弃原因
    Classify {
        /// 键值数据（key=value，可重复）
        #[arg(long = "data", short, value_name = "KEY=VALUE")]
        data: Vec<String>,
        /// Transport 附带的显示标题
        #[arg(long)]
        title: Option<String>,
        /// Transport 附带的显示正文
        #[arg(long)]
        body: Option<String>,
    },
    /// 分类并分发通知
    Notify {
        /// 键值数据（key=value，可重复）
        #[arg(long = "data", short, value_name = "KEY=VALUE")]
        data: Vec<String>,
        /// Transport 附带的显示标题
        #[arg(long)]
        title: Option<String>,
        /// Transport 附带的显示正文
        #[arg(long)]
        body: Option<String>,
        /// Dry-run 模式（只打印请求，不落盘）
        #[arg(long)]
        dry_run: bool,
    },
    /// 预配通知渠道并列出
    Channels {
        /// 输出 JSON 格式
        #[arg(long)]
        json: bool,
    },
    /// 查看最近的分发记录
    Log {
        /// 显示最近 N 条
        #[arg(long, short, default_value = "10")]
        limit: usize,
        /// 输出 JSON 格式
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // 通过 RUST_LOG 控制日志级别，默认 info，写到 stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mozo_notify=info,mozo=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();
    let config = NotifyConfig::load()?;

    match cli.command {
        Commands::Classify { data, title, body } => {
            let payload = build_payload(&data, title, body)?;
            let classifier = CallClassifier::from_config(&config);
            match classifier.classify(Some(&payload)) {
                Some(call) => println!("{}", serde_json::to_string_pretty(&call)?),
                None => println!("忽略：不像呼叫消息"),
            }
        }
        Commands::Notify {
            data,
            title,
            body,
            dry_run,
        } => {
            let payload = build_payload(&data, title, body)?;
            let classifier = CallClassifier::from_config(&config);
            let Some(call) = classifier.classify(Some(&payload)) else {
                println!("忽略：不像呼叫消息");
                return Ok(());
            };

            let surface = Arc::new(LocalFileSurface::new(config.data_dir()));
            let notifier = CallNotifier::new(surface).with_dry_run(dry_run);
            notifier.ensure_channels()?;
            let request = notifier.dispatch(&call)?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Commands::Channels { json } => {
            let surface = Arc::new(LocalFileSurface::new(config.data_dir()));
            let notifier = CallNotifier::new(surface);
            notifier.ensure_channels()?;

            let channels = call_channels();
            if json {
                println!("{}", serde_json::to_string_pretty(&channels)?);
            } else {
                println!("已预配 {} 个通知渠道:\n", channels.len());
                for channel in channels {
                    println!(
                        "  {} | {} | importance={}",
                        channel.id, channel.name, channel.importance
                    );
                }
            }
        }
        Commands::Log { limit, json } => {
            let surface = LocalFileSurface::new(config.data_dir());
            let records = surface.store().read_recent(limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("暂无分发记录");
            } else {
                println!("最近 {} 条分发记录:\n", records.len());
                for record in records {
                    println!(
                        "  {} | id={} | {} | table={} callId={}",
                        record.ts.to_rfc3339(),
                        record.request.id,
                        record.request.title,
                        record.request.routing.table_number.as_deref().unwrap_or("-"),
                        record.request.routing.call_id.as_deref().unwrap_or("-"),
                    );
                }
            }
        }
    }

    Ok(())
}

/// 从 key=value 参数与显示字段构建 payload
fn build_payload(
    data: &[String],
    title: Option<String>,
    body: Option<String>,
) -> Result<InboundPayload> {
    let mut payload = InboundPayload::new();
    for entry in data {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("无效的键值对: {} (期望 key=value)", entry))?;
        payload = payload.with_entry(key, value);
    }
    if let Some(title) = title {
        payload = payload.with_display_title(title);
    }
    if let Some(body) = body {
        payload = payload.with_display_body(body);
    }
    Ok(payload)
}
