//! gatehouse-telemetry - 日志初始化
//!
//! RUST_LOG 环境变量优先于配置里的日志级别。

use tracing_subscriber::fmt;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// 开发环境用，人类可读的 fmt 输出
pub fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(fmt::layer())
        .init();
}

/// 生产环境用，一行一条 JSON 方便采集
pub fn init_tracing_json(log_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(fmt::layer().json())
        .init();
}
