//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 未设置 `RUST_LOG` 时使用的过滤规则
pub const DEFAULT_LOG_FILTER: &str = "info";

/// 初始化全局日志（`RUST_LOG` 优先，否则 `info`）
///
/// 可以重复调用，已经安装过订阅者时不做任何事。
pub fn init_logger() {
    init_logger_with(DEFAULT_LOG_FILTER);
}

/// 以指定的默认过滤规则初始化全局日志
///
/// 返回 false 表示已有全局订阅者。
pub fn init_logger_with(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok()
}
