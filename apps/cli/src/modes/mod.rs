//! 运行模式
//!
//! 支持两种模式：
//! - One-shot 模式：每次命令独立建立会话
//! - REPL 模式：交互式 Shell，会话（以及 Servodrive 模式）跨命令保持

pub mod oneshot;
pub mod repl;

use anyhow::Result;
use mcm_sdk::{ProcessTransport, Session, SessionBuilder};

use crate::GlobalArgs;
use crate::commands::config::load_session_config;

/// 按配置文件和命令行选项建立会话
pub fn open_session(global: &GlobalArgs) -> Result<Session<ProcessTransport>> {
    let config = load_session_config(global)?;
    Ok(SessionBuilder::new().config(config).build()?)
}
