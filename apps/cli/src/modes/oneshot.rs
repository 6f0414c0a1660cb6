//! One-shot 模式
//!
//! 每个命令独立执行：
//! 1. 读取配置
//! 2. 建立会话
//! 3. 执行一条指令
//! 4. 输出结果

use anyhow::Result;
use mcm_sdk::{ProcessTransport, Session};

use crate::GlobalArgs;
use crate::commands::DeviceCommand;
use crate::modes::open_session;
use crate::output::OutputFormat;

/// One-shot 模式
pub struct OneShotMode {
    session: Session<ProcessTransport>,
    force: bool,
    format: OutputFormat,
}

impl OneShotMode {
    pub fn new(global: &GlobalArgs) -> Result<Self> {
        Ok(Self {
            session: open_session(global)?,
            force: global.force,
            format: global.format,
        })
    }

    pub fn run(&mut self, command: DeviceCommand) -> Result<()> {
        let output = command.execute(&mut self.session, self.force)?;
        output.print(self.format)
    }
}
