//! 命令定义和实现

pub mod config;
pub mod r#move;
pub mod position;
pub mod query;
pub mod servo;

pub use config::ConfigCommand;
pub use r#move::MoveCommand;
pub use position::PositionCommand;
pub use query::{AddressArgs, ChannelArgs};
pub use servo::ServoCommand;

use anyhow::Result;
use clap::Subcommand;
use mcm_sdk::{Session, Transport};

use crate::output::Output;

/// 需要控制器的命令（One-shot 与 REPL 共用）
#[derive(Subcommand, Debug)]
pub enum DeviceCommand {
    /// 按步数移动（MOV）
    Move(MoveCommand),

    /// 切换到外部模拟输入（EXT，Flexdrive）
    Analogue(MoveCommand),

    /// 查询编码器位置（POS）
    Position(PositionCommand),

    /// 查询模块状态（STS）
    Status(AddressArgs),

    /// 查询模块描述（DESC）
    Describe(AddressArgs),

    /// 查询定位器信息（INFO）
    Info(ChannelArgs),

    /// 停止运动（STP，Flexdrive）
    Stop(AddressArgs),

    /// 位置计数清零（RST）
    Reset(ChannelArgs),

    /// Servodrive 闭环控制
    #[command(subcommand)]
    Servo(ServoCommand),
}

impl DeviceCommand {
    pub fn execute<T: Transport>(self, session: &mut Session<T>, force: bool) -> Result<Output> {
        let output = match self {
            DeviceCommand::Move(args) => Output::Fields(session.move_to(
                args.address.as_str(),
                args.direction,
                args.channel.as_str(),
                &args.overrides(force),
            )?),
            DeviceCommand::Analogue(args) => Output::Fields(session.select_analogue_input(
                args.address.as_str(),
                args.direction,
                args.channel.as_str(),
                &args.overrides(force),
            )?),
            DeviceCommand::Position(args) => args.execute(session, force)?,
            DeviceCommand::Status(args) => {
                Output::Fields(session.get_status(args.address.as_str(), force)?)
            },
            DeviceCommand::Describe(args) => {
                Output::Fields(session.get_description(args.address.as_str(), force)?)
            },
            DeviceCommand::Info(args) => Output::Fields(session.get_information(
                args.address.as_str(),
                args.channel.as_str(),
                force,
            )?),
            DeviceCommand::Stop(args) => Output::Fields(session.stop(args.address.as_str(), force)?),
            DeviceCommand::Reset(args) => Output::Text(session.reset_position(
                args.address.as_str(),
                args.channel.as_str(),
                force,
            )?),
            DeviceCommand::Servo(cmd) => cmd.execute(session, force)?,
        };
        Ok(output)
    }
}
