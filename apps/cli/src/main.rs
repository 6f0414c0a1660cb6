//! # MCM CLI
//!
//! Command-line interface for JPE MCM stepper controllers.
//!
//! ## 双模式架构
//!
//! ### One-shot 模式（推荐用于脚本）
//!
//! ```bash
//! # 每次调用独立建立会话
//! mcm-cli --server move 1 forward --steps 500
//! mcm-cli --format json position 1
//! ```
//!
//! ### REPL 模式（Servodrive 需要跨多条指令保持模式）
//!
//! ```bash
//! $ mcm-cli --server shell
//! mcm> servo enable
//! mcm[servo]> servo go-to 1000 0 0
//! mcm[servo]> servo status
//! mcm[servo]> servo disable
//! mcm> exit
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod modes;
mod output;

use commands::{ConfigCommand, DeviceCommand};
use modes::oneshot::OneShotMode;
use modes::repl::run_repl;
use output::OutputFormat;

/// MCM CLI - 步进控制器命令行工具
#[derive(Parser, Debug)]
#[command(name = "mcm-cli")]
#[command(about = "Command-line interface for JPE MCM stepper controllers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// 所有命令共享的选项（覆盖配置文件）
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// 配置文件（默认 <config_dir>/mcm/config.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// cacli 可执行文件路径
    #[arg(long, global = true)]
    pub exe: Option<PathBuf>,

    /// 通过 cacli 服务器访问控制器
    #[arg(long, global = true)]
    pub server: bool,

    /// 设备 id
    #[arg(long, global = true)]
    pub device: Option<String>,

    /// 打印每次调用的参数和输出
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 跳过 Servodrive 模式检查
    #[arg(long, global = true)]
    pub force: bool,

    /// 输出格式
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Device(DeviceCommand),

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 启动交互式 Shell（REPL 模式）
    Shell,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 日志写到 stderr，stdout 只留给命令输出
    let default_filter = if cli.global.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Config(cmd) => cmd.execute(&cli.global),

        Commands::Device(cmd) => {
            let mut mode = OneShotMode::new(&cli.global)?;
            mode.run(cmd)
        },

        Commands::Shell => run_repl(&cli.global),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use commands::ServoCommand;
    use mcm_sdk::Direction;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mcm-cli", "position", "2", "--raw", "--server", "--device", "7", "--format", "json",
        ])
        .unwrap();
        assert!(cli.global.server);
        assert_eq!(cli.global.device.as_deref(), Some("7"));
        assert_eq!(cli.global.format, OutputFormat::Json);
        match cli.command {
            Commands::Device(DeviceCommand::Position(args)) => {
                assert_eq!(args.address, "2");
                assert!(args.raw);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_move_parses_direction_and_overrides() {
        let cli = Cli::try_parse_from([
            "mcm-cli", "move", "1", "ccw", "--steps", "250", "--profile", "CLA2601",
        ])
        .unwrap();
        match cli.command {
            Commands::Device(DeviceCommand::Move(args)) => {
                assert_eq!(args.direction, Direction::Backward);
                assert_eq!(args.channel, "1");
                let overrides = args.overrides(false);
                assert_eq!(overrides.steps, Some(250));
                assert_eq!(overrides.profile.as_deref(), Some("CLA2601"));
                assert_eq!(overrides.frequency, None);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_servo_go_to_accepts_negative_positions() {
        let cli =
            Cli::try_parse_from(["mcm-cli", "servo", "go-to", "100", "-200", "0"]).unwrap();
        match cli.command {
            Commands::Device(DeviceCommand::Servo(ServoCommand::GoTo { pos1, pos2, pos3 })) => {
                assert_eq!((pos1, pos2, pos3), (100, -200, 0));
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_direction_rejected() {
        assert!(Cli::try_parse_from(["mcm-cli", "move", "1", "sideways"]).is_err());
    }
}
