//! Servodrive 命令
//!
//! 使能状态只存在于会话内：One-shot 模式下 `enable` 之后的 Servodrive 指令
//! 需要 `--force`，或者在 `shell` 中连续执行。

use anyhow::Result;
use clap::Subcommand;
use mcm_sdk::driver::DEFAULT_PGAIN;
use mcm_sdk::{Direction, MotionOverrides, Session, Transport};

use crate::output::Output;

#[derive(Subcommand, Debug, Clone)]
pub enum ServoCommand {
    /// 使能闭环控制（FBEN），使用地址 1 的 profile / temperature
    Enable {
        /// 比例增益
        #[arg(long, default_value_t = DEFAULT_PGAIN)]
        pgain: u32,

        /// 环境温度（K，写入地址 1）
        #[arg(long)]
        temperature: Option<i64>,

        /// 定位器型号（写入地址 1）
        #[arg(long)]
        profile: Option<String>,
    },

    /// 退出闭环控制（FBXT）
    Disable,

    /// 设定三轴目标位置（FBCS），未接的轴填 0
    GoTo {
        #[arg(allow_negative_numbers = true)]
        pos1: i64,
        #[arg(allow_negative_numbers = true)]
        pos2: i64,
        #[arg(allow_negative_numbers = true)]
        pos3: i64,
    },

    /// 急停（FBES）
    Estop,

    /// 寻找限位（FBFE）
    FindEndStops {
        /// 方向
        direction: Direction,

        /// 速度轮询延迟（1-20）
        #[arg(long, default_value_t = 1)]
        filter: u32,

        /// 完成后把位置清零
        #[arg(long)]
        zero: bool,
    },

    /// 查询状态和位置（FBST）
    Status,
}

impl ServoCommand {
    pub fn execute<T: Transport>(self, session: &mut Session<T>, force: bool) -> Result<Output> {
        let fields = match self {
            ServoCommand::Enable {
                pgain,
                temperature,
                profile,
            } => {
                let overrides = MotionOverrides {
                    temperature,
                    profile,
                    ..MotionOverrides::default()
                };
                session.enable_servodrive(pgain, &overrides)?
            },
            ServoCommand::Disable => session.disable_servodrive()?,
            ServoCommand::GoTo { pos1, pos2, pos3 } => {
                session.servodrive_go_to(pos1, pos2, pos3, force)?
            },
            ServoCommand::Estop => session.servodrive_emergency_stop(force)?,
            ServoCommand::FindEndStops {
                direction,
                filter,
                zero,
            } => session.servodrive_find_end_stops(direction, filter, zero, force)?,
            ServoCommand::Status => session.servodrive_status_position(force)?,
        };
        Ok(Output::Fields(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcm_sdk::ModeState;
    use mcm_sdk::SessionBuilder;
    use mcm_sdk::transport::MockTransport;

    #[test]
    fn test_enable_then_status_in_one_session() {
        let mock = MockTransport::new();
        let mut session = SessionBuilder::new().build_with(mock.clone()).unwrap();

        ServoCommand::Enable {
            pgain: 250,
            temperature: Some(77),
            profile: None,
        }
        .execute(&mut session, false)
        .unwrap();
        assert_eq!(session.mode(), ModeState::Enabled);

        ServoCommand::Status.execute(&mut session, false).unwrap();
        assert_eq!(
            mock.invocations(),
            vec![
                vec!["cacli.exe", "FBEN", "250", "PROFILE1", "77"],
                vec!["cacli.exe", "FBST"],
            ]
        );
    }

    #[test]
    fn test_servo_command_needs_enabled_session() {
        let mock = MockTransport::new();
        let mut session = SessionBuilder::new().build_with(mock).unwrap();
        let err = ServoCommand::Estop.execute(&mut session, false).unwrap_err();
        assert!(err.to_string().contains("not allowed"));
        assert!(ServoCommand::Estop.execute(&mut session, true).is_ok());
    }
}
