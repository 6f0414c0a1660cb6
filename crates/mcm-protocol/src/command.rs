//! 指令编码
//!
//! 线上格式没有字段名，只有位置：`[CODE, arg1, arg2, ...]`。
//! 每条指令的参数顺序固定，见 [`Command::tokens`]。

use crate::code::CommandCode;
use crate::types::{Address, Channel, Direction};

/// 运动参数快照
///
/// 由会话层从设置缓存中取出，编码时按位置写入 MOV / EXT。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionSettings {
    /// 控制器上的配置名
    pub profile: String,
    /// 环境温度（K）
    pub temperature: u32,
    /// 步进频率（Hz）
    pub frequency: u32,
    /// 相对步长（%）
    pub step_size: u32,
    /// 步数
    pub steps: u32,
}

/// 逻辑指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// MOV
    Move {
        address: Address,
        channel: Channel,
        direction: Direction,
        settings: MotionSettings,
    },
    /// EXT（不带步数）
    SelectAnalogueInput {
        address: Address,
        channel: Channel,
        direction: Direction,
        settings: MotionSettings,
    },
    /// POS
    Position { address: Address, channel: Channel },
    /// STS
    Status { address: Address },
    /// DESC
    Description { address: Address },
    /// INFO
    Information { address: Address, channel: Channel },
    /// STP
    Stop { address: Address },
    /// RST
    ResetPosition { address: Address, channel: Channel },
    /// FBEN，profile / temperature 取自地址 "1"
    EnableServodrive {
        pgain: u32,
        profile: String,
        temperature: u32,
    },
    /// FBXT
    DisableServodrive,
    /// FBCS，未接的轴填 0
    ServodriveGoTo { pos1: i64, pos2: i64, pos3: i64 },
    /// FBES
    ServodriveEmergencyStop,
    /// FBFE
    ServodriveFindEndStops {
        direction: Direction,
        /// 速度轮询延迟（相对值，控制器手册给出的范围是 1-20）
        filter: u32,
        /// 完成后是否把位置清零
        zero: bool,
    },
    /// FBST
    ServodriveStatusPosition,
}

impl Command {
    pub fn code(&self) -> CommandCode {
        match self {
            Command::Move { .. } => CommandCode::Mov,
            Command::SelectAnalogueInput { .. } => CommandCode::Ext,
            Command::Position { .. } => CommandCode::Pos,
            Command::Status { .. } => CommandCode::Sts,
            Command::Description { .. } => CommandCode::Desc,
            Command::Information { .. } => CommandCode::Info,
            Command::Stop { .. } => CommandCode::Stp,
            Command::ResetPosition { .. } => CommandCode::Rst,
            Command::EnableServodrive { .. } => CommandCode::Fben,
            Command::DisableServodrive => CommandCode::Fbxt,
            Command::ServodriveGoTo { .. } => CommandCode::Fbcs,
            Command::ServodriveEmergencyStop => CommandCode::Fbes,
            Command::ServodriveFindEndStops { .. } => CommandCode::Fbfe,
            Command::ServodriveStatusPosition => CommandCode::Fbst,
        }
    }

    /// 编码为线上 token 序列（首个 token 为指令码）
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = vec![self.code().as_str().to_string()];
        match self {
            Command::Move {
                address,
                channel,
                direction,
                settings,
            } => {
                tokens.extend([
                    address.to_string(),
                    channel.to_string(),
                    settings.profile.clone(),
                    settings.temperature.to_string(),
                    direction.token(),
                    settings.frequency.to_string(),
                    settings.step_size.to_string(),
                    settings.steps.to_string(),
                ]);
            },
            Command::SelectAnalogueInput {
                address,
                channel,
                direction,
                settings,
            } => {
                tokens.extend([
                    address.to_string(),
                    channel.to_string(),
                    settings.profile.clone(),
                    settings.temperature.to_string(),
                    direction.token(),
                    settings.frequency.to_string(),
                    settings.step_size.to_string(),
                ]);
            },
            Command::Position { address, channel }
            | Command::Information { address, channel }
            | Command::ResetPosition { address, channel } => {
                tokens.extend([address.to_string(), channel.to_string()]);
            },
            Command::Status { address }
            | Command::Description { address }
            | Command::Stop { address } => {
                tokens.push(address.to_string());
            },
            Command::EnableServodrive {
                pgain,
                profile,
                temperature,
            } => {
                tokens.extend([pgain.to_string(), profile.clone(), temperature.to_string()]);
            },
            Command::ServodriveGoTo { pos1, pos2, pos3 } => {
                tokens.extend([pos1.to_string(), pos2.to_string(), pos3.to_string()]);
            },
            Command::ServodriveFindEndStops {
                direction,
                filter,
                zero,
            } => {
                tokens.extend([
                    direction.token(),
                    filter.to_string(),
                    u8::from(*zero).to_string(),
                ]);
            },
            Command::DisableServodrive
            | Command::ServodriveEmergencyStop
            | Command::ServodriveStatusPosition => {},
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> MotionSettings {
        MotionSettings {
            profile: "P1".to_string(),
            temperature: 293,
            frequency: 100,
            step_size: 100,
            steps: 100,
        }
    }

    #[test]
    fn test_move_token_order() {
        let cmd = Command::Move {
            address: Address::from("2"),
            channel: Channel::from(1),
            direction: Direction::Forward,
            settings: settings(),
        };
        assert_eq!(cmd.code(), CommandCode::Mov);
        assert_eq!(
            cmd.tokens(),
            ["MOV", "2", "1", "P1", "293", "1", "100", "100", "100"]
        );
    }

    #[test]
    fn test_ext_omits_steps() {
        let cmd = Command::SelectAnalogueInput {
            address: Address::from(1),
            channel: Channel::from(2),
            direction: Direction::Backward,
            settings: MotionSettings {
                frequency: 600,
                step_size: 40,
                ..settings()
            },
        };
        assert_eq!(cmd.tokens(), ["EXT", "1", "2", "P1", "293", "0", "600", "40"]);
    }

    #[test]
    fn test_addressed_queries() {
        let a = Address::from(3);
        let c = Channel::default();
        assert_eq!(
            Command::Position {
                address: a.clone(),
                channel: c.clone()
            }
            .tokens(),
            ["POS", "3", "1"]
        );
        assert_eq!(
            Command::Information {
                address: a.clone(),
                channel: c.clone()
            }
            .tokens(),
            ["INFO", "3", "1"]
        );
        assert_eq!(
            Command::ResetPosition {
                address: a.clone(),
                channel: c
            }
            .tokens(),
            ["RST", "3", "1"]
        );
        assert_eq!(Command::Status { address: a.clone() }.tokens(), ["STS", "3"]);
        assert_eq!(
            Command::Description { address: a.clone() }.tokens(),
            ["DESC", "3"]
        );
        assert_eq!(Command::Stop { address: a }.tokens(), ["STP", "3"]);
    }

    #[test]
    fn test_servodrive_tokens() {
        assert_eq!(
            Command::EnableServodrive {
                pgain: 300,
                profile: "PROFILE1".to_string(),
                temperature: 293,
            }
            .tokens(),
            ["FBEN", "300", "PROFILE1", "293"]
        );
        assert_eq!(Command::DisableServodrive.tokens(), ["FBXT"]);
        assert_eq!(
            Command::ServodriveGoTo {
                pos1: -1500,
                pos2: 0,
                pos3: 42
            }
            .tokens(),
            ["FBCS", "-1500", "0", "42"]
        );
        assert_eq!(Command::ServodriveEmergencyStop.tokens(), ["FBES"]);
        assert_eq!(
            Command::ServodriveFindEndStops {
                direction: Direction::Backward,
                filter: 5,
                zero: true,
            }
            .tokens(),
            ["FBFE", "0", "5", "1"]
        );
        assert_eq!(Command::ServodriveStatusPosition.tokens(), ["FBST"]);
    }
}
