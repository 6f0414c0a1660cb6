//! 指令码定义
//!
//! 指令码是封闭集合：只由编码器产生，解码器按它分派，因此所有分派都是穷尽 `match`。

use std::fmt;
use std::str::FromStr;

use crate::ProtocolError;

/// 指令族
///
/// 决定指令在哪种控制器模式下可以下发。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFamily {
    /// 直驱指令，要求 Servodrive 未使能
    Direct,
    /// 闭环指令，要求 Servodrive 已使能
    Servodrive,
    /// 模式切换指令（FBEN / FBXT），任何模式下都可下发
    Transition,
}

/// 控制器指令码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandCode {
    /// Basedrive 移动
    Mov,
    /// Flexdrive 外部模拟输入
    Ext,
    /// 编码器位置
    Pos,
    /// Basedrive 状态
    Sts,
    /// 模块描述
    Desc,
    /// 定位器信息
    Info,
    /// 停止
    Stp,
    /// 复位编码器位置
    Rst,
    /// Servodrive 使能
    Fben,
    /// Servodrive 退出
    Fbxt,
    /// Servodrive 设定目标点
    Fbcs,
    /// Servodrive 急停
    Fbes,
    /// Servodrive 寻找限位
    Fbfe,
    /// Servodrive 状态与位置
    Fbst,
}

impl CommandCode {
    /// 全部指令码
    pub const ALL: [CommandCode; 14] = [
        CommandCode::Mov,
        CommandCode::Ext,
        CommandCode::Pos,
        CommandCode::Sts,
        CommandCode::Desc,
        CommandCode::Info,
        CommandCode::Stp,
        CommandCode::Rst,
        CommandCode::Fben,
        CommandCode::Fbxt,
        CommandCode::Fbcs,
        CommandCode::Fbes,
        CommandCode::Fbfe,
        CommandCode::Fbst,
    ];

    /// 线上助记符
    pub fn as_str(self) -> &'static str {
        match self {
            CommandCode::Mov => "MOV",
            CommandCode::Ext => "EXT",
            CommandCode::Pos => "POS",
            CommandCode::Sts => "STS",
            CommandCode::Desc => "DESC",
            CommandCode::Info => "INFO",
            CommandCode::Stp => "STP",
            CommandCode::Rst => "RST",
            CommandCode::Fben => "FBEN",
            CommandCode::Fbxt => "FBXT",
            CommandCode::Fbcs => "FBCS",
            CommandCode::Fbes => "FBES",
            CommandCode::Fbfe => "FBFE",
            CommandCode::Fbst => "FBST",
        }
    }

    pub fn family(self) -> CommandFamily {
        match self {
            CommandCode::Mov
            | CommandCode::Ext
            | CommandCode::Pos
            | CommandCode::Sts
            | CommandCode::Desc
            | CommandCode::Info
            | CommandCode::Stp
            | CommandCode::Rst => CommandFamily::Direct,
            CommandCode::Fbcs | CommandCode::Fbes | CommandCode::Fbfe | CommandCode::Fbst => {
                CommandFamily::Servodrive
            },
            CommandCode::Fben | CommandCode::Fbxt => CommandFamily::Transition,
        }
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandCode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandCode::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProtocolError::UnknownCode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonic_roundtrip_for_every_code() {
        for code in CommandCode::ALL {
            assert_eq!(code.as_str().parse::<CommandCode>().unwrap(), code);
        }
        assert_eq!("fbst".parse::<CommandCode>().unwrap(), CommandCode::Fbst);
    }

    #[test]
    fn test_unknown_code() {
        assert!(matches!(
            "OEMC".parse::<CommandCode>(),
            Err(ProtocolError::UnknownCode(code)) if code == "OEMC"
        ));
    }

    #[test]
    fn test_families() {
        let direct = [
            CommandCode::Mov,
            CommandCode::Ext,
            CommandCode::Pos,
            CommandCode::Sts,
            CommandCode::Desc,
            CommandCode::Info,
            CommandCode::Stp,
            CommandCode::Rst,
        ];
        for code in direct {
            assert_eq!(code.family(), CommandFamily::Direct, "{code}");
        }
        for code in [
            CommandCode::Fbcs,
            CommandCode::Fbes,
            CommandCode::Fbfe,
            CommandCode::Fbst,
        ] {
            assert_eq!(code.family(), CommandFamily::Servodrive, "{code}");
        }
        assert_eq!(CommandCode::Fben.family(), CommandFamily::Transition);
        assert_eq!(CommandCode::Fbxt.family(), CommandFamily::Transition);
    }
}
