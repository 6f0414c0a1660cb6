//! # MCM Protocol
//!
//! MCM 步进控制器的命令行协议定义（无 IO 依赖）
//!
//! ## 模块
//!
//! - `types`: 地址、通道、方向
//! - `code`: 指令码与指令族
//! - `command`: 逻辑指令到位置 token 的编码
//! - `response`: 回复文本到结构化结果的解码
//!
//! ## 线上格式
//!
//! 请求是位置参数列表 `[CODE, arg1, arg2, ...]`，没有字段名；
//! 回复是换行分隔的 `key : value` 行，RST 除外（原文返回）。

pub mod code;
pub mod command;
pub mod response;
pub mod types;

// 重新导出常用类型
pub use code::{CommandCode, CommandFamily};
pub use command::{Command, MotionSettings};
pub use response::{DecodeRule, Reply, ResponseFields, Value, decode, parse_fields};
pub use types::{Address, Channel, Direction};

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Malformed reply line (expected `key : value`): {0:?}")]
    MalformedLine(String),

    #[error("Field {key} is not an integer: {value:?}")]
    InvalidInteger { key: String, value: String },

    #[error("Reply has no field {0}")]
    MissingField(String),

    #[error("Field {key} is not {expected}")]
    UnexpectedType { key: String, expected: &'static str },

    #[error("Unexpected reply shape: {0}")]
    UnexpectedReply(String),

    #[error("Unknown command code: {0}")]
    UnknownCode(String),

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: String },
}
