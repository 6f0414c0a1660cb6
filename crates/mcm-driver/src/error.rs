//! 驱动层错误类型定义

use mcm_protocol::{Address, CommandCode, ProtocolError};
use mcm_transport::TransportError;
use thiserror::Error;

use crate::mode::ModeState;
use crate::settings::SettingField;

/// 控制器自身报告的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// 控制器未找到（通常是另一个程序占用了连接）
    #[error("Error: {reply}; has another program connected to the controller?")]
    DeviceNotFound { reply: String },

    /// 控制器拒绝执行（通常处于外部输入模式）
    #[error("Error: {reply}; is controller in external input mode?")]
    UnableToComply { reply: String },

    /// 传输程序以非零状态退出
    #[error("Command failed (exit code {exit_code:?}): {reply}")]
    CommandFailed {
        exit_code: Option<i32>,
        reply: String,
    },
}

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 设置值超出范围（原值保持不变）
    #[error("{field} out of range: {value} (allowed {min}..={max})")]
    Validation {
        field: SettingField,
        value: i64,
        min: i64,
        max: i64,
    },

    /// 读取从未写入过的设置
    #[error("No {field} stored for address {address}")]
    NotFound {
        field: SettingField,
        address: Address,
    },

    /// 会话配置错误（可执行文件不可达、配置文件无效等）
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 控制器报告的错误
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// 回显参数与台账记录不一致
    ///
    /// 说明请求与回复的对应关系已被破坏，不可重试。
    #[error("Integrity violation for command #{id}: sent {expected:?}, transport echoed {echoed:?}")]
    Integrity {
        id: u64,
        expected: Vec<String>,
        echoed: Vec<String>,
    },

    /// 指令与当前 Servodrive 模式不符
    #[error("{code} is not allowed while servodrive is {mode}")]
    State { code: CommandCode, mode: ModeState },

    /// 功能未实现
    #[error("Not implemented: {0}")]
    Unimplemented(&'static str),

    /// 传输层错误
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// 协议解析错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 工作线程已退出
    #[error("Session worker closed")]
    WorkerClosed,

    /// 无法启动工作线程
    #[error("Failed to spawn session worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// 提交的操作 panic（会话仍可用）
    #[error("Session operation panicked")]
    JobPanicked,
}

impl DriverError {
    /// 是否为致命错误
    ///
    /// 台账不一致意味着请求/回复对应关系已损坏，会话不应继续使用。
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }

    /// 是否为调用方用法错误
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::NotFound { .. }
                | Self::State { .. }
                | Self::Configuration(_)
        )
    }

    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::Device(_))
    }
}
