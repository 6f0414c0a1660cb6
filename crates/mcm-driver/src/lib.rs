//! 驱动层模块
//!
//! 本模块提供 MCM 控制器的会话功能，包括：
//! - 每地址运动设置缓存（带范围校验）
//! - 指令台账与回显核对
//! - Servodrive 模式门
//! - 设备错误识别
//! - 单线程排队执行（[`SessionWorker`]）
//!
//! # 使用场景
//!
//! 大多数用户通过 [`SessionBuilder`] 建立 [`Session`]，直接调用其上的操作。

mod builder;
pub mod config;
pub mod device;
mod error;
pub mod ledger;
pub mod mode;
mod session;
pub mod settings;
mod worker;

pub use builder::SessionBuilder;
pub use config::{DEFAULT_EXECUTABLE, SessionConfig, SettingsPreset};
pub use error::{DeviceError, DriverError};
pub use ledger::{CommandLedger, PendingCommand};
pub use mode::{ModeGate, ModeState};
pub use session::{DEFAULT_PGAIN, Session};
pub use settings::{MotionOverrides, SettingField, SettingsStore};
pub use worker::{SessionHandle, SessionWorker};
