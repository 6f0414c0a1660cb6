//! MCM SDK - JPE MCM 步进控制器 Rust SDK
//!
//! 通过厂商命令行工具 `cacli` 与控制器通信：每条指令一次子进程调用，
//! 回复按 `key : value` 行解析为结构化结果。
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **协议层** (`protocol`): 指令编码、回复解码（无 IO）
//! - **传输层** (`transport`): 子进程调用抽象，测试中可替换为 Mock
//! - **驱动层** (`driver`): 会话、设置缓存、指令台账、模式门
//!
//! # 快速开始
//!
//! ```no_run
//! use mcm_sdk::prelude::*;
//!
//! mcm_sdk::init_logger();
//! let mut session = SessionBuilder::new().server(true).build()?;
//! session.move_to(1, Direction::Forward, 1, &MotionOverrides::new().steps(500))?;
//! let position = session.get_position(1, 1, false)?;
//! println!("position: {position}");
//! # Ok::<(), DriverError>(())
//! ```

pub use mcm_driver as driver;
pub use mcm_protocol as protocol;
pub use mcm_transport as transport;

mod logging;
pub mod prelude;

pub use logging::{DEFAULT_LOG_FILTER, init_logger, init_logger_with};

// 常用类型
pub use driver::{
    DeviceError, DriverError, ModeState, MotionOverrides, Session, SessionBuilder, SessionConfig,
    SessionHandle, SessionWorker,
};
pub use protocol::{
    Address, Channel, Command, CommandCode, Direction, ProtocolError, Reply, ResponseFields, Value,
};
pub use transport::{ProcessTransport, Transport, TransportError};
