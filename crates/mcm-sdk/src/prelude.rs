//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use mcm_sdk::prelude::*;
//! ```

pub use crate::driver::{
    DEFAULT_PGAIN, ModeState, MotionOverrides, Session, SessionBuilder, SessionConfig,
    SessionHandle, SessionWorker,
};
pub use crate::protocol::{Address, Channel, Direction, Reply, ResponseFields, Value};
pub use crate::transport::Transport;

// 错误类型
pub use crate::driver::{DeviceError, DriverError};
pub use crate::protocol::ProtocolError;
pub use crate::transport::TransportError;
