//! Builder 模式实现
//!
//! 提供链式构造 `Session` 实例的便捷方式。

use std::path::PathBuf;

use mcm_transport::{ProcessTransport, Transport};

use crate::config::SessionConfig;
use crate::error::DriverError;
use crate::session::Session;

/// Session Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use mcm_driver::SessionBuilder;
///
/// // 服务器模式，指定设备
/// let session = SessionBuilder::new()
///     .executable("C:/JPE/cacli.exe")
///     .server(true)
///     .device("1025")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    /// 基础配置（未设置时使用默认配置）
    config: SessionConfig,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有配置开始（例如从 TOML 读取的配置）
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// 传输可执行文件路径（默认 `cacli.exe`）
    pub fn executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.config.executable = executable.into();
        self
    }

    /// 服务器模式
    pub fn server(mut self, server: bool) -> Self {
        self.config.server = server;
        self
    }

    /// 设备 id
    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.config.device = Some(device.into());
        self
    }

    /// 以 info 级别记录每次调用
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// 使用子进程传输构建会话
    ///
    /// # Errors
    /// - `DriverError::Configuration`: 可执行文件不存在
    pub fn build(self) -> Result<Session<ProcessTransport>, DriverError> {
        self.build_with(ProcessTransport::new())
    }

    /// 使用自定义传输构建会话（测试中传入 Mock）
    pub fn build_with<T: Transport>(self, transport: T) -> Result<Session<T>, DriverError> {
        Session::new(self.config, transport)
    }
}
