//! # MCM Transport Layer
//!
//! 传输层抽象。控制器只能通过外部命令行程序（如 `cacli.exe`）访问：
//! 以参数列表启动进程，阻塞等待结束，收集输出。
//!
//! 参数列表约定为 `[executable, device_selector?, code, token...]`，
//! 由会话层构造；传输层只负责执行并原样回显参数。

use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod process;

#[cfg(feature = "mock")]
pub mod mock;

pub use process::ProcessTransport;

#[cfg(feature = "mock")]
pub use mock::{MockReply, MockTransport};

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Transport executable not found at {}", .0.display())]
    ExecutableNotFound(PathBuf),
    #[error("Empty command line")]
    EmptyCommand,
}

/// 一次调用的完整输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOutput {
    /// 标准输出（文本）
    pub stdout: String,
    /// 标准错误（文本）
    pub stderr: String,
    /// 进程退出码，被信号终止时为 `None`
    pub exit_code: Option<i32>,
    /// 回显的调用参数，必须与传入的参数逐字节一致
    pub args: Vec<String>,
}

impl TransportOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// 传输层协作者
///
/// 调用是同步阻塞的，没有超时：外部进程挂起会一直阻塞调用线程。
pub trait Transport {
    /// 以 `args` 启动一次调用（`args[0]` 为可执行文件）
    fn invoke(&mut self, args: &[String]) -> Result<TransportOutput, TransportError>;

    /// 检查可执行文件是否可达（会话建立时调用）
    fn probe(&self, executable: &Path) -> Result<(), TransportError> {
        if executable.is_file() || find_in_path(executable).is_some() {
            Ok(())
        } else {
            Err(TransportError::ExecutableNotFound(executable.to_path_buf()))
        }
    }
}

/// 在 `PATH` 中查找不带目录的可执行文件名
pub fn find_in_path(executable: &Path) -> Option<PathBuf> {
    if executable.components().count() != 1 {
        return None;
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(executable))
        .find(|candidate| candidate.is_file())
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn invoke(&mut self, args: &[String]) -> Result<TransportOutput, TransportError> {
        (**self).invoke(args)
    }

    fn probe(&self, executable: &Path) -> Result<(), TransportError> {
        (**self).probe(executable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullTransport;

    impl Transport for NullTransport {
        fn invoke(&mut self, args: &[String]) -> Result<TransportOutput, TransportError> {
            Ok(TransportOutput {
                stdout: String::new(),
                stderr: String::new(),
                exit_code: Some(0),
                args: args.to_vec(),
            })
        }
    }

    #[test]
    fn test_default_probe_rejects_missing_file() {
        let err = NullTransport
            .probe(Path::new("/definitely/not/here/cacli.exe"))
            .unwrap_err();
        assert!(matches!(err, TransportError::ExecutableNotFound(_)));
        assert!(err.to_string().contains("cacli.exe"));
    }

    #[test]
    fn test_default_probe_rejects_directory() {
        let dir = std::env::temp_dir();
        assert!(NullTransport.probe(&dir).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_bare_name_resolved_through_path() {
        assert!(find_in_path(Path::new("sh")).is_some());
        assert!(NullTransport.probe(Path::new("sh")).is_ok());
        assert!(find_in_path(Path::new("/bin/sh")).is_none());
    }

    #[test]
    fn test_boxed_transport_delegates() {
        let mut boxed: Box<dyn Transport> = Box::new(NullTransport);
        let args = vec!["cacli.exe".to_string(), "FBST".to_string()];
        let out = boxed.invoke(&args).unwrap();
        assert!(out.success());
        assert_eq!(out.args, args);
    }

    #[test]
    fn test_success_requires_zero_exit() {
        let mut out = NullTransport.invoke(&[]).unwrap();
        out.exit_code = Some(1);
        assert!(!out.success());
        out.exit_code = None;
        assert!(!out.success());
    }
}
