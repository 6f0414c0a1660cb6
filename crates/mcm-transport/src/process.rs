//! 子进程传输
//!
//! 每次调用启动一个进程，捕获完整的 stdout / stderr 后返回。

use std::process::{Command, Stdio};

use tracing::{debug, trace};

use crate::{Transport, TransportError, TransportOutput};

/// 通过外部可执行文件访问控制器
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTransport;

impl ProcessTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for ProcessTransport {
    fn invoke(&mut self, args: &[String]) -> Result<TransportOutput, TransportError> {
        let (program, rest) = args.split_first().ok_or(TransportError::EmptyCommand)?;

        let mut command = Command::new(program);
        command
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // 回显的是 Command 实际持有的参数
        let echoed: Vec<String> = std::iter::once(command.get_program())
            .chain(command.get_args())
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

        debug!(?args, "Spawning transport process");
        let output = command.output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        trace!(status = ?output.status, %stdout, %stderr, "Transport process finished");

        Ok(TransportOutput {
            stdout,
            stderr,
            exit_code: output.status.code(),
            args: echoed,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_captures_stdout_and_echoes_args() {
        let args = sh("printf 'POS : 4\\nRVL : 40\\n'");
        let out = ProcessTransport::new().invoke(&args).unwrap();
        assert_eq!(out.stdout, "POS : 4\nRVL : 40\n");
        assert_eq!(out.exit_code, Some(0));
        assert_eq!(out.args, args);
    }

    #[test]
    fn test_captures_stderr_and_exit_code() {
        let out = ProcessTransport::new()
            .invoke(&sh("echo oops >&2; exit 3"))
            .unwrap();
        assert_eq!(out.stderr.trim(), "oops");
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let err = ProcessTransport::new()
            .invoke(&["/definitely/not/here/cacli.exe".to_string()])
            .unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }

    #[test]
    fn test_empty_command() {
        let err = ProcessTransport::new().invoke(&[]).unwrap_err();
        assert!(matches!(err, TransportError::EmptyCommand));
    }

    #[test]
    fn test_probe_accepts_existing_file() {
        use std::path::Path;
        assert!(ProcessTransport::new().probe(Path::new("/bin/sh")).is_ok());
    }
}
