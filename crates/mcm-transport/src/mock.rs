//! Mock 传输（无硬件依赖）
//!
//! 按脚本返回回复，记录每次调用的参数，并可以模拟回显被破坏、进程启动失败等故障。
//! 克隆共享同一份内部状态：把一份交给会话，另一份留在测试里检查。

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Transport, TransportError, TransportOutput};

/// 预设回复
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockReply {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl MockReply {
    /// 退出码 0
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    /// 指定退出码
    pub fn exit(code: i32, stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(code),
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }
}

type Responder = Box<dyn FnMut(&[String]) -> MockReply + Send>;

struct MockState {
    replies: VecDeque<MockReply>,
    responder: Option<Responder>,
    invocations: Vec<Vec<String>>,
    corrupt_next_echo: bool,
    fail_next_spawn: bool,
    executable_present: bool,
}

/// Mock 传输
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                replies: VecDeque::new(),
                responder: None,
                invocations: Vec::new(),
                corrupt_next_echo: false,
                fail_next_spawn: false,
                executable_present: true,
            })),
        }
    }

    /// 动态生成回复（脚本队列为空时使用）
    pub fn with_responder(
        self,
        responder: impl FnMut(&[String]) -> MockReply + Send + 'static,
    ) -> Self {
        self.state.lock().responder = Some(Box::new(responder));
        self
    }

    /// 追加一条脚本回复（FIFO）
    pub fn push_reply(&self, reply: MockReply) {
        self.state.lock().replies.push_back(reply);
    }

    /// 下一次调用回显错误的参数
    pub fn corrupt_next_echo(&self) {
        self.state.lock().corrupt_next_echo = true;
    }

    /// 下一次调用以 IO 错误失败（模拟进程无法启动）
    pub fn fail_next_spawn(&self) {
        self.state.lock().fail_next_spawn = true;
    }

    /// 控制 `probe` 的结果
    pub fn set_executable_present(&self, present: bool) {
        self.state.lock().executable_present = present;
    }

    /// 已记录的全部调用参数
    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.state.lock().invocations.clone()
    }

    pub fn last_invocation(&self) -> Option<Vec<String>> {
        self.state.lock().invocations.last().cloned()
    }

    pub fn invocation_count(&self) -> usize {
        self.state.lock().invocations.len()
    }
}

impl Transport for MockTransport {
    fn invoke(&mut self, args: &[String]) -> Result<TransportOutput, TransportError> {
        let mut state = self.state.lock();
        state.invocations.push(args.to_vec());

        if std::mem::take(&mut state.fail_next_spawn) {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "mock spawn failure",
            )));
        }

        let reply = match state.replies.pop_front() {
            Some(reply) => reply,
            None => match state.responder.as_mut() {
                Some(responder) => responder(args),
                None => MockReply::ok(""),
            },
        };

        let mut echoed = args.to_vec();
        if std::mem::take(&mut state.corrupt_next_echo) {
            echoed.push("<corrupted>".to_string());
        }

        Ok(TransportOutput {
            stdout: reply.stdout,
            stderr: reply.stderr,
            exit_code: reply.exit_code,
            args: echoed,
        })
    }

    fn probe(&self, executable: &Path) -> Result<(), TransportError> {
        if self.state.lock().executable_present {
            Ok(())
        } else {
            Err(TransportError::ExecutableNotFound(executable.to_path_buf()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scripted_replies_in_order_then_responder() {
        let mut mock = MockTransport::new()
            .with_responder(|args| MockReply::ok(format!("CODE : {}", args[1])));
        mock.push_reply(MockReply::ok("first"));
        mock.push_reply(MockReply::exit(2, "second"));

        let a = args(&["cacli.exe", "STS", "1"]);
        assert_eq!(mock.invoke(&a).unwrap().stdout, "first");
        let second = mock.invoke(&a).unwrap();
        assert_eq!(second.exit_code, Some(2));
        assert_eq!(mock.invoke(&a).unwrap().stdout, "CODE : STS");
        assert_eq!(mock.invocation_count(), 3);
    }

    #[test]
    fn test_clone_shares_state() {
        let observer = MockTransport::new();
        let mut session_side = observer.clone();
        session_side.invoke(&args(&["cacli.exe", "FBST"])).unwrap();
        assert_eq!(
            observer.last_invocation().unwrap(),
            args(&["cacli.exe", "FBST"])
        );
    }

    #[test]
    fn test_corrupt_echo_only_once() {
        let mut mock = MockTransport::new();
        mock.corrupt_next_echo();
        let a = args(&["cacli.exe", "FBXT"]);
        assert_ne!(mock.invoke(&a).unwrap().args, a);
        assert_eq!(mock.invoke(&a).unwrap().args, a);
    }

    #[test]
    fn test_fail_next_spawn() {
        let mut mock = MockTransport::new();
        mock.fail_next_spawn();
        assert!(matches!(
            mock.invoke(&args(&["x"])),
            Err(TransportError::Io(_))
        ));
        assert!(mock.invoke(&args(&["x"])).is_ok());
    }

    #[test]
    fn test_probe_follows_flag() {
        let mock = MockTransport::new();
        assert!(mock.probe(Path::new("cacli.exe")).is_ok());
        mock.set_executable_present(false);
        assert!(mock.probe(Path::new("cacli.exe")).is_err());
    }
}
