//! 会话工作线程
//!
//! 把一个 [`Session`] 移入专用线程，其他线程通过 [`SessionHandle`] 排队提交操作。
//! 队列先进先出，同一时刻只有一个操作在执行，每个调用者拿到的正是自己那条指令的回复。

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use mcm_transport::Transport;
use tracing::{debug, warn};

use crate::error::DriverError;
use crate::session::Session;

type Job<T> = Box<dyn FnOnce(&mut Session<T>) + Send>;

enum Request<T: Transport> {
    Run(Job<T>),
    /// 停止并交还会话
    Shutdown(Sender<Session<T>>),
}

/// 会话工作线程
///
/// # Example
///
/// ```no_run
/// use mcm_driver::{SessionBuilder, SessionWorker};
///
/// let session = SessionBuilder::new().build().unwrap();
/// let worker = SessionWorker::spawn(session).unwrap();
///
/// let handle = worker.handle();
/// let position = std::thread::spawn(move || handle.call(|s| s.get_position(1, 1, false)));
/// println!("{:?}", position.join().unwrap());
///
/// let _session = worker.shutdown().unwrap();
/// ```
pub struct SessionWorker<T: Transport> {
    tx: Sender<Request<T>>,
    thread: Option<JoinHandle<()>>,
}

impl<T: Transport + Send + 'static> SessionWorker<T> {
    /// 启动工作线程
    pub fn spawn(session: Session<T>) -> Result<Self, DriverError> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let thread = thread::Builder::new()
            .name("mcm-session".into())
            .spawn(move || worker_loop(session, rx))
            .map_err(DriverError::WorkerSpawn)?;
        Ok(Self {
            tx,
            thread: Some(thread),
        })
    }

    /// 获取提交句柄（可克隆，可跨线程）
    pub fn handle(&self) -> SessionHandle<T> {
        SessionHandle {
            tx: self.tx.clone(),
        }
    }

    /// 等待已排队的操作完成后停止线程，交还会话
    ///
    /// 之后通过句柄提交的操作返回 `WorkerClosed`。
    pub fn shutdown(mut self) -> Result<Session<T>, DriverError> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.tx
            .send(Request::Shutdown(reply_tx))
            .map_err(|_| DriverError::WorkerClosed)?;
        let session = reply_rx.recv().map_err(|_| DriverError::WorkerClosed)?;
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("Session worker panicked during shutdown");
        }
        Ok(session)
    }
}

impl<T: Transport> Drop for SessionWorker<T> {
    fn drop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        // 句柄可能仍然存活，不能靠通道断开来结束线程
        let (reply_tx, _reply_rx) = crossbeam_channel::bounded(1);
        if self.tx.send(Request::Shutdown(reply_tx)).is_ok() && thread.join().is_err() {
            warn!("Session worker panicked");
        }
    }
}

impl<T: Transport> fmt::Debug for SessionWorker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionWorker")
            .field("queued", &self.tx.len())
            .field("running", &self.thread.is_some())
            .finish()
    }
}

fn worker_loop<T: Transport>(mut session: Session<T>, rx: Receiver<Request<T>>) {
    debug!("Session worker started");
    while let Ok(request) = rx.recv() {
        match request {
            Request::Run(job) => job(&mut session),
            Request::Shutdown(reply) => {
                debug!("Session worker stopping");
                let _ = reply.send(session);
                return;
            },
        }
    }
    debug!("Session worker channel closed");
}

/// 提交句柄
pub struct SessionHandle<T: Transport> {
    tx: Sender<Request<T>>,
}

impl<T: Transport> Clone for SessionHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Transport> fmt::Debug for SessionHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle").field("queued", &self.tx.len()).finish()
    }
}

impl<T: Transport + Send + 'static> SessionHandle<T> {
    /// 排队执行一个会话操作并等待其结果
    ///
    /// # Errors
    /// - `DriverError::WorkerClosed`: 工作线程已停止
    /// - `DriverError::JobPanicked`: 操作 panic；工作线程和会话保留，后续调用不受影响
    /// - 其余错误来自操作本身
    pub fn call<R, F>(&self, f: F) -> Result<R, DriverError>
    where
        F: FnOnce(&mut Session<T>) -> Result<R, DriverError> + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let job: Job<T> = Box::new(move |session| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| f(session))).unwrap_or_else(|_| {
                warn!("Session operation panicked");
                Err(DriverError::JobPanicked)
            });
            let _ = reply_tx.send(result);
        });
        self.tx
            .send(Request::Run(job))
            .map_err(|_| DriverError::WorkerClosed)?;
        reply_rx.recv().map_err(|_| DriverError::WorkerClosed)?
    }
}
