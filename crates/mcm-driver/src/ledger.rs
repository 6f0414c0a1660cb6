//! 指令台账
//!
//! 记录每条已下发指令的完整传输参数，收到回复时按 id 取出并核对回显。
//! id 从 0 开始严格递增，会话生命周期内不复用；每条记录只会被取出一次。

use std::collections::BTreeMap;

use mcm_protocol::CommandCode;
use tracing::{trace, warn};

use crate::error::DriverError;

/// 待回复指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommand {
    /// 完整传输参数（含可执行文件和设备选择符）
    pub transport_args: Vec<String>,
    /// 指令码
    pub request_type: CommandCode,
    /// 编码后的 token（含指令码）
    pub raw_tokens: Vec<String>,
}

/// 指令台账
#[derive(Debug, Default)]
pub struct CommandLedger {
    next_id: u64,
    pending: BTreeMap<u64, PendingCommand>,
}

impl CommandLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一条指令，返回新分配的 id
    pub fn issue(
        &mut self,
        transport_args: Vec<String>,
        request_type: CommandCode,
        raw_tokens: Vec<String>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        trace!(id, code = %request_type, args = ?transport_args, "Ledger issue");
        self.pending.insert(
            id,
            PendingCommand {
                transport_args,
                request_type,
                raw_tokens,
            },
        );
        id
    }

    /// 结清一条指令并核对回显
    ///
    /// 记录先被移除，再比较；不一致时返回 `Integrity`，记录也不会残留。
    pub fn settle(&mut self, id: u64, echoed: &[String]) -> Result<PendingCommand, DriverError> {
        let entry = self.take(id)?;
        if entry.transport_args.as_slice() != echoed {
            warn!(id, expected = ?entry.transport_args, ?echoed, "Ledger integrity violation");
            return Err(DriverError::Integrity {
                id,
                expected: entry.transport_args,
                echoed: echoed.to_vec(),
            });
        }
        trace!(id, code = %entry.request_type, "Ledger settle");
        Ok(entry)
    }

    /// 丢弃没有产生回复的指令（传输层调用失败）
    pub fn abandon(&mut self, id: u64) -> Option<PendingCommand> {
        let entry = self.pending.remove(&id);
        if entry.is_some() {
            trace!(id, "Ledger abandon");
        }
        entry
    }

    /// 在途指令数
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn get(&self, id: u64) -> Option<&PendingCommand> {
        self.pending.get(&id)
    }

    /// 下一个将被分配的 id
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    fn take(&mut self, id: u64) -> Result<PendingCommand, DriverError> {
        // 未知 id 只可能是重复结清，同样说明对应关系已损坏
        self.pending.remove(&id).ok_or(DriverError::Integrity {
            id,
            expected: Vec::new(),
            echoed: Vec::new(),
        })
    }
}
