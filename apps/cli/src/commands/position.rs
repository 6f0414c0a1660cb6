//! 位置查询命令

use anyhow::Result;
use clap::Args;
use mcm_sdk::{Session, Transport};

use crate::output::Output;

/// 位置查询命令参数
#[derive(Args, Debug, Clone)]
pub struct PositionCommand {
    /// 模块地址
    pub address: String,

    /// 通道
    #[arg(short, long, default_value = "1")]
    pub channel: String,

    /// 输出编码器原始值（RVL）而不是位置（POS）
    #[arg(long)]
    pub raw: bool,
}

impl PositionCommand {
    pub fn execute<T: Transport>(&self, session: &mut Session<T>, force: bool) -> Result<Output> {
        let (address, channel) = (self.address.as_str(), self.channel.as_str());
        Ok(if self.raw {
            Output::Scalar {
                key: "RVL",
                value: session.get_position_raw(address, channel, force)?,
            }
        } else {
            Output::Scalar {
                key: "POS",
                value: session.get_position(address, channel, force)?,
            }
        })
    }
}
