//! 查询类命令的公共参数

use clap::Args;

/// 只需要模块地址的命令
#[derive(Args, Debug, Clone)]
pub struct AddressArgs {
    /// 模块地址
    pub address: String,
}

/// 需要模块地址和通道的命令
#[derive(Args, Debug, Clone)]
pub struct ChannelArgs {
    /// 模块地址
    pub address: String,

    /// 通道
    #[arg(short, long, default_value = "1")]
    pub channel: String,
}
