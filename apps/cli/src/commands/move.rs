//! 移动命令
//!
//! MOV 与 EXT 共用参数；未给出的设置使用会话缓存中的值，给出的值会写回缓存。

use clap::Args;
use mcm_sdk::{Direction, MotionOverrides};

/// 移动命令参数
#[derive(Args, Debug, Clone)]
pub struct MoveCommand {
    /// 模块地址
    pub address: String,

    /// 方向：forward/cw/1 或 backward/ccw/0
    pub direction: Direction,

    /// 通道
    #[arg(short, long, default_value = "1")]
    pub channel: String,

    /// 步进频率（Hz，0-600）
    #[arg(long)]
    pub frequency: Option<i64>,

    /// 步幅（%，0-100）
    #[arg(long)]
    pub step_size: Option<i64>,

    /// 环境温度（K，0-300）
    #[arg(long)]
    pub temperature: Option<i64>,

    /// 步数（0-50000，EXT 忽略）
    #[arg(long)]
    pub steps: Option<i64>,

    /// 定位器型号
    #[arg(long)]
    pub profile: Option<String>,
}

impl MoveCommand {
    pub fn overrides(&self, force: bool) -> MotionOverrides {
        MotionOverrides {
            frequency: self.frequency,
            step_size: self.step_size,
            temperature: self.temperature,
            steps: self.steps,
            profile: self.profile.clone(),
            force,
        }
    }
}
