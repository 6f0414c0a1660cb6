//! 设备级错误识别
//!
//! 两条固定回复与退出码无关，先于退出码检查。

use mcm_transport::TransportOutput;

use crate::error::DeviceError;

/// 控制器被占用时的回复
pub const DEVICE_NOT_FOUND: &str = "ERROR: DEVICE NOT FOUND";
/// 控制器处于外部输入模式时的回复
pub const UNABLE_TO_COMPLY: &str = "Unable to comply";

/// 检查一次调用的输出是否为设备错误
pub fn classify(output: &TransportOutput) -> Result<(), DeviceError> {
    let reply = output.stdout.trim();
    if reply == DEVICE_NOT_FOUND {
        return Err(DeviceError::DeviceNotFound {
            reply: reply.to_string(),
        });
    }
    if reply == UNABLE_TO_COMPLY {
        return Err(DeviceError::UnableToComply {
            reply: reply.to_string(),
        });
    }
    if !output.success() {
        return Err(DeviceError::CommandFailed {
            exit_code: output.exit_code,
            reply: reply.to_string(),
        });
    }
    Ok(())
}
