//! Servodrive 模式门
//!
//! 控制器在直驱（开环）与 Servodrive（闭环）之间二选一。
//! 直驱指令只能在 Servodrive 关闭时下发，Servodrive 指令只能在开启时下发。

use std::fmt;

use mcm_protocol::{CommandCode, CommandFamily};
use tracing::{info, warn};

use crate::error::DriverError;

/// Servodrive 模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeState {
    /// 未使能（默认），允许直驱指令
    #[default]
    Disabled,
    /// 已使能，允许 Servodrive 指令
    Enabled,
}

impl ModeState {
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }

    /// 该模式下允许的指令族
    fn admits(self, family: CommandFamily) -> bool {
        match family {
            CommandFamily::Transition => true,
            CommandFamily::Direct => self == Self::Disabled,
            CommandFamily::Servodrive => self == Self::Enabled,
        }
    }
}

impl fmt::Display for ModeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeState::Disabled => f.write_str("disabled"),
            ModeState::Enabled => f.write_str("enabled"),
        }
    }
}

/// 模式门
///
/// 状态只在 [`enable`](Self::enable) / [`disable`](Self::disable) 中改变。
#[derive(Debug, Default)]
pub struct ModeGate {
    state: ModeState,
}

impl ModeGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ModeState {
        self.state
    }

    /// 检查指令能否在当前模式下下发
    ///
    /// `force` 为 true 时完全跳过检查。
    pub fn check(&self, code: CommandCode, force: bool) -> Result<(), DriverError> {
        if self.state.admits(code.family()) {
            return Ok(());
        }
        if force {
            warn!(%code, mode = %self.state, "Mode gate bypassed by force flag");
            return Ok(());
        }
        Err(DriverError::State {
            code,
            mode: self.state,
        })
    }

    pub fn enable(&mut self) {
        if self.state != ModeState::Enabled {
            info!("Servodrive mode: disabled -> enabled");
        }
        self.state = ModeState::Enabled;
    }

    pub fn disable(&mut self) {
        if self.state != ModeState::Disabled {
            info!("Servodrive mode: enabled -> disabled");
        }
        self.state = ModeState::Disabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disabled() {
        let gate = ModeGate::new();
        assert_eq!(gate.state(), ModeState::Disabled);
        assert!(!gate.state().is_enabled());
    }

    #[test]
    fn test_families_per_state() {
        let mut gate = ModeGate::new();
        for code in CommandCode::ALL {
            let allowed = gate.check(code, false).is_ok();
            assert_eq!(allowed, code.family() != CommandFamily::Servodrive, "{code}");
        }

        gate.enable();
        for code in CommandCode::ALL {
            let allowed = gate.check(code, false).is_ok();
            assert_eq!(allowed, code.family() != CommandFamily::Direct, "{code}");
        }
    }

    #[test]
    fn test_state_error_carries_code_and_mode() {
        let mut gate = ModeGate::new();
        gate.enable();
        let err = gate.check(CommandCode::Pos, false).unwrap_err();
        assert!(matches!(
            err,
            DriverError::State {
                code: CommandCode::Pos,
                mode: ModeState::Enabled
            }
        ));
    }

    #[test]
    fn test_force_bypasses_gate() {
        let mut gate = ModeGate::new();
        assert!(gate.check(CommandCode::Fbst, true).is_ok());
        gate.enable();
        assert!(gate.check(CommandCode::Mov, true).is_ok());
    }

    #[test]
    fn test_enable_disable_roundtrip() {
        let mut gate = ModeGate::new();
        gate.enable();
        gate.enable();
        assert_eq!(gate.state(), ModeState::Enabled);
        gate.disable();
        assert_eq!(gate.state(), ModeState::Disabled);
        assert!(gate.check(CommandCode::Fbcs, false).is_err());
    }
}
