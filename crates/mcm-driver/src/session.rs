//! 会话
//!
//! 一个 `Session` 对应一条控制器连接，独占设置缓存、指令台账和模式门。
//! 每个操作都是一次完整的请求/回复往返：
//!
//! ```text
//! 覆盖设置 → 模式检查 → 编码 → 台账登记 → 传输调用 → 回显核对 → 设备错误识别 → 解码
//! ```
//!
//! 所有方法都取 `&mut self`：同一会话同一时刻只能有一个调用者。
//! 需要跨线程共享时使用 [`SessionWorker`](crate::worker::SessionWorker)。

use mcm_protocol::{
    Address, Channel, Command, CommandCode, Direction, Reply, ResponseFields, decode,
};
use mcm_transport::Transport;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::device;
use crate::error::DriverError;
use crate::ledger::CommandLedger;
use crate::mode::{ModeGate, ModeState};
use crate::settings::{MotionOverrides, SettingsStore};

/// FBEN 默认比例增益
pub const DEFAULT_PGAIN: u32 = 300;

/// Servodrive 使用地址 "1" 的 profile / temperature
const SERVODRIVE_SETTINGS_ADDRESS: &str = "1";

/// 控制器会话
pub struct Session<T: Transport> {
    config: SessionConfig,
    transport: T,
    settings: SettingsStore,
    ledger: CommandLedger,
    gate: ModeGate,
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("mode", &self.gate.state())
            .field("pending", &self.ledger.pending())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Session<T> {
    /// 建立会话
    ///
    /// # 错误
    /// - `DriverError::Configuration`: 传输可执行文件不可达
    /// - `DriverError::Validation`: 配置中的预置设置越界
    pub fn new(config: SessionConfig, transport: T) -> Result<Self, DriverError> {
        transport
            .probe(&config.executable)
            .map_err(|e| DriverError::Configuration(e.to_string()))?;
        let settings = config.initial_settings()?;

        info!(
            executable = %config.executable.display(),
            selector = ?config.device_selector(),
            "MCM session ready"
        );

        Ok(Self {
            config,
            transport,
            settings,
            ledger: CommandLedger::new(),
            gate: ModeGate::new(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// 当前 Servodrive 模式
    pub fn mode(&self) -> ModeState {
        self.gate.state()
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    /// 在途指令数（正常情况下调用之间恒为 0）
    pub fn pending_commands(&self) -> usize {
        self.ledger.pending()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 拆出传输层
    pub fn into_transport(self) -> T {
        self.transport
    }

    // ==================== 设置 ====================

    pub fn set_frequency(&mut self, address: impl Into<Address>, hz: i64) -> Result<(), DriverError> {
        self.settings.set_frequency(address, hz)
    }

    pub fn set_step_size(
        &mut self,
        address: impl Into<Address>,
        percent: i64,
    ) -> Result<(), DriverError> {
        self.settings.set_step_size(address, percent)
    }

    pub fn set_temperature(
        &mut self,
        address: impl Into<Address>,
        kelvin: i64,
    ) -> Result<(), DriverError> {
        self.settings.set_temperature(address, kelvin)
    }

    pub fn set_steps(&mut self, address: impl Into<Address>, steps: i64) -> Result<(), DriverError> {
        self.settings.set_steps(address, steps)
    }

    pub fn set_profile(&mut self, address: impl Into<Address>, profile: impl Into<String>) {
        self.settings.set_profile(address, profile)
    }

    pub fn frequency(&self, address: impl Into<Address>) -> Result<u32, DriverError> {
        self.settings.frequency(address)
    }

    pub fn step_size(&self, address: impl Into<Address>) -> Result<u32, DriverError> {
        self.settings.step_size(address)
    }

    pub fn temperature(&self, address: impl Into<Address>) -> Result<u32, DriverError> {
        self.settings.temperature(address)
    }

    pub fn steps(&self, address: impl Into<Address>) -> Result<u32, DriverError> {
        self.settings.steps(address)
    }

    pub fn profile(&self, address: impl Into<Address>) -> Result<String, DriverError> {
        self.settings.profile(address)
    }

    // ==================== 直驱指令 ====================

    /// 移动（MOV）
    ///
    /// `overrides` 中的设置先写入缓存（保留），再编码。
    pub fn move_to(
        &mut self,
        address: impl Into<Address>,
        direction: Direction,
        channel: impl Into<Channel>,
        overrides: &MotionOverrides,
    ) -> Result<ResponseFields, DriverError> {
        let address = address.into();
        self.settings.apply(&address, overrides)?;
        self.gate.check(CommandCode::Mov, overrides.force)?;
        let settings = self.settings.snapshot(&address)?;
        self.dispatch(Command::Move {
            address,
            channel: channel.into(),
            direction,
            settings,
        })?
        .into_fields()
        .map_err(Into::into)
    }

    /// 选择外部模拟输入（EXT，Flexdrive）
    ///
    /// CADM2 上电时会做零点校准，上电期间输入必须保持 0 V。
    pub fn select_analogue_input(
        &mut self,
        address: impl Into<Address>,
        direction: Direction,
        channel: impl Into<Channel>,
        overrides: &MotionOverrides,
    ) -> Result<ResponseFields, DriverError> {
        let address = address.into();
        self.settings.apply(&address, overrides)?;
        self.gate.check(CommandCode::Ext, overrides.force)?;
        let settings = self.settings.snapshot(&address)?;
        self.dispatch(Command::SelectAnalogueInput {
            address,
            channel: channel.into(),
            direction,
            settings,
        })?
        .into_fields()
        .map_err(Into::into)
    }

    /// 编码器位置（POS 字段）
    pub fn get_position(
        &mut self,
        address: impl Into<Address>,
        channel: impl Into<Channel>,
        force: bool,
    ) -> Result<i64, DriverError> {
        let fields = self.position_fields(address.into(), channel.into(), force)?;
        Ok(fields.int("POS")?)
    }

    /// 编码器原始值（RVL 字段）
    pub fn get_position_raw(
        &mut self,
        address: impl Into<Address>,
        channel: impl Into<Channel>,
        force: bool,
    ) -> Result<i64, DriverError> {
        let fields = self.position_fields(address.into(), channel.into(), force)?;
        Ok(fields.int("RVL")?)
    }

    /// 状态（STS）
    pub fn get_status(
        &mut self,
        address: impl Into<Address>,
        force: bool,
    ) -> Result<ResponseFields, DriverError> {
        self.fields(
            Command::Status {
                address: address.into(),
            },
            force,
        )
    }

    /// 模块描述（DESC）
    pub fn get_description(
        &mut self,
        address: impl Into<Address>,
        force: bool,
    ) -> Result<ResponseFields, DriverError> {
        self.fields(
            Command::Description {
                address: address.into(),
            },
            force,
        )
    }

    /// 定位器信息（INFO）
    pub fn get_information(
        &mut self,
        address: impl Into<Address>,
        channel: impl Into<Channel>,
        force: bool,
    ) -> Result<ResponseFields, DriverError> {
        self.fields(
            Command::Information {
                address: address.into(),
                channel: channel.into(),
            },
            force,
        )
    }

    /// 停止运动（STP，仅 Flexdrive）
    pub fn stop(
        &mut self,
        address: impl Into<Address>,
        force: bool,
    ) -> Result<ResponseFields, DriverError> {
        self.fields(
            Command::Stop {
                address: address.into(),
            },
            force,
        )
    }

    /// 位置计数清零（RST），返回控制器原文
    pub fn reset_position(
        &mut self,
        address: impl Into<Address>,
        channel: impl Into<Channel>,
        force: bool,
    ) -> Result<String, DriverError> {
        let reply = self.execute(
            Command::ResetPosition {
                address: address.into(),
                channel: channel.into(),
            },
            force,
        )?;
        Ok(reply.into_raw()?)
    }

    /// 编码器自动校准
    ///
    /// 该流程是交互式的，无法在一次请求/回复中完成，始终返回 `Unimplemented`。
    pub fn autocalibrate(
        &mut self,
        address: impl Into<Address>,
        channel: impl Into<Channel>,
    ) -> Result<ResponseFields, DriverError> {
        let (address, channel) = (address.into(), channel.into());
        debug!(%address, %channel, "Autocalibration requested");
        Err(DriverError::Unimplemented("encoder autocalibration"))
    }

    // ==================== Servodrive ====================

    /// 使能 Servodrive（FBEN）
    ///
    /// 只使用 `overrides` 中的 temperature / profile，写入地址 "1"。
    /// 模式先切换为 `Enabled` 再下发指令：即使 FBEN 失败，模式门也保持 `Enabled`。
    pub fn enable_servodrive(
        &mut self,
        pgain: u32,
        overrides: &MotionOverrides,
    ) -> Result<ResponseFields, DriverError> {
        let servodrive_overrides = MotionOverrides {
            temperature: overrides.temperature,
            profile: overrides.profile.clone(),
            ..MotionOverrides::default()
        };
        self.settings
            .apply(SERVODRIVE_SETTINGS_ADDRESS, &servodrive_overrides)?;
        let profile = self.settings.profile(SERVODRIVE_SETTINGS_ADDRESS)?;
        let temperature = self.settings.temperature(SERVODRIVE_SETTINGS_ADDRESS)?;

        self.gate.enable();
        self.dispatch(Command::EnableServodrive {
            pgain,
            profile,
            temperature,
        })?
        .into_fields()
        .map_err(Into::into)
    }

    /// 退出 Servodrive（FBXT）
    pub fn disable_servodrive(&mut self) -> Result<ResponseFields, DriverError> {
        self.gate.disable();
        self.dispatch(Command::DisableServodrive)?
            .into_fields()
            .map_err(Into::into)
    }

    /// 设定目标点（FBCS），未接的轴填 0
    pub fn servodrive_go_to(
        &mut self,
        pos1: i64,
        pos2: i64,
        pos3: i64,
        force: bool,
    ) -> Result<ResponseFields, DriverError> {
        self.fields(Command::ServodriveGoTo { pos1, pos2, pos3 }, force)
    }

    /// 急停（FBES）
    pub fn servodrive_emergency_stop(&mut self, force: bool) -> Result<ResponseFields, DriverError> {
        self.fields(Command::ServodriveEmergencyStop, force)
    }

    /// 寻找限位（FBFE）
    ///
    /// - `filter`: 速度轮询延迟（相对值，1-20）
    /// - `zero`: 完成后是否把位置清零
    pub fn servodrive_find_end_stops(
        &mut self,
        direction: Direction,
        filter: u32,
        zero: bool,
        force: bool,
    ) -> Result<ResponseFields, DriverError> {
        self.fields(
            Command::ServodriveFindEndStops {
                direction,
                filter,
                zero,
            },
            force,
        )
    }

    /// 状态与位置（FBST），所有字段均为整数
    ///
    /// - `ENABLED`: 0 未使能，1 使能，2 正在寻找限位
    /// - `BUSY`: 1 表示正在缩小设定点误差
    /// - `POSx` / `ERRx`: 各轴当前位置和与目标的偏差
    pub fn servodrive_status_position(&mut self, force: bool) -> Result<ResponseFields, DriverError> {
        self.fields(Command::ServodriveStatusPosition, force)
    }

    // ==================== 底层 ====================

    /// 经过模式检查下发任意指令
    pub fn execute(&mut self, command: Command, force: bool) -> Result<Reply, DriverError> {
        self.gate.check(command.code(), force)?;
        self.dispatch(command)
    }

    fn fields(&mut self, command: Command, force: bool) -> Result<ResponseFields, DriverError> {
        Ok(self.execute(command, force)?.into_fields()?)
    }

    fn position_fields(
        &mut self,
        address: Address,
        channel: Channel,
        force: bool,
    ) -> Result<ResponseFields, DriverError> {
        self.fields(Command::Position { address, channel }, force)
    }

    /// 传输参数：`[executable, selector?, tokens...]`
    fn transport_args(&self, tokens: &[String]) -> Vec<String> {
        let mut args = Vec::with_capacity(tokens.len() + 2);
        args.push(self.config.executable.to_string_lossy().into_owned());
        args.extend(self.config.device_selector());
        args.extend_from_slice(tokens);
        args
    }

    fn dispatch(&mut self, command: Command) -> Result<Reply, DriverError> {
        let code = command.code();
        let tokens = command.tokens();
        let args = self.transport_args(&tokens);
        let id = self.ledger.issue(args.clone(), code, tokens);

        let output = match self.transport.invoke(&args) {
            Ok(output) => output,
            Err(e) => {
                self.ledger.abandon(id);
                return Err(e.into());
            },
        };

        if self.config.verbose {
            info!(
                id,
                args = ?output.args,
                stdout = %output.stdout.trim(),
                stderr = %output.stderr.trim(),
                "Transport reply"
            );
        } else {
            debug!(id, %code, exit_code = ?output.exit_code, "Transport reply");
        }

        self.ledger.settle(id, &output.args)?;
        device::classify(&output)?;
        let reply = decode(code, &output.stdout)?;
        debug!(id, %code, ?reply, "Decoded reply");
        Ok(reply)
    }
}
