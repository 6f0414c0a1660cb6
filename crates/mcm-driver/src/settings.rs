//! 设置缓存
//!
//! 按地址缓存运动参数。每个字段独立记录：只写过 `frequency` 的地址读 `profile` 仍然失败。
//! 所有 setter 先校验范围再写入，失败时原值不变。

use std::collections::HashMap;
use std::fmt;

use mcm_protocol::{Address, MotionSettings};
use tracing::trace;

use crate::error::DriverError;

/// 设置字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingField {
    /// 步进频率，Hz
    Frequency,
    /// 相对步长，%
    StepSize,
    /// 环境温度，K
    Temperature,
    /// 步数
    Steps,
    /// 控制器配置名（无约束）
    Profile,
}

impl SettingField {
    /// 数值字段的闭区间范围，`Profile` 返回 `None`
    pub fn range(self) -> Option<(i64, i64)> {
        match self {
            SettingField::Frequency => Some((0, 600)),
            SettingField::StepSize => Some((0, 100)),
            SettingField::Temperature => Some((0, 300)),
            SettingField::Steps => Some((0, 50_000)),
            SettingField::Profile => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SettingField::Frequency => "frequency",
            SettingField::StepSize => "step_size",
            SettingField::Temperature => "temperature",
            SettingField::Steps => "steps",
            SettingField::Profile => "profile",
        }
    }

    /// 校验数值
    pub fn validate(self, value: i64) -> Result<u32, DriverError> {
        let (min, max) = self.range().unwrap_or((i64::MIN, i64::MAX));
        if (min..=max).contains(&value) {
            u32::try_from(value).map_err(|_| self.out_of_range(value))
        } else {
            Err(self.out_of_range(value))
        }
    }

    fn out_of_range(self, value: i64) -> DriverError {
        let (min, max) = self.range().unwrap_or((0, 0));
        DriverError::Validation {
            field: self,
            value,
            min,
            max,
        }
    }
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单次调用附带的设置覆盖
///
/// 覆盖值会被写回缓存（保留到下一次修改），随后再编码指令。
/// `force` 跳过 Servodrive 模式检查，仅供诊断使用。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MotionOverrides {
    pub frequency: Option<i64>,
    pub step_size: Option<i64>,
    pub temperature: Option<i64>,
    pub steps: Option<i64>,
    pub profile: Option<String>,
    pub force: bool,
}

impl MotionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frequency(mut self, hz: i64) -> Self {
        self.frequency = Some(hz);
        self
    }

    pub fn step_size(mut self, percent: i64) -> Self {
        self.step_size = Some(percent);
        self
    }

    pub fn temperature(mut self, kelvin: i64) -> Self {
        self.temperature = Some(kelvin);
        self
    }

    pub fn steps(mut self, steps: i64) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

#[derive(Debug, Clone, Default)]
struct SettingsEntry {
    frequency: Option<u32>,
    step_size: Option<u32>,
    temperature: Option<u32>,
    steps: Option<u32>,
    profile: Option<String>,
}

/// 按地址的设置缓存
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    entries: HashMap<Address, SettingsEntry>,
}

/// 地址 "1" / "2" 的默认值
const DEFAULT_FREQUENCY: u32 = 100;
const DEFAULT_STEP_SIZE: u32 = 100;
const DEFAULT_TEMPERATURE: u32 = 293;
const DEFAULT_STEPS: u32 = 100;
const DEFAULT_PROFILE: &str = "PROFILE1";

impl SettingsStore {
    /// 空缓存
    pub fn empty() -> Self {
        Self::default()
    }

    /// 预置地址 "1" 和 "2" 的默认值
    pub fn with_defaults() -> Self {
        let mut store = Self::empty();
        for address in ["1", "2"] {
            store.entries.insert(
                Address::from(address),
                SettingsEntry {
                    frequency: Some(DEFAULT_FREQUENCY),
                    step_size: Some(DEFAULT_STEP_SIZE),
                    temperature: Some(DEFAULT_TEMPERATURE),
                    steps: Some(DEFAULT_STEPS),
                    profile: Some(DEFAULT_PROFILE.to_string()),
                },
            );
        }
        store
    }

    pub fn set_frequency(&mut self, address: impl Into<Address>, hz: i64) -> Result<(), DriverError> {
        let value = SettingField::Frequency.validate(hz)?;
        self.entry(address.into()).frequency = Some(value);
        Ok(())
    }

    pub fn set_step_size(
        &mut self,
        address: impl Into<Address>,
        percent: i64,
    ) -> Result<(), DriverError> {
        let value = SettingField::StepSize.validate(percent)?;
        self.entry(address.into()).step_size = Some(value);
        Ok(())
    }

    pub fn set_temperature(
        &mut self,
        address: impl Into<Address>,
        kelvin: i64,
    ) -> Result<(), DriverError> {
        let value = SettingField::Temperature.validate(kelvin)?;
        self.entry(address.into()).temperature = Some(value);
        Ok(())
    }

    pub fn set_steps(&mut self, address: impl Into<Address>, steps: i64) -> Result<(), DriverError> {
        let value = SettingField::Steps.validate(steps)?;
        self.entry(address.into()).steps = Some(value);
        Ok(())
    }

    pub fn set_profile(&mut self, address: impl Into<Address>, profile: impl Into<String>) {
        self.entry(address.into()).profile = Some(profile.into());
    }

    pub fn frequency(&self, address: impl Into<Address>) -> Result<u32, DriverError> {
        self.read(address.into(), SettingField::Frequency, |e| e.frequency)
    }

    pub fn step_size(&self, address: impl Into<Address>) -> Result<u32, DriverError> {
        self.read(address.into(), SettingField::StepSize, |e| e.step_size)
    }

    pub fn temperature(&self, address: impl Into<Address>) -> Result<u32, DriverError> {
        self.read(address.into(), SettingField::Temperature, |e| e.temperature)
    }

    pub fn steps(&self, address: impl Into<Address>) -> Result<u32, DriverError> {
        self.read(address.into(), SettingField::Steps, |e| e.steps)
    }

    pub fn profile(&self, address: impl Into<Address>) -> Result<String, DriverError> {
        self.read(address.into(), SettingField::Profile, |e| e.profile.clone())
    }

    /// 应用覆盖值
    ///
    /// 先校验全部字段，再统一写入：任何一个字段越界时缓存完全不变。
    pub fn apply(
        &mut self,
        address: impl Into<Address>,
        overrides: &MotionOverrides,
    ) -> Result<(), DriverError> {
        let address = address.into();
        let check = |field: SettingField, value: Option<i64>| value.map(|v| field.validate(v)).transpose();
        let frequency = check(SettingField::Frequency, overrides.frequency)?;
        let step_size = check(SettingField::StepSize, overrides.step_size)?;
        let temperature = check(SettingField::Temperature, overrides.temperature)?;
        let steps = check(SettingField::Steps, overrides.steps)?;

        let entry = self.entry(address.clone());
        if frequency.is_some() {
            entry.frequency = frequency;
        }
        if step_size.is_some() {
            entry.step_size = step_size;
        }
        if temperature.is_some() {
            entry.temperature = temperature;
        }
        if steps.is_some() {
            entry.steps = steps;
        }
        if let Some(profile) = &overrides.profile {
            entry.profile = Some(profile.clone());
        }
        trace!(%address, ?overrides, "Applied settings overrides");
        Ok(())
    }

    /// 取出编码 MOV / EXT 所需的全部字段
    pub fn snapshot(&self, address: impl Into<Address>) -> Result<MotionSettings, DriverError> {
        let address = address.into();
        Ok(MotionSettings {
            profile: self.profile(&address)?,
            temperature: self.temperature(&address)?,
            frequency: self.frequency(&address)?,
            step_size: self.step_size(&address)?,
            steps: self.steps(&address)?,
        })
    }

    /// 已知地址（任意字段写过即算）
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.entries.keys()
    }

    fn entry(&mut self, address: Address) -> &mut SettingsEntry {
        self.entries.entry(address).or_default()
    }

    fn read<V>(
        &self,
        address: Address,
        field: SettingField,
        get: impl FnOnce(&SettingsEntry) -> Option<V>,
    ) -> Result<V, DriverError> {
        self.entries
            .get(&address)
            .and_then(get)
            .ok_or(DriverError::NotFound { field, address })
    }
}
