//! 会话配置
//!
//! 可以直接构造，也可以从 TOML 读取：
//!
//! ```toml
//! executable = "C:/JPE/cacli.exe"
//! server = true
//! device = "1025"
//! verbose = false
//!
//! [settings.3]
//! frequency = 300
//! profile = "CLA2601"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DriverError;
use crate::settings::{MotionOverrides, SettingsStore};

/// 默认传输可执行文件
pub const DEFAULT_EXECUTABLE: &str = "cacli.exe";

/// 单个地址的预置设置（全部可选）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsPreset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl From<&SettingsPreset> for MotionOverrides {
    fn from(preset: &SettingsPreset) -> Self {
        MotionOverrides {
            frequency: preset.frequency,
            step_size: preset.step_size,
            temperature: preset.temperature,
            steps: preset.steps,
            profile: preset.profile.clone(),
            force: false,
        }
    }
}

/// 会话配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// 传输可执行文件路径
    pub executable: PathBuf,
    /// 是否通过 cacli 服务器模式访问
    pub server: bool,
    /// 设备 id（None 表示默认设备）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// 以 info 级别记录每次调用的参数和输出
    pub verbose: bool,
    /// 按地址的预置设置，会话建立时写入缓存
    pub settings: BTreeMap<String, SettingsPreset>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            server: false,
            device: None,
            verbose: false,
            settings: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, DriverError> {
        toml::from_str(content)
            .map_err(|e| DriverError::Configuration(format!("invalid session config: {e}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DriverError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, DriverError> {
        toml::to_string_pretty(self)
            .map_err(|e| DriverError::Configuration(format!("cannot serialize config: {e}")))
    }

    /// 设备选择符
    ///
    /// - 服务器模式：`@SERV` 或 `@SERV:<device>`
    /// - 直连模式：`@<device>`，未指定设备时省略
    pub fn device_selector(&self) -> Option<String> {
        match (self.server, &self.device) {
            (true, None) => Some("@SERV".to_string()),
            (true, Some(device)) => Some(format!("@SERV:{device}")),
            (false, Some(device)) => Some(format!("@{device}")),
            (false, None) => None,
        }
    }

    /// 默认值加上预置设置
    pub(crate) fn initial_settings(&self) -> Result<SettingsStore, DriverError> {
        let mut store = SettingsStore::with_defaults();
        for (address, preset) in &self.settings {
            store.apply(address.as_str(), &MotionOverrides::from(preset))?;
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_device_selector() {
        let mut config = SessionConfig::default();
        assert_eq!(config.device_selector(), None);

        config.device = Some("1025".into());
        assert_eq!(config.device_selector().as_deref(), Some("@1025"));

        config.server = true;
        assert_eq!(config.device_selector().as_deref(), Some("@SERV:1025"));

        config.device = None;
        assert_eq!(config.device_selector().as_deref(), Some("@SERV"));
    }

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.executable, PathBuf::from("cacli.exe"));
    }

    #[test]
    fn test_parse_full_toml() {
        let config = SessionConfig::from_toml_str(
            r#"
            executable = "/opt/jpe/cacli"
            server = true
            device = "1025"
            verbose = true

            [settings.3]
            frequency = 300
            profile = "CLA2601"
            "#,
        )
        .unwrap();
        assert_eq!(config.executable, PathBuf::from("/opt/jpe/cacli"));
        assert!(config.server && config.verbose);
        let preset = &config.settings["3"];
        assert_eq!(preset.frequency, Some(300));
        assert_eq!(preset.profile.as_deref(), Some("CLA2601"));

        let store = config.initial_settings().unwrap();
        assert_eq!(store.frequency(3).unwrap(), 300);
        assert_eq!(store.profile(3).unwrap(), "CLA2601");
        assert_eq!(store.frequency(1).unwrap(), 100);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = SessionConfig::from_toml_str("exe = \"x\"").unwrap_err();
        assert!(matches!(err, DriverError::Configuration(_)));
    }

    #[test]
    fn test_out_of_range_preset_rejected() {
        let config = SessionConfig::from_toml_str("[settings.1]\nfrequency = 900").unwrap();
        assert!(matches!(
            config.initial_settings(),
            Err(DriverError::Validation { .. })
        ));
    }

    #[test]
    fn test_load_and_roundtrip_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server = true\ndevice = \"7\"").unwrap();
        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.device_selector().as_deref(), Some("@SERV:7"));

        let text = config.to_toml_string().unwrap();
        assert_eq!(SessionConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SessionConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, DriverError::Configuration(_)));
    }
}
