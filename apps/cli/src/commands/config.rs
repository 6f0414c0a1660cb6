//! 配置管理命令
//!
//! 配置文件是 [`SessionConfig`] 的 TOML 形式；命令行选项覆盖文件中的值。

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use mcm_sdk::SessionConfig;

use crate::GlobalArgs;
use crate::output::OutputFormat;

/// 默认配置文件路径：`<config_dir>/mcm/config.toml`
pub fn default_config_file() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
    path.push("mcm");
    path.push("config.toml");
    Ok(path)
}

/// 读取配置并应用命令行覆盖
///
/// `--config` 指定的文件必须存在；默认路径的文件不存在时使用默认配置。
pub fn load_session_config(global: &GlobalArgs) -> Result<SessionConfig> {
    let mut config = match &global.config {
        Some(path) => read_config(path)?,
        None => match default_config_file() {
            Ok(path) if path.exists() => read_config(&path)?,
            _ => SessionConfig::default(),
        },
    };
    apply_overrides(&mut config, global);
    Ok(config)
}

fn read_config(path: &Path) -> Result<SessionConfig> {
    SessionConfig::load(path).with_context(|| format!("读取配置文件失败: {}", path.display()))
}

fn apply_overrides(config: &mut SessionConfig, global: &GlobalArgs) {
    if let Some(exe) = &global.exe {
        config.executable = exe.clone();
    }
    if global.server {
        config.server = true;
    }
    if let Some(device) = &global.device {
        config.device = Some(device.clone());
    }
    if global.verbose {
        config.verbose = true;
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示生效的配置（文件 + 命令行覆盖）
    Show,

    /// 显示配置文件路径
    Path,

    /// 把生效的配置写入配置文件
    Init {
        /// 覆盖已存在的文件
        #[arg(long)]
        overwrite: bool,
    },
}

impl ConfigCommand {
    pub fn execute(self, global: &GlobalArgs) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                let config = load_session_config(global)?;
                match global.format {
                    OutputFormat::Table => print!("{}", config.to_toml_string()?),
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                }
                Ok(())
            },

            ConfigCommand::Path => {
                let path = match &global.config {
                    Some(path) => path.clone(),
                    None => default_config_file()?,
                };
                println!("{}", path.display());
                Ok(())
            },

            ConfigCommand::Init { overwrite } => {
                let path = match &global.config {
                    Some(path) => path.clone(),
                    None => default_config_file()?,
                };
                if path.exists() && !overwrite {
                    anyhow::bail!("配置文件已存在: {}（使用 --overwrite 覆盖）", path.display());
                }

                let mut config = SessionConfig::default();
                apply_overrides(&mut config, global);
                if let Some(dir) = path.parent() {
                    fs::create_dir_all(dir).context("创建配置目录失败")?;
                }
                fs::write(&path, config.to_toml_string()?).context("写入配置文件失败")?;
                println!("✅ 已写入 {}", path.display());
                Ok(())
            },
        }
    }
}
