/// 应用配置管理
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::render::is_valid_format;

const APP_DIR: &str = "tasklist";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 数据目录（任务库、日志、默认导出位置）；未设置时使用系统数据目录
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// 列表中日期的显示格式（strftime）
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// 日志级别，RUST_LOG 优先
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            date_format: default_date_format(),
            log_level: default_log_level(),
        }
    }
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 获取配置文件路径
/// Windows: %APPDATA%\tasklist\config.toml
/// macOS: ~/Library/Application Support/tasklist/config.toml
/// Linux: ~/.config/tasklist/config.toml
pub fn get_config_path() -> Result<PathBuf> {
    let dirs = directories::BaseDirs::new().context("could not determine the user's home directory")?;
    Ok(dirs.config_dir().join(APP_DIR).join("config.toml"))
}

/// 数据目录：配置优先，否则为系统数据目录下的 tasklist/
pub fn data_dir(config: &Config) -> Result<PathBuf> {
    if let Some(dir) = &config.data_dir {
        return Ok(dir.clone());
    }
    let dirs = directories::BaseDirs::new().context("could not determine the user's home directory")?;
    Ok(dirs.data_dir().join(APP_DIR))
}

/// 加载配置
pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        // 配置文件不存在，返回默认配置
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    Ok(config)
}

/// 保存配置
pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(config, &get_config_path()?)
}

pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    // 确保目录存在
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;

    Ok(())
}

/// 更新数据目录
pub fn set_data_dir(dir: PathBuf) -> Result<()> {
    let mut config = load_config()?;
    config.data_dir = Some(dir);
    save_config(&config)?;
    println!("✓ Data directory set to: {}", data_dir(&config)?.display());
    Ok(())
}

/// 更新日期显示格式
pub fn set_date_format(format: String) -> Result<()> {
    let mut config = load_config()?;
    apply_date_format(&mut config, format)?;
    save_config(&config)?;
    println!("✓ Date format set to: {}", config.date_format);
    Ok(())
}

/// 只接受能格式化纯日期的 strftime 字符串
fn apply_date_format(config: &mut Config, format: String) -> Result<()> {
    if !is_valid_format(&format) {
        anyhow::bail!("invalid date format: {} (use date fields like %d, %m, %Y)", format);
    }
    config.date_format = format;
    Ok(())
}

/// 显示当前配置
pub fn show_config() -> Result<()> {
    let config = load_config()?;
    println!("Current configuration:");
    println!("  Data directory: {}", data_dir(&config)?.display());
    println!("  Date format:    {}", config.date_format);
    println!("  Log level:      {}", config.log_level);
    println!();
    println!("Config file: {}", get_config_path()?.display());
    Ok(())
}
