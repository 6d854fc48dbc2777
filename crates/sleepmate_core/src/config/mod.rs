use crate::clock;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::UtcOffset;

const APP_DIR_NAME: &str = "sleepmate";
const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "SLEEPMATE_CONFIG_PATH";

/// Korea Standard Time, the offset the stored times were written in.
pub const DEFAULT_UTC_OFFSET_HOURS: i8 = 9;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub utc_offset_hours: Option<i8>,
    #[serde(default)]
    pub store_path: Option<String>,
}

impl Config {
    pub fn utc_offset(&self) -> Result<UtcOffset, AppError> {
        clock::offset_from_hours(self.utc_offset_hours.unwrap_or(DEFAULT_UTC_OFFSET_HOURS))
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub utc_offset_hours: Option<i8>,
    pub store_path: Option<String>,
}

/// Per-user directory holding both the config file and the default store.
pub fn app_dir() -> Result<PathBuf, AppError> {
    let var = if cfg!(windows) { "APPDATA" } else { "HOME" };
    let base = std::env::var(var)
        .map(PathBuf::from)
        .map_err(|_| AppError::invalid_data(format!("{var} is not set")))?;
    let base = if cfg!(windows) { base } else { base.join(".config") };
    Ok(base.join(APP_DIR_NAME))
}

pub fn config_path() -> Result<PathBuf, AppError> {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(app_dir()?.join(CONFIG_FILE_NAME)),
    }
}

/// Never fails: a missing file means defaults, and an unreadable or invalid
/// one means defaults plus the error for the caller to report.
pub fn load_config_with_fallback() -> ConfigLoad {
    into_load(config_path().and_then(|path| load_or_default(&path)))
}

fn load_or_default(path: &Path) -> Result<Config, AppError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config_from_path(path)
}

fn into_load(loaded: Result<Config, AppError>) -> ConfigLoad {
    match loaded {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("config {} is not valid JSON: {}", path.display(), err))
    })?;
    config.utc_offset()?;
    Ok(normalize_store_path(config))
}

fn normalize_store_path(mut config: Config) -> Config {
    config.store_path = config
        .store_path
        .map(|path| path.trim().to_string())
        .filter(|path| !path.is_empty());
    config
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(hours) = overrides.utc_offset_hours {
        merged.utc_offset_hours = Some(hours);
    }
    if let Some(path) = overrides.store_path.as_ref() {
        merged.store_path = Some(path.clone());
    }
    normalize_store_path(merged)
}
