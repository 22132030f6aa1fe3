//! On-disk configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use cv_core::{CoreError, CoreResult};

use crate::{FsStore, STORE_DIR_NAME};

const CONFIG_FILE_NAME: &str = "config.yaml";

/// Environment variable overriding the store location.
pub const PATH_ENV: &str = "CELLARVAULT_PATH";

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CellarConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_validity_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchConfig>,
}

/// Catalogue used by `search`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SearchConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl CellarConfig {
    pub fn cache_validity(&self) -> Option<Duration> {
        self.cache_validity_secs.map(Duration::from_secs)
    }
}

fn config_path() -> CoreResult<PathBuf> {
    if let Some(dir) = dirs::config_dir() {
        return Ok(dir.join(STORE_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    Err(CoreError::Storage(
        "unable to determine config directory".into(),
    ))
}

/// Read a config file, treating a missing file as the default config.
pub fn read_config(path: &Path) -> CoreResult<CellarConfig> {
    if !path.exists() {
        return Ok(CellarConfig::default());
    }
    let contents =
        fs::read_to_string(path).map_err(|err| CoreError::Storage(err.to_string()))?;
    serde_yaml::from_str(&contents).map_err(|err| CoreError::Storage(err.to_string()))
}

pub fn write_config(path: &Path, config: &CellarConfig) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| CoreError::Storage(err.to_string()))?;
    }
    let contents =
        serde_yaml::to_string(config).map_err(|err| CoreError::Storage(err.to_string()))?;
    fs::write(path, contents).map_err(|err| CoreError::Storage(err.to_string()))?;
    Ok(())
}

pub fn load_config() -> CoreResult<CellarConfig> {
    read_config(&config_path()?)
}

pub fn save_config(config: &CellarConfig) -> CoreResult<()> {
    write_config(&config_path()?, config)
}

/// Remember the store root in the user config, keeping the other settings.
pub fn set_config_path(path: &Path) -> CoreResult<()> {
    let mut config = load_config()?;
    config.path = Some(path.to_string_lossy().to_string());
    save_config(&config)
}

/// Store root: `CELLARVAULT_PATH`, then the config file, then `~/.cellarvault`.
pub fn resolve_store_path() -> CoreResult<PathBuf> {
    if let Ok(value) = std::env::var(PATH_ENV) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }

    let config = load_config()?;
    if let Some(path) = config.path {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    FsStore::default_path()
}
