//! Configuration loading and management
//!
//! Handles parsing of `.tasksched.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::export::DEFAULT_EXPORT_DIR;
use crate::ordering::DEFAULT_DUE_SOON_DAYS;
use crate::storage::DEFAULT_STORE_PATH;
use crate::task::{parse_time, DEFAULT_TIME};

pub const CONFIG_FILE: &str = ".tasksched.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backing file and export location
    #[serde(default)]
    pub store: StoreConfig,

    /// Defaults for new input
    #[serde(default)]
    pub input: InputConfig,

    /// Urgency classification
    #[serde(default)]
    pub urgency: UrgencyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// CSV file holding all tasks
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Directory receiving `ExportData.csv`
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(DEFAULT_EXPORT_DIR)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            export_dir: default_export_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Time of day used when none is given
    #[serde(default = "default_time")]
    pub default_time: String,
}

fn default_time() -> String {
    DEFAULT_TIME.to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            default_time: default_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgencyConfig {
    /// Tasks due within this many days (today included) are "due soon"
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: u32,
}

fn default_due_soon_days() -> u32 {
    DEFAULT_DUE_SOON_DAYS
}

impl Default for UrgencyConfig {
    fn default() -> Self {
        Self {
            due_soon_days: default_due_soon_days(),
        }
    }
}

impl Config {
    /// Load configuration from a `.tasksched.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|err| Error::InvalidConfig(format!("{}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.tasksched.toml` from `dir`, or return defaults when absent
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.store.path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("store.path cannot be empty".to_string()));
        }
        if self.store.export_dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "store.export_dir cannot be empty".to_string(),
            ));
        }
        parse_time(&self.input.default_time).map_err(|_| {
            Error::InvalidConfig(format!(
                "input.default_time '{}' must be HH:mm",
                self.input.default_time
            ))
        })?;
        if !(1..=365).contains(&self.urgency.due_soon_days) {
            return Err(Error::InvalidConfig(
                "urgency.due_soon_days must be between 1 and 365".to_string(),
            ));
        }
        Ok(())
    }
}
