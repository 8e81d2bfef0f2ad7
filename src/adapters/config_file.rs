//! JSON file configuration adapter (host builds).
//!
//! Implements [`ConfigPort`] by reading a JSON document from disk. Fields
//! missing from the file keep their defaults. Without a path, or when the
//! file does not exist, defaults are returned.

use std::io::ErrorKind;
use std::path::PathBuf;

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "AEGIS_CONFIG";

pub struct FileConfig {
    path: Option<PathBuf>,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Path taken from [`CONFIG_ENV`], if set.
    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        }
    }
}

impl ConfigPort for FileConfig {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let Some(path) = &self.path else {
            info!("config: no {} set, using defaults", CONFIG_ENV);
            return Ok(SystemConfig::default());
        };
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("config: {} not found, using defaults", path.display());
                return Ok(SystemConfig::default());
            }
            Err(_) => return Err(ConfigError::IoError),
        };
        let config: SystemConfig =
            serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        info!("config: loaded {}", path.display());
        Ok(config)
    }
}
