//! JSON config file adapter.
//!
//! Implements [`ConfigPort`] over a single JSON document.  Missing fields
//! take their defaults, so a file only needs the values that differ.
//! Saves go through a sibling temp file and a rename, so a crash mid-write
//! leaves the previous file intact.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::DoorbellConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<DoorbellConfig, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError(format!("{}: {}", self.path.display(), e)),
        })?;
        let config: DoorbellConfig =
            serde_json::from_str(&text).map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        config.validate()?;
        log::info!("Config loaded from {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &DoorbellConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let json =
            serde_json::to_string_pretty(config).map_err(|e| ConfigError::Corrupted(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| ConfigError::IoError(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| ConfigError::IoError(e.to_string()))
    }
}
