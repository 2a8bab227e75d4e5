//! Runtime configuration: where data lives and which zone defines a day.
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::{DateError, ReferenceZone};
use crate::constants::{
    DEFAULT_CATALOG_PATH, DEFAULT_GUESS_DIR, DEFAULT_STATE_PATH, DEFAULT_UTC_OFFSET_SECONDS,
};

/// Errors raised when configuration is unreadable or invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config JSON is malformed")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must not be empty")]
    EmptyPath { field: &'static str },
    #[error(transparent)]
    Zone(#[from] DateError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_catalog_path")]
    pub catalog_path: PathBuf,
    #[serde(default = "GameConfig::default_state_path")]
    pub state_path: PathBuf,
    #[serde(default = "GameConfig::default_guess_dir")]
    pub guess_dir: PathBuf,
    #[serde(default = "GameConfig::default_utc_offset_seconds")]
    pub utc_offset_seconds: i32,
}

impl GameConfig {
    fn default_catalog_path() -> PathBuf {
        PathBuf::from(DEFAULT_CATALOG_PATH)
    }

    fn default_state_path() -> PathBuf {
        PathBuf::from(DEFAULT_STATE_PATH)
    }

    fn default_guess_dir() -> PathBuf {
        PathBuf::from(DEFAULT_GUESS_DIR)
    }

    const fn default_utc_offset_seconds() -> i32 {
        DEFAULT_UTC_OFFSET_SECONDS
    }

    /// Parse a JSON config; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Check paths and the timezone offset.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, path) in [
            ("catalog_path", &self.catalog_path),
            ("state_path", &self.state_path),
            ("guess_dir", &self.guess_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyPath { field });
            }
        }
        self.zone()?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`DateError::Offset`] for an out-of-range offset.
    pub fn zone(&self) -> Result<ReferenceZone, DateError> {
        ReferenceZone::from_offset_seconds(self.utc_offset_seconds)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            catalog_path: Self::default_catalog_path(),
            state_path: Self::default_state_path(),
            guess_dir: Self::default_guess_dir(),
            utc_offset_seconds: Self::default_utc_offset_seconds(),
        }
    }
}
