//! # Configuration Management Module
//!
//! Persistent overlay settings stored in platform-appropriate locations.
//! Handles loading, saving, and providing defaults for configuration options.
//!
//! ## Settings
//! - `server_url`: Base URL of the heart-rate server (`/api/hr`, `/api/theme`)
//! - `hr_poll_interval_ms` / `theme_poll_interval_ms`: Poll cadence
//! - `frame_interval_ms`: Delay between rendered frames
//! - `scroll_divisor`: Frames per ECG scroll step
//! - `theme`: Theme applied before the first theme poll answers
//!
//! ## Storage Location
//! - macOS: ~/Library/Application Support/hr-overlay/config.toml
//! - Linux: ~/.config/hr-overlay/config.toml
//! - Windows: %APPDATA%\hr-overlay\config.toml

use crate::ecg::DEFAULT_SCROLL_DIVISOR;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub hr_poll_interval_ms: u64,
    pub theme_poll_interval_ms: u64,
    pub frame_interval_ms: u64,
    pub scroll_divisor: u32,
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:17878".to_string(),
            hr_poll_interval_ms: 1000,
            theme_poll_interval_ms: 1000,
            frame_interval_ms: 16,
            scroll_divisor: DEFAULT_SCROLL_DIVISOR,
            theme: "default".to_string(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hr-overlay")
            .join("config.toml")
    }

    /// Load config from the default location, creating it if missing
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = toml::from_str(&contents)
                    .map_err(ConfigError::ParseFailed)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File doesn't exist, create default
                log::info!("No config at {}, writing defaults", path.display());
                let config = Self::default();
                config.save_to(path)?;
                Ok(config)
            }
            Err(e) => Err(ConfigError::ReadFailed(e)),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(ConfigError::WriteFailed)?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(ConfigError::SerializeFailed)?;
        fs::write(path, toml_string)
            .map_err(ConfigError::WriteFailed)?;

        Ok(())
    }
}
