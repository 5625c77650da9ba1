//! Configuration management for Playdeck
//!
//! This module handles loading and managing application configuration
//! from the user config file and environment variables. The configuration
//! is an explicit struct handed to the components that need it at
//! construction time; there is no process-wide settings singleton.

use crate::utils::error::{PlaydeckError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Audio configuration
    pub audio: AudioConfig,

    /// General application settings
    pub general: GeneralConfig,
}

/// Audio configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Initial volume (0 - 100)
    pub volume: u8,

    /// Preferred output device name (empty = system default)
    pub device: String,
}

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Playlist loaded at startup when non-empty
    pub default_playlist: String,

    /// Re-select the last played song at startup
    pub remember_last_song: bool,

    /// Path of the last played song
    pub last_song: Option<PathBuf>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 50,
            device: String::new(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            default_playlist: String::new(),
            remember_last_song: false,
            last_song: None,
        }
    }
}

impl Config {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources
    /// override earlier):
    /// 1. Default values
    /// 2. User config file (~/.config/playdeck/config.toml on Linux)
    /// 3. Environment variables (PLAYDECK_* prefix)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config = Self::from_file(&user_path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the user config file
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()
            .ok_or_else(|| PlaydeckError::Config("Cannot determine user config path".to_string()))?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PlaydeckError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml = toml::to_string_pretty(self)
            .map_err(|e| PlaydeckError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml)
            .map_err(|e| PlaydeckError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Read configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PlaydeckError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&contents)
            .map_err(|e| PlaydeckError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // Example: PLAYDECK_VOLUME=80
        if let Ok(volume) = std::env::var("PLAYDECK_VOLUME") {
            self.audio.volume = volume
                .parse()
                .map_err(|_| PlaydeckError::Config("Invalid PLAYDECK_VOLUME".to_string()))?;
        }

        if let Ok(log_level) = std::env::var("PLAYDECK_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.audio.volume > 100 {
            return Err(PlaydeckError::Config(
                "Audio volume must be between 0 and 100".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(PlaydeckError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level, valid_log_levels
            )));
        }

        Ok(())
    }

    /// Initial volume scaled to the backend's 0.0 - 1.0 range
    pub fn volume_level(&self) -> f32 {
        f32::from(self.audio.volume) / 100.0
    }

    /// Get user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("playdeck").join("config.toml"))
    }

    /// Get the playlist store path, next to the config file
    pub fn playlist_store_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("playdeck").join("playlists.toml"))
    }
}
