//! Room timing and server settings.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Timing knobs for a hosted room.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct RoomConfig {
    /// How long a dropped player may take to rejoin, in seconds.
    reconnect_window_secs: u64,

    /// How long the restart pulse stays raised, in milliseconds.
    restart_pulse_millis: u64,
}

impl RoomConfig {
    /// Reconnection window as a duration.
    pub fn reconnect_window(&self) -> Duration {
        Duration::from_secs(self.reconnect_window_secs)
    }

    /// Restart pulse length as a duration.
    pub fn restart_pulse(&self) -> Duration {
        Duration::from_millis(self.restart_pulse_millis)
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            reconnect_window_secs: 20,
            restart_pulse_millis: 3000,
        }
    }
}

/// Process-wide settings loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default tracing filter when `RUST_LOG` is unset.
    log_filter: String,

    /// Timing applied to every room.
    room: RoomConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info,strictly_rooms=debug".to_string(),
            room: RoomConfig::default(),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading settings from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let settings: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(room = ?settings.room, "Settings loaded");
        Ok(settings)
    }

    /// Loads settings from `path` if it exists, defaults otherwise.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::from_file(path),
            Some(path) => {
                info!("Config file not found at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Renders the settings back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to render config: {}", e)))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
