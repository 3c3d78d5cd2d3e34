//! TOML-based application configuration.
//!
//! Stores host-tunable preferences:
//! - Timeline geometry (tile pitch, padding, marker spacing)
//! - Reminder behavior (enabled, warning lead time)
//! - Log level
//!
//! Configuration is stored at `~/.config/wakeday/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::timeline::TimelineGeometry;

/// Timeline geometry overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_tile_pitch")]
    pub tile_pitch: f64,
    #[serde(default = "default_edge_padding")]
    pub edge_padding: f64,
    #[serde(default = "default_min_marker_spacing")]
    pub min_marker_spacing: f64,
}

impl TimelineConfig {
    pub fn geometry(&self) -> TimelineGeometry {
        TimelineGeometry {
            tile_pitch: self.tile_pitch,
            edge_padding: self.edge_padding,
            min_marker_spacing: self.min_marker_spacing,
            ..TimelineGeometry::default()
        }
    }
}

/// Reminder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minutes before the due time at which the warning reminder fires.
    #[serde(default = "default_warning_lead")]
    pub warning_lead_minutes: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/wakeday/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from the default path, degrading to defaults on any failure.
    pub fn load() -> Self {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "no config path; using default configuration");
                return Self::default();
            }
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "falling back to default configuration");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let rendered = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, rendered).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }
}

/// Returns `~/.config/wakeday[-dev]/` based on WAKEDAY_ENV.
///
/// Set WAKEDAY_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WAKEDAY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("wakeday-dev")
    } else {
        base_dir.join("wakeday")
    };

    fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}

// Default functions
fn default_tile_pitch() -> f64 {
    120.0
}
fn default_edge_padding() -> f64 {
    40.0
}
fn default_min_marker_spacing() -> f64 {
    20.0
}
fn default_warning_lead() -> u32 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            tile_pitch: default_tile_pitch(),
            edge_padding: default_edge_padding(),
            min_marker_spacing: default_min_marker_spacing(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            warning_lead_minutes: default_warning_lead(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_field_defaults() {
        let config = Config::default();
        assert_eq!(config.timeline.tile_pitch, 120.0);
        assert_eq!(config.notifications.warning_lead_minutes, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.timeline.edge_padding, 40.0);
        assert!(config.notifications.enabled);
    }

    #[test]
    fn partial_section_fills_remaining_fields() {
        let config: Config = toml::from_str("[timeline]\ntile_pitch = 90.0\n").unwrap();
        assert_eq!(config.timeline.tile_pitch, 90.0);
        assert_eq!(config.timeline.edge_padding, 40.0);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(back.timeline.tile_pitch, config.timeline.tile_pitch);
        assert_eq!(back.logging.level, config.logging.level);
    }
}
