//! TOML-based application configuration.
//!
//! Stores the fixed alarm-handling durations and the alert title line.
//! Configuration is stored at `~/.config/multitimer/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/multitimer/config.toml`. Missing
/// fields fall back to their defaults, so a config written by an older
/// version keeps loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// How long a fired alarm stays loud before it is automatically
    /// downgraded to a quiet presentation.
    #[serde(default = "default_silence_timeout_ms")]
    pub silence_timeout_ms: u64,
    /// Upper bound on wake retention while an alarm is being handled.
    #[serde(default = "default_wake_timeout_ms")]
    pub wake_timeout_ms: u64,
    /// Title line shown on every alert.
    #[serde(default = "default_alert_title")]
    pub alert_title: String,
}

// Default functions
fn default_silence_timeout_ms() -> u64 {
    15_000
}
fn default_wake_timeout_ms() -> u64 {
    15_000
}
fn default_alert_title() -> String {
    "Multi Timer".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            silence_timeout_ms: default_silence_timeout_ms(),
            wake_timeout_ms: default_wake_timeout_ms(),
            alert_title: default_alert_title(),
        }
    }
}

impl Config {
    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms)
    }

    pub fn wake_timeout(&self) -> Duration {
        Duration::from_millis(self.wake_timeout_ms)
    }

    /// Load from the default path. A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save to the default path, creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Returns `~/.config/multitimer[-dev]/config.toml` based on MULTITIMER_ENV.
///
/// Set MULTITIMER_ENV=dev to use the development config directory.
fn config_path() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .ok_or(ConfigError::NoConfigDir)?
        .join(".config");

    let env = std::env::var("MULTITIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("multitimer-dev")
    } else {
        base_dir.join("multitimer")
    };

    Ok(dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_timeouts() {
        let config = Config::default();
        assert_eq!(config.silence_timeout_ms, 15_000);
        assert_eq!(config.wake_timeout_ms, 15_000);
        assert_eq!(config.silence_timeout(), Duration::from_millis(15_000));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.silence_timeout_ms = 30_000;
        config.alert_title = "Kitchen".into();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.silence_timeout_ms, 30_000);
        assert_eq!(loaded.wake_timeout_ms, 15_000);
        assert_eq!(loaded.alert_title, "Kitchen");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(loaded.silence_timeout_ms, 15_000);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "silence_timeout_ms = 5000\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.silence_timeout_ms, 5_000);
        assert_eq!(loaded.wake_timeout_ms, 15_000);
        assert_eq!(loaded.alert_title, "Multi Timer");
    }
}
