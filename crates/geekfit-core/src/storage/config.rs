//! TOML-based application configuration.
//!
//! Stores process-level preferences:
//! - Database location override
//! - Log level
//! - Scheduler tick and focus-detection thresholds
//!
//! Configuration is stored at `~/.config/geekfit/config.toml`. User-facing
//! settings (goals, reminder intervals) live in the database instead; see
//! [`Settings`](super::Settings).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::wellness::FocusConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Database file; defaults to `geekfit.db` in the data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `GEEKFIT_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,
    #[serde(default = "default_focus_threshold_minutes")]
    pub focus_threshold_minutes: u32,
    #[serde(default = "default_idle_gap_minutes")]
    pub idle_gap_minutes: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/geekfit/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_tick_seconds() -> u64 {
    30
}
fn default_focus_threshold_minutes() -> u32 {
    10
}
fn default_idle_gap_minutes() -> u32 {
    5
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_seconds: default_tick_seconds(),
            focus_threshold_minutes: default_focus_threshold_minutes(),
            idle_gap_minutes: default_idle_gap_minutes(),
        }
    }
}

impl SchedulerConfig {
    pub fn focus(&self) -> FocusConfig {
        FocusConfig {
            focus_threshold: chrono::Duration::minutes(i64::from(self.focus_threshold_minutes)),
            idle_gap: chrono::Duration::minutes(i64::from(self.idle_gap_minutes)),
        }
    }

    pub fn tick(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tick_seconds.max(1))
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                // Optional fields serialize as null; treat "" as clearing them.
                serde_json::Value::Null if value.is_empty() => serde_json::Value::Null,
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default config file location.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key, keeping the existing value's type.
    /// Does not save; call [`Config::save`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Database file to open.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.data.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("geekfit.db")),
        }
    }
}
