//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Work and break durations
//! - The activity preselected for new work intervals
//! - How the interactive host drives the timer
//!
//! Configuration is stored at `~/.config/timebox/config.toml`.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::timer::{
    DurationPolicy, WorkDuration, DEFAULT_LONG_BREAK_MIN, DEFAULT_SHORT_BREAK_MIN,
    DEFAULT_WORK_MIN,
};

/// Durations and defaults for the timer itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
    #[serde(default = "default_activity")]
    pub default_activity: String,
}

/// Settings for the process that drives the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// How often the host calls `tick()`.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// A wall-clock jump larger than this between wake-ups is treated as a
    /// suspension and answered with `resume()`.
    #[serde(default = "default_resume_gap_ms")]
    pub resume_gap_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/timebox/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub host: HostConfig,
}

fn default_work_minutes() -> u32 {
    DEFAULT_WORK_MIN
}
fn default_short_break_minutes() -> u32 {
    DEFAULT_SHORT_BREAK_MIN
}
fn default_long_break_minutes() -> u32 {
    DEFAULT_LONG_BREAK_MIN
}
fn default_activity() -> String {
    "Work".into()
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_resume_gap_ms() -> u64 {
    3000
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            default_activity: default_activity(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            resume_gap_ms: default_resume_gap_ms(),
        }
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
        if parts.peek().is_none() || key.is_empty() {
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
                        .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                ),
                serde_json::Value::Number(_) => serde_json::Value::Number(
                    value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                        .into(),
                ),
                serde_json::Value::Object(_) => return Err(unknown()),
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content).inspect_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "rejected config file");
        })
    }

    /// Parse TOML text and check every value a host will rely on.
    pub fn parse(content: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value has the wrong type
    /// or fails [`Config::validate`]. The config is left untouched on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check that every duration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy().map(|_| ())?;
        if self.host.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "host.tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Build the duration policy described by `[timer]`.
    pub fn policy(&self) -> Result<DurationPolicy, ConfigError> {
        let minutes = |key: &str, value: u32| {
            value
                .checked_mul(60)
                .and_then(NonZeroU32::new)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be a positive number of minutes".into(),
                })
        };
        let work = minutes("timer.work_minutes", self.timer.work_minutes)?;
        let short_break = minutes("timer.short_break_minutes", self.timer.short_break_minutes)?;
        let long_break = minutes("timer.long_break_minutes", self.timer.long_break_minutes)?;
        let work = WorkDuration::from_secs(work.get()).map_err(|e| ConfigError::InvalidValue {
            key: "timer.work_minutes".into(),
            message: e.to_string(),
        })?;
        Ok(DurationPolicy::new(work, short_break, long_break))
    }
}
