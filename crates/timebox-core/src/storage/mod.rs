mod config;
pub mod database;

pub use config::{Config, HostConfig, TimerConfig};
pub use database::{Activity, ActivityTotal, Database, SessionRecord};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/timebox[-dev]/` based on TIMEBOX_ENV.
///
/// Set TIMEBOX_ENV=dev to use development data directory, or
/// TIMEBOX_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TIMEBOX_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TIMEBOX_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("timebox-dev")
            } else {
                base_dir.join("timebox")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
