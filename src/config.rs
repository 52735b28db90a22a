//! Application-level configuration loading: storage backend and day boundaries.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use time::UtcOffset;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PLAYLOOP_CONFIG_PATH";

/// Storage backend selected at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// In-process store, optionally persisted to a JSON snapshot file.
    Memory {
        /// Snapshot file; volatile store when absent.
        #[serde(default)]
        snapshot_path: Option<PathBuf>,
    },
    /// CouchDB database configured through `COUCH_*` environment variables.
    Couch,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory {
            snapshot_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Storage backend.
    #[serde(default)]
    pub store: StoreConfig,
    /// Offset from UTC, in minutes, used to compute day boundaries of session filters.
    #[serde(default)]
    pub day_offset_minutes: i32,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to defaults when it is missing or invalid.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        store = ?config.store,
                        day_offset_minutes = config.day_offset_minutes,
                        "loaded config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Day boundary offset. Out-of-range values fall back to UTC.
    pub fn day_offset(&self) -> UtcOffset {
        let minutes = self.day_offset_minutes;
        UtcOffset::from_hms((minutes / 60) as i8, (minutes % 60) as i8, 0).unwrap_or_else(|err| {
            warn!(minutes, error = %err, "invalid day offset; using UTC");
            UtcOffset::UTC
        })
    }
}

fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
