//! Pipeline configuration, read from a TOML file.
//!
//! Every key is optional:
//!
//! ```toml
//! cache_dir = "/var/cache/candle_history"
//! batch_size = 50
//! backoff_base_secs = 10
//! max_attempts = 8
//! calendar_tz = "America/New_York"
//! availability_lag_minutes = 15
//!
//! [alpaca]
//! requests_per_minute = 200
//! timeout_secs = 30
//! feed = "iex"
//! ```
//!
//! `CANDLE_HISTORY_CACHE_DIR` and `CANDLE_HISTORY_BATCH_SIZE` override the
//! corresponding file values.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shared_utils::env::{InvalidEnvVarError, parse_env_var};
use thiserror::Error;

use crate::{
    providers::alpaca_rest::AlpacaSettings,
    scheduler::{DEFAULT_BACKOFF_BASE, DEFAULT_BATCH_SIZE},
};

pub const CACHE_DIR_ENV: &str = "CANDLE_HISTORY_CACHE_DIR";
pub const BATCH_SIZE_ENV: &str = "CANDLE_HISTORY_BATCH_SIZE";

pub const DEFAULT_AVAILABILITY_LAG: Duration = Duration::from_secs(15 * 60);

/// US equity sessions, after-hours included, fall on one New York day.
pub const DEFAULT_CALENDAR_TZ: Tz = chrono_tz::America::New_York;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown time zone: {0}")]
    InvalidTimeZone(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error(transparent)]
    Env(#[from] InvalidEnvVarError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    pub cache_dir: PathBuf,
    pub batch_size: usize,
    pub backoff_base_secs: u64,
    pub max_attempts: Option<u32>,
    pub calendar_tz: String,
    pub availability_lag_minutes: u64,
    pub alpaca: AlpacaSettings,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            cache_dir: std::env::temp_dir().join("candle_history"),
            batch_size: DEFAULT_BATCH_SIZE,
            backoff_base_secs: DEFAULT_BACKOFF_BASE.as_secs(),
            max_attempts: None,
            calendar_tz: DEFAULT_CALENDAR_TZ.name().to_string(),
            availability_lag_minutes: DEFAULT_AVAILABILITY_LAG.as_secs() / 60,
            alpaca: AlpacaSettings::default(),
        }
    }
}

/// The scheduler-facing part of [`HistoryConfig`], validated.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub batch_size: usize,
    pub backoff_base: Duration,
    pub max_attempts: Option<u32>,
    pub calendar_tz: Tz,
    pub availability_lag: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            backoff_base: DEFAULT_BACKOFF_BASE,
            max_attempts: None,
            calendar_tz: DEFAULT_CALENDAR_TZ,
            availability_lag: DEFAULT_AVAILABILITY_LAG,
        }
    }
}

impl HistoryConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses the file, then applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(dir) = parse_env_var::<PathBuf>(CACHE_DIR_ENV)? {
            self.cache_dir = dir;
        }
        if let Some(size) = parse_env_var::<usize>(BATCH_SIZE_ENV)? {
            self.batch_size = size;
        }
        Ok(())
    }

    pub fn pipeline(&self) -> Result<PipelineSettings, ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "batch_size",
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_attempts == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "max_attempts",
                message: "must be at least 1 when set".to_string(),
            });
        }
        let calendar_tz: Tz = self
            .calendar_tz
            .parse()
            .map_err(|_| ConfigError::InvalidTimeZone(self.calendar_tz.clone()))?;

        Ok(PipelineSettings {
            batch_size: self.batch_size,
            backoff_base: Duration::from_secs(self.backoff_base_secs),
            max_attempts: self.max_attempts,
            calendar_tz,
            availability_lag: Duration::from_secs(self.availability_lag_minutes * 60),
        })
    }
}
