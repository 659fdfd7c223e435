//! Hub configuration.
//!
//! # Responsibility
//! - Load optional TOML settings and fill in defaults.
//! - Reject values that would stall the poller or the timer.
//!
//! # Invariants
//! - A missing config file yields `HubConfig::default()`.
//! - Returned configs always pass `validate()`.

use crate::capture::poller::DEFAULT_POLL_INTERVAL;
use crate::timer::TimerSettings;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up inside the data directory.
pub const CONFIG_FILE_NAME: &str = "prodhub.toml";
/// Database file name inside the data directory.
pub const DB_FILE_NAME: &str = "prodhub.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Runtime settings for stores, poller, timer and logging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HubConfig {
    /// Database file; `None` means `<data_dir>/prodhub.sqlite3`.
    pub db_path: Option<PathBuf>,
    /// Absolute log directory; `None` means `<data_dir>/logs`.
    pub log_dir: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`; `None` uses the build default.
    pub log_level: Option<String>,
    pub poll_interval_ms: u64,
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub auto_start_next_phase: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        let timer = TimerSettings::default();
        Self {
            db_path: None,
            log_dir: None,
            log_level: None,
            poll_interval_ms: u64::try_from(DEFAULT_POLL_INTERVAL.as_millis()).unwrap_or(2_000),
            work_minutes: timer.work_secs / 60,
            break_minutes: timer.break_secs / 60,
            auto_start_next_phase: timer.auto_start_next_phase,
        }
    }
}

impl HubConfig {
    /// Loads `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.work_minutes == 0 || self.break_minutes == 0 {
            return Err(ConfigError::Invalid(
                "work_minutes and break_minutes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            work_secs: self.work_minutes.saturating_mul(60),
            break_secs: self.break_minutes.saturating_mul(60),
            auto_start_next_phase: self.auto_start_next_phase,
        }
    }

    pub fn db_path_in(&self, data_dir: &Path) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| data_dir.join(DB_FILE_NAME))
    }

    pub fn log_dir_in(&self, data_dir: &Path) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("logs"))
    }
}
