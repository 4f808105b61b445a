//! Core runtime configuration.
//!
//! Defaults are usable as-is; `from_env` overrides them from `HABITFORGE_*`
//! variables. Blank variables count as unset.

use crate::calendar::{DisplayFormat, DisplayLocale};
use crate::logging::{default_log_level, normalize_level};
use crate::stats::{DEFAULT_STREAK_HORIZON_DAYS, DEFAULT_TOP_HABITS, WEEK_DAYS};
use chrono_tz::Tz;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DISPLAY_TZ: &str = "HABITFORGE_DISPLAY_TZ";
pub const ENV_LOCALE: &str = "HABITFORGE_LOCALE";
pub const ENV_STREAK_HORIZON_DAYS: &str = "HABITFORGE_STREAK_HORIZON_DAYS";
pub const ENV_TOP_HABITS: &str = "HABITFORGE_TOP_HABITS";
pub const ENV_DB_PATH: &str = "HABITFORGE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "HABITFORGE_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "habitforge.sqlite3";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: &'static str,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} `{}`: {}", self.key, self.value, self.reason)
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub display: DisplayFormat,
    /// Upper bound on days walked back by the current-streak count.
    pub streak_horizon_days: u32,
    /// Entries kept in monthly top-habit rankings.
    pub top_habits: usize,
    /// Days covered by the dashboard "last N days" series.
    pub dashboard_lookback_days: u32,
    pub db_path: PathBuf,
    pub log_level: &'static str,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            display: DisplayFormat::default(),
            streak_horizon_days: DEFAULT_STREAK_HORIZON_DAYS,
            top_habits: DEFAULT_TOP_HABITS,
            dashboard_lookback_days: WEEK_DAYS,
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup(key)` for each `HABITFORGE_*` key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(value) = read(ENV_DISPLAY_TZ) {
            config.display.timezone = value.parse::<Tz>().map_err(|_| ConfigError {
                key: ENV_DISPLAY_TZ,
                value,
                reason: "unknown IANA timezone",
            })?;
        }
        if let Some(value) = read(ENV_LOCALE) {
            config.display.locale = value.parse::<DisplayLocale>().map_err(|_| ConfigError {
                key: ENV_LOCALE,
                value,
                reason: "expected id or en",
            })?;
        }
        if let Some(value) = read(ENV_STREAK_HORIZON_DAYS) {
            config.streak_horizon_days = parse_positive(ENV_STREAK_HORIZON_DAYS, value)?;
        }
        if let Some(value) = read(ENV_TOP_HABITS) {
            config.top_habits = parse_positive(ENV_TOP_HABITS, value)? as usize;
        }
        if let Some(value) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(value);
        }
        if let Some(value) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&value).map_err(|_| ConfigError {
                key: ENV_LOG_LEVEL,
                value,
                reason: "expected trace|debug|info|warn|error",
            })?;
        }

        Ok(config)
    }
}

fn parse_positive(key: &'static str, value: String) -> Result<u32, ConfigError> {
    match value.parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError {
            key,
            value,
            reason: "expected a positive integer",
        }),
    }
}
