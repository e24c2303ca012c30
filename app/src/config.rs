//! Configuration management for the taskdeck binary.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Invalid numeric values fall back to their default with a warning.

use notifications::NotificationEnvironment;
use std::env::{self, VarError};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Directory for persisted state
pub const DATA_DIR_VAR: &str = "TASKDECK_DATA_DIR";
/// Default notification lifetime in milliseconds
pub const NOTIFICATION_MS_VAR: &str = "TASKDECK_NOTIFICATION_MS";
/// Maximum queued notifications (0 = unbounded)
pub const NOTIFICATION_CAPACITY_VAR: &str = "TASKDECK_NOTIFICATION_CAPACITY";
/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_VAR: &str = "TASKDECK_SHUTDOWN_TIMEOUT_SECS";
/// Log filter directives
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

/// Errors that make the configuration unusable
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable holds bytes that are not valid UTF-8
    #[error("{0} is not valid unicode")]
    NotUnicode(String),

    /// The data directory is set to an empty string
    #[error("{DATA_DIR_VAR} must not be empty")]
    EmptyDataDir,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Where `<namespace>.json` records live
    pub data_dir: PathBuf,
    /// Lifetime of notifications added without an explicit duration
    pub notification_duration: Duration,
    /// Maximum queue length (`None` = unbounded)
    pub notification_capacity: Option<usize>,
    /// How long shutdown waits for running effects
    pub shutdown_timeout: Duration,
    /// `tracing-subscriber` filter directives
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".taskdeck"),
            notification_duration: NotificationEnvironment::DEFAULT_DURATION,
            notification_capacity: Some(NotificationEnvironment::DEFAULT_CAPACITY),
            shutdown_timeout: Duration::from_secs(5),
            log_filter: "taskdeck=info,taskdeck_runtime=warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is not unicode or the data
    /// directory is empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name))
    }

    /// Load configuration through `lookup` (the environment, or a map in tests)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is not unicode or the data
    /// directory is empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let read = |name: &str| match lookup(name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(name.to_string())),
        };
        let defaults = Self::default();

        let data_dir = match read(DATA_DIR_VAR)? {
            Some(dir) if dir.trim().is_empty() => return Err(ConfigError::EmptyDataDir),
            Some(dir) => PathBuf::from(dir),
            None => defaults.data_dir,
        };

        let notification_ms = parse_or(
            NOTIFICATION_MS_VAR,
            read(NOTIFICATION_MS_VAR)?,
            4000_u64,
        );
        let notification_duration = if notification_ms == 0 {
            tracing::warn!(var = NOTIFICATION_MS_VAR, "Duration must be positive, using default");
            defaults.notification_duration
        } else {
            Duration::from_millis(notification_ms)
        };

        let capacity = parse_or(
            NOTIFICATION_CAPACITY_VAR,
            read(NOTIFICATION_CAPACITY_VAR)?,
            NotificationEnvironment::DEFAULT_CAPACITY,
        );

        let shutdown_secs = parse_or(SHUTDOWN_TIMEOUT_VAR, read(SHUTDOWN_TIMEOUT_VAR)?, 5_u64);

        Ok(Self {
            data_dir,
            notification_duration,
            notification_capacity: (capacity > 0).then_some(capacity),
            shutdown_timeout: Duration::from_secs(shutdown_secs),
            log_filter: read(LOG_FILTER_VAR)?.unwrap_or(defaults.log_filter),
        })
    }

    /// Notification queue settings
    #[must_use]
    pub const fn notification_environment(&self) -> NotificationEnvironment {
        NotificationEnvironment::new(self.notification_duration, self.notification_capacity)
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Display + Copy,
    T::Err: Display,
{
    let Some(raw) = raw else {
        return default;
    };

    raw.trim().parse().unwrap_or_else(|error| {
        tracing::warn!(var = name, value = %raw, %error, %default, "Invalid value, using default");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned().ok_or(VarError::NotPresent))
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(load(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = load(&[
            (DATA_DIR_VAR, "/tmp/deck"),
            (NOTIFICATION_MS_VAR, "1500"),
            (NOTIFICATION_CAPACITY_VAR, "3"),
            (SHUTDOWN_TIMEOUT_VAR, "9"),
            (LOG_FILTER_VAR, "debug"),
        ])
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/deck"));
        assert_eq!(config.notification_duration, Duration::from_millis(1500));
        assert_eq!(config.notification_capacity, Some(3));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(9));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn zero_capacity_means_unbounded() {
        let config = load(&[(NOTIFICATION_CAPACITY_VAR, "0")]).unwrap();
        assert_eq!(config.notification_capacity, None);
        assert_eq!(config.notification_environment().capacity, None);
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = load(&[
            (NOTIFICATION_MS_VAR, "soon"),
            (NOTIFICATION_CAPACITY_VAR, "-1"),
            (SHUTDOWN_TIMEOUT_VAR, ""),
        ])
        .unwrap();
        assert_eq!(config, AppConfig::default());

        let config = load(&[(NOTIFICATION_MS_VAR, "0")]).unwrap();
        assert_eq!(config.notification_duration, Duration::from_millis(4000));
    }

    #[test]
    fn empty_data_dir_is_an_error() {
        assert!(matches!(load(&[(DATA_DIR_VAR, "  ")]), Err(ConfigError::EmptyDataDir)));
    }

    #[test]
    fn non_unicode_is_an_error() {
        let result = AppConfig::from_lookup(|name| {
            if name == LOG_FILTER_VAR {
                Err(VarError::NotUnicode(std::ffi::OsString::from("x")))
            } else {
                Err(VarError::NotPresent)
            }
        });
        assert!(matches!(result, Err(ConfigError::NotUnicode(ref var)) if var == LOG_FILTER_VAR));
    }
}
