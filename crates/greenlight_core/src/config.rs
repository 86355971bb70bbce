//! Runtime configuration for the core.
//!
//! Values come from `GREENLIGHT_*` environment variables; anything unset
//! falls back to its default.

use crate::credential::{DEFAULT_PASSWORD_COST, MAX_PASSWORD_COST, MIN_PASSWORD_COST};
use crate::logging::default_log_level;
use crate::repo::record_store::DEFAULT_QUERY_TIMEOUT;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "GREENLIGHT_DB_PATH";
pub const ENV_QUERY_TIMEOUT_MS: &str = "GREENLIGHT_QUERY_TIMEOUT_MS";
pub const ENV_PASSWORD_COST: &str = "GREENLIGHT_PASSWORD_COST";
pub const ENV_LOG_LEVEL: &str = "GREENLIGHT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "GREENLIGHT_LOG_DIR";

const DEFAULT_DB_PATH: &str = "greenlight.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for {key}: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    /// Deadline applied to every store call.
    pub query_timeout: Duration,
    pub password_cost: u32,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            password_cost: DEFAULT_PASSWORD_COST,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(raw) = get(ENV_QUERY_TIMEOUT_MS) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|millis| *millis > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_QUERY_TIMEOUT_MS,
                    value: raw.clone(),
                    reason: "expected a positive number of milliseconds",
                })?;
            config.query_timeout = Duration::from_millis(millis);
        }

        if let Some(raw) = get(ENV_PASSWORD_COST) {
            let cost = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|cost| (MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(cost))
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_PASSWORD_COST,
                    value: raw.clone(),
                    reason: "expected a bcrypt cost between 4 and 31",
                })?;
            config.password_cost = cost;
        }

        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.log_level = level.trim().to_string();
        }

        config.log_dir = get(ENV_LOG_DIR).map(PathBuf::from);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_PASSWORD_COST, ENV_QUERY_TIMEOUT_MS};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.query_timeout, Duration::from_secs(3));
        assert_eq!(config.password_cost, 12);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = CoreConfig::from_lookup(lookup(&[
            ("GREENLIGHT_DB_PATH", "/var/lib/greenlight/app.db"),
            ("GREENLIGHT_QUERY_TIMEOUT_MS", "1500"),
            ("GREENLIGHT_PASSWORD_COST", "10"),
            ("GREENLIGHT_LOG_LEVEL", "warn"),
            ("GREENLIGHT_LOG_DIR", "/var/log/greenlight"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/var/lib/greenlight/app.db"));
        assert_eq!(config.query_timeout, Duration::from_millis(1500));
        assert_eq!(config.password_cost, 10);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/greenlight")));
    }

    #[test]
    fn rejects_zero_timeout_and_out_of_range_cost() {
        let err = CoreConfig::from_lookup(lookup(&[("GREENLIGHT_QUERY_TIMEOUT_MS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_QUERY_TIMEOUT_MS));

        let err =
            CoreConfig::from_lookup(lookup(&[("GREENLIGHT_PASSWORD_COST", "40")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_PASSWORD_COST));
    }
}
