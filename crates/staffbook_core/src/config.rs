//! Runtime configuration for the employee store.
//!
//! # Responsibility
//! - Hold database location, listing policy and logging settings.
//! - Resolve overrides from `STAFFBOOK_*` environment variables.
//!
//! # Invariants
//! - Blank environment values are ignored, never treated as empty settings.
//! - The listing policy is always explicit; there is no hidden filtering.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const ENV_DB_PATH: &str = "STAFFBOOK_DB_PATH";
pub const ENV_LISTING: &str = "STAFFBOOK_LISTING";
pub const ENV_LOG_LEVEL: &str = "STAFFBOOK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "STAFFBOOK_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "staffbook.sqlite3";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported listing policy `{0}`; expected all|active-only")]
    InvalidListingPolicy(String),
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error")]
    InvalidLogLevel(String),
}

/// Which employees the index listing shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingPolicy {
    /// Every employee, active or not.
    #[default]
    All,
    /// Only employees with `is_active = true`.
    ActiveOnly,
}

impl ListingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ActiveOnly => "active-only",
        }
    }
}

impl Display for ListingPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active-only" | "active_only" | "active" => Ok(Self::ActiveOnly),
            other => Err(ConfigError::InvalidListingPolicy(other.to_string())),
        }
    }
}

/// Core settings shared by every front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    pub listing: ListingPolicy,
    pub log_level: LevelFilter,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            listing: ListingPolicy::default(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by `STAFFBOOK_*` values from `lookup`.
    ///
    /// # Errors
    /// - `InvalidListingPolicy` for an unknown `STAFFBOOK_LISTING`.
    /// - `InvalidLogLevel` for an unknown `STAFFBOOK_LOG_LEVEL`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = value(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(listing) = value(ENV_LISTING) {
            config.listing = listing.parse()?;
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            config.log_level = parse_log_level(&level)?;
        }
        if let Some(dir) = value(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Parses `trace|debug|info|warn|error` (also `warning`), ignoring case.
///
/// `off` is rejected: file logging is switched off by leaving the log
/// directory unset.
pub fn parse_log_level(raw: &str) -> Result<LevelFilter, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(LevelFilter::Trace),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" | "warning" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        other => Err(ConfigError::InvalidLogLevel(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        parse_log_level, ConfigError, CoreConfig, ListingPolicy, ENV_DB_PATH, ENV_LISTING,
        ENV_LOG_LEVEL,
    };
    use log::LevelFilter;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn listing_policy_parses_known_spellings() {
        assert_eq!("all".parse::<ListingPolicy>(), Ok(ListingPolicy::All));
        assert_eq!(
            " Active-Only ".parse::<ListingPolicy>(),
            Ok(ListingPolicy::ActiveOnly)
        );
        assert_eq!(
            "active".parse::<ListingPolicy>(),
            Ok(ListingPolicy::ActiveOnly)
        );
        assert!(matches!(
            "some".parse::<ListingPolicy>(),
            Err(ConfigError::InvalidListingPolicy(_))
        ));
    }

    #[test]
    fn lookup_overrides_defaults_and_ignores_blank_values() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/var/lib/staffbook/db.sqlite3"),
            (ENV_LISTING, "active-only"),
            (ENV_LOG_LEVEL, "  "),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/var/lib/staffbook/db.sqlite3"));
        assert_eq!(config.listing, ListingPolicy::ActiveOnly);
        assert_eq!(config.log_level, CoreConfig::default().log_level);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn lookup_rejects_unknown_log_level() {
        let err = CoreConfig::from_lookup(lookup_from(&[(ENV_LOG_LEVEL, "verbose")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidLogLevel("verbose".to_string()));
    }

    #[test]
    fn log_level_parses_known_names_and_rejects_off() {
        assert_eq!(parse_log_level(" INFO "), Ok(LevelFilter::Info));
        assert_eq!(parse_log_level("warning"), Ok(LevelFilter::Warn));
        assert!(matches!(
            parse_log_level("off"),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }
}
