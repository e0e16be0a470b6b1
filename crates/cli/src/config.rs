//! Runtime configuration: optional TOML file, then environment overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use libris_core::Money;
use libris_ledger::LoanPolicy;
use libris_observability::LogFormat;

pub const ENV_DATA_DIR: &str = "LIBRIS_DATA_DIR";
pub const ENV_LOAN_PERIOD_DAYS: &str = "LIBRIS_LOAN_PERIOD_DAYS";
pub const ENV_FINE_PER_DAY_CENTS: &str = "LIBRIS_FINE_PER_DAY_CENTS";
pub const ENV_LOG_FORMAT: &str = "LIBRIS_LOG_FORMAT";
pub const ENV_ADMIN_PASSWORD: &str = "LIBRIS_ADMIN_PASSWORD";
pub const ENV_SEED_CATALOG: &str = "LIBRIS_SEED_CATALOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding `books.json`, `users.json` and `transactions.json`.
    pub data_dir: PathBuf,
    pub loan_period_days: u32,
    pub fine_per_day_cents: u64,
    pub log_format: LogFormat,
    /// Password for the `admin` account created on first start.
    pub bootstrap_admin_password: Option<String>,
    /// Stock an empty catalog with starter titles on start.
    pub seed_catalog: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("library-data"),
            loan_period_days: 14,
            fine_per_day_cents: 50,
            log_format: LogFormat::Json,
            bootstrap_admin_password: None,
            seed_catalog: false,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// File (or defaults) plus process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `LIBRIS_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(days) = lookup(ENV_LOAN_PERIOD_DAYS) {
            self.loan_period_days = parse_value(ENV_LOAN_PERIOD_DAYS, &days)?;
        }
        if let Some(cents) = lookup(ENV_FINE_PER_DAY_CENTS) {
            self.fine_per_day_cents = parse_value(ENV_FINE_PER_DAY_CENTS, &cents)?;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.log_format = format.parse().map_err(|message| ConfigError::Invalid {
                key: ENV_LOG_FORMAT,
                message,
            })?;
        }
        if let Some(password) = lookup(ENV_ADMIN_PASSWORD) {
            self.bootstrap_admin_password = Some(password);
        }
        if let Some(seed) = lookup(ENV_SEED_CATALOG) {
            self.seed_catalog = parse_value(ENV_SEED_CATALOG, &seed)?;
        }
        Ok(self)
    }

    pub fn loan_policy(&self) -> Result<LoanPolicy, ConfigError> {
        LoanPolicy::new(self.loan_period_days, Money::from_minor(self.fine_per_day_cents)).map_err(
            |e| ConfigError::Invalid {
                key: "loan_period_days",
                message: e.to_string(),
            },
        )
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        message: format!("'{raw}': {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_standard_loan_terms() {
        let config = Config::default();
        let policy = config.loan_policy().unwrap();
        assert_eq!(policy.loan_period_days(), 14);
        assert_eq!(policy.fine_per_day(), Money::from_minor(50));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.seed_catalog);
    }

    #[test]
    fn parses_toml_with_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libris.toml");
        std::fs::write(
            &path,
            "data_dir = \"/var/lib/libris\"\nloan_period_days = 21\nlog_format = \"pretty\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/libris"));
        assert_eq!(config.loan_period_days, 21);
        assert_eq!(config.fine_per_day_cents, 50);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libris.toml");
        std::fs::write(&path, "loan_days = 3\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = Config::default()
            .with_overrides(env(&[
                (ENV_DATA_DIR, "/tmp/lib"),
                (ENV_LOAN_PERIOD_DAYS, "7"),
                (ENV_FINE_PER_DAY_CENTS, " 25 "),
                (ENV_LOG_FORMAT, "pretty"),
                (ENV_ADMIN_PASSWORD, "s3cret"),
                (ENV_SEED_CATALOG, "true"),
            ]))
            .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/lib"));
        assert_eq!(config.loan_period_days, 7);
        assert_eq!(config.fine_per_day_cents, 25);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.bootstrap_admin_password.as_deref(), Some("s3cret"));
        assert!(config.seed_catalog);
    }

    #[test]
    fn seed_flag_must_be_a_boolean() {
        let err = Config::default()
            .with_overrides(env(&[(ENV_SEED_CATALOG, "yes")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: ENV_SEED_CATALOG, .. }));
    }

    #[test]
    fn bad_override_names_the_variable() {
        let err = Config::default()
            .with_overrides(env(&[(ENV_LOAN_PERIOD_DAYS, "two weeks")]))
            .unwrap_err();
        match err {
            ConfigError::Invalid { key, .. } => assert_eq!(key, ENV_LOAN_PERIOD_DAYS),
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn zero_day_loans_fail_policy_validation() {
        let config = Config {
            loan_period_days: 0,
            ..Config::default()
        };
        assert!(matches!(config.loan_policy(), Err(ConfigError::Invalid { .. })));
    }
}
