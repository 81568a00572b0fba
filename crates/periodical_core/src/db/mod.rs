//! SQLite storage bootstrap and connection provider seam.
//!
//! # Responsibility
//! - Describe how a store is opened (`StoreConfig`).
//! - Hand out configured SQLite connections to repositories.
//!
//! # Invariants
//! - Every connection handed to a repository has had its pragmas applied.
//! - No schema is created here; tables are owned by each entity repository.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

mod open;

pub use open::{ConnectionProvider, FileDatabase, MemoryDatabase};

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    InvalidConfig(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidConfig(message) => write!(f, "invalid store config: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Settings applied to every connection opened against a store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Path to the single-file database.
    pub path: PathBuf,
    /// Mirrors `PRAGMA foreign_keys`. Off means the declared article
    /// references are not checked by SQLite either.
    #[serde(default = "default_enforce_foreign_keys")]
    pub enforce_foreign_keys: bool,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    /// Creates a config for `path` with default pragmas.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            enforce_foreign_keys: default_enforce_foreign_keys(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }

    /// Checks the config before any connection is attempted.
    ///
    /// # Errors
    /// - Returns `DbError::InvalidConfig` when `path` is empty.
    /// - Returns `DbError::InvalidConfig` when `busy_timeout_ms` is zero.
    pub fn validate(&self) -> DbResult<()> {
        if self.path.as_os_str().is_empty() {
            return Err(DbError::InvalidConfig("path cannot be empty".to_string()));
        }
        if self.busy_timeout_ms == 0 {
            return Err(DbError::InvalidConfig(
                "busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

fn default_enforce_foreign_keys() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

#[cfg(test)]
mod tests {
    use super::{DbError, StoreConfig};

    #[test]
    fn new_uses_default_pragmas() {
        let config = StoreConfig::new("periodical.db");
        assert!(config.enforce_foreign_keys);
        assert_eq!(config.busy_timeout_ms, 5_000);
        config.validate().unwrap();
    }

    #[test]
    fn deserialize_fills_missing_fields_with_defaults() {
        let config: StoreConfig =
            serde_json::from_value(serde_json::json!({ "path": "/var/lib/periodical.db" }))
                .unwrap();
        assert_eq!(config, StoreConfig::new("/var/lib/periodical.db"));

        let config: StoreConfig = serde_json::from_value(serde_json::json!({
            "path": "p.db",
            "enforce_foreign_keys": false,
            "busy_timeout_ms": 250
        }))
        .unwrap();
        assert!(!config.enforce_foreign_keys);
        assert_eq!(config.busy_timeout().as_millis(), 250);
    }

    #[test]
    fn validate_rejects_empty_path_and_zero_timeout() {
        let empty = StoreConfig::new("");
        assert!(matches!(empty.validate(), Err(DbError::InvalidConfig(_))));

        let mut zero = StoreConfig::new("periodical.db");
        zero.busy_timeout_ms = 0;
        let err = zero.validate().unwrap_err();
        assert!(err.to_string().contains("busy_timeout_ms"));
    }
}
