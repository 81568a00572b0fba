//! Connection providers for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//!
//! # Invariants
//! - `FileDatabase` opens one connection per operation and closes it before
//!   returning; nothing is reused across calls.
//! - Connections have `foreign_keys` set from `StoreConfig` before use.

use super::{DbError, DbResult, StoreConfig};
use log::{debug, error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;

/// Source of configured connections for repository operations.
///
/// Implementations decide the connection lifetime; callers only get a borrow
/// for the duration of `op`.
pub trait ConnectionProvider {
    fn with_connection<T, F>(&self, op: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>;
}

/// Single-file store. Each operation acquires and releases its own connection.
#[derive(Debug, Clone)]
pub struct FileDatabase {
    config: StoreConfig,
}

impl FileDatabase {
    /// Validates `config` and returns a provider for it.
    ///
    /// The file is not touched until the first operation.
    pub fn new(config: StoreConfig) -> DbResult<Self> {
        config.validate()?;
        info!(
            "event=store_config module=db status=ok path={} foreign_keys={} busy_timeout_ms={}",
            config.path.display(),
            config.enforce_foreign_keys,
            config.busy_timeout_ms
        );
        Ok(Self { config })
    }

    /// Shorthand for `FileDatabase::new(StoreConfig::new(path))`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::new(StoreConfig::new(path.as_ref()))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn acquire(&self) -> DbResult<Connection> {
        let started_at = Instant::now();
        let conn = match Connection::open(&self.config.path) {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=db_open module=db status=error mode=file duration_ms={} error_code=db_open_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        if let Err(err) = configure_connection(&conn, &self.config) {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_configure_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }

        debug!(
            "event=db_open module=db status=ok mode=file duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(conn)
    }
}

impl ConnectionProvider for FileDatabase {
    fn with_connection<T, F>(&self, op: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let conn = self.acquire()?;
        let result = op(&conn);
        // Release even when `op` failed; the op error wins over a close error.
        let closed = conn.close().map_err(|(_, err)| DbError::from(err));
        let value = result?;
        closed?;
        Ok(value)
    }
}

/// In-memory store for tests and scratch sessions.
///
/// SQLite drops an in-memory database with its connection, so this provider
/// keeps one connection open for its whole lifetime.
#[derive(Debug)]
pub struct MemoryDatabase {
    conn: Connection,
}

impl MemoryDatabase {
    /// Opens an in-memory database with foreign keys enforced.
    pub fn open() -> DbResult<Self> {
        let started_at = Instant::now();
        let conn = Connection::open_in_memory()?;
        let config = StoreConfig::new(":memory:");
        configure_connection(&conn, &config)?;
        info!(
            "event=db_open module=db status=ok mode=memory duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(Self { conn })
    }
}

impl ConnectionProvider for MemoryDatabase {
    fn with_connection<T, F>(&self, op: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        op(&self.conn)
    }
}

fn configure_connection(conn: &Connection, config: &StoreConfig) -> DbResult<()> {
    let pragma = if config.enforce_foreign_keys {
        "PRAGMA foreign_keys = ON;"
    } else {
        "PRAGMA foreign_keys = OFF;"
    };
    conn.execute_batch(pragma)?;
    conn.busy_timeout(config.busy_timeout())?;
    Ok(())
}
