pub mod migrations;
pub mod models;
pub mod queries;

use std::path::PathBuf;
use std::time::Duration;

use rusqlite::Connection;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection failed: {0}")]
    Connection(#[source] rusqlite::Error),
    #[error("username already exists")]
    DuplicateUsername,
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Where the board database lives. Built once at startup and handed to
/// the store; nothing reads connection settings from ambient state.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
}

/// Handle to the board database. Holds configuration only; every
/// request opens its own connection and closes it on drop.
#[derive(Clone)]
pub struct Store {
    config: StoreConfig,
}

impl Store {
    /// Open the store: connects once to run migrations, then returns
    /// the handle. Fails with `StoreError::Connection` if the database
    /// cannot be opened.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let store = Self { config };
        let conn = store.connect()?;
        migrations::run(&conn)?;

        info!("Database opened at {}", store.config.path.display());
        Ok(store)
    }

    /// Open a fresh connection for one request. No pooling, no reuse,
    /// no retry; the connection closes when dropped, on every exit path.
    pub fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.config.path).map_err(StoreError::Connection)?;

        // WAL mode for concurrent readers; foreign keys are off by
        // default in SQLite and must be enabled per connection.
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(StoreError::Connection)?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(StoreError::Connection)?;
        // Concurrent per-request writers queue on SQLite's page lock
        // instead of failing immediately with SQLITE_BUSY.
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(StoreError::Connection)?;

        Ok(conn)
    }
}
