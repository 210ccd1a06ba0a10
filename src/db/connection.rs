use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::StoreError;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Handle to the SQLite file. Holds only the path; connections are opened
/// per operation and closed when the closure returns.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            busy_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a connection, runs `f`, and drops the connection on every exit path.
    ///
    /// Lock waits are bounded by the busy timeout; expiry surfaces as
    /// `StorageUnavailable`.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError>,
    {
        let mut conn = Connection::open(&self.path)
            .map_err(|e| StoreError::unavailable("Open DB failed", e))?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| StoreError::unavailable("Setting busy timeout failed", e))?;

        f(&mut conn)
    }
}

/// Creates the bookmarks table if it does not exist yet.
pub fn init_db(db: &Database) -> Result<(), StoreError> {
    db.with_conn(|conn| {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| StoreError::unavailable("Failed to apply schema", e))
    })?;

    tracing::debug!(path = %db.path().display(), "sqlite schema ready");
    Ok(())
}
