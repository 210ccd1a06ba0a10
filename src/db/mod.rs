pub mod connection;
pub mod documents;
pub mod listings;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::{ListingRecord, ListingUpdate};
use crate::errors::StoreError;

pub use connection::{init_db, Database};
pub use documents::DocumentStore;
pub use listings::SqliteStore;

/// Storage of bookmarked listings, identical across backends.
///
/// `insert`, `delete` and `update` are atomic per record. `false` means
/// "duplicate" for `insert` and "no such url" for `delete`/`update`.
pub trait PersistentStore: Send + Sync {
    /// Every stored record. Order is unspecified.
    fn select(&self) -> Result<Vec<ListingRecord>, StoreError>;

    fn insert(&self, record: &ListingRecord) -> Result<bool, StoreError>;

    fn delete(&self, url: &str) -> Result<bool, StoreError>;

    /// Writes one restricted attribute. `true` iff a record with `url` exists,
    /// even when the new value equals the old one.
    fn update(&self, url: &str, change: ListingUpdate) -> Result<bool, StoreError>;

    /// Validates `attribute` before any storage access.
    fn update_attribute(&self, url: &str, attribute: &str, value: &str) -> Result<bool, StoreError> {
        let change = ListingUpdate::parse(attribute, value)?;
        self.update(url, change)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Sqlite,
    Document,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(BackendKind::Sqlite),
            "document" | "datastore" => Ok(BackendKind::Document),
            other => Err(format!(
                "unknown storage backend `{other}` (expected `sqlite` or `document`)"
            )),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Sqlite => f.write_str("sqlite"),
            BackendKind::Document => f.write_str("document"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: BackendKind,
    pub sqlite_path: PathBuf,
    pub document_path: PathBuf,
    /// Upper bound on waiting for the medium in a single operation.
    pub timeout: Duration,
}

/// Builds the configured backend. Called once at startup; the returned store
/// lives for the rest of the process.
pub fn open_store(config: &StoreConfig) -> Result<Box<dyn PersistentStore>, StoreError> {
    let store: Box<dyn PersistentStore> = match config.backend {
        BackendKind::Sqlite => Box::new(SqliteStore::open(Database::new(
            &config.sqlite_path,
            config.timeout,
        ))?),
        BackendKind::Document => {
            Box::new(DocumentStore::open(&config.document_path, config.timeout)?)
        }
    };

    tracing::info!(backend = %config.backend, "bookmark store opened");
    Ok(store)
}
