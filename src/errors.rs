// errors.rs
use thiserror::Error;

use crate::scraper::FetchError;

/// Failures of the persistence layer.
///
/// A duplicate url on insert and a missing url on delete/update are not
/// errors; those come back as `false`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The medium could not be reached, timed out, is corrupt, or a write failed.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Attribute `{0}` cannot be updated (allowed: date_applied, application_status)")]
    InvalidAttribute(String),

    #[error("Invalid value `{value}` for {attribute}")]
    InvalidValue {
        attribute: &'static str,
        value: String,
    },
}

impl StoreError {
    pub fn unavailable(context: &str, err: impl std::fmt::Display) -> Self {
        StoreError::StorageUnavailable(format!("{context}: {err}"))
    }
}

/// Errors surfaced by the caller-facing `Tracker` service.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
