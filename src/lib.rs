pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod scraper;
pub mod tracker;

pub use config::Config;
pub use db::{open_store, BackendKind, PersistentStore, StoreConfig};
pub use domain::{ApplicationStatus, ListingAttribute, ListingFilters, ListingRecord, ListingUpdate};
pub use errors::{StoreError, TrackerError};
pub use scraper::{AggregateReport, Aggregator, Endpoint, FetchError, HttpListingSource, ListingFetcher};
pub use tracker::{BookmarkOutcome, Tracker};

#[cfg(test)]
mod tests;
