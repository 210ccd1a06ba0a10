//! Caller-facing operations over the bookmark store and the listing search.

use chrono::NaiveDate;

use crate::db::PersistentStore;
use crate::domain::{ApplicationStatus, ListingFilters, ListingRecord, ListingUpdate};
use crate::errors::TrackerError;
use crate::scraper::{AggregateReport, Aggregator, Endpoint};

/// Result of bookmarking a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkOutcome {
    Added,
    /// A bookmark with the same url exists; nothing was written.
    AlreadyBookmarked,
    /// The listing had no url and was not stored.
    Skipped,
}

pub struct Tracker {
    store: Box<dyn PersistentStore>,
    aggregator: Aggregator,
    endpoints: Vec<Endpoint>,
    per_endpoint_cap: usize,
}

impl Tracker {
    pub fn new(
        store: Box<dyn PersistentStore>,
        aggregator: Aggregator,
        endpoints: Vec<Endpoint>,
        per_endpoint_cap: usize,
    ) -> Self {
        Self {
            store,
            aggregator,
            endpoints,
            per_endpoint_cap,
        }
    }

    pub fn list_bookmarks(&self) -> Result<Vec<ListingRecord>, TrackerError> {
        Ok(self.store.select()?)
    }

    pub fn bookmark(&self, listing: &ListingRecord) -> Result<BookmarkOutcome, TrackerError> {
        if listing.url.trim().is_empty() {
            return Ok(BookmarkOutcome::Skipped);
        }

        if self.store.insert(listing)? {
            tracing::info!(url = %listing.url, "bookmark added");
            Ok(BookmarkOutcome::Added)
        } else {
            Ok(BookmarkOutcome::AlreadyBookmarked)
        }
    }

    pub fn remove_bookmark(&self, url: &str) -> Result<bool, TrackerError> {
        if url.trim().is_empty() {
            return Ok(false);
        }

        let removed = self.store.delete(url)?;
        if removed {
            tracing::info!(%url, "bookmark removed");
        }
        Ok(removed)
    }

    /// Records an application date and/or status. Each present field is a
    /// separate restricted update; `true` if any of them found the bookmark.
    pub fn update_application(
        &self,
        url: &str,
        date_applied: Option<NaiveDate>,
        status: Option<ApplicationStatus>,
    ) -> Result<bool, TrackerError> {
        if url.trim().is_empty() {
            return Ok(false);
        }

        let mut updated = false;
        if let Some(date) = date_applied {
            updated |= self.store.update(url, ListingUpdate::DateApplied(Some(date)))?;
        }
        if let Some(status) = status {
            updated |= self
                .store
                .update(url, ListingUpdate::ApplicationStatus(Some(status)))?;
        }
        Ok(updated)
    }

    /// String-named update; the attribute is checked before the store is touched.
    pub fn update_field(&self, url: &str, attribute: &str, value: &str) -> Result<bool, TrackerError> {
        Ok(self.store.update_attribute(url, attribute, value)?)
    }

    /// Searches every configured endpoint with the configured cap.
    pub fn search(&self, filters: &ListingFilters) -> AggregateReport {
        self.aggregator
            .fetch_all(&self.endpoints, self.per_endpoint_cap, filters)
    }

    /// Single-endpoint search. An unreachable endpoint is an error here
    /// instead of a partial result.
    pub fn search_endpoint(
        &self,
        endpoint: &Endpoint,
        max_results: usize,
        filters: &ListingFilters,
    ) -> Result<Vec<ListingRecord>, TrackerError> {
        Ok(self
            .aggregator
            .fetcher()
            .fetch(endpoint, max_results, filters)
            .into_result()?)
    }
}
