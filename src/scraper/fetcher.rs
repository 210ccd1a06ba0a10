// fetcher.rs
use serde_json::Value;

use crate::domain::{ListingFilters, ListingRecord};
use crate::scraper::models::{Endpoint, RawListing};
use crate::scraper::source::{BatchRequest, ListingSource};
use crate::scraper::FetchError;

/// Entries per upstream page.
pub const BATCH_SIZE: usize = 10;

/// Why a fetch stopped paging.
#[derive(Debug, Clone)]
pub enum Termination {
    /// The requested number of listings was reached.
    Filled,
    /// The endpoint returned an empty batch.
    Exhausted,
    /// Non-success status. Treated like exhaustion.
    Rejected(FetchError),
    /// The endpoint could not be reached or answered with garbage.
    Failed(FetchError),
}

/// Listings gathered from one endpoint plus how the paging ended.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub endpoint: Endpoint,
    pub listings: Vec<ListingRecord>,
    pub termination: Termination,
    /// Upstream requests issued.
    pub requests: usize,
}

impl FetchReport {
    /// The fatal error, if paging ended because the endpoint was unreachable.
    pub fn failure(&self) -> Option<&FetchError> {
        match &self.termination {
            Termination::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&FetchError> {
        match &self.termination {
            Termination::Rejected(e) => Some(e),
            _ => None,
        }
    }

    /// Listings, or the failure that cut the fetch short.
    pub fn into_result(self) -> Result<Vec<ListingRecord>, FetchError> {
        match self.termination {
            Termination::Failed(e) => Err(e),
            _ => Ok(self.listings),
        }
    }
}

/// Pages through one endpoint in sequential batches.
pub struct ListingFetcher {
    source: Box<dyn ListingSource>,
}

impl ListingFetcher {
    pub fn new(source: impl ListingSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Collects up to `max_results` listings from `endpoint`.
    ///
    /// Batches are requested strictly in offset order. A rejected or failed
    /// batch ends the loop but keeps what was already gathered.
    pub fn fetch(
        &self,
        endpoint: &Endpoint,
        max_results: usize,
        filters: &ListingFilters,
    ) -> FetchReport {
        let mut listings = Vec::new();
        let mut offset = 0;
        let mut requests = 0;

        let termination = loop {
            if listings.len() >= max_results {
                break Termination::Filled;
            }

            tracing::debug!(%endpoint, offset, "requesting batch");
            requests += 1;

            let request = BatchRequest { offset, filters };
            let entries = match self.source.fetch_batch(endpoint, &request) {
                Ok(entries) => entries,
                Err(e @ FetchError::Rejected { .. }) => {
                    tracing::warn!(%endpoint, offset, error = %e, "upstream rejected batch");
                    break Termination::Rejected(e);
                }
                Err(e) => {
                    tracing::error!(%endpoint, offset, error = %e, "batch request failed");
                    break Termination::Failed(e);
                }
            };

            if entries.is_empty() {
                tracing::debug!(%endpoint, offset, "no more listings");
                break Termination::Exhausted;
            }

            let received = entries.len();
            let before = listings.len();
            listings.extend(entries.into_iter().filter_map(|entry| decode_entry(endpoint, entry)));
            tracing::debug!(%endpoint, offset, received, kept = listings.len() - before, "batch received");

            // A page of nothing but undecodable entries would never fill the cap.
            if listings.len() == before {
                break Termination::Failed(FetchError::Malformed {
                    endpoint: endpoint.to_string(),
                    reason: format!("none of the {received} entries at offset {offset} could be read"),
                });
            }
            offset += BATCH_SIZE;
        };

        listings.truncate(max_results);

        FetchReport {
            endpoint: endpoint.clone(),
            listings,
            termination,
            requests,
        }
    }
}

fn decode_entry(endpoint: &Endpoint, entry: Value) -> Option<ListingRecord> {
    let raw: RawListing = match serde_json::from_value(entry) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(%endpoint, error = %e, "skipping listing with missing fields");
            return None;
        }
    };

    match raw.into_record() {
        Ok(record) => Some(record),
        Err(reason) => {
            tracing::warn!(%endpoint, %reason, "skipping listing");
            None
        }
    }
}
