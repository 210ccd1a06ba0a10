// aggregator.rs
use std::thread;

use crate::domain::{ListingFilters, ListingRecord};
use crate::scraper::fetcher::{FetchReport, ListingFetcher, Termination};
use crate::scraper::models::Endpoint;
use crate::scraper::FetchError;

#[derive(Debug, Clone)]
pub struct EndpointFailure {
    pub endpoint: Endpoint,
    pub error: FetchError,
}

/// Concatenated listings from every endpoint plus whatever went wrong.
#[derive(Debug, Clone, Default)]
pub struct AggregateReport {
    /// In endpoint order; duplicates across endpoints are kept.
    pub listings: Vec<ListingRecord>,
    /// Endpoints that could not be reached. Listings gathered before the
    /// failure are still in `listings`.
    pub failures: Vec<EndpointFailure>,
    /// Endpoints that answered with a non-success status.
    pub rejections: Vec<EndpointFailure>,
}

impl AggregateReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn absorb(&mut self, report: FetchReport) {
        let FetchReport {
            endpoint,
            listings,
            termination,
            ..
        } = report;

        self.listings.extend(listings);
        match termination {
            Termination::Failed(error) => self.failures.push(EndpointFailure { endpoint, error }),
            Termination::Rejected(error) => {
                self.rejections.push(EndpointFailure { endpoint, error })
            }
            Termination::Filled | Termination::Exhausted => {}
        }
    }
}

pub struct Aggregator {
    fetcher: ListingFetcher,
}

impl Aggregator {
    pub fn new(fetcher: ListingFetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &ListingFetcher {
        &self.fetcher
    }

    /// Fetches every endpoint concurrently, each capped at `per_endpoint_cap`,
    /// and joins them back in the order given.
    pub fn fetch_all(
        &self,
        endpoints: &[Endpoint],
        per_endpoint_cap: usize,
        filters: &ListingFilters,
    ) -> AggregateReport {
        let reports: Vec<FetchReport> = thread::scope(|scope| {
            let handles: Vec<_> = endpoints
                .iter()
                .map(|endpoint| {
                    let handle = scope
                        .spawn(move || self.fetcher.fetch(endpoint, per_endpoint_cap, filters));
                    (endpoint, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(endpoint, handle)| {
                    handle.join().unwrap_or_else(|_| FetchReport {
                        endpoint: endpoint.clone(),
                        listings: Vec::new(),
                        termination: Termination::Failed(FetchError::Unavailable {
                            endpoint: endpoint.to_string(),
                            reason: "fetch worker panicked".to_string(),
                        }),
                        requests: 0,
                    })
                })
                .collect()
        });

        let mut aggregate = AggregateReport::default();
        for report in reports {
            aggregate.absorb(report);
        }

        tracing::info!(
            endpoints = endpoints.len(),
            listings = aggregate.listings.len(),
            failed = aggregate.failures.len(),
            rejected = aggregate.rejections.len(),
            "search complete"
        );
        aggregate
    }
}
