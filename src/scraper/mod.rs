mod aggregator;
mod fetcher;
mod models;
mod scraper_error;
mod source;

pub use aggregator::{AggregateReport, Aggregator, EndpointFailure};
pub use fetcher::{FetchReport, ListingFetcher, Termination, BATCH_SIZE};
pub use models::{posting_date, Endpoint, RawListing};
pub use scraper_error::FetchError;
pub use source::{BatchRequest, HttpListingSource, ListingSource};
