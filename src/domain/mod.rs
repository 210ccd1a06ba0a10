pub mod filters;
pub mod listing;

pub use filters::ListingFilters;
pub use listing::{ApplicationStatus, ListingAttribute, ListingRecord, ListingUpdate};
