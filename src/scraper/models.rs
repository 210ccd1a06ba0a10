use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::domain::ListingRecord;

// listing
//  ├── title
//  ├── organization
//  ├── date_posted        "2024-10-01T08:15:00" (offset optional)
//  ├── location           plain text, or
//  ├── locations_derived  ["Boston, Massachusetts, United States", ...]
//  └── url

#[derive(Debug, Clone, Deserialize)]
pub struct RawListing {
    pub title: String,
    pub organization: String,
    pub date_posted: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub locations_derived: Vec<String>,
    pub url: String,
}

impl RawListing {
    /// Normalizes an upstream entry. Only the date part of `date_posted` is kept.
    pub fn into_record(self) -> Result<ListingRecord, String> {
        let date_posted = posting_date(&self.date_posted)
            .ok_or_else(|| format!("unparseable date_posted `{}`", self.date_posted))?;

        let location = match self.location.filter(|l| !l.trim().is_empty()) {
            Some(location) => location,
            None => self.locations_derived.join("; "),
        };

        Ok(ListingRecord::new(
            self.title,
            self.organization,
            date_posted,
            location,
            self.url,
        ))
    }
}

/// Date component of an upstream timestamp, discarding any time of day.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]`, or a bare date.
pub fn posting_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }

    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// One upstream data source queried independently by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Host the upstream gateway routes on (`x-rapidapi-host`).
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Url::parse(s.trim()).map(Self::new)
    }
}
