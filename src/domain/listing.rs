// src/domain/listing.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::StoreError;

/// One internship posting, either freshly fetched or bookmarked.
///
/// `url` is the identity of a bookmark. Fetched records leave
/// `date_applied` and `application_status` unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    pub organization: String,
    pub date_posted: NaiveDate,
    pub location: String,
    pub url: String,

    pub date_applied: Option<NaiveDate>,
    pub application_status: Option<ApplicationStatus>,
}

impl ListingRecord {
    /// A listing that has not been applied to yet.
    pub fn new(
        title: impl Into<String>,
        organization: impl Into<String>,
        date_posted: NaiveDate,
        location: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            organization: organization.into(),
            date_posted,
            location: location.into(),
            url: url.into(),
            date_applied: None,
            application_status: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "Not Yet Applied")]
    NotYetApplied,
    Accepted,
    Pending,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::NotYetApplied,
        ApplicationStatus::Accepted,
        ApplicationStatus::Pending,
        ApplicationStatus::Rejected,
    ];

    /// Label used for storage and display.
    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::NotYetApplied => "Not Yet Applied",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = StoreError;

    /// Accepts the stored label, case-insensitively, with or without spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|status| status.label().replace(' ', "").to_ascii_lowercase() == wanted)
            .ok_or_else(|| StoreError::InvalidValue {
                attribute: ListingAttribute::ApplicationStatus.column(),
                value: s.to_string(),
            })
    }
}

/// The only attributes of a bookmark that may change after insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingAttribute {
    DateApplied,
    ApplicationStatus,
}

impl ListingAttribute {
    /// Column / property name used by both backends.
    pub fn column(self) -> &'static str {
        match self {
            ListingAttribute::DateApplied => "date_applied",
            ListingAttribute::ApplicationStatus => "application_status",
        }
    }
}

impl FromStr for ListingAttribute {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date_applied" | "dateApplied" => Ok(ListingAttribute::DateApplied),
            "application_status" | "applicationStatus" => Ok(ListingAttribute::ApplicationStatus),
            other => Err(StoreError::InvalidAttribute(other.to_string())),
        }
    }
}

/// A single restricted change to a bookmark.
///
/// `None` clears the attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingUpdate {
    DateApplied(Option<NaiveDate>),
    ApplicationStatus(Option<ApplicationStatus>),
}

impl ListingUpdate {
    /// Builds an update from an attribute name and its textual value.
    ///
    /// The attribute is validated first, so an unknown attribute is always
    /// reported as `InvalidAttribute` whatever the value is. An empty value
    /// clears the attribute.
    pub fn parse(attribute: &str, value: &str) -> Result<Self, StoreError> {
        let attribute: ListingAttribute = attribute.parse()?;
        let value = value.trim();

        match attribute {
            ListingAttribute::DateApplied if value.is_empty() => Ok(Self::DateApplied(None)),
            ListingAttribute::DateApplied => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|d| Self::DateApplied(Some(d)))
                .map_err(|_| StoreError::InvalidValue {
                    attribute: attribute.column(),
                    value: value.to_string(),
                }),
            ListingAttribute::ApplicationStatus if value.is_empty() => {
                Ok(Self::ApplicationStatus(None))
            }
            ListingAttribute::ApplicationStatus => {
                Ok(Self::ApplicationStatus(Some(value.parse()?)))
            }
        }
    }

    /// Writes this change onto a record. Touches nothing else.
    pub fn apply_to(&self, record: &mut ListingRecord) {
        match *self {
            ListingUpdate::DateApplied(date) => record.date_applied = date,
            ListingUpdate::ApplicationStatus(status) => record.application_status = status,
        }
    }
}
