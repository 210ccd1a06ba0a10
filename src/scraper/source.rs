// source.rs
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

use crate::domain::ListingFilters;
use crate::scraper::models::Endpoint;
use crate::scraper::FetchError;

const USER_AGENT: &str = concat!("internship-tracker/", env!("CARGO_PKG_VERSION"));

/// One page request against an endpoint.
#[derive(Debug, Clone, Copy)]
pub struct BatchRequest<'a> {
    pub offset: usize,
    pub filters: &'a ListingFilters,
}

/// Transport for a single batch. The fetcher owns paging; a source only
/// answers one request.
///
/// A non-success status is `FetchError::Rejected`; anything that kept the
/// request from completing is `FetchError::Unavailable`.
pub trait ListingSource: Send + Sync {
    fn fetch_batch(
        &self,
        endpoint: &Endpoint,
        request: &BatchRequest<'_>,
    ) -> Result<Vec<Value>, FetchError>;
}

/// The listings API over HTTP.
pub struct HttpListingSource {
    client: Client,
    api_key: Option<String>,
}

impl HttpListingSource {
    /// `timeout` bounds every batch request, connect through body.
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, api_key })
    }
}

impl ListingSource for HttpListingSource {
    fn fetch_batch(
        &self,
        endpoint: &Endpoint,
        request: &BatchRequest<'_>,
    ) -> Result<Vec<Value>, FetchError> {
        let unavailable = |e: reqwest::Error| FetchError::Unavailable {
            endpoint: endpoint.to_string(),
            reason: if e.is_timeout() {
                format!("timed out: {e}")
            } else {
                e.to_string()
            },
        };

        let offset = request.offset.to_string();
        let mut query: Vec<(&str, &str)> = vec![("offset", offset.as_str())];
        query.extend(request.filters.query_pairs());

        let mut builder = self
            .client
            .get(endpoint.url().clone())
            .header("x-rapidapi-host", endpoint.host())
            .query(&query);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-rapidapi-key", key);
        }

        let resp = builder.send().map_err(unavailable)?;
        let status = resp.status();

        if !status.is_success() {
            // The status alone decides a rejection; the body is only context.
            return Err(FetchError::Rejected {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: resp.text().unwrap_or_default(),
            });
        }

        let text = resp.text().map_err(unavailable)?;

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(entries)) => Ok(entries),
            Ok(other) => Err(FetchError::Malformed {
                endpoint: endpoint.to_string(),
                reason: format!("expected a JSON array, got {}", json_kind(&other)),
            }),
            Err(e) => Err(FetchError::Malformed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
