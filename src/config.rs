use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::db::{BackendKind, StoreConfig};
use crate::scraper::Endpoint;

pub const DEFAULT_ENDPOINTS: [&str; 2] = [
    "https://internships-api.p.rapidapi.com/active-ats-7d",
    "https://internships-api.p.rapidapi.com/active-jb-7d",
];

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub api_key: Option<String>,
    pub endpoints: Vec<Endpoint>,
    pub per_endpoint_cap: usize,
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Missing keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match get("TRACKER_BACKEND") {
            Some(raw) => raw
                .parse::<BackendKind>()
                .map_err(|e| anyhow!(e))
                .context("TRACKER_BACKEND is invalid")?,
            None => BackendKind::default(),
        };

        let store_timeout_ms: u64 = get("TRACKER_STORE_TIMEOUT_MS")
            .unwrap_or_else(|| "5000".to_string())
            .parse()
            .context("TRACKER_STORE_TIMEOUT_MS must be a number of milliseconds")?;

        let request_timeout_secs: u64 = get("TRACKER_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .context("TRACKER_REQUEST_TIMEOUT_SECS must be a number of seconds")?;

        let per_endpoint_cap: usize = get("TRACKER_PER_ENDPOINT_CAP")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("TRACKER_PER_ENDPOINT_CAP must be a positive number")?;
        if per_endpoint_cap == 0 {
            return Err(anyhow!("TRACKER_PER_ENDPOINT_CAP must be a positive number"));
        }

        let endpoints = match get("INTERNSHIP_ENDPOINTS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<Endpoint>()
                        .with_context(|| format!("INTERNSHIP_ENDPOINTS has an invalid url `{s}`"))
                })
                .collect::<Result<Vec<_>>>()?,
            None => DEFAULT_ENDPOINTS
                .iter()
                .map(|s| s.parse::<Endpoint>().context("default endpoint is invalid"))
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(Self {
            store: StoreConfig {
                backend,
                sqlite_path: PathBuf::from(
                    get("TRACKER_SQLITE_PATH")
                        .unwrap_or_else(|| "bookmarked_internships.db".to_string()),
                ),
                document_path: PathBuf::from(
                    get("TRACKER_DOCUMENT_PATH")
                        .unwrap_or_else(|| "bookmarked_internships.json".to_string()),
                ),
                timeout: Duration::from_millis(store_timeout_ms),
            },
            api_key: get("INTERNSHIP_API_KEY"),
            endpoints,
            per_endpoint_cap,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}
