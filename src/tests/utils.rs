// src/tests/utils.rs

use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use crate::db::{open_store, BackendKind, PersistentStore, StoreConfig};
use crate::domain::ListingRecord;
use crate::scraper::{BatchRequest, Endpoint, FetchError, ListingSource, BATCH_SIZE};

/// A store in a scratch directory. The directory lives as long as the value.
pub struct TestStore {
    pub store: Box<dyn PersistentStore>,
    pub config: StoreConfig,
    pub dir: TempDir,
}

pub fn make_store(backend: BackendKind) -> TestStore {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = StoreConfig {
        backend,
        sqlite_path: dir.path().join("bookmarks.sqlite3"),
        document_path: dir.path().join("bookmarks.json"),
        timeout: Duration::from_secs(2),
    };
    let store = open_store(&config).expect("Failed to open store");

    TestStore {
        store,
        config,
        dir,
    }
}

pub const BACKENDS: [BackendKind; 2] = [BackendKind::Sqlite, BackendKind::Document];

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn listing(url: &str) -> ListingRecord {
    ListingRecord::new(
        "Software Engineering Intern",
        "Acme Corp",
        date(2024, 10, 1),
        "Portland, OR",
        url,
    )
}

pub fn endpoint(url: &str) -> Endpoint {
    url.parse().unwrap()
}

/// How a scripted endpoint answers.
#[derive(Debug, Clone)]
pub enum Script {
    /// `n` matching entries served in pages of `BATCH_SIZE`.
    Entries(usize),
    /// Every request fails at the network level.
    Down,
    /// Every request gets this status.
    Status(u16),
    /// Serves entries but fails at the network level from `offset` on.
    DownFrom { total: usize, offset: usize },
    /// Serves this body at offset 0 and nothing after it.
    Raw(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub endpoint: String,
    pub offset: usize,
    pub query: Vec<(String, String)>,
}

/// In-process stand-in for the listings API.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    scripts: HashMap<String, Script>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, endpoint: &str, script: Script) -> Self {
        self.scripts.insert(endpoint.to_string(), script);
        self
    }

    /// Shared log of requests, readable after the source moves into a fetcher.
    pub fn seen(&self) -> Arc<Mutex<Vec<SeenRequest>>> {
        Arc::clone(&self.seen)
    }
}

pub fn offsets_for(seen: &Arc<Mutex<Vec<SeenRequest>>>, endpoint: &str) -> Vec<usize> {
    seen.lock()
        .unwrap()
        .iter()
        .filter(|r| r.endpoint == endpoint)
        .map(|r| r.offset)
        .collect()
}

pub fn entry(endpoint: &Endpoint, i: usize) -> Value {
    json!({
        "title": format!("Intern {i}"),
        "organization": format!("Org {}", i % 3),
        "date_posted": "2024-10-01T09:30:00",
        "location": "Remote",
        "url": format!("https://{}/jobs/{i}", endpoint.host()),
    })
}

fn page(endpoint: &Endpoint, total: usize, offset: usize) -> Vec<Value> {
    (offset..total.min(offset + BATCH_SIZE))
        .map(|i| entry(endpoint, i))
        .collect()
}

impl ListingSource for ScriptedSource {
    fn fetch_batch(
        &self,
        endpoint: &Endpoint,
        request: &BatchRequest<'_>,
    ) -> Result<Vec<Value>, FetchError> {
        let key = endpoint.to_string();
        self.seen.lock().unwrap().push(SeenRequest {
            endpoint: key.clone(),
            offset: request.offset,
            query: request
                .filters
                .query_pairs()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });

        let down = || FetchError::Unavailable {
            endpoint: key.clone(),
            reason: "connection refused".to_string(),
        };

        match self.scripts.get(&key).cloned().unwrap_or(Script::Entries(0)) {
            Script::Entries(total) => Ok(page(endpoint, total, request.offset)),
            Script::Down => Err(down()),
            Script::Status(status) => Err(FetchError::Rejected {
                endpoint: key.clone(),
                status,
                body: r#"{"message":"You are not subscribed to this API."}"#.to_string(),
            }),
            Script::DownFrom { offset, .. } if request.offset >= offset => Err(down()),
            Script::DownFrom { total, .. } => Ok(page(endpoint, total, request.offset)),
            Script::Raw(body) if request.offset == 0 => Ok(body),
            Script::Raw(_) => Ok(Vec::new()),
        }
    }
}
