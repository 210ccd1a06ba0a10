use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, TryLockError};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

use crate::db::PersistentStore;
use crate::domain::{ListingRecord, ListingUpdate};
use crate::errors::StoreError;

const KIND: &str = "BookmarkedInternships";
const LOCK_POLL: Duration = Duration::from_millis(5);

/// One lock per collection file, shared by every handle in the process.
static COLLECTION_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

fn collection_lock(path: &Path) -> Arc<Mutex<()>> {
    let mut locks = COLLECTION_LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    Arc::clone(locks.entry(path.to_path_buf()).or_default())
}

/// Document-collection backend: one JSON file holding a single kind of
/// entity, keyed by posting url.
///
/// Every operation loads, mutates and rewrites the collection while holding
/// the file's process-wide lock, so per-record operations are atomic across
/// all handles in a process.
#[derive(Debug)]
pub struct DocumentStore {
    /// Canonical location of the collection file; also the lock key.
    path: PathBuf,
    dir: PathBuf,
    timeout: Duration,
    lock: Arc<Mutex<()>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Collection {
    kind: String,
    entities: BTreeMap<String, ListingRecord>,
}

impl Default for Collection {
    fn default() -> Self {
        Self {
            kind: KIND.to_string(),
            entities: BTreeMap::new(),
        }
    }
}

impl DocumentStore {
    /// Opens the collection file, creating an empty one if it is missing.
    /// An unreadable or foreign file is rejected here rather than on first use.
    pub fn open(path: impl Into<PathBuf>, timeout: Duration) -> Result<Self, StoreError> {
        let path = path.into();
        let file_name = path.file_name().ok_or_else(|| {
            StoreError::StorageUnavailable(format!("{} is not a file path", path.display()))
        })?;
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let dir = fs::canonicalize(parent)
            .map_err(|e| StoreError::unavailable("Collection directory unreachable", e))?;
        let path = dir.join(file_name);

        let store = Self {
            lock: collection_lock(&path),
            path,
            dir,
            timeout,
        };

        {
            let _guard = store.acquire()?;
            match store.load()? {
                Some(collection) => tracing::debug!(
                    path = %store.path.display(),
                    entities = collection.entities.len(),
                    "document collection loaded"
                ),
                None => store.save(&Collection::default())?,
            }
        }

        Ok(store)
    }

    /// Waits for the collection lock, at most `timeout`.
    fn acquire(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match self.lock.try_lock() {
                Ok(guard) => return Ok(guard),
                // Saves go through a rename, so a panicked holder cannot leave a torn file.
                Err(TryLockError::Poisoned(poisoned)) => return Ok(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) if Instant::now() >= deadline => {
                    return Err(StoreError::StorageUnavailable(format!(
                        "timed out after {:?} waiting for {}",
                        self.timeout,
                        self.path.display()
                    )));
                }
                Err(TryLockError::WouldBlock) => std::thread::sleep(LOCK_POLL),
            }
        }
    }

    fn load(&self) -> Result<Option<Collection>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::unavailable("Read collection failed", e)),
        };

        let collection: Collection = serde_json::from_str(&text)
            .map_err(|e| StoreError::unavailable("Corrupt collection file", e))?;

        if collection.kind != KIND {
            return Err(StoreError::StorageUnavailable(format!(
                "{} holds kind `{}`, expected `{KIND}`",
                self.path.display(),
                collection.kind
            )));
        }

        Ok(Some(collection))
    }

    fn load_or_default(&self) -> Result<Collection, StoreError> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Writes a uniquely named sibling file and renames it over the collection.
    fn save(&self, collection: &Collection) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(collection)
            .map_err(|e| StoreError::unavailable("Serialize collection failed", e))?;

        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| StoreError::unavailable("Create temp collection failed", e))?;
        tmp.write_all(&json)
            .map_err(|e| StoreError::unavailable("Write collection failed", e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::unavailable("Replace collection failed", e.error))?;
        Ok(())
    }
}

impl PersistentStore for DocumentStore {
    fn select(&self) -> Result<Vec<ListingRecord>, StoreError> {
        let _guard = self.acquire()?;
        Ok(self.load_or_default()?.entities.into_values().collect())
    }

    fn insert(&self, record: &ListingRecord) -> Result<bool, StoreError> {
        let _guard = self.acquire()?;
        let mut collection = self.load_or_default()?;

        if collection.entities.contains_key(&record.url) {
            tracing::debug!(url = %record.url, "bookmark already present");
            return Ok(false);
        }

        collection
            .entities
            .insert(record.url.clone(), record.clone());
        self.save(&collection)?;
        Ok(true)
    }

    fn delete(&self, url: &str) -> Result<bool, StoreError> {
        let _guard = self.acquire()?;
        let mut collection = self.load_or_default()?;

        if collection.entities.remove(url).is_none() {
            return Ok(false);
        }

        self.save(&collection)?;
        Ok(true)
    }

    fn update(&self, url: &str, change: ListingUpdate) -> Result<bool, StoreError> {
        let _guard = self.acquire()?;
        let mut collection = self.load_or_default()?;

        let Some(entity) = collection.entities.get_mut(url) else {
            return Ok(false);
        };

        change.apply_to(entity);
        self.save(&collection)?;
        Ok(true)
    }
}
