use chrono::{NaiveDate, Utc};
use rusqlite::{params, Row, TransactionBehavior};

use crate::db::connection::{init_db, Database};
use crate::db::PersistentStore;
use crate::domain::{ApplicationStatus, ListingRecord, ListingUpdate};
use crate::errors::StoreError;

const SELECT_ALL_SQL: &str = r#"
    SELECT internship_title, organization, date_posted, location,
           internship_url, date_applied, application_status
    FROM bookmarked_internships
    ORDER BY created_at, rowid
"#;

/// Embedded file-based backend.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

/// Column values exactly as stored, before status labels are decoded.
struct StoredRow {
    title: String,
    organization: String,
    date_posted: NaiveDate,
    location: String,
    url: String,
    date_applied: Option<NaiveDate>,
    application_status: Option<String>,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            title: row.get(0)?,
            organization: row.get(1)?,
            date_posted: row.get(2)?,
            location: row.get(3)?,
            url: row.get(4)?,
            date_applied: row.get(5)?,
            application_status: row.get(6)?,
        })
    }

    fn into_record(self) -> Result<ListingRecord, StoreError> {
        let application_status = match self.application_status {
            Some(label) => Some(label.parse::<ApplicationStatus>().map_err(|_| {
                StoreError::StorageUnavailable(format!(
                    "corrupt application_status `{label}` for {}",
                    self.url
                ))
            })?),
            None => None,
        };

        Ok(ListingRecord {
            title: self.title,
            organization: self.organization,
            date_posted: self.date_posted,
            location: self.location,
            url: self.url,
            date_applied: self.date_applied,
            application_status,
        })
    }
}

impl SqliteStore {
    /// Opens the database file and makes sure the schema exists.
    pub fn open(db: Database) -> Result<Self, StoreError> {
        init_db(&db)?;
        Ok(Self { db })
    }
}

impl PersistentStore for SqliteStore {
    fn select(&self) -> Result<Vec<ListingRecord>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(SELECT_ALL_SQL)
                .map_err(|e| StoreError::unavailable("Prepare select failed", e))?;

            let rows = stmt
                .query_map([], StoredRow::from_row)
                .map_err(|e| StoreError::unavailable("Select failed", e))?;

            let mut out = Vec::new();
            for r in rows {
                let row = r.map_err(|e| StoreError::unavailable("Corrupt bookmark row", e))?;
                out.push(row.into_record()?);
            }
            Ok(out)
        })
    }

    fn insert(&self, record: &ListingRecord) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            // IMMEDIATE takes the write lock up front so the existence check
            // and the insert cannot interleave with another writer.
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| StoreError::unavailable("Begin insert failed", e))?;

            let exists: bool = tx
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM bookmarked_internships WHERE internship_url = ?1)",
                    params![record.url],
                    |row| row.get(0),
                )
                .map_err(|e| StoreError::unavailable("Duplicate check failed", e))?;

            if exists {
                tracing::debug!(url = %record.url, "bookmark already present");
                return Ok(false);
            }

            tx.execute(
                r#"
                INSERT INTO bookmarked_internships (
                    internship_title, organization, date_posted, location,
                    internship_url, date_applied, application_status, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    record.title,
                    record.organization,
                    record.date_posted,
                    record.location,
                    record.url,
                    record.date_applied,
                    record.application_status.map(ApplicationStatus::label),
                    Utc::now(),
                ],
            )
            .map_err(|e| StoreError::unavailable("Insert failed", e))?;

            tx.commit()
                .map_err(|e| StoreError::unavailable("Commit insert failed", e))?;
            Ok(true)
        })
    }

    fn delete(&self, url: &str) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let removed = conn
                .execute(
                    "DELETE FROM bookmarked_internships WHERE internship_url = ?1",
                    params![url],
                )
                .map_err(|e| StoreError::unavailable("Delete failed", e))?;
            Ok(removed > 0)
        })
    }

    fn update(&self, url: &str, change: ListingUpdate) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let changed = match change {
                ListingUpdate::DateApplied(date) => conn.execute(
                    "UPDATE bookmarked_internships SET date_applied = ?1 WHERE internship_url = ?2",
                    params![date, url],
                ),
                ListingUpdate::ApplicationStatus(status) => conn.execute(
                    "UPDATE bookmarked_internships SET application_status = ?1 WHERE internship_url = ?2",
                    params![status.map(ApplicationStatus::label), url],
                ),
            }
            .map_err(|e| StoreError::unavailable("Update failed", e))?;

            Ok(changed > 0)
        })
    }
}
