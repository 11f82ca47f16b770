//! SQLite-backed record store

use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::{RecordStore, StoreError};
use crate::types::Entry;

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M:%S";

/// Record store over a local SQLite file.
///
/// The monotonically increasing `id` column is the append-order key;
/// newest-first reads sort on it descending.
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl SqliteRecordStore {
    /// Open (or create) the database at the given path and initialize it.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Connection(format!("cannot create {}: {e}", parent.display())))?;
        }

        let conn = Connection::open(&path)
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        // WAL keeps overlapping request-handling turns from corrupting rows
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        };
        store.ensure_initialized().await?;
        Ok(store)
    }

    /// Path of the backing database file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn ensure_initialized(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                date_logged TEXT NOT NULL,
                time_logged TEXT NOT NULL,
                went_right TEXT DEFAULT '',
                went_wrong TEXT DEFAULT '',
                next_steps TEXT DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_entries_username ON entries(username);
            "#,
        )
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn append(&self, mut entry: Entry) -> Result<(), StoreError> {
        entry.stamp_now();

        let conn = self.conn.lock().await;
        conn.execute(
            r#"INSERT INTO entries
               (username, date_logged, time_logged, went_right, went_wrong, next_steps)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                entry.user,
                entry.date.format(DATE_FMT).to_string(),
                entry.time.format(TIME_FMT).to_string(),
                entry.went_right,
                entry.went_wrong,
                entry.next_steps,
            ],
        )
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        debug!("Appended entry for {} to {}", entry.user, self.path.display());
        Ok(())
    }

    async fn load(&self, user_filter: Option<&str>) -> Result<Vec<Entry>, StoreError> {
        let conn = self.conn.lock().await;

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<Entry> {
            let date_str: String = row.get(1)?;
            let time_str: String = row.get(2)?;
            Ok(Entry {
                user: row.get(0)?,
                date: chrono::NaiveDate::parse_from_str(&date_str, DATE_FMT)
                    .unwrap_or_default(),
                time: chrono::NaiveTime::parse_from_str(&time_str, TIME_FMT)
                    .unwrap_or_default(),
                went_right: row.get(3)?,
                went_wrong: row.get(4)?,
                next_steps: row.get(5)?,
            })
        };

        let entries = match user_filter {
            Some(user) => {
                let mut stmt = conn
                    .prepare_cached(
                        "SELECT username, date_logged, time_logged, went_right, went_wrong, next_steps
                         FROM entries WHERE username = ?1 ORDER BY id DESC",
                    )
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                let rows = stmt
                    .query_map(params![user], map_row)
                    .map_err(|e| StoreError::Backend(e.to_string()))?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                rows
            }
            None => {
                let mut stmt = conn
                    .prepare_cached(
                        "SELECT username, date_logged, time_logged, went_right, went_wrong, next_steps
                         FROM entries ORDER BY id DESC",
                    )
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                let rows = stmt
                    .query_map([], map_row)
                    .map_err(|e| StoreError::Backend(e.to_string()))?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                rows
            }
        };

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDate};
    use tempfile::tempdir;

    async fn open_test_store() -> (tempfile::TempDir, SqliteRecordStore) {
        let dir = tempdir().unwrap();
        let store = SqliteRecordStore::open(dir.path().join("aar.db")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_empty_store_loads_empty() {
        let (_dir, store) = open_test_store().await;
        assert!(store.load(None).await.unwrap().is_empty());
        assert!(store.load(Some("Kyle")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_initialized_idempotent() {
        let (_dir, store) = open_test_store().await;
        store.ensure_initialized().await.unwrap();
        store.ensure_initialized().await.unwrap();
        assert!(store.load(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_then_load_newest_first() {
        let (_dir, store) = open_test_store().await;

        for i in 1..=4 {
            store
                .append(Entry::now("Kyle", format!("right-{i}"), "", ""))
                .await
                .unwrap();
        }

        let entries = store.load(None).await.unwrap();
        assert_eq!(entries.len(), 4);
        // Strictly newest-first: append order reversed
        let rights: Vec<&str> = entries.iter().map(|e| e.went_right.as_str()).collect();
        assert_eq!(rights, vec!["right-4", "right-3", "right-2", "right-1"]);
    }

    #[tokio::test]
    async fn test_load_filters_by_user_preserving_order() {
        let (_dir, store) = open_test_store().await;

        store.append(Entry::now("Kyle", "k1", "", "")).await.unwrap();
        store.append(Entry::now("Sarah", "s1", "", "")).await.unwrap();
        store.append(Entry::now("Kyle", "k2", "", "")).await.unwrap();
        store.append(Entry::now("Mike", "m1", "", "")).await.unwrap();

        let kyles = store.load(Some("Kyle")).await.unwrap();
        assert_eq!(kyles.len(), 2);
        assert_eq!(kyles[0].went_right, "k2");
        assert_eq!(kyles[1].went_right, "k1");

        assert!(store.load(Some("Nobody")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_stamps_server_timestamp() {
        let (_dir, store) = open_test_store().await;

        let mut entry = Entry::now("Sarah", "shipped on time", "", "keep pace");
        entry.date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        store.append(entry).await.unwrap();

        let loaded = store.load(Some("Sarah")).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].went_right, "shipped on time");
        assert_eq!(loaded[0].next_steps, "keep pace");
        // Client-supplied date replaced by the server clock
        assert_eq!(loaded[0].date, Local::now().date_naive());
    }

    #[tokio::test]
    async fn test_empty_text_fields_round_trip() {
        let (_dir, store) = open_test_store().await;
        store.append(Entry::now("Mike", "", "demo crashed", "")).await.unwrap();

        let loaded = store.load(Some("Mike")).await.unwrap();
        assert_eq!(loaded[0].went_right, "");
        assert_eq!(loaded[0].went_wrong, "demo crashed");
    }
}
