//! Record Store: the persistence abstraction over retrospective entries
//!
//! Two interchangeable backends implement the same contract: a local SQLite
//! file and a remote Google Sheet. The presentation layer and the coach only
//! ever see `Arc<dyn RecordStore>`.

pub mod sheets;
pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{Config, StorageBackend};
use crate::types::Entry;

pub use sheets::SheetsRecordStore;
pub use sqlite::SqliteRecordStore;

/// Errors surfaced by a storage backend. All of them are non-fatal: the
/// presentation layer degrades to an error message and an empty table.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage backend unreachable (network, file open)
    #[error("cannot reach storage backend: {0}")]
    Connection(String),
    /// Bad or missing credentials
    #[error("storage authentication failed: {0}")]
    Auth(String),
    /// Any other backend failure (quota, malformed data, SQL)
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Append and filtered-read operations over retrospective entries.
///
/// Ordering contract: `load` is newest-first, derived purely from append
/// position (id DESC in SQLite, row reversal in Sheets). Tie-break between
/// entries appended at the same instant follows insertion order.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Idempotent setup (create table / header row), safe on every startup.
    async fn ensure_initialized(&self) -> Result<(), StoreError>;

    /// Durably append one entry at the end of the sequence.
    ///
    /// The entry is stamped with the server clock before writing; any
    /// caller-supplied date/time are replaced. Never reorders or
    /// deduplicates. Visible to all subsequent reads once this returns.
    async fn append(&self, entry: Entry) -> Result<(), StoreError>;

    /// All entries (or only those whose user matches `user_filter`),
    /// newest-first. An empty or uninitialized store yields an empty vec,
    /// not an error.
    async fn load(&self, user_filter: Option<&str>) -> Result<Vec<Entry>, StoreError>;
}

/// Open the store selected by the configuration.
pub async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config.storage.backend {
        StorageBackend::Sqlite => {
            let store = SqliteRecordStore::open(config.database_path()?).await?;
            Ok(Arc::new(store))
        }
        StorageBackend::Sheets => {
            let token = crate::secrets::get_sheets_token()?;
            let store = SheetsRecordStore::new(&config.storage, token)?;
            Ok(Arc::new(store))
        }
    }
}
