//! Team AAR - team retrospective logger library
//!
//! A small team-retrospective ("after-action review") tool:
//! - Record Store over a local SQLite file or a remote Google Sheet
//! - AI Coach producing one short improvement tip from recent entries
//! - Web form UI and CLI on top of both
//!
//! # Example
//!
//! ```ignore
//! use team_aar::store::{open_store, RecordStore};
//! use team_aar::config::Config;
//! use team_aar::types::Entry;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let store = open_store(&config).await?;
//!     store.ensure_initialized().await?;
//!     store.append(Entry::now("Kyle", "shipped on time", "", "keep pace")).await?;
//!     for entry in store.load(Some("Kyle")).await? {
//!         println!("{} {}: {}", entry.date, entry.user, entry.went_right);
//!     }
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod config;
pub mod secrets;
pub mod store;
pub mod llm;
pub mod coach;
pub mod server;
pub mod cli;

// Re-export commonly used types for convenience
pub use coach::{Coach, NO_HISTORY_TIP, RECENT_WINDOW};
pub use config::Config;
pub use store::{open_store, RecordStore, SheetsRecordStore, SqliteRecordStore, StoreError};
pub use types::Entry;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
