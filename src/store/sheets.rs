//! Google Sheets-backed record store
//!
//! Speaks the Sheets v4 values API directly: one `values:append` call per
//! entry (the sheet's own append atomicity is the concurrency story) and one
//! range read per load. Rows have no identifier, so newest-first is the
//! reverse of row order below the header.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{RecordStore, StoreError};
use crate::config::StorageConfig;
use crate::types::Entry;

/// Fixed first-row header of the backing sheet
pub const HEADER: [&str; 6] = ["Date", "Time", "User", "Went Right", "Went Wrong", "Next Steps"];

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M:%S";

/// Record store over a remote spreadsheet reached via an authenticated API.
pub struct SheetsRecordStore {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetsRecordStore {
    /// Build a store from storage config plus a pre-obtained bearer token.
    pub fn new(config: &StorageConfig, token: String) -> Result<Self, StoreError> {
        let spreadsheet_id = config
            .spreadsheet_id
            .clone()
            .ok_or_else(|| StoreError::Backend("spreadsheet_id is not configured".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            spreadsheet_id,
            sheet_name: config.sheet_name.clone(),
            token,
        })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}!{}",
            self.base_url, self.spreadsheet_id, self.sheet_name, range
        )
    }

    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let response = self
            .client
            .get(self.values_url(range))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let response = check_status(response).await?;
        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| StoreError::Backend(format!("malformed values response: {e}")))?;
        Ok(body.values)
    }

    async fn append_row(&self, row: [String; 6]) -> Result<(), StoreError> {
        let url = format!("{}:append", self.values_url("A1"));
        let response = self
            .client
            .post(url)
            // RAW keeps cell text exactly as written; letting the sheet
            // re-typeset dates would break round-tripping them back out.
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(&self.token)
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .map_err(map_transport_error)?;

        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SheetsRecordStore {
    async fn ensure_initialized(&self) -> Result<(), StoreError> {
        // An empty A1 means a fresh sheet that still needs its header row
        let first_row = self.read_range("A1:F1").await?;
        if first_row.is_empty() {
            debug!("Writing header row to sheet {}", self.sheet_name);
            self.append_row(HEADER.map(str::to_string)).await?;
        }
        Ok(())
    }

    async fn append(&self, mut entry: Entry) -> Result<(), StoreError> {
        entry.stamp_now();
        self.append_row(entry_to_row(&entry)).await?;
        debug!("Appended entry for {} to sheet {}", entry.user, self.sheet_name);
        Ok(())
    }

    async fn load(&self, user_filter: Option<&str>) -> Result<Vec<Entry>, StoreError> {
        let rows = self.read_range("A1:F").await?;
        Ok(rows_to_entries(rows, user_filter))
    }
}

/// Serialize an entry into one sheet row, header column order.
pub fn entry_to_row(entry: &Entry) -> [String; 6] {
    [
        entry.date.format(DATE_FMT).to_string(),
        entry.time.format(TIME_FMT).to_string(),
        entry.user.clone(),
        entry.went_right.clone(),
        entry.went_wrong.clone(),
        entry.next_steps.clone(),
    ]
}

/// Parse raw sheet rows into entries, newest-first, optionally filtered.
///
/// The header row is skipped; trailing cells a row never filled in come back
/// missing from the API and read as empty. Every data row stays an entry:
/// a date or time cell that fails to parse (hand-edited, or typeset by an
/// older sheet) falls back to the epoch default instead of dropping the row,
/// so N appended entries always load as N entries.
pub fn rows_to_entries(rows: Vec<Vec<String>>, user_filter: Option<&str>) -> Vec<Entry> {
    let cell = |row: &[String], idx: usize| row.get(idx).cloned().unwrap_or_default();

    let mut entries: Vec<Entry> = rows
        .into_iter()
        .skip_while(|row| row.first().map(|c| c == HEADER[0]).unwrap_or(false))
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .map(|row| Entry {
            date: chrono::NaiveDate::parse_from_str(&cell(&row, 0), DATE_FMT)
                .unwrap_or_default(),
            time: chrono::NaiveTime::parse_from_str(&cell(&row, 1), TIME_FMT)
                .unwrap_or_default(),
            user: cell(&row, 2),
            went_right: cell(&row, 3),
            went_wrong: cell(&row, 4),
            next_steps: cell(&row, 5),
        })
        .collect();

    // The sheet appends at the bottom, so newest-first is the reverse
    entries.reverse();

    if let Some(user) = user_filter {
        entries.retain(|e| e.user == user);
    }
    entries
}

fn map_transport_error(e: reqwest::Error) -> StoreError {
    StoreError::Connection(e.to_string())
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(StoreError::Auth(format!("{status}: {body}")))
        }
        _ => Err(StoreError::Backend(format!("{status}: {body}"))),
    }
}
