//! Shared types used across modules
//!
//! This module contains types that are used by multiple modules
//! to avoid circular dependencies.

use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One retrospective (AAR) submission.
///
/// Entries are immutable once stored. `date` and `time` are assigned by the
/// store at append time from the server clock; values supplied by a caller
/// are replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Calendar date the entry was logged (server-assigned)
    pub date: NaiveDate,
    /// Time of day the entry was logged (server-assigned)
    pub time: NaiveTime,
    /// Who logged the entry (from the configured roster)
    pub user: String,
    /// What went right (may be empty)
    #[serde(default)]
    pub went_right: String,
    /// What went wrong (may be empty)
    #[serde(default)]
    pub went_wrong: String,
    /// What to do differently next time (may be empty)
    #[serde(default)]
    pub next_steps: String,
}

impl Entry {
    /// Build an entry stamped with the current local date and time.
    pub fn now(
        user: impl Into<String>,
        went_right: impl Into<String>,
        went_wrong: impl Into<String>,
        next_steps: impl Into<String>,
    ) -> Self {
        let now = Local::now().naive_local();
        Self {
            date: now.date(),
            time: now.time(),
            user: user.into(),
            went_right: went_right.into(),
            went_wrong: went_wrong.into(),
            next_steps: next_steps.into(),
        }
    }

    /// Replace the timestamp with the current local clock.
    ///
    /// Stores call this on append so that client-supplied values never win.
    pub fn stamp_now(&mut self) {
        let now = Local::now().naive_local();
        self.date = now.date();
        self.time = now.time();
    }

    /// True when both free-text retrospective fields are blank.
    ///
    /// Such entries are rejected by the presentation layer before they reach
    /// the store.
    pub fn is_blank(&self) -> bool {
        self.went_right.trim().is_empty() && self.went_wrong.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        let entry = Entry::now("Kyle", "", "", "do better");
        assert!(entry.is_blank());

        let entry = Entry::now("Kyle", "shipped", "", "");
        assert!(!entry.is_blank());

        let entry = Entry::now("Kyle", "   ", "late standup", "");
        assert!(!entry.is_blank());
    }

    #[test]
    fn test_stamp_now_overrides_client_timestamp() {
        let mut entry = Entry::now("Sarah", "shipped on time", "", "keep pace");
        entry.date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        entry.time = NaiveTime::from_hms_opt(0, 0, 0).unwrap();

        entry.stamp_now();
        assert_eq!(entry.date, Local::now().date_naive());
        assert_ne!(entry.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}
