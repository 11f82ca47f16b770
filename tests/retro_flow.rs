//! Integration tests for the retrospective flow:
//! append → filtered newest-first load → coaching window truncation,
//! exercised through the public `RecordStore` trait object.

use std::sync::Arc;

use team_aar::coach::RECENT_WINDOW;
use team_aar::store::{RecordStore, SqliteRecordStore};
use team_aar::types::Entry;

async fn open_store(dir: &tempfile::TempDir) -> Arc<dyn RecordStore> {
    let store = SqliteRecordStore::open(dir.path().join("aar.db"))
        .await
        .expect("open sqlite store");
    Arc::new(store)
}

#[tokio::test]
async fn append_load_roundtrip_through_trait_object() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    store.ensure_initialized().await.unwrap();
    store
        .append(Entry::now("Sarah", "shipped on time", "", "keep pace"))
        .await
        .unwrap();

    let history = store.load(Some("Sarah")).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].user, "Sarah");
    assert_eq!(history[0].went_right, "shipped on time");
    assert_eq!(history[0].went_wrong, "");
    assert_eq!(history[0].next_steps, "keep pace");
}

#[tokio::test]
async fn load_all_is_strictly_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    let users = ["Kyle", "Sarah", "Mike", "Kyle", "Sarah", "Kyle", "Mike"];
    for (i, user) in users.iter().enumerate() {
        store
            .append(Entry::now(*user, format!("note-{i}"), "", ""))
            .await
            .unwrap();
    }

    let all = store.load(None).await.unwrap();
    assert_eq!(all.len(), users.len());
    for (pos, entry) in all.iter().enumerate() {
        let appended_index = users.len() - 1 - pos;
        assert_eq!(entry.went_right, format!("note-{appended_index}"));
        assert_eq!(entry.user, users[appended_index]);
    }
}

#[tokio::test]
async fn user_filter_returns_exact_subset_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    for i in 0..6 {
        let user = if i % 2 == 0 { "Kyle" } else { "Sarah" };
        store
            .append(Entry::now(user, format!("note-{i}"), "", ""))
            .await
            .unwrap();
    }

    let kyles = store.load(Some("Kyle")).await.unwrap();
    let notes: Vec<&str> = kyles.iter().map(|e| e.went_right.as_str()).collect();
    assert_eq!(notes, vec!["note-4", "note-2", "note-0"]);
    assert!(kyles.iter().all(|e| e.user == "Kyle"));
}

#[tokio::test]
async fn coaching_window_truncates_at_five_entries() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    // Exactly five entries: the window is the whole history
    for i in 1..=5 {
        store
            .append(Entry::now("Kyle", format!("note-{i}"), "", ""))
            .await
            .unwrap();
    }
    let history = store.load(Some("Kyle")).await.unwrap();
    let window = &history[..history.len().min(RECENT_WINDOW)];
    assert_eq!(window.len(), 5);
    assert_eq!(window[0].went_right, "note-5");
    assert_eq!(window[4].went_right, "note-1");

    // A sixth entry pushes the oldest one out of the window
    store.append(Entry::now("Kyle", "note-6", "", "")).await.unwrap();
    let history = store.load(Some("Kyle")).await.unwrap();
    assert_eq!(history.len(), 6);
    let window = &history[..history.len().min(RECENT_WINDOW)];
    assert_eq!(window.len(), 5);
    assert_eq!(window[0].went_right, "note-6");
    assert_eq!(window[4].went_right, "note-2");
    assert!(window.iter().all(|e| e.went_right != "note-1"));
}
