//! HTTP handlers for the JSON API

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::coach::RECENT_WINDOW;
use crate::server::ServerState;
use crate::store::StoreError;
use crate::types::Entry;

/// Entry submission request
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub user: String,
    #[serde(default)]
    pub went_right: String,
    #[serde(default)]
    pub went_wrong: String,
    #[serde(default)]
    pub next_steps: String,
}

/// Entry submission response
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub saved: bool,
    pub tip: String,
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
}

/// History query parameters
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user: Option<String>,
}

/// Map a store failure to a non-fatal JSON error response
fn store_error_response(e: StoreError) -> axum::response::Response {
    let status = match e {
        StoreError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::Auth(_) => StatusCode::BAD_GATEWAY,
        StoreError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!("Store error: {}", e);
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}

/// Status handler
pub async fn status_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let response = StatusResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.config.storage.backend.to_string(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Roster handler: the configured selectable user names
pub async fn users_handler(State(state): State<ServerState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.config.roster.clone())).into_response()
}

/// History handler: entries newest-first, optionally filtered by user
pub async fn entries_handler(
    State(state): State<ServerState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    match state.store.load(query.user.as_deref()).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// Submission handler: validate, append, reload history, coach.
///
/// The save and the tip are independent: once the append succeeds the
/// response says `saved: true`, even when tip generation only produced an
/// error string.
pub async fn submit_handler(
    State(state): State<ServerState>,
    Json(req): Json<SubmitRequest>,
) -> impl IntoResponse {
    if !state.config.is_roster_member(&req.user) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("Unknown user '{}'", req.user) })),
        )
            .into_response();
    }

    let entry = Entry::now(&req.user, req.went_right, req.went_wrong, req.next_steps);
    if entry.is_blank() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Please fill out at least one of went right / went wrong." })),
        )
            .into_response();
    }

    if let Err(e) = state.store.append(entry).await {
        return store_error_response(e);
    }

    // Reload so the tip sees the entry that was just saved
    let tip = match state.store.load(Some(&req.user)).await {
        Ok(history) => {
            let window = &history[..history.len().min(RECENT_WINDOW)];
            state.coach.generate_tip(window, &req.user).await
        }
        Err(e) => format!("Saved, but history could not be reloaded for coaching: {e}"),
    };

    (StatusCode::OK, Json(SubmitResponse { saved: true, tip })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::Coach;
    use crate::config::Config;
    use crate::server::ServerState;
    use crate::store::{RecordStore, SqliteRecordStore};
    use std::sync::Arc;

    async fn test_state(dir: &tempfile::TempDir) -> ServerState {
        let config = Config::default();
        let store = SqliteRecordStore::open(dir.path().join("aar.db"))
            .await
            .unwrap();
        let coach = Coach::with_client(
            Err("API key not found".to_string()),
            &config.coach,
        );
        ServerState {
            config: Arc::new(config),
            store: Arc::new(store),
            coach: Arc::new(coach),
        }
    }

    fn request(user: &str, right: &str, wrong: &str, next: &str) -> SubmitRequest {
        SubmitRequest {
            user: user.to_string(),
            went_right: right.to_string(),
            went_wrong: wrong.to_string(),
            next_steps: next.to_string(),
        }
    }

    #[tokio::test]
    async fn test_blank_submission_rejected_and_not_stored() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        // Whitespace-only right/wrong counts as blank even with next steps set
        let response = submit_handler(
            State(state.clone()),
            Json(request("Kyle", "", "   ", "try harder")),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.load(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        let response = submit_handler(
            State(state.clone()),
            Json(request("Nobody", "shipped", "", "")),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.load(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submission_saves_even_when_coach_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        let response = submit_handler(
            State(state.clone()),
            Json(request("Sarah", "shipped on time", "", "keep pace")),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let saved = state.store.load(Some("Sarah")).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].went_right, "shipped on time");
    }
}
