//! Web server module: the form UI and JSON API over the record store

pub mod http;

use anyhow::Result;
use axum::{
    response::Html,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::coach::Coach;
use crate::config::Config;
use crate::store::RecordStore;

/// Shared server state
///
/// All client handles are built once at startup and passed explicitly; the
/// handlers never construct their own connections.
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub store: Arc<dyn RecordStore>,
    pub coach: Arc<Coach>,
}

/// Start the web server
pub async fn start(
    host: &str,
    port: u16,
    config: Arc<Config>,
    store: Arc<dyn RecordStore>,
    coach: Arc<Coach>,
) -> Result<()> {
    let state = ServerState { config, store, coach };

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_page))
        .route("/api/status", get(http::status_handler))
        .route("/api/users", get(http::users_handler))
        .route("/api/entries", get(http::entries_handler).post(http::submit_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Team AAR server listening on http://{}", addr);
    println!("🚀 Team AAR listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}

/// Handler for the index page: log form plus tabbed history view
async fn index_page() -> Html<&'static str> {
    Html(r#"<!DOCTYPE html>
<html>
<head>
    <title>Team Daily AAR</title>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            background: #1a1a1a;
            color: #e0e0e0;
        }
        h1 { color: #4CAF50; }
        .tabs button {
            background: #333; color: #e0e0e0; border: none;
            padding: 10px 20px; cursor: pointer; border-radius: 4px 4px 0 0;
        }
        .tabs button.active { background: #4CAF50; color: #111; }
        .panel { background: #2a2a2a; padding: 15px; border-radius: 0 8px 8px 8px; }
        textarea, select {
            width: 100%; background: #333; color: #e0e0e0;
            border: 1px solid #444; border-radius: 4px; padding: 8px; margin: 6px 0;
        }
        textarea { min-height: 70px; }
        button.primary {
            background: #4CAF50; color: #111; border: none;
            padding: 10px 20px; border-radius: 4px; cursor: pointer; margin-top: 8px;
        }
        table { width: 100%; border-collapse: collapse; margin-top: 10px; }
        th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid #444; }
        .tip { background: #1f3a24; border-left: 4px solid #4CAF50; padding: 10px; margin-top: 12px; }
        .error { background: #3a1f1f; border-left: 4px solid #e05050; padding: 10px; margin-top: 12px; }
    </style>
</head>
<body>
    <h1>🚀 Team Daily AAR</h1>
    <div class="tabs">
        <button id="tab-log" class="active" onclick="showTab('log')">📝 Log Entry</button>
        <button id="tab-history" onclick="showTab('history')">📜 View History</button>
    </div>
    <div id="panel-log" class="panel">
        <label>Who are you?</label>
        <select id="user"></select>
        <label>1. What went right?</label>
        <textarea id="right"></textarea>
        <label>2. What went wrong?</label>
        <textarea id="wrong"></textarea>
        <label>3. What should we do differently?</label>
        <textarea id="next"></textarea>
        <button class="primary" onclick="submitEntry()">Save &amp; Analyze</button>
        <div id="result"></div>
    </div>
    <div id="panel-history" class="panel" style="display:none">
        <label>Filter by user:</label>
        <select id="filter"><option value="">All Users</option></select>
        <div id="history"></div>
    </div>
    <script>
        async function loadUsers() {
            const res = await fetch('/api/users');
            const users = await res.json();
            for (const sel of [document.getElementById('user'), document.getElementById('filter')]) {
                for (const u of users) {
                    const opt = document.createElement('option');
                    opt.value = u; opt.textContent = u;
                    sel.appendChild(opt);
                }
            }
        }
        function showTab(name) {
            document.getElementById('panel-log').style.display = name === 'log' ? '' : 'none';
            document.getElementById('panel-history').style.display = name === 'history' ? '' : 'none';
            document.getElementById('tab-log').className = name === 'log' ? 'active' : '';
            document.getElementById('tab-history').className = name === 'history' ? 'active' : '';
            if (name === 'history') loadHistory();
        }
        async function submitEntry() {
            const body = {
                user: document.getElementById('user').value,
                went_right: document.getElementById('right').value,
                went_wrong: document.getElementById('wrong').value,
                next_steps: document.getElementById('next').value,
            };
            const result = document.getElementById('result');
            result.innerHTML = 'Saving...';
            const res = await fetch('/api/entries', {
                method: 'POST',
                headers: {'Content-Type': 'application/json'},
                body: JSON.stringify(body),
            });
            const data = await res.json();
            if (res.ok) {
                result.innerHTML = '<div class="tip">💡 <b>AI Coach:</b> ' + data.tip + '</div>';
            } else {
                result.innerHTML = '<div class="error">❌ ' + (data.error || 'Save failed') + '</div>';
            }
        }
        async function loadHistory() {
            const user = document.getElementById('filter').value;
            const res = await fetch('/api/entries' + (user ? '?user=' + encodeURIComponent(user) : ''));
            const out = document.getElementById('history');
            if (!res.ok) {
                const data = await res.json();
                out.innerHTML = '<div class="error">❌ ' + (data.error || 'Load failed') + '</div>';
                return;
            }
            const entries = await res.json();
            if (entries.length === 0) { out.innerHTML = '<p>No records found yet.</p>'; return; }
            let html = '<table><tr><th>Date</th><th>User</th><th>Right</th><th>Wrong</th><th>Next Steps</th></tr>';
            for (const e of entries) {
                html += `<tr><td>${e.date}</td><td>${e.user}</td><td>${e.went_right}</td><td>${e.went_wrong}</td><td>${e.next_steps}</td></tr>`;
            }
            out.innerHTML = html + '</table>';
        }
        document.getElementById('filter').addEventListener('change', loadHistory);
        loadUsers();
    </script>
</body>
</html>"#)
}
