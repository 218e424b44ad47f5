//! Read-only endpoint handlers.
//!
//! All handlers read the shared [`Venue`](carnival_core::Venue) under its
//! read lock and derive labels against the current wall-clock time.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/display` | Current display snapshot |
//! | `GET` | `/api/events` | Events, time-sorted, with labels |
//! | `GET` | `/api/events/{id}` | Single event with labels |
//! | `GET` | `/api/map-blocks` | Map blocks in store order |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use carnival_types::EventId;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the display state and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.current_snapshot().await;
    let last_tick = state.last_tick.read().await.clone();

    let clock = snapshot.clock_text;
    let date = snapshot.date_text;
    let tick = snapshot.tick;
    let featured = snapshot
        .featured
        .as_ref()
        .map_or_else(|| "--".to_owned(), |v| escape(&v.event.title));
    let countdown = snapshot
        .countdown
        .as_ref()
        .map_or_else(|| "--".to_owned(), |c| c.text.clone());
    let upcoming = snapshot.upcoming.len();
    let active = snapshot.active.len();
    let constant = snapshot.constant.len();
    let activations = last_tick.as_ref().map_or(0, |t| t.activated.len());
    let status = match &state.control {
        Some(control) if control.is_stop_requested() => "STOPPING".to_owned(),
        Some(control) => format!("RUNNING ({}s)", control.uptime_seconds()),
        None => "IDLE".to_owned(),
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Carnival Display</title>
    <style>
        body {{
            background: #1a0f2e;
            color: #f4e9ff;
            font-family: 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #ffb347; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #b9a6d6; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #2a1b47;
            border: 1px solid #4b3575;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #b9a6d6; font-size: 0.85rem; }}
        .metric .value {{ color: #ffb347; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #ffb347; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #7ee787; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #4b3575; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Carnival Display</h1>
    <p class="subtitle">{date} &middot; {clock}</p>

    <p>Status: <span class="status">{status}</span></p>

    <div>
        <div class="metric"><div class="label">Tick</div><div class="value">{tick}</div></div>
        <div class="metric"><div class="label">Featured</div><div class="value">{featured}</div></div>
        <div class="metric"><div class="label">Countdown</div><div class="value">{countdown}</div></div>
        <div class="metric"><div class="label">Upcoming</div><div class="value">{upcoming}</div></div>
        <div class="metric"><div class="label">Live</div><div class="value">{active}</div></div>
        <div class="metric"><div class="label">Always On</div><div class="value">{constant}</div></div>
        <div class="metric"><div class="label">Went Live Last Tick</div><div class="value">{activations}</div></div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/display">/api/display</a> -- Current display snapshot</li>
        <li>GET <a href="/api/events">/api/events</a> -- Events, time-sorted</li>
        <li>GET <a href="/api/map-blocks">/api/map-blocks</a> -- Venue map blocks</li>
        <li>WS <code>/ws/display</code> -- Live snapshot stream</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/display
// ---------------------------------------------------------------------------

/// Return the display snapshot as of now.
pub async fn get_display(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.current_snapshot().await)
}

// ---------------------------------------------------------------------------
// GET /api/events, GET /api/events/{id}
// ---------------------------------------------------------------------------

/// List every event, time-sorted with undated events last, decorated with
/// labels and map positions.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let now = state.now();
    let venue = state.venue.read().await;
    let events = venue.schedule(now);

    Ok(Json(serde_json::json!({
        "count": events.len(),
        "events": serde_json::to_value(&events)?,
    })))
}

/// Return a single event with labels.
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = EventId::from(id);
    let now = state.now();
    let venue = state.venue.read().await;
    let event = venue
        .store
        .get(&id)
        .ok_or_else(|| ObserverError::NotFound(format!("event {id}")))?;
    Ok(Json(venue.view(event, now)))
}

// ---------------------------------------------------------------------------
// GET /api/map-blocks
// ---------------------------------------------------------------------------

/// List map blocks in store order.
pub async fn list_blocks(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let venue = state.venue.read().await;
    let blocks = venue.store.list_blocks();
    Json(serde_json::json!({
        "count": blocks.len(),
        "mapBlocks": blocks,
    }))
}

/// Minimal HTML escaping for user-supplied titles.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
