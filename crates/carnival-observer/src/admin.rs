//! Administrative endpoints that edit events and map blocks.
//!
//! Every mutation is applied to the in-memory store first, so the next
//! tick and every snapshot see it immediately, and is then mirrored to
//! the persistence backend in the background. Creates are the exception:
//! the backend assigns ids, so a create goes to the backend first and
//! falls back to a locally generated id if the backend is unreachable.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/events` | Create an event |
//! | `PATCH` | `/api/events/{id}` | Update an event |
//! | `DELETE` | `/api/events/{id}` | Delete an event |
//! | `POST` | `/api/events/{id}/nudge` | Shift the start time by minutes |
//! | `POST` | `/api/events/{id}/position` | Place the event on the map |
//! | `POST` | `/api/events/reset-positions` | Re-apply the grid placement |
//! | `POST` | `/api/map-blocks` | Add a map block |
//! | `PATCH` | `/api/map-blocks/{id}` | Update a map block |
//! | `POST` | `/api/map-blocks/{id}/resize` | Resize a block by deltas |
//! | `DELETE` | `/api/map-blocks/{id}` | Delete a map block |

use std::future::Future;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use carnival_store::{EventStore, RemoteBackend, RemoteError};
use carnival_types::{
    BlockDraft, BlockId, BlockPatch, EventDraft, EventId, EventPatch, MapPosition,
};
use tracing::{info, warn};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/events/{id}/nudge`.
#[derive(Debug, serde::Deserialize)]
pub struct NudgeRequest {
    /// Minutes to shift by; negative moves the event earlier.
    pub minutes: i64,
}

/// Request body for `POST /api/map-blocks/{id}/resize`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeRequest {
    /// Change in width, in map percent.
    #[serde(default)]
    pub delta_width: f64,
    /// Change in height, in map percent.
    #[serde(default)]
    pub delta_height: f64,
}

/// Spawn `call` against the backend if mirroring is enabled.
fn mirror_to_backend<F, Fut, T>(state: &AppState, operation: &'static str, call: F)
where
    F: FnOnce(RemoteBackend) -> Fut,
    Fut: Future<Output = Result<T, RemoteError>> + Send + 'static,
    T: Send + 'static,
{
    if let Some(remote) = state.remote.clone() {
        carnival_store::mirror(operation, call(remote));
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Create an event.
///
/// The draft is validated before anything is sent to the backend.
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, ObserverError> {
    EventStore::validate_draft(&draft)?;

    let created_remotely = match &state.remote {
        Some(remote) => match remote.create_event(&draft).await {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, "backend create failed, assigning a local id");
                None
            }
        },
        None => None,
    };

    let mut venue = state.venue.write().await;
    let event = match created_remotely {
        Some(event) => venue.store.insert(event)?,
        None => venue.store.create(draft)?,
    };
    drop(venue);

    info!(event_id = %event.id, title = %event.title, "event created");
    state.publish_current().await;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Apply a partial update to an event.
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<EventPatch>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = EventId::from(id);
    let event = state.venue.write().await.store.update(&id, &patch)?;

    let mut stored = patch;
    if stored.map_position.is_some() {
        stored.map_position = event.map_position;
    }
    mirror_to_backend(&state, "update_event", move |remote| async move {
        remote.update_event(&id, &stored).await
    });
    state.publish_current().await;
    Ok(Json(event))
}

/// Delete an event.
///
/// A lock or takeover held by the event is released on the next tick.
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = EventId::from(id);
    let event = state.venue.write().await.store.delete(&id)?;
    info!(event_id = %id, "event deleted");

    mirror_to_backend(&state, "delete_event", move |remote| async move {
        remote.delete_event(&id).await
    });
    state.publish_current().await;
    Ok(Json(event))
}

/// Shift an event's start by a signed number of minutes.
pub async fn nudge_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<NudgeRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = EventId::from(id);
    let event = state
        .venue
        .write()
        .await
        .store
        .nudge(&id, request.minutes)?;
    info!(
        event_id = %id,
        minutes = request.minutes,
        scheduled_time = %event.scheduled_time,
        "event nudged"
    );

    let patch = EventPatch::scheduled_time(event.scheduled_time.clone());
    mirror_to_backend(&state, "nudge_event", move |remote| async move {
        remote.update_event(&id, &patch).await
    });
    state.publish_current().await;
    Ok(Json(event))
}

/// Place an event at an explicit map position.
pub async fn reposition_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(position): Json<MapPosition>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = EventId::from(id);
    let event = state
        .venue
        .write()
        .await
        .store
        .reposition_event(&id, position)?;

    if let Some(position) = event.map_position {
        let patch = EventPatch::map_position(position);
        mirror_to_backend(&state, "reposition_event", move |remote| async move {
            remote.update_event(&id, &patch).await
        });
    }
    state.publish_current().await;
    Ok(Json(event))
}

/// Re-apply the grid placement to every event.
pub async fn reset_positions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let mut venue = state.venue.write().await;
    venue.store.reset_positions();
    let placed: Vec<(EventId, MapPosition)> = venue
        .store
        .list()
        .iter()
        .filter_map(|e| e.map_position.map(|p| (e.id.clone(), p)))
        .collect();
    drop(venue);
    info!(events = placed.len(), "event positions reset");

    let count = placed.len();
    for (id, position) in placed {
        let patch = EventPatch::map_position(position);
        mirror_to_backend(&state, "reset_positions", move |remote| async move {
            remote.update_event(&id, &patch).await
        });
    }
    state.publish_current().await;
    Ok(Json(serde_json::json!({ "count": count })))
}

// ---------------------------------------------------------------------------
// Map blocks
// ---------------------------------------------------------------------------

/// Add a map block.
pub async fn create_block(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<BlockDraft>,
) -> Result<impl IntoResponse, ObserverError> {
    let created_remotely = match &state.remote {
        Some(remote) => match remote.create_block(&draft).await {
            Ok(block) => Some(block),
            Err(e) => {
                warn!(error = %e, "backend block create failed, assigning a local id");
                None
            }
        },
        None => None,
    };

    let mut venue = state.venue.write().await;
    let block = match created_remotely {
        Some(block) => venue.store.insert_block(block),
        None => venue.store.add_block(draft),
    };
    drop(venue);

    info!(block_id = %block.id, label = %block.label, "map block added");
    state.publish_current().await;
    Ok((StatusCode::CREATED, Json(block)))
}

/// Apply a partial update to a map block.
pub async fn update_block(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<BlockPatch>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = BlockId::from(id);
    let block = state.venue.write().await.store.update_block(&id, &patch)?;

    // Mirror the clamped result rather than the raw request.
    let stored = BlockPatch {
        block_type: patch.block_type.map(|_| block.block_type),
        label: patch.label.as_ref().map(|_| block.label.clone()),
        position: patch.position.map(|_| block.position),
        size: patch.size.map(|_| block.size),
    };
    mirror_to_backend(&state, "update_block", move |remote| async move {
        remote.update_block(&id, &stored).await
    });
    state.publish_current().await;
    Ok(Json(block))
}

/// Grow or shrink a map block by deltas, clamped to the map.
pub async fn resize_block(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<ResizeRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = BlockId::from(id);
    let block = state.venue.write().await.store.resize_block(
        &id,
        request.delta_width,
        request.delta_height,
    )?;

    let patch = BlockPatch {
        size: Some(block.size),
        ..BlockPatch::default()
    };
    mirror_to_backend(&state, "resize_block", move |remote| async move {
        remote.update_block(&id, &patch).await
    });
    state.publish_current().await;
    Ok(Json(block))
}

/// Delete a map block.
pub async fn delete_block(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = BlockId::from(id);
    let block = state.venue.write().await.store.delete_block(&id)?;
    info!(block_id = %id, "map block deleted");

    mirror_to_backend(&state, "delete_block", move |remote| async move {
        remote.delete_block(&id).await
    });
    state.publish_current().await;
    Ok(Json(block))
}
