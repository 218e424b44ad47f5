//! Axum router construction for the display API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS enabled so the display and admin pages can be served from
//! another origin.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{admin, handlers, ws};

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/display` -- `WebSocket` snapshot stream
/// - `GET /api/display` -- current display snapshot
/// - `GET|POST /api/events`, `GET|PATCH|DELETE /api/events/{id}`
/// - `POST /api/events/{id}/nudge`, `POST /api/events/{id}/position`
/// - `POST /api/events/reset-positions`
/// - `GET|POST /api/map-blocks`, `PATCH|DELETE /api/map-blocks/{id}`
/// - `POST /api/map-blocks/{id}/resize`
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/display", get(ws::ws_display))
        // Display
        .route("/api/display", get(handlers::get_display))
        // Events
        .route(
            "/api/events",
            get(handlers::list_events).post(admin::create_event),
        )
        .route("/api/events/reset-positions", post(admin::reset_positions))
        .route(
            "/api/events/{id}",
            get(handlers::get_event)
                .patch(admin::update_event)
                .delete(admin::delete_event),
        )
        .route("/api/events/{id}/nudge", post(admin::nudge_event))
        .route("/api/events/{id}/position", post(admin::reposition_event))
        // Map blocks
        .route(
            "/api/map-blocks",
            get(handlers::list_blocks).post(admin::create_block),
        )
        .route(
            "/api/map-blocks/{id}",
            axum::routing::patch(admin::update_block).delete(admin::delete_block),
        )
        .route("/api/map-blocks/{id}/resize", post(admin::resize_block))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
