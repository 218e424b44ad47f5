//! Integration tests for the display API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. The venue clock is anchored to a fixed instant
//! and tokio time is paused so relative labels are deterministic.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use carnival_core::{Venue, VenueClock};
use carnival_observer::router::build_router;
use carnival_observer::state::AppState;
use carnival_store::{EventStore, RemoteBackend};
use carnival_types::{
    BlockDraft, BlockSize, BlockType, Category, EventDraft, EventKind, MapPosition, format_instant,
};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tower::ServiceExt;

fn origin() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 31, 18, 0, 0).unwrap()
}

fn draft(title: &str, at: DateTime<Utc>) -> EventDraft {
    EventDraft {
        title: title.to_owned(),
        description: String::new(),
        scheduled_time: format_instant(at),
        duration: 30,
        location: String::from("Main Tent"),
        participants: 20,
        ticket_cost: String::from("Free"),
        category: Category::Contest,
        kind: EventKind::Scheduled,
        map_position: None,
    }
}

fn make_test_state() -> Arc<AppState> {
    let mut store = EventStore::new();
    store
        .create(draft("Pie Eating", origin() + TimeDelta::minutes(90)))
        .unwrap();
    store
        .create(draft("Ring Toss", origin() + TimeDelta::minutes(20)))
        .unwrap();
    store
        .create(EventDraft {
            scheduled_time: String::new(),
            kind: EventKind::Constant,
            ..draft("Petting Zoo", origin())
        })
        .unwrap();
    store.add_block(BlockDraft {
        block_type: BlockType::Stage,
        label: String::from("Main Stage"),
        position: MapPosition { x: 10.0, y: 10.0 },
        size: BlockSize {
            width: 20.0,
            height: 10.0,
        },
    });

    let venue = Arc::new(RwLock::new(Venue::new(store)));
    Arc::new(AppState::new(venue).with_clock(VenueClock::anchored(origin())))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn first_event_id(state: &Arc<AppState>, title: &str) -> String {
    let venue = state.venue.read().await;
    venue
        .store
        .list()
        .iter()
        .find(|e| e.title == title)
        .unwrap()
        .id
        .to_string()
}

// ---------------------------------------------------------------------------
// Read endpoints
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn index_returns_html() {
    let app = build_router(make_test_state());
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Carnival Display"));
    assert!(html.contains("/api/display"));
    assert!(html.contains("IDLE"));
}

#[tokio::test(start_paused = true)]
async fn display_snapshot_partitions_events() {
    let app = build_router(make_test_state());
    let response = app
        .oneshot(Request::get("/api/display").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["tick"], 0);
    assert_eq!(json["upcoming"].as_array().unwrap().len(), 2);
    assert_eq!(json["constant"].as_array().unwrap().len(), 1);
    assert_eq!(json["active"].as_array().unwrap().len(), 0);
    assert_eq!(json["map_blocks"].as_array().unwrap().len(), 1);
    assert!(json["countdown"].is_null());
    assert!(json["takeover"].is_null());
    // Soonest scheduled first.
    assert_eq!(json["upcoming"][0]["event"]["title"], "Ring Toss");
    assert_eq!(json["upcoming"][0]["time_label"], "in 20m");
}

#[tokio::test(start_paused = true)]
async fn events_are_time_sorted_with_labels() {
    let app = build_router(make_test_state());
    let response = app
        .oneshot(Request::get("/api/events").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 3);
    let events = json["events"].as_array().unwrap();
    assert_eq!(events[0]["event"]["title"], "Ring Toss");
    assert_eq!(events[1]["event"]["title"], "Pie Eating");
    assert_eq!(events[1]["time_label"], "in 1h 30m");
    // Constant events have no start and sort last.
    assert_eq!(events[2]["event"]["title"], "Petting Zoo");
    assert_eq!(events[2]["time_label"], "ALWAYS AVAILABLE");
}

#[tokio::test(start_paused = true)]
async fn get_event_by_id() {
    let state = make_test_state();
    let id = first_event_id(&state, "Pie Eating").await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::get(format!("/api/events/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["event"]["id"], id.as_str());
    assert_eq!(json["event"]["status"], "upcoming");
    // First event in store order takes the first grid slot.
    assert_eq!(json["position"]["x"], 20.0);
    assert_eq!(json["position"]["y"], 20.0);
}

#[tokio::test(start_paused = true)]
async fn unknown_event_returns_404() {
    let app = build_router(make_test_state());
    let response = app
        .oneshot(
            Request::get("/api/events/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 404);
}

#[tokio::test(start_paused = true)]
async fn unknown_route_returns_404() {
    let app = build_router(make_test_state());
    let response = app
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Event administration
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn create_event_assigns_local_id_without_backend() {
    let state = make_test_state();
    let app = build_router(Arc::clone(&state));
    let body = json!({
        "title": "Costume Parade",
        "scheduledTime": "2025-10-31T19:00:00.000Z",
        "duration": 45,
        "category": "performance",
    });

    let response = app
        .oneshot(json_request("POST", "/api/events", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "upcoming");
    assert_eq!(json["ticketCost"], "Free");
    assert!(!json["id"].as_str().unwrap().is_empty());
    assert_eq!(state.venue.read().await.store.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn create_event_rejects_zero_duration() {
    let state = make_test_state();
    let app = build_router(Arc::clone(&state));
    let body = json!({
        "title": "Blink",
        "scheduledTime": "2025-10-31T19:00:00.000Z",
        "duration": 0,
        "category": "game",
    });

    let response = app
        .oneshot(json_request("POST", "/api/events", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.venue.read().await.store.len(), 3);
}

#[tokio::test]
async fn create_event_falls_back_when_backend_unreachable() {
    let venue = Arc::new(RwLock::new(Venue::default()));
    let remote = RemoteBackend::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
    let state = Arc::new(AppState::new(venue).with_remote(remote));
    let app = build_router(Arc::clone(&state));
    let body = json!({
        "title": "Hayride",
        "scheduledTime": "2025-10-31T19:00:00.000Z",
        "duration": 20,
        "category": "activity",
    });

    let response = app
        .oneshot(json_request("POST", "/api/events", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(state.venue.read().await.store.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn update_event_applies_patch() {
    let state = make_test_state();
    let id = first_event_id(&state, "Ring Toss").await;
    let app = build_router(Arc::clone(&state));

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/api/events/{id}"),
            &json!({ "title": "Ring Toss Finals", "duration": 40 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["title"], "Ring Toss Finals");
    assert_eq!(json["duration"], 40);
    assert_eq!(json["location"], "Main Tent");
}

#[tokio::test(start_paused = true)]
async fn update_unknown_event_returns_404() {
    let app = build_router(make_test_state());
    let response = app
        .oneshot(json_request(
            "PATCH",
            "/api/events/missing",
            &json!({ "title": "x" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn delete_event_removes_it() {
    let state = make_test_state();
    let id = first_event_id(&state, "Pie Eating").await;
    let app = build_router(Arc::clone(&state));

    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/api/events/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.venue.read().await.store.len(), 2);

    let again = app
        .oneshot(
            Request::delete(format!("/api/events/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn nudge_shifts_start_time() {
    let state = make_test_state();
    let id = first_event_id(&state, "Ring Toss").await;
    let app = build_router(Arc::clone(&state));

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/events/{id}/nudge"),
            &json!({ "minutes": -15 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(
        json["scheduledTime"],
        format_instant(origin() + TimeDelta::minutes(5))
    );
}

#[tokio::test(start_paused = true)]
async fn nudge_constant_event_is_rejected() {
    let state = make_test_state();
    let id = first_event_id(&state, "Petting Zoo").await;
    let app = build_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/events/{id}/nudge"),
            &json!({ "minutes": 10 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn reposition_clamps_to_map() {
    let state = make_test_state();
    let id = first_event_id(&state, "Ring Toss").await;
    let app = build_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/events/{id}/position"),
            &json!({ "x": 120.0, "y": 1.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["mapPosition"]["x"], 95.0);
    assert_eq!(json["mapPosition"]["y"], 5.0);
}

#[tokio::test(start_paused = true)]
async fn reset_positions_restores_grid() {
    let state = make_test_state();
    let id = first_event_id(&state, "Ring Toss").await;
    let app = build_router(Arc::clone(&state));

    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/events/{id}/position"),
            &json!({ "x": 70.0, "y": 70.0 }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::post("/api/events/reset-positions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 3);

    let venue = state.venue.read().await;
    // Second event in store order, second grid column.
    let position = venue.store.list()[1].map_position.unwrap();
    assert!((position.x - 50.0).abs() < f64::EPSILON);
    assert!((position.y - 20.0).abs() < f64::EPSILON);
}

// ---------------------------------------------------------------------------
// Map blocks
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn block_lifecycle() {
    let state = make_test_state();
    let app = build_router(Arc::clone(&state));

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/map-blocks",
            &json!({
                "type": "booth",
                "label": "Cider",
                "position": { "x": 40.0, "y": 60.0 },
                "size": { "width": 10.0, "height": 8.0 },
            }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let block = body_to_json(created.into_body()).await;
    let id = block["id"].as_str().unwrap().to_owned();

    let resized = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/map-blocks/{id}/resize"),
            &json!({ "deltaWidth": 100.0, "deltaHeight": -2.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(resized.status(), StatusCode::OK);
    let json = body_to_json(resized.into_body()).await;
    assert_eq!(json["size"]["width"], 90.0);
    assert_eq!(json["size"]["height"], 6.0);

    let renamed = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/map-blocks/{id}"),
            &json!({ "label": "Hot Cider" }),
        ))
        .await
        .unwrap();
    assert_eq!(renamed.status(), StatusCode::OK);
    let json = body_to_json(renamed.into_body()).await;
    assert_eq!(json["label"], "Hot Cider");

    let listed = app
        .clone()
        .oneshot(Request::get("/api/map-blocks").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(listed.into_body()).await;
    assert_eq!(json["count"], 2);

    let deleted = app
        .oneshot(
            Request::delete(format!("/api/map-blocks/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(state.venue.read().await.store.list_blocks().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn resize_unknown_block_returns_404() {
    let app = build_router(make_test_state());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/map-blocks/block-missing/resize",
            &json!({ "deltaWidth": 1.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Broadcast
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn admin_edit_publishes_snapshot() {
    let state = make_test_state();
    let mut rx = state.subscribe();
    let id = first_event_id(&state, "Ring Toss").await;
    let app = build_router(Arc::clone(&state));

    app.oneshot(json_request(
        "PATCH",
        &format!("/api/events/{id}"),
        &json!({ "title": "Ring Toss Deluxe" }),
    ))
    .await
    .unwrap();

    let snapshot = rx.recv().await.unwrap();
    assert_eq!(snapshot.upcoming[0].event.title, "Ring Toss Deluxe");
}

#[tokio::test]
async fn broadcast_without_subscribers_is_not_an_error() {
    let state = make_test_state();
    let snapshot = state.current_snapshot().await;
    assert_eq!(state.broadcast(&snapshot), 0);

    let mut rx = state.subscribe();
    assert_eq!(state.broadcast(&snapshot), 1);
    let received = rx.recv().await.unwrap();
    assert_eq!(received.tick, 0);
}
