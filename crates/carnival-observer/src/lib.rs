//! HTTP and `WebSocket` API for the carnival display.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/display`) streaming a full
//!   [`DisplaySnapshot`](carnival_types::DisplaySnapshot) after every
//!   timer and every admin edit, via [`tokio::sync::broadcast`]
//! - **Read endpoints** for the display snapshot, events, and map blocks
//! - **Admin endpoints** that edit events and map blocks and mirror the
//!   edits to the persistence backend
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Handlers share the [`Venue`](carnival_core::Venue) with the display
//! loop through an `Arc<RwLock<_>>`. Admin edits take the write lock
//! briefly and never await the backend while holding it.

pub mod admin;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::{StartupError, spawn_observer};
pub use state::AppState;
