//! Shared type definitions for the carnival display engine.
//!
//! This crate is the single source of truth for all types used across the
//! workspace. Types defined here flow downstream to `TypeScript` via `ts-rs`
//! for the public display and the admin screens.
//!
//! # Modules
//!
//! - [`ids`] -- Opaque identifier wrappers for events and map blocks
//! - [`enums`] -- Category, event kind, lifecycle status, block type
//! - [`structs`] -- Events, map blocks, mutation payloads, store document
//! - [`display`] -- Render-ready snapshot pushed to the display
//! - [`timestamp`] -- `scheduledTime` parsing and the venue timezone

pub mod display;
pub mod enums;
pub mod ids;
pub mod structs;
pub mod timestamp;

// Re-export all public types at crate root for convenience.
pub use display::{CountdownView, DisplaySnapshot, EventView, TakeoverView};
pub use enums::{BlockType, Category, EventKind, EventStatus};
pub use ids::{BlockId, EventId};
pub use structs::{
    BlockDraft, BlockPatch, BlockSize, Event, EventDraft, EventPatch, MapBlock, MapPosition,
    StoreDocument,
};
pub use timestamp::{VENUE_TZ, format_instant, parse_instant};
