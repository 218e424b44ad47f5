//! Read models pushed to the public display.
//!
//! A [`DisplaySnapshot`] is rebuilt after every lifecycle tick and every
//! rotation tick. It carries everything the presentation layer renders, so
//! the display never derives timing on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::EventId;
use crate::structs::{Event, MapBlock, MapPosition};

/// An event decorated with derived, render-ready text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventView {
    /// The underlying event.
    pub event: Event,
    /// Relative start text (`NOW`, `in 12m`, `in 1h 5m`, `ALWAYS AVAILABLE`).
    pub time_label: String,
    /// Start time in venue wall time (`06:30 PM`), when the event has one.
    pub start_text: Option<String>,
    /// Effective map position (explicit, or the grid placement).
    pub position: MapPosition,
    /// Starts within the next five minutes.
    pub starting_soon: bool,
}

/// The imminent-start countdown shown while an event holds the lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CountdownView {
    /// Event holding the imminent-start lock.
    pub event_id: EventId,
    /// Seconds until the event starts.
    #[ts(type = "number")]
    pub seconds: u64,
    /// `m:ss` rendering of `seconds`.
    pub text: String,
}

/// The full-screen "starting now" takeover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TakeoverView {
    /// The event that just went live.
    pub event: EventView,
    /// When the takeover was armed.
    pub armed_at: DateTime<Utc>,
    /// When the takeover is scheduled to dismiss itself.
    pub dismiss_at: DateTime<Utc>,
}

/// Everything the public display renders at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DisplaySnapshot {
    /// Number of lifecycle ticks evaluated so far.
    #[ts(type = "number")]
    pub tick: u64,
    /// Instant the snapshot was computed for.
    pub generated_at: DateTime<Utc>,
    /// Venue wall clock (`06:30:05 PM`).
    pub clock_text: String,
    /// Venue calendar date (`Friday, October 31`).
    pub date_text: String,
    /// The single highlighted event, if any.
    pub featured: Option<EventView>,
    /// Present while an event holds the imminent-start lock.
    pub countdown: Option<CountdownView>,
    /// Present while a takeover is showing.
    pub takeover: Option<TakeoverView>,
    /// Current rotation index into the displayable set.
    pub rotation_index: usize,
    /// Upcoming scheduled events, time-sorted.
    pub upcoming: Vec<EventView>,
    /// Active scheduled events, time-sorted.
    pub active: Vec<EventView>,
    /// Constant events, in store order.
    pub constant: Vec<EventView>,
    /// Static map geometry.
    pub map_blocks: Vec<MapBlock>,
}
