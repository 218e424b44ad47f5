//! Core entity structs: events, map blocks, and their mutation payloads.
//!
//! Field names serialize in camelCase so that documents exchanged with the
//! persistence backend and the TypeScript display need no translation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::enums::{BlockType, Category, EventKind, EventStatus};
use crate::ids::{BlockId, EventId};
use crate::timestamp;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point on the venue map, in percent of the map's width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MapPosition {
    /// Horizontal offset from the left edge (0-100).
    pub x: f64,
    /// Vertical offset from the top edge (0-100).
    pub y: f64,
}

/// Extent of a map block, in percent of the map's width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BlockSize {
    /// Block width.
    pub width: f64,
    /// Block height.
    pub height: f64,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A carnival event shown on the schedule board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Immutable identifier.
    pub id: EventId,
    /// Headline shown on the display.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// ISO-8601 start instant as exchanged with the backend. May be empty
    /// (constant events) or malformed; see [`Event::scheduled_at`].
    #[serde(default)]
    pub scheduled_time: String,
    /// Length of the event in minutes.
    pub duration: u32,
    /// Free-text venue location ("Main Tent A").
    pub location: String,
    /// Expected attendance or capacity.
    pub participants: u32,
    /// Ticket price label. Not necessarily numeric ("Free").
    pub ticket_cost: String,
    /// Attraction category.
    pub category: Category,
    /// Lifecycle status. Frozen for constant events.
    #[serde(default)]
    pub status: EventStatus,
    /// Scheduled or constant.
    #[serde(default, rename = "eventType", deserialize_with = "null_as_default")]
    pub kind: EventKind,
    /// Explicit map placement. When absent the grid placement applies.
    #[serde(default)]
    pub map_position: Option<MapPosition>,
}

impl Event {
    /// Parse the scheduled start instant.
    ///
    /// Returns `None` for empty or unparseable values; such events are
    /// treated as having undefined timing.
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        timestamp::parse_instant(&self.scheduled_time)
    }

    /// Return `true` if this is an always-available event.
    pub fn is_constant(&self) -> bool {
        self.kind == EventKind::Constant
    }

    /// Return `true` if the event belongs to the displayable set: every
    /// constant event plus scheduled events that are upcoming or active.
    pub fn is_displayable(&self) -> bool {
        self.is_constant() || matches!(self.status, EventStatus::Upcoming | EventStatus::Active)
    }
}

/// Fields supplied by an administrator when creating an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EventDraft {
    /// Headline.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// ISO-8601 start instant (empty for constant events).
    #[serde(default)]
    pub scheduled_time: String,
    /// Length in minutes.
    pub duration: u32,
    /// Venue location.
    #[serde(default)]
    pub location: String,
    /// Expected attendance.
    #[serde(default)]
    pub participants: u32,
    /// Ticket price label.
    #[serde(default = "default_ticket_cost")]
    pub ticket_cost: String,
    /// Attraction category.
    pub category: Category,
    /// Scheduled or constant.
    #[serde(default, rename = "eventType", deserialize_with = "null_as_default")]
    pub kind: EventKind,
    /// Optional explicit map placement.
    #[serde(default)]
    pub map_position: Option<MapPosition>,
}

/// Partial update of an event. `None` fields are left untouched.
///
/// There is deliberately no `status` field: lifecycle status is written
/// only by the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EventPatch {
    /// New headline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New start instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    /// New length in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// New location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// New attendance figure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<u32>,
    /// New ticket label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_cost: Option<String>,
    /// New category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// New event kind.
    #[serde(default, rename = "eventType", skip_serializing_if = "Option::is_none")]
    pub kind: Option<EventKind>,
    /// New map placement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_position: Option<MapPosition>,
}

impl EventPatch {
    /// A patch that only moves the scheduled start.
    pub fn scheduled_time(value: impl Into<String>) -> Self {
        Self {
            scheduled_time: Some(value.into()),
            ..Self::default()
        }
    }

    /// A patch that only moves the event on the map.
    pub fn map_position(position: MapPosition) -> Self {
        Self {
            map_position: Some(position),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Map blocks
// ---------------------------------------------------------------------------

/// A static structure drawn on the venue map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MapBlock {
    /// Immutable identifier.
    pub id: BlockId,
    /// Structure kind.
    #[serde(rename = "type")]
    pub block_type: BlockType,
    /// Caption drawn on the block.
    pub label: String,
    /// Top-left corner.
    pub position: MapPosition,
    /// Extent.
    pub size: BlockSize,
}

/// Fields supplied when adding a map block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BlockDraft {
    /// Structure kind.
    #[serde(rename = "type")]
    pub block_type: BlockType,
    /// Caption.
    pub label: String,
    /// Top-left corner.
    pub position: MapPosition,
    /// Extent.
    pub size: BlockSize,
}

/// Partial update of a map block. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BlockPatch {
    /// New structure kind.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub block_type: Option<BlockType>,
    /// New caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// New top-left corner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<MapPosition>,
    /// New extent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<BlockSize>,
}

// ---------------------------------------------------------------------------
// Whole-store document
// ---------------------------------------------------------------------------

/// The complete store as served by the backend's `GET /store`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StoreDocument {
    /// Events in insertion order.
    #[serde(default)]
    pub events: Vec<Event>,
    /// Map blocks in insertion order.
    #[serde(default)]
    pub map_blocks: Vec<MapBlock>,
}

fn default_ticket_cost() -> String {
    "Free".to_owned()
}

/// Accept an explicit JSON `null` where the backend allows an optional
/// field, mapping it to the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
