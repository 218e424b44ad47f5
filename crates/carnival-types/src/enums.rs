//! Enumeration types for the carnival display engine.
//!
//! Wire names are lowercase to match the persistence backend's JSON
//! documents (`"performance"`, `"constant"`, `"upcoming"`, ...).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Event classification
// ---------------------------------------------------------------------------

/// The kind of attraction an event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Category {
    /// Carnival games (ring toss, duck pond).
    Game,
    /// Stage performances and shows.
    Performance,
    /// Food stalls and tastings.
    Food,
    /// Walk-up activities such as face painting.
    Activity,
    /// Judged contests.
    Contest,
}

/// Whether an event follows a schedule or runs all day.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum EventKind {
    /// Starts at `scheduledTime` and runs for `duration` minutes.
    #[default]
    Scheduled,
    /// Always available. Never changes status and is never evaluated by
    /// the lifecycle scheduler.
    Constant,
}

/// Lifecycle status of a scheduled event.
///
/// Variants are declared in lifecycle order so that the derived [`Ord`]
/// matches the only legal direction of travel.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum EventStatus {
    /// Not yet started.
    #[default]
    Upcoming,
    /// Started and still inside its duration.
    Active,
    /// Duration has elapsed.
    Completed,
}

impl EventStatus {
    /// Return `true` if moving from `self` to `next` is a single forward
    /// step (upcoming to active, or active to completed).
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Upcoming, Self::Active) | (Self::Active, Self::Completed)
        )
    }
}

// ---------------------------------------------------------------------------
// Map geometry
// ---------------------------------------------------------------------------

/// A kind of static structure drawn on the venue map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum BlockType {
    /// Perimeter or dividing wall.
    Wall,
    /// Vendor or game booth.
    Booth,
    /// Performance stage.
    Stage,
    /// Entry gate.
    Entrance,
}
