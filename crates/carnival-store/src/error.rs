//! Error types for the `carnival-store` crate.
//!
//! All fallible store operations return [`StoreError`]. A status write
//! against a missing event is not an error; see
//! [`StatusChange::Missing`](crate::store::StatusChange::Missing).

use carnival_types::{BlockId, EventId};

/// Errors that can occur during store mutations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No event with this id exists.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// No map block with this id exists.
    #[error("map block not found: {0}")]
    BlockNotFound(BlockId),

    /// The event's scheduled time cannot be parsed, so it cannot be shifted.
    #[error("event {id} has an unparseable scheduled time {value:?}")]
    InvalidTimestamp {
        /// The event being adjusted.
        id: EventId,
        /// The raw wire value.
        value: String,
    },

    /// Shifting the scheduled time left the representable range.
    #[error("scheduled time adjustment out of range for event {0}")]
    TimeOutOfRange(EventId),

    /// Durations are whole minutes and must be positive.
    #[error("duration must be at least one minute, got {0}")]
    InvalidDuration(u32),
}

/// Errors from the persistence backend's HTTP API.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The request could not be sent or the connection failed.
    #[error("backend request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("backend response parse failed: {0}")]
    Decode(String),
}
