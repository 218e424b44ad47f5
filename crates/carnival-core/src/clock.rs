//! Wall-clock source for the display loop.
//!
//! Production reads the system clock. Tests anchor a wall-clock instant to
//! the tokio clock so that `tokio::time::pause` and `advance` move "now"
//! forward deterministically.

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;

/// Where the runner reads `now` from.
#[derive(Debug, Clone, Copy)]
pub enum VenueClock {
    /// `Utc::now()`.
    System,
    /// A fixed wall-clock origin advanced by tokio's monotonic clock.
    Anchored {
        /// Wall-clock time at `started`.
        origin: DateTime<Utc>,
        /// Tokio instant matching `origin`.
        started: Instant,
    },
}

impl VenueClock {
    /// Anchor `origin` to the current tokio instant.
    pub fn anchored(origin: DateTime<Utc>) -> Self {
        Self::Anchored {
            origin,
            started: Instant::now(),
        }
    }

    /// The current wall-clock time.
    pub fn now(&self) -> DateTime<Utc> {
        match *self {
            Self::System => Utc::now(),
            Self::Anchored { origin, started } => {
                let elapsed = TimeDelta::from_std(started.elapsed()).unwrap_or(TimeDelta::MAX);
                origin.checked_add_signed(elapsed).unwrap_or(origin)
            }
        }
    }

    /// Tokio deadline corresponding to the wall-clock instant `at`.
    ///
    /// Instants in the past map to now.
    pub fn deadline(&self, at: DateTime<Utc>) -> Instant {
        let remaining = at
            .signed_duration_since(self.now())
            .to_std()
            .unwrap_or_default();
        Instant::now()
            .checked_add(remaining)
            .unwrap_or_else(Instant::now)
    }
}
