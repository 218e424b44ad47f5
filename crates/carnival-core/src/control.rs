//! Shutdown control for the display loop.
//!
//! A [`DisplayControl`] is wrapped in [`Arc`](std::sync::Arc) and shared
//! between the runner, the signal handler, and the HTTP status page. The
//! stop flag is atomic so the status page can read it without waiting on
//! the runner.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Notify;

/// Shared stop flag plus a wakeup for the runner's `select!`.
#[derive(Debug)]
pub struct DisplayControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wakes the runner when a stop is requested.
    stop_notify: Notify,

    /// Wall-clock time the display started.
    started_at: DateTime<Utc>,
}

impl Default for DisplayControl {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayControl {
    /// Create a control in the running state.
    pub fn new() -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            started_at: Utc::now(),
        }
    }

    /// Request a clean stop and wake the runner.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        // notify_one stores a permit, so a runner that is not yet waiting
        // still observes the stop.
        self.stop_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Resolve once a stop has been requested.
    pub async fn stopped(&self) {
        while !self.is_stop_requested() {
            self.stop_notify.notified().await;
        }
    }

    /// Wall-clock time the display started.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Seconds since start, clamped at zero.
    pub fn uptime_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }
}
