//! Display callback that feeds the API state and the backend.
//!
//! After each timer fires, this callback broadcasts the fresh
//! [`DisplaySnapshot`] to all connected `WebSocket` clients. After a
//! lifecycle tick it also records the summary for the status page and
//! mirrors every status transition to the persistence backend.

use std::sync::Arc;

use carnival_core::{DisplayCallback, DisplayUpdate, TickSummary};
use carnival_observer::AppState;
use carnival_types::{DisplaySnapshot, EventStatus};
use tracing::debug;

/// Callback that bridges the display loop to the API server.
pub struct ObserverCallback {
    state: Arc<AppState>,
}

impl ObserverCallback {
    /// Create a new observer callback backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    fn mirror_statuses(&self, summary: &TickSummary) {
        let Some(remote) = &self.state.remote else {
            return;
        };
        let transitions = summary
            .activated
            .iter()
            .map(|id| (id, EventStatus::Active))
            .chain(summary.completed.iter().map(|id| (id, EventStatus::Completed)));

        for (id, status) in transitions {
            let remote = remote.clone();
            let id = id.clone();
            carnival_store::mirror("update_status", async move {
                remote.update_status(&id, status).await
            });
        }
    }
}

impl DisplayCallback for ObserverCallback {
    fn on_update(&mut self, update: DisplayUpdate<'_>, snapshot: &DisplaySnapshot) {
        let receivers = self.state.broadcast(snapshot);

        match update {
            DisplayUpdate::Tick(summary) => {
                if summary.has_transitions() {
                    debug!(tick = summary.tick, receivers, "transition broadcast sent");
                }
                self.mirror_statuses(summary);

                // Skip the write if a handler holds the lock; the next tick
                // will catch up.
                if let Ok(mut last) = self.state.last_tick.try_write() {
                    *last = Some(summary.clone());
                }
            }
            DisplayUpdate::Rotation => {
                debug!(index = snapshot.rotation_index, receivers, "rotation broadcast sent");
            }
            DisplayUpdate::TakeoverDismissed(event_id) => {
                debug!(event_id = %event_id, receivers, "takeover dismissal broadcast sent");
            }
        }
    }
}
