//! Display loop runner.
//!
//! This module provides [`run_display`], the top-level async function that
//! owns the three display timers:
//!
//! - **Lifecycle tick** (1 s): advances statuses and the imminent-start lock
//! - **Rotation tick** (15 s): steps the featured rotation unless locked
//! - **Takeover dismissal** (one-shot, 30 s): armed on each activation
//!
//! All three run in a single `select!` loop, so ticks never overlap and
//! every timer is dropped when the loop returns.

use std::sync::Arc;

use carnival_types::{DisplaySnapshot, EventId};
use tokio::sync::RwLock;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::clock::VenueClock;
use crate::config::DisplayConfig;
use crate::control::DisplayControl;
use crate::scheduler::{LifecycleScheduler, TickSummary};
use crate::venue::Venue;

/// What caused a snapshot to be published.
#[derive(Debug, Clone, Copy)]
pub enum DisplayUpdate<'a> {
    /// A lifecycle tick ran.
    Tick(&'a TickSummary),
    /// The featured rotation stepped (or stayed put under a lock).
    Rotation,
    /// The takeover for this event was dismissed.
    TakeoverDismissed(&'a EventId),
}

/// Callback invoked after every timer fires.
///
/// Implementations can use this to broadcast snapshots to observers or
/// mirror status changes to the persistence backend.
pub trait DisplayCallback: Send {
    /// Called with the cause of the update and the fresh snapshot.
    fn on_update(&mut self, update: DisplayUpdate<'_>, snapshot: &DisplaySnapshot);
}

/// A no-op callback for testing.
pub struct NoOpCallback;

impl DisplayCallback for NoOpCallback {
    fn on_update(&mut self, _update: DisplayUpdate<'_>, _snapshot: &DisplaySnapshot) {}
}

/// Counters for a finished display run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayRunResult {
    /// Lifecycle ticks executed.
    pub ticks: u64,
    /// Rotation ticks executed.
    pub rotations: u64,
    /// Takeovers dismissed by their timer.
    pub takeovers_dismissed: u64,
}

/// Run the display loop until a stop is requested.
///
/// # Arguments
///
/// * `venue` - Shared store and timer state
/// * `config` - Timer cadences and lock window
/// * `clock` - Wall-clock source
/// * `control` - Shared stop control
/// * `callback` - Called after every timer with the fresh snapshot
pub async fn run_display(
    venue: &Arc<RwLock<Venue>>,
    config: &DisplayConfig,
    clock: VenueClock,
    control: &Arc<DisplayControl>,
    callback: &mut dyn DisplayCallback,
) -> DisplayRunResult {
    let scheduler = LifecycleScheduler::new(config);
    let mut result = DisplayRunResult::default();

    let mut lifecycle = tokio::time::interval(config.tick_interval());
    lifecycle.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let rotation_period = config.rotation_interval();
    let first_rotation = Instant::now()
        .checked_add(rotation_period)
        .unwrap_or_else(Instant::now);
    let mut rotation = tokio::time::interval_at(first_rotation, rotation_period);
    rotation.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Pending dismissal: the event it belongs to and when it fires.
    let mut takeover: Option<(EventId, Instant)> = None;

    info!(
        tick_interval_ms = config.tick_interval_ms,
        rotation_interval_ms = config.rotation_interval_ms,
        takeover_secs = config.takeover_secs,
        "display loop starting"
    );

    loop {
        let dismiss_at = takeover.as_ref().map(|(_, at)| *at);

        tokio::select! {
            biased;

            () = control.stopped() => {
                info!("display stop requested");
                break;
            }

            _ = lifecycle.tick() => {
                let now = clock.now();
                let mut guard = venue.write().await;
                let summary = guard.tick(&scheduler, now);
                if let Some(armed) = &summary.takeover {
                    // A newer activation replaces any pending dismissal.
                    takeover = Some((armed.event_id.clone(), clock.deadline(armed.dismiss_at)));
                }
                let snapshot = guard.snapshot(now);
                drop(guard);

                result.ticks = result.ticks.saturating_add(1);
                callback.on_update(DisplayUpdate::Tick(&summary), &snapshot);
            }

            _ = rotation.tick() => {
                let now = clock.now();
                let mut guard = venue.write().await;
                guard.rotate();
                debug!(index = guard.rotation.index, "rotation tick");
                let snapshot = guard.snapshot(now);
                drop(guard);

                result.rotations = result.rotations.saturating_add(1);
                callback.on_update(DisplayUpdate::Rotation, &snapshot);
            }

            () = tokio::time::sleep_until(dismiss_at.unwrap_or_else(Instant::now)), if dismiss_at.is_some() => {
                let Some((event_id, _)) = takeover.take() else {
                    continue;
                };
                let now = clock.now();
                let mut guard = venue.write().await;
                if guard.dismiss_takeover(&event_id) {
                    info!(event_id = %event_id, "takeover dismissed");
                    result.takeovers_dismissed = result.takeovers_dismissed.saturating_add(1);
                }
                let snapshot = guard.snapshot(now);
                drop(guard);

                callback.on_update(DisplayUpdate::TakeoverDismissed(&event_id), &snapshot);
            }
        }
    }

    info!(
        ticks = result.ticks,
        rotations = result.rotations,
        takeovers_dismissed = result.takeovers_dismissed,
        "display loop stopped"
    );
    result
}
