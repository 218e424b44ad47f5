//! The lifecycle scheduler.
//!
//! Each tick evaluates every scheduled event against `now`, advances its
//! status, and manages the exclusive imminent-start lock. Timer state lives
//! in an owned [`SchedulerState`]; [`LifecycleScheduler::tick`] takes the
//! previous state and returns the next one. The only store mutation is
//! [`EventStore::set_status`].
//!
//! # Per-event rules
//!
//! Let `m` be the floored minutes until start and `s` the floored seconds.
//!
//! | Status   | Condition                          | Action                      |
//! |----------|------------------------------------|-----------------------------|
//! | upcoming | `0 <= m < window`, no lock held    | take the lock, countdown `s` |
//! | upcoming | holds the lock, `s > 0`            | refresh the countdown       |
//! | upcoming | `m <= 0`                           | activate, release lock, arm takeover |
//! | active   | more than `duration` minutes past  | complete                    |
//!
//! Constant events are never evaluated. Events whose start does not parse
//! never lock and never activate.

use carnival_store::EventStore;
use carnival_types::{EventId, EventStatus};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::DisplayConfig;
use crate::timing;

/// The imminent-start lock. At most one event holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lock {
    /// The locked event.
    pub event_id: EventId,
    /// Seconds until the locked event starts, as of the last tick.
    pub countdown_secs: u64,
}

/// A pending full-screen "starting now" takeover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Takeover {
    /// The event that went live.
    pub event_id: EventId,
    /// When the activation happened.
    pub armed_at: DateTime<Utc>,
    /// When the takeover dismisses itself.
    pub dismiss_at: DateTime<Utc>,
}

/// Timer-owned scheduler state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerState {
    /// Number of ticks evaluated.
    pub tick: u64,
    /// Current lock holder, if any.
    pub lock: Option<Lock>,
    /// Current takeover, if any.
    pub takeover: Option<Takeover>,
}

impl SchedulerState {
    /// Clear the takeover if it still belongs to `event_id`.
    ///
    /// A dismissal armed for an earlier activation never clears a newer
    /// takeover.
    #[must_use]
    pub fn dismiss_takeover(mut self, event_id: &EventId) -> Self {
        if self
            .takeover
            .as_ref()
            .is_some_and(|t| &t.event_id == event_id)
        {
            self.takeover = None;
        }
        self
    }

    /// Return `true` if `event_id` holds the lock.
    pub fn is_locked_by(&self, event_id: &EventId) -> bool {
        self.lock.as_ref().is_some_and(|l| &l.event_id == event_id)
    }
}

/// What a single tick changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Event that took the lock this tick.
    pub lock_acquired: Option<EventId>,
    /// Event that gave up the lock this tick.
    pub lock_released: Option<EventId>,
    /// Events moved to `active`.
    pub activated: Vec<EventId>,
    /// Events moved to `completed`.
    pub completed: Vec<EventId>,
    /// Scheduled events skipped because their start time does not parse.
    pub malformed: Vec<EventId>,
    /// Takeover armed this tick.
    pub takeover: Option<Takeover>,
}

impl TickSummary {
    /// Return `true` if any event changed status.
    pub fn has_transitions(&self) -> bool {
        !self.activated.is_empty() || !self.completed.is_empty()
    }
}

/// Result of one tick: the next state plus what changed.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    /// State to feed into the next tick.
    pub state: SchedulerState,
    /// Changes made during this tick.
    pub summary: TickSummary,
}

/// Evaluates lifecycle rules once per tick.
#[derive(Debug, Clone)]
pub struct LifecycleScheduler {
    lock_window_minutes: i64,
    takeover: TimeDelta,
}

impl Default for LifecycleScheduler {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}

/// An event's fields as they stood when the tick began.
struct Candidate {
    id: EventId,
    status: EventStatus,
    start: Option<DateTime<Utc>>,
    duration: u32,
}

impl LifecycleScheduler {
    /// Create a scheduler with the configured lock window and takeover time.
    pub fn new(config: &DisplayConfig) -> Self {
        let takeover_secs = i64::try_from(config.takeover_secs).unwrap_or(i64::MAX);
        Self {
            lock_window_minutes: config.lock_window_minutes,
            takeover: TimeDelta::try_seconds(takeover_secs).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Run one lifecycle tick.
    ///
    /// Events are visited in store order, so when two events enter the
    /// lock window on the same tick the earlier one wins. Each event makes
    /// at most one status transition per tick, judged on the status it had
    /// when the tick began.
    pub fn tick(
        &self,
        state: SchedulerState,
        store: &mut EventStore,
        now: DateTime<Utc>,
    ) -> TickOutcome {
        let mut next = state;
        next.tick = next.tick.saturating_add(1);
        let mut summary = TickSummary {
            tick: next.tick,
            ..TickSummary::default()
        };

        release_stale_lock(&mut next, store, &mut summary);

        let candidates: Vec<Candidate> = store
            .list()
            .iter()
            .filter(|e| !e.is_constant())
            .map(|e| Candidate {
                id: e.id.clone(),
                status: e.status,
                start: e.scheduled_at(),
                duration: e.duration,
            })
            .collect();

        for candidate in candidates {
            let Some(start) = candidate.start else {
                if candidate.status != EventStatus::Completed {
                    summary.malformed.push(candidate.id);
                }
                continue;
            };

            match candidate.status {
                EventStatus::Upcoming => {
                    self.evaluate_upcoming(&mut next, store, &candidate.id, start, now, &mut summary);
                }
                EventStatus::Active => {
                    if timing::is_past_duration(start, candidate.duration, now)
                        && store
                            .set_status(&candidate.id, EventStatus::Completed)
                            .is_applied()
                    {
                        info!(tick = next.tick, event_id = %candidate.id, "event completed");
                        summary.completed.push(candidate.id);
                    }
                }
                EventStatus::Completed => {}
            }
        }

        if summary.has_transitions() || summary.lock_acquired.is_some() {
            debug!(
                tick = summary.tick,
                activated = summary.activated.len(),
                completed = summary.completed.len(),
                locked = next.lock.as_ref().map(|l| l.event_id.to_string()),
                "lifecycle tick"
            );
        }

        TickOutcome {
            state: next,
            summary,
        }
    }

    fn evaluate_upcoming(
        &self,
        state: &mut SchedulerState,
        store: &mut EventStore,
        id: &EventId,
        start: DateTime<Utc>,
        now: DateTime<Utc>,
        summary: &mut TickSummary,
    ) {
        let minutes = timing::minutes_until(start, now);
        let seconds = timing::seconds_until(start, now);
        let countdown = u64::try_from(seconds).unwrap_or(0);

        if state.lock.is_none() && (0..self.lock_window_minutes).contains(&minutes) {
            info!(tick = state.tick, event_id = %id, countdown_secs = countdown, "imminent-start lock acquired");
            state.lock = Some(Lock {
                event_id: id.clone(),
                countdown_secs: countdown,
            });
            summary.lock_acquired = Some(id.clone());
        } else if seconds > 0 {
            if let Some(lock) = state.lock.as_mut().filter(|l| &l.event_id == id) {
                lock.countdown_secs = countdown;
            }
        }

        if minutes > 0 || !store.set_status(id, EventStatus::Active).is_applied() {
            return;
        }

        if state.is_locked_by(id) {
            state.lock = None;
            summary.lock_released = Some(id.clone());
        }
        let takeover = Takeover {
            event_id: id.clone(),
            armed_at: now,
            dismiss_at: now.checked_add_signed(self.takeover).unwrap_or(now),
        };
        info!(tick = state.tick, event_id = %id, dismiss_at = %takeover.dismiss_at, "event activated");
        state.takeover = Some(takeover.clone());
        summary.takeover = Some(takeover);
        summary.activated.push(id.clone());
    }
}

/// Drop the lock if its holder was deleted, started, or lost its start time
/// since the last tick.
fn release_stale_lock(state: &mut SchedulerState, store: &EventStore, summary: &mut TickSummary) {
    let Some(lock) = state.lock.as_ref() else {
        return;
    };
    let still_valid = store.get(&lock.event_id).is_some_and(|e| {
        !e.is_constant() && e.status == EventStatus::Upcoming && e.scheduled_at().is_some()
    });
    if !still_valid {
        debug!(event_id = %lock.event_id, "releasing stale lock");
        summary.lock_released = Some(lock.event_id.clone());
        state.lock = None;
    }
}
