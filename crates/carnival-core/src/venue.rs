//! The shared venue record and display snapshot assembly.
//!
//! [`Venue`] bundles the store with the scheduler and rotation state. The
//! runner and the HTTP handlers share one `Arc<RwLock<Venue>>`, and every
//! tick or administrative mutation holds the write lock for its whole
//! duration.

use carnival_store::{EventStore, layout};
use carnival_types::{CountdownView, DisplaySnapshot, Event, EventId, EventStatus, EventView, TakeoverView};
use chrono::{DateTime, Utc};

use crate::featured::{self, RotationState};
use crate::scheduler::{LifecycleScheduler, SchedulerState, TickSummary};
use crate::timing;

/// Store plus timer-owned display state.
#[derive(Debug, Clone, Default)]
pub struct Venue {
    /// Events and map blocks.
    pub store: EventStore,
    /// Lock, takeover, and tick counter.
    pub scheduler: SchedulerState,
    /// Featured rotation position.
    pub rotation: RotationState,
}

impl Venue {
    /// Wrap a loaded store with fresh timer state.
    pub fn new(store: EventStore) -> Self {
        Self {
            store,
            scheduler: SchedulerState::default(),
            rotation: RotationState::default(),
        }
    }

    /// Run one lifecycle tick against `now`.
    pub fn tick(&mut self, scheduler: &LifecycleScheduler, now: DateTime<Utc>) -> TickSummary {
        let previous = std::mem::take(&mut self.scheduler);
        let outcome = scheduler.tick(previous, &mut self.store, now);
        self.scheduler = outcome.state;
        outcome.summary
    }

    /// Advance the featured rotation by one step.
    pub fn rotate(&mut self) {
        let len = featured::displayable(&self.store).len();
        self.rotation = self.rotation.advance(len, self.scheduler.lock.is_some());
    }

    /// Dismiss the takeover armed for `event_id`, if it is still showing.
    /// Returns `true` if a takeover was cleared.
    pub fn dismiss_takeover(&mut self, event_id: &EventId) -> bool {
        let before = self.scheduler.takeover.is_some();
        self.scheduler = std::mem::take(&mut self.scheduler).dismiss_takeover(event_id);
        before && self.scheduler.takeover.is_none()
    }

    /// The currently featured event.
    pub fn featured(&self) -> Option<&Event> {
        featured::select_featured(&self.store, self.scheduler.lock.as_ref(), self.rotation)
    }

    /// Decorate an event with render-ready text and its map position.
    pub fn view(&self, event: &Event, now: DateTime<Utc>) -> EventView {
        let position = self
            .store
            .position_of(&event.id)
            .unwrap_or_else(|| layout::grid_position(self.store.len()));
        EventView {
            event: event.clone(),
            time_label: timing::time_label(event, now),
            start_text: timing::start_text(event),
            position,
            starting_soon: timing::is_starting_soon(event, now),
        }
    }

    /// All events, time-sorted, as views.
    pub fn schedule(&self, now: DateTime<Utc>) -> Vec<EventView> {
        self.store
            .sorted_by_schedule()
            .into_iter()
            .map(|e| self.view(e, now))
            .collect()
    }

    /// Everything the display renders at `now`.
    pub fn snapshot(&self, now: DateTime<Utc>) -> DisplaySnapshot {
        let sorted = self.store.sorted_by_schedule();
        let scheduled_with = |status: EventStatus| -> Vec<EventView> {
            sorted
                .iter()
                .filter(|e| !e.is_constant() && e.status == status)
                .map(|e| self.view(e, now))
                .collect()
        };

        let countdown = self.scheduler.lock.as_ref().map(|lock| CountdownView {
            event_id: lock.event_id.clone(),
            seconds: lock.countdown_secs,
            text: timing::countdown_text(lock.countdown_secs),
        });

        let takeover = self.scheduler.takeover.as_ref().and_then(|t| {
            self.store.get(&t.event_id).map(|event| TakeoverView {
                event: self.view(event, now),
                armed_at: t.armed_at,
                dismiss_at: t.dismiss_at,
            })
        });

        let displayable_len = featured::displayable(&self.store).len();

        DisplaySnapshot {
            tick: self.scheduler.tick,
            generated_at: now,
            clock_text: timing::clock_text(now),
            date_text: timing::date_text(now),
            featured: self.featured().map(|e| self.view(e, now)),
            countdown,
            takeover,
            rotation_index: self.rotation.index.checked_rem(displayable_len).unwrap_or(0),
            upcoming: scheduled_with(EventStatus::Upcoming),
            active: scheduled_with(EventStatus::Active),
            constant: self
                .store
                .list()
                .iter()
                .filter(|e| e.is_constant())
                .map(|e| self.view(e, now))
                .collect(),
            map_blocks: self.store.list_blocks().to_vec(),
        }
    }
}
