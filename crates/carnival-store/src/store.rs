//! In-memory event and map-block store.
//!
//! The [`EventStore`] is the object of truth for the display process. The
//! scheduler reads it every tick and writes lifecycle status through
//! [`EventStore::set_status`]; administrators change every other field.
//! Every mutation completes synchronously, so callers holding the store
//! never observe a partial write.

use carnival_types::{
    BlockDraft, BlockId, BlockPatch, BlockSize, Event, EventDraft, EventId, EventPatch,
    EventStatus, MapBlock, MapPosition, StoreDocument, format_instant,
};
use chrono::TimeDelta;
use tracing::warn;

use crate::error::StoreError;
use crate::layout;
use crate::ordering;

/// Outcome of a lifecycle status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The status moved forward.
    Applied {
        /// Status before the write.
        from: EventStatus,
        /// Status after the write.
        to: EventStatus,
    },
    /// The event was deleted before the write landed. Nothing changed.
    Missing,
    /// The write would regress the status or touch a constant event.
    Rejected {
        /// Status the event still holds.
        current: EventStatus,
        /// Status that was refused.
        requested: EventStatus,
    },
}

impl StatusChange {
    /// Return `true` if the store was modified.
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// The canonical list of events and map blocks.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
    blocks: Vec<MapBlock>,
}

impl EventStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Build a store from a whole-store document.
    ///
    /// Loaded values are normalised the same way as [`EventStore::insert`]
    /// and [`EventStore::insert_block`]; see [`EventStore::replace_all`].
    pub fn from_document(document: StoreDocument) -> Self {
        let mut store = Self::new();
        store.replace_all(document);
        store
    }

    /// Copy the store into a whole-store document.
    pub fn snapshot(&self) -> StoreDocument {
        StoreDocument {
            events: self.events.clone(),
            map_blocks: self.blocks.clone(),
        }
    }

    /// Replace every event and block with the contents of `document`.
    ///
    /// Positions and sizes are clamped to the map. A zero-minute duration
    /// is raised to one minute and logged.
    pub fn replace_all(&mut self, document: StoreDocument) {
        self.events = document.events.into_iter().map(normalize_event).collect();
        self.blocks = document.map_blocks.into_iter().map(normalize_block).collect();
    }

    // -----------------------------------------------------------------------
    // Event reads
    // -----------------------------------------------------------------------

    /// All events in insertion order.
    pub fn list(&self) -> &[Event] {
        &self.events
    }

    /// Look up an event by id.
    pub fn get(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|e| &e.id == id)
    }

    /// Return the number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if there are no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events sorted by scheduled instant, undated events last.
    pub fn sorted_by_schedule(&self) -> Vec<&Event> {
        ordering::by_schedule(&self.events)
    }

    /// Effective map position of the event at `index` in store order.
    pub fn event_position(&self, index: usize) -> Option<MapPosition> {
        self.events
            .get(index)
            .map(|event| layout::effective_position(event, index))
    }

    /// Effective map position of the event with `id`.
    pub fn position_of(&self, id: &EventId) -> Option<MapPosition> {
        self.events
            .iter()
            .enumerate()
            .find(|(_, e)| &e.id == id)
            .map(|(index, event)| layout::effective_position(event, index))
    }

    // -----------------------------------------------------------------------
    // Event mutations
    // -----------------------------------------------------------------------

    /// Create a new event in `upcoming` status with a generated id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDuration`] for a zero-minute duration.
    pub fn create(&mut self, draft: EventDraft) -> Result<Event, StoreError> {
        let event = Event {
            id: EventId::generate(),
            title: draft.title,
            description: draft.description,
            scheduled_time: draft.scheduled_time,
            duration: draft.duration,
            location: draft.location,
            participants: draft.participants,
            ticket_cost: draft.ticket_cost,
            category: draft.category,
            status: EventStatus::Upcoming,
            kind: draft.kind,
            map_position: draft.map_position,
        };
        self.insert(event)
    }

    /// Check a draft without storing it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDuration`] for a zero-minute duration.
    pub fn validate_draft(draft: &EventDraft) -> Result<(), StoreError> {
        validate_duration(draft.duration)
    }

    /// Append an event created elsewhere, keeping its id and status.
    ///
    /// Used when the persistence backend assigns the id. An event whose id
    /// is already present replaces the stored copy in place.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDuration`] for a zero-minute duration.
    pub fn insert(&mut self, mut event: Event) -> Result<Event, StoreError> {
        validate_duration(event.duration)?;
        event.map_position = event.map_position.map(layout::clamp_position);

        if let Some(slot) = self.events.iter_mut().find(|e| e.id == event.id) {
            slot.clone_from(&event);
        } else {
            self.events.push(event.clone());
        }
        Ok(event)
    }

    /// Apply a partial update. Status and id are never touched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EventNotFound`] if no event has this id, or
    /// [`StoreError::InvalidDuration`] for a zero-minute duration.
    pub fn update(&mut self, id: &EventId, patch: &EventPatch) -> Result<Event, StoreError> {
        if let Some(duration) = patch.duration {
            validate_duration(duration)?;
        }
        let event = self.event_mut(id)?;

        if let Some(title) = &patch.title {
            event.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            event.description.clone_from(description);
        }
        if let Some(scheduled_time) = &patch.scheduled_time {
            event.scheduled_time.clone_from(scheduled_time);
        }
        if let Some(duration) = patch.duration {
            event.duration = duration;
        }
        if let Some(location) = &patch.location {
            event.location.clone_from(location);
        }
        if let Some(participants) = patch.participants {
            event.participants = participants;
        }
        if let Some(ticket_cost) = &patch.ticket_cost {
            event.ticket_cost.clone_from(ticket_cost);
        }
        if let Some(category) = patch.category {
            event.category = category;
        }
        if let Some(kind) = patch.kind {
            event.kind = kind;
        }
        if let Some(position) = patch.map_position {
            event.map_position = Some(layout::clamp_position(position));
        }

        Ok(event.clone())
    }

    /// Remove an event.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EventNotFound`] if no event has this id.
    pub fn delete(&mut self, id: &EventId) -> Result<Event, StoreError> {
        let index = self
            .events
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| StoreError::EventNotFound(id.clone()))?;
        Ok(self.events.remove(index))
    }

    /// Shift the scheduled start by a signed number of minutes.
    ///
    /// The result is written back as an RFC 3339 UTC string.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EventNotFound`] if no event has this id,
    /// [`StoreError::InvalidTimestamp`] if the current time does not parse,
    /// or [`StoreError::TimeOutOfRange`] if the shift overflows.
    pub fn nudge(&mut self, id: &EventId, minutes: i64) -> Result<Event, StoreError> {
        let event = self.event_mut(id)?;
        let at = event
            .scheduled_at()
            .ok_or_else(|| StoreError::InvalidTimestamp {
                id: id.clone(),
                value: event.scheduled_time.clone(),
            })?;
        let shifted = TimeDelta::try_minutes(minutes)
            .and_then(|delta| at.checked_add_signed(delta))
            .ok_or_else(|| StoreError::TimeOutOfRange(id.clone()))?;

        event.scheduled_time = format_instant(shifted);
        Ok(event.clone())
    }

    /// Write a lifecycle status. The only mutation the scheduler performs.
    ///
    /// Writes to a deleted event are a no-op. Status only moves forward
    /// (`upcoming` to `active` to `completed`), and constant events keep
    /// whatever status they were loaded with.
    pub fn set_status(&mut self, id: &EventId, status: EventStatus) -> StatusChange {
        let Some(event) = self.events.iter_mut().find(|e| &e.id == id) else {
            return StatusChange::Missing;
        };

        let current = event.status;
        if event.is_constant() || !current.can_advance_to(status) {
            return StatusChange::Rejected {
                current,
                requested: status,
            };
        }

        event.status = status;
        StatusChange::Applied {
            from: current,
            to: status,
        }
    }

    /// Place an event at an explicit map position, clamped to the map.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EventNotFound`] if no event has this id.
    pub fn reposition_event(
        &mut self,
        id: &EventId,
        position: MapPosition,
    ) -> Result<Event, StoreError> {
        let event = self.event_mut(id)?;
        event.map_position = Some(layout::clamp_position(position));
        Ok(event.clone())
    }

    /// Re-apply the grid placement to every event.
    pub fn reset_positions(&mut self) {
        for (index, event) in self.events.iter_mut().enumerate() {
            event.map_position = Some(layout::grid_position(index));
        }
    }

    fn event_mut(&mut self, id: &EventId) -> Result<&mut Event, StoreError> {
        self.events
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| StoreError::EventNotFound(id.clone()))
    }

    // -----------------------------------------------------------------------
    // Map blocks
    // -----------------------------------------------------------------------

    /// All map blocks in insertion order.
    pub fn list_blocks(&self) -> &[MapBlock] {
        &self.blocks
    }

    /// Look up a block by id.
    pub fn get_block(&self, id: &BlockId) -> Option<&MapBlock> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    /// Add a block with a generated id.
    pub fn add_block(&mut self, draft: BlockDraft) -> MapBlock {
        self.insert_block(MapBlock {
            id: BlockId::generate(),
            block_type: draft.block_type,
            label: draft.label,
            position: draft.position,
            size: draft.size,
        })
    }

    /// Append a block created elsewhere, keeping its id. A block whose id
    /// is already present replaces the stored copy in place.
    pub fn insert_block(&mut self, mut block: MapBlock) -> MapBlock {
        block.position = layout::clamp_position(block.position);
        block.size = layout::clamp_size(block.size);

        if let Some(slot) = self.blocks.iter_mut().find(|b| b.id == block.id) {
            slot.clone_from(&block);
        } else {
            self.blocks.push(block.clone());
        }
        block
    }

    /// Apply a partial update to a block.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BlockNotFound`] if no block has this id.
    pub fn update_block(&mut self, id: &BlockId, patch: &BlockPatch) -> Result<MapBlock, StoreError> {
        let block = self.block_mut(id)?;

        if let Some(block_type) = patch.block_type {
            block.block_type = block_type;
        }
        if let Some(label) = &patch.label {
            block.label.clone_from(label);
        }
        if let Some(position) = patch.position {
            block.position = layout::clamp_position(position);
        }
        if let Some(size) = patch.size {
            block.size = layout::clamp_size(size);
        }

        Ok(block.clone())
    }

    /// Grow or shrink a block by the given deltas, clamped to the allowed
    /// size range.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BlockNotFound`] if no block has this id.
    pub fn resize_block(
        &mut self,
        id: &BlockId,
        delta_width: f64,
        delta_height: f64,
    ) -> Result<MapBlock, StoreError> {
        let block = self.block_mut(id)?;
        block.size = layout::clamp_size(BlockSize {
            width: block.size.width + delta_width,
            height: block.size.height + delta_height,
        });
        Ok(block.clone())
    }

    /// Remove a block.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BlockNotFound`] if no block has this id.
    pub fn delete_block(&mut self, id: &BlockId) -> Result<MapBlock, StoreError> {
        let index = self
            .blocks
            .iter()
            .position(|b| &b.id == id)
            .ok_or_else(|| StoreError::BlockNotFound(id.clone()))?;
        Ok(self.blocks.remove(index))
    }

    fn block_mut(&mut self, id: &BlockId) -> Result<&mut MapBlock, StoreError> {
        self.blocks
            .iter_mut()
            .find(|b| &b.id == id)
            .ok_or_else(|| StoreError::BlockNotFound(id.clone()))
    }
}

fn normalize_event(mut event: Event) -> Event {
    if event.duration == 0 {
        warn!(event_id = %event.id, "loaded event has zero duration, using one minute");
        event.duration = 1;
    }
    event.map_position = event.map_position.map(layout::clamp_position);
    event
}

fn normalize_block(mut block: MapBlock) -> MapBlock {
    block.position = layout::clamp_position(block.position);
    block.size = layout::clamp_size(block.size);
    block
}

fn validate_duration(duration: u32) -> Result<(), StoreError> {
    if duration == 0 {
        Err(StoreError::InvalidDuration(duration))
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use carnival_types::{BlockType, Category, EventKind};

    fn draft(title: &str, scheduled_time: &str) -> EventDraft {
        EventDraft {
            title: title.to_owned(),
            description: String::new(),
            scheduled_time: scheduled_time.to_owned(),
            duration: 30,
            location: "Main Tent A".to_owned(),
            participants: 10,
            ticket_cost: "Free".to_owned(),
            category: Category::Performance,
            kind: EventKind::Scheduled,
            map_position: None,
        }
    }

    fn block_draft() -> BlockDraft {
        BlockDraft {
            block_type: BlockType::Booth,
            label: "Ticket Booth".to_owned(),
            position: MapPosition { x: 40.0, y: 40.0 },
            size: BlockSize {
                width: 10.0,
                height: 8.0,
            },
        }
    }

    #[test]
    fn loaded_document_is_clamped_to_the_map() {
        let mut event = EventStore::new()
            .create(draft("Stilt Walker", "2025-10-31T18:00:00Z"))
            .unwrap();
        event.duration = 0;
        event.map_position = Some(MapPosition { x: 150.0, y: -20.0 });
        let block = MapBlock {
            id: BlockId::from("block-far"),
            block_type: BlockType::Wall,
            label: "Fence".to_owned(),
            position: MapPosition { x: 400.0, y: 5.0 },
            size: BlockSize {
                width: 300.0,
                height: 0.5,
            },
        };
        let document = StoreDocument {
            events: vec![event.clone()],
            map_blocks: vec![block],
        };

        let mut store = EventStore::new();
        store.replace_all(document.clone());
        let loaded = store.get(&event.id).unwrap();
        assert_eq!(loaded.duration, 1);
        assert_eq!(loaded.map_position, Some(MapPosition { x: 95.0, y: 5.0 }));
        let stored = store.get_block(&BlockId::from("block-far")).unwrap();
        assert_eq!(stored.position, MapPosition { x: 95.0, y: 5.0 });
        assert_eq!(
            stored.size,
            BlockSize {
                width: 90.0,
                height: 3.0
            }
        );

        let rebuilt = EventStore::from_document(document);
        assert_eq!(rebuilt.snapshot(), store.snapshot());
    }

    #[test]
    fn create_starts_upcoming_with_fresh_id() {
        let mut store = EventStore::new();
        let a = store.create(draft("Juggler", "2025-10-31T18:00:00Z")).unwrap();
        let b = store.create(draft("Clown", "2025-10-31T19:00:00Z")).unwrap();

        assert_eq!(a.status, EventStatus::Upcoming);
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
        assert_eq!(store.list().first().unwrap().id, a.id);
    }

    #[test]
    fn create_rejects_zero_duration() {
        let mut store = EventStore::new();
        let mut d = draft("Nothing", "2025-10-31T18:00:00Z");
        d.duration = 0;
        assert!(matches!(store.create(d), Err(StoreError::InvalidDuration(0))));
        assert!(store.is_empty());
    }

    #[test]
    fn update_leaves_unset_fields_alone() {
        let mut store = EventStore::new();
        let event = store.create(draft("Juggler", "2025-10-31T18:00:00Z")).unwrap();

        let patch = EventPatch {
            title: Some("Fire Juggler".to_owned()),
            map_position: Some(MapPosition { x: 200.0, y: 50.0 }),
            ..EventPatch::default()
        };
        let updated = store.update(&event.id, &patch).unwrap();

        assert_eq!(updated.title, "Fire Juggler");
        assert_eq!(updated.location, "Main Tent A");
        assert_eq!(updated.scheduled_time, "2025-10-31T18:00:00Z");
        assert_eq!(updated.map_position, Some(MapPosition { x: 95.0, y: 50.0 }));
    }

    #[test]
    fn update_unknown_event_is_not_found() {
        let mut store = EventStore::new();
        let err = store
            .update(&EventId::from("ghost"), &EventPatch::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::EventNotFound(_)));
    }

    #[test]
    fn delete_removes_and_reports_missing() {
        let mut store = EventStore::new();
        let event = store.create(draft("Juggler", "2025-10-31T18:00:00Z")).unwrap();
        store.delete(&event.id).unwrap();
        assert!(store.get(&event.id).is_none());
        assert!(matches!(
            store.delete(&event.id),
            Err(StoreError::EventNotFound(_))
        ));
    }

    #[test]
    fn nudge_shifts_and_rewrites_as_utc() {
        let mut store = EventStore::new();
        let event = store.create(draft("Juggler", "2025-10-31T18:00:00Z")).unwrap();

        let later = store.nudge(&event.id, 15).unwrap();
        assert_eq!(later.scheduled_time, "2025-10-31T18:15:00.000Z");

        let earlier = store.nudge(&event.id, -5).unwrap();
        assert_eq!(earlier.scheduled_time, "2025-10-31T18:10:00.000Z");
    }

    #[test]
    fn nudge_refuses_unparseable_time() {
        let mut store = EventStore::new();
        let event = store.create(draft("Juggler", "soon")).unwrap();
        let err = store.nudge(&event.id, 5).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTimestamp { value, .. } if value == "soon"));
    }

    #[test]
    fn status_only_moves_forward() {
        let mut store = EventStore::new();
        let event = store.create(draft("Juggler", "2025-10-31T18:00:00Z")).unwrap();

        assert!(store.set_status(&event.id, EventStatus::Active).is_applied());
        assert!(store.set_status(&event.id, EventStatus::Completed).is_applied());
        assert_eq!(
            store.set_status(&event.id, EventStatus::Upcoming),
            StatusChange::Rejected {
                current: EventStatus::Completed,
                requested: EventStatus::Upcoming,
            }
        );
        assert_eq!(store.get(&event.id).unwrap().status, EventStatus::Completed);
    }

    #[test]
    fn status_cannot_skip_active() {
        let mut store = EventStore::new();
        let event = store.create(draft("Juggler", "2025-10-31T18:00:00Z")).unwrap();
        assert!(!store.set_status(&event.id, EventStatus::Completed).is_applied());
    }

    #[test]
    fn status_write_on_deleted_event_is_noop() {
        let mut store = EventStore::new();
        assert_eq!(
            store.set_status(&EventId::from("gone"), EventStatus::Active),
            StatusChange::Missing
        );
    }

    #[test]
    fn constant_events_keep_their_status() {
        let mut store = EventStore::new();
        let mut d = draft("Face Painting", "");
        d.kind = EventKind::Constant;
        let event = store.create(d).unwrap();

        assert!(!store.set_status(&event.id, EventStatus::Active).is_applied());
        assert_eq!(store.get(&event.id).unwrap().status, EventStatus::Upcoming);
    }

    #[test]
    fn positions_default_to_grid_until_set() {
        let mut store = EventStore::new();
        for i in 0..4 {
            store.create(draft(&format!("e{i}"), "")).unwrap();
        }
        assert_eq!(
            store.event_position(3),
            Some(MapPosition { x: 20.0, y: 50.0 })
        );

        let id = store.list().get(3).unwrap().id.clone();
        store
            .reposition_event(&id, MapPosition { x: 1.0, y: 60.0 })
            .unwrap();
        assert_eq!(store.position_of(&id), Some(MapPosition { x: 5.0, y: 60.0 }));

        store.reset_positions();
        assert_eq!(
            store.get(&id).unwrap().map_position,
            Some(MapPosition { x: 20.0, y: 50.0 })
        );
        assert!(store.event_position(4).is_none());
    }

    #[test]
    fn insert_keeps_backend_id_and_replaces_duplicates() {
        let mut store = EventStore::new();
        let mut event = store.create(draft("Juggler", "")).unwrap();
        store.delete(&event.id).unwrap();

        event.id = EventId::from("a1b2c3");
        store.insert(event.clone()).unwrap();
        event.title = "Renamed".to_owned();
        store.insert(event).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(&EventId::from("a1b2c3")).unwrap().title,
            "Renamed"
        );
    }

    #[test]
    fn blocks_clamp_on_every_write() {
        let mut store = EventStore::new();
        let mut d = block_draft();
        d.size.width = 500.0;
        let block = store.add_block(d);
        assert!(block.id.as_str().starts_with("block-"));
        assert!((block.size.width - 90.0).abs() < f64::EPSILON);

        let moved = store
            .update_block(
                &block.id,
                &BlockPatch {
                    position: Some(MapPosition { x: -3.0, y: 99.0 }),
                    ..BlockPatch::default()
                },
            )
            .unwrap();
        assert_eq!(moved.position, MapPosition { x: 5.0, y: 95.0 });

        let shrunk = store.resize_block(&block.id, -100.0, -100.0).unwrap();
        assert_eq!(
            shrunk.size,
            BlockSize {
                width: 5.0,
                height: 3.0
            }
        );
    }

    #[test]
    fn resize_applies_deltas() {
        let mut store = EventStore::new();
        let block = store.add_block(block_draft());
        let grown = store.resize_block(&block.id, 5.0, -2.0).unwrap();
        assert_eq!(
            grown.size,
            BlockSize {
                width: 15.0,
                height: 6.0
            }
        );
    }

    #[test]
    fn delete_block_unknown_is_not_found() {
        let mut store = EventStore::new();
        let block = store.add_block(block_draft());
        store.delete_block(&block.id).unwrap();
        assert!(store.list_blocks().is_empty());
        assert!(matches!(
            store.delete_block(&block.id),
            Err(StoreError::BlockNotFound(_))
        ));
    }

    #[test]
    fn document_round_trip_preserves_order() {
        let mut store = EventStore::new();
        store.create(draft("first", "")).unwrap();
        store.create(draft("second", "")).unwrap();
        store.add_block(block_draft());

        let copy = EventStore::from_document(store.snapshot());
        let titles: Vec<&str> = copy.list().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["first", "second"]);
        assert_eq!(copy.list_blocks().len(), 1);

        let mut other = EventStore::new();
        other.replace_all(copy.snapshot());
        assert_eq!(other.len(), 2);
    }
}
