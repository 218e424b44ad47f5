//! Featured-event selection.
//!
//! The locked event is always featured. Otherwise the display rotates
//! through the displayable set (every constant event plus scheduled events
//! that are upcoming or active) in store order. The index is taken modulo
//! the current set size at selection time, so it jumps when the set
//! shrinks.

use carnival_store::EventStore;
use carnival_types::Event;

use crate::scheduler::Lock;

/// Rotation position through the displayable set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationState {
    /// Raw index. Always reduced modulo the set size before use.
    pub index: usize,
}

impl RotationState {
    /// Advance one step.
    ///
    /// Rotation is paused while a lock is held, and an empty set resets
    /// the index to zero.
    #[must_use]
    pub fn advance(self, displayable_len: usize, locked: bool) -> Self {
        if locked {
            return self;
        }
        let index = self
            .index
            .checked_add(1)
            .and_then(|next| next.checked_rem(displayable_len))
            .unwrap_or(0);
        Self { index }
    }
}

/// The displayable set, in store order.
pub fn displayable(store: &EventStore) -> Vec<&Event> {
    store.list().iter().filter(|e| e.is_displayable()).collect()
}

/// Choose the featured event.
///
/// A lock whose event no longer exists falls back to rotation.
pub fn select_featured<'a>(
    store: &'a EventStore,
    lock: Option<&Lock>,
    rotation: RotationState,
) -> Option<&'a Event> {
    if let Some(locked) = lock.and_then(|l| store.get(&l.event_id)) {
        return Some(locked);
    }
    let set = displayable(store);
    rotation
        .index
        .checked_rem(set.len())
        .and_then(|i| set.get(i).copied())
}
