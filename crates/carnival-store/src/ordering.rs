//! Derived display ordering.
//!
//! Ordering is never stored: listings are sorted on read by scheduled
//! instant, with unparseable or empty timestamps after every dated event.
//! The sort is stable, so ties keep store order.

use carnival_types::Event;

/// Sort events by scheduled instant, undated events last.
pub fn by_schedule<'a, I>(events: I) -> Vec<&'a Event>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut sorted: Vec<&Event> = events.into_iter().collect();
    sorted.sort_by_key(|event| {
        let at = event.scheduled_at();
        (at.is_none(), at)
    });
    sorted
}
