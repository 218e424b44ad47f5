//! Countdown math and human-facing time text.
//!
//! All differences are floored the same way the display does
//! (`floor(ms / 60000)`), so an event 30 seconds in the past is at minute
//! `-1`, not `0`. Wall-clock text is always rendered in the venue timezone.

use carnival_types::{Event, VENUE_TZ};
use chrono::{DateTime, Utc};

/// Label for constant events.
pub const ALWAYS_AVAILABLE: &str = "ALWAYS AVAILABLE";
/// Label for events inside their running window.
pub const NOW: &str = "NOW";
/// Label for scheduled events past their running window.
pub const ENDED: &str = "ENDED";
/// Label for scheduled events whose start time does not parse.
pub const TBD: &str = "TBD";

/// Minutes before start at which an event counts as starting soon.
const STARTING_SOON_MINUTES: i64 = 5;

/// Signed milliseconds from `now` until `at`.
pub fn millis_until(at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    at.signed_duration_since(now).num_milliseconds()
}

/// Whole minutes until `at`, floored toward negative infinity.
pub fn minutes_until(at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    millis_until(at, now).div_euclid(60_000)
}

/// Whole seconds until `at`, floored toward negative infinity.
pub fn seconds_until(at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    millis_until(at, now).div_euclid(1000)
}

/// Return `true` once `now` is more than `duration_minutes` past `at`.
pub fn is_past_duration(at: DateTime<Utc>, duration_minutes: u32, now: DateTime<Utc>) -> bool {
    millis_until(at, now) < i64::from(duration_minutes).saturating_mul(-60_000)
}

/// `m:ss` countdown text. Minutes are not wrapped into hours.
pub fn countdown_text(seconds: u64) -> String {
    format!("{}:{:02}", seconds.div_euclid(60), seconds.rem_euclid(60))
}

/// Relative start text for an event.
///
/// `ALWAYS AVAILABLE` for constant events, `NOW` from the start until the
/// duration has elapsed, `in Nm` under an hour, otherwise `in Hh Mm`.
/// Events past their duration read `ENDED`; an unparseable start reads
/// `TBD`.
pub fn time_label(event: &Event, now: DateTime<Utc>) -> String {
    if event.is_constant() {
        return ALWAYS_AVAILABLE.to_owned();
    }
    let Some(at) = event.scheduled_at() else {
        return TBD.to_owned();
    };

    let minutes = minutes_until(at, now);
    if minutes < 0 {
        return if is_past_duration(at, event.duration, now) {
            ENDED.to_owned()
        } else {
            NOW.to_owned()
        };
    }
    if minutes < 60 {
        return format!("in {minutes}m");
    }
    format!(
        "in {}h {}m",
        minutes.div_euclid(60),
        minutes.rem_euclid(60)
    )
}

/// Return `true` if a scheduled event starts within the next five minutes
/// but has not started yet.
pub fn is_starting_soon(event: &Event, now: DateTime<Utc>) -> bool {
    if event.is_constant() {
        return false;
    }
    event.scheduled_at().is_some_and(|at| {
        let minutes = minutes_until(at, now);
        minutes > 0 && minutes <= STARTING_SOON_MINUTES
    })
}

/// Start time in venue wall time (`06:30 PM`).
pub fn start_text(event: &Event) -> Option<String> {
    if event.is_constant() {
        return None;
    }
    event
        .scheduled_at()
        .map(|at| at.with_timezone(&VENUE_TZ).format("%I:%M %p").to_string())
}

/// Venue wall clock (`06:30:05 PM`).
pub fn clock_text(now: DateTime<Utc>) -> String {
    now.with_timezone(&VENUE_TZ).format("%I:%M:%S %p").to_string()
}

/// Venue calendar date (`Friday, October 31`).
pub fn date_text(now: DateTime<Utc>) -> String {
    now.with_timezone(&VENUE_TZ).format("%A, %B %-d").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use carnival_types::{Category, EventId, EventKind, EventStatus, format_instant};
    use chrono::{TimeDelta, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 31, 18, 0, 0).unwrap()
    }

    fn event_at(at: DateTime<Utc>, duration: u32) -> Event {
        Event {
            id: EventId::from("e"),
            title: "Juggler".to_owned(),
            description: String::new(),
            scheduled_time: format_instant(at),
            duration,
            location: String::new(),
            participants: 0,
            ticket_cost: "Free".to_owned(),
            category: Category::Performance,
            status: EventStatus::Upcoming,
            kind: EventKind::Scheduled,
            map_position: None,
        }
    }

    #[test]
    fn differences_floor_toward_negative_infinity() {
        let at = now() - TimeDelta::seconds(30);
        assert_eq!(minutes_until(at, now()), -1);
        assert_eq!(seconds_until(at, now()), -30);

        let at = now() + TimeDelta::seconds(270);
        assert_eq!(minutes_until(at, now()), 4);
        assert_eq!(seconds_until(at, now()), 270);

        let at = now() + TimeDelta::milliseconds(999);
        assert_eq!(minutes_until(at, now()), 0);
        assert_eq!(seconds_until(at, now()), 0);
    }

    #[test]
    fn countdown_pads_seconds() {
        assert_eq!(countdown_text(270), "4:30");
        assert_eq!(countdown_text(9), "0:09");
        assert_eq!(countdown_text(0), "0:00");
    }

    #[test]
    fn labels_follow_the_start_window() {
        let e = event_at(now() + TimeDelta::minutes(12), 30);
        assert_eq!(time_label(&e, now()), "in 12m");

        let e = event_at(now() + TimeDelta::minutes(65), 30);
        assert_eq!(time_label(&e, now()), "in 1h 5m");

        let e = event_at(now() + TimeDelta::minutes(120), 30);
        assert_eq!(time_label(&e, now()), "in 2h 0m");

        let e = event_at(now() - TimeDelta::minutes(10), 30);
        assert_eq!(time_label(&e, now()), NOW);

        let e = event_at(now() - TimeDelta::minutes(31), 30);
        assert_eq!(time_label(&e, now()), ENDED);
    }

    #[test]
    fn start_instant_reads_zero_minutes() {
        let e = event_at(now(), 30);
        assert_eq!(time_label(&e, now()), "in 0m");
    }

    #[test]
    fn constant_and_undated_events_have_fixed_labels() {
        let mut e = event_at(now(), 30);
        e.kind = EventKind::Constant;
        assert_eq!(time_label(&e, now()), ALWAYS_AVAILABLE);
        assert!(start_text(&e).is_none());

        let mut e = event_at(now(), 30);
        e.scheduled_time = "later".to_owned();
        assert_eq!(time_label(&e, now()), TBD);
        assert!(!is_starting_soon(&e, now()));
    }

    #[test]
    fn starting_soon_excludes_the_start_minute() {
        assert!(is_starting_soon(&event_at(now() + TimeDelta::minutes(5), 30), now()));
        assert!(is_starting_soon(&event_at(now() + TimeDelta::minutes(1), 30), now()));
        assert!(!is_starting_soon(&event_at(now() + TimeDelta::seconds(59), 30), now()));
        assert!(!is_starting_soon(&event_at(now() + TimeDelta::minutes(6), 30), now()));
    }

    #[test]
    fn wall_clock_text_uses_venue_time() {
        // 18:00 UTC is 11:00 in Los Angeles during daylight time.
        assert_eq!(clock_text(now()), "11:00:00 AM");
        assert_eq!(date_text(now()), "Friday, October 31");
        let e = event_at(now() + TimeDelta::minutes(90), 30);
        assert_eq!(start_text(&e).unwrap(), "12:30 PM");
    }
}
