//! Parsing of the `scheduledTime` wire value.
//!
//! The backend stores ISO-8601 instants written by `Date::toISOString`
//! (`2025-10-31T18:00:00.000Z`). Admin forms may also submit zone-less
//! `datetime-local` values (`2025-10-31T11:00`); those are read as wall
//! time at the venue. Anything else is treated as undefined timing.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// The fixed presentation timezone of the venue.
pub const VENUE_TZ: Tz = chrono_tz::America::Los_Angeles;

/// Zone-less layouts accepted as venue wall time.
const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a wire timestamp into a UTC instant.
///
/// Returns `None` for empty input, unparseable input, and venue wall times
/// that do not exist (skipped by a DST transition).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())?;

    match VENUE_TZ.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        // Fall-back hour: take the earlier of the two instants.
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// Format an instant as an RFC 3339 UTC string with millisecond precision,
/// the same shape the display writes back to the backend.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
