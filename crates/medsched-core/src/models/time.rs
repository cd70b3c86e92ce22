//! Minute-resolution timestamp handling.
//!
//! Every timestamp in the store is TEXT in `YYYY-MM-DD HH:MM` form, so
//! lexicographic comparison in SQL matches chronological comparison.

use chrono::{NaiveDateTime, Timelike};

/// Storage format for all schedule and intake timestamps.
pub const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Render a timestamp in storage form, dropping sub-minute precision.
pub fn format_minute(ts: NaiveDateTime) -> String {
    ts.format(MINUTE_FORMAT).to_string()
}

/// Parse a stored timestamp. `None` for anything not in storage form.
pub fn parse_minute(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, MINUTE_FORMAT).ok()
}

/// Zero out seconds and finer. Past/due comparisons happen at minute
/// resolution, so a dose scheduled for the current minute is never "past".
pub fn truncate_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}
