//! UTC calendar helpers used by the reset rules. Everything here is computed
//! on `DateTime<Utc>` so the host's local timezone never leaks in.

use chrono::{DateTime, Datelike, Utc, Weekday};

/// Whole 24-hour periods between `earlier` and `now`. Negative if `earlier`
/// lies in the future.
pub fn days_since(earlier: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - earlier).num_days()
}

pub fn is_monday(now: DateTime<Utc>) -> bool {
    now.weekday() == Weekday::Mon
}

pub fn is_first_of_month(now: DateTime<Utc>) -> bool {
    now.day() == 1
}

pub fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}
