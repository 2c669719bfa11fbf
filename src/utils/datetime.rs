use chrono::{DateTime, Duration, Utc};

pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Absolute time `delay_minutes` after `now`, `None` past chrono's range.
pub fn after_minutes(now: DateTime<Utc>, delay_minutes: i64) -> Option<DateTime<Utc>> {
    now.checked_add_signed(Duration::try_minutes(delay_minutes)?)
}
