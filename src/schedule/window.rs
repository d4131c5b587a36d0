//! Daily window membership.
//!
//! Everything is computed in minutes-of-day. A window whose start is after
//! its end spans midnight.

use chrono::{Local, Timelike};

/// Parse "HH:MM" into minutes since midnight.
pub fn parse_hhmm(value: &str) -> Option<u32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}

/// Minutes since midnight as zero-padded "HH:MM".
pub fn format_hhmm(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60 % 24, minutes % 60)
}

/// Is the local wall clock inside `start..=end`?
pub fn is_active(start: Option<&str>, end: Option<&str>) -> bool {
    let now = Local::now();
    is_active_at(start, end, now.hour() * 60 + now.minute())
}

/// Is `now_minutes` inside `start..=end`? Absent or malformed bounds are never active.
pub fn is_active_at(start: Option<&str>, end: Option<&str>, now_minutes: u32) -> bool {
    let (Some(start), Some(end)) = (start.and_then(parse_hhmm), end.and_then(parse_hhmm)) else {
        return false;
    };

    if start <= end {
        start <= now_minutes && now_minutes <= end
    } else {
        now_minutes >= start || now_minutes <= end
    }
}
