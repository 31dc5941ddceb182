use std::fmt::{Display, Write as _};

use chrono::{DateTime, Local, TimeZone};

use crate::config::DEFAULT_DATE_FORMAT;

/// Render a `createdDate` in the local time zone.
pub fn format_date(millis: i64, pattern: &str) -> String {
    format_date_in(millis, pattern, &Local)
}

/// Render a `createdDate` in `tz`. An unusable pattern falls back to the
/// default long form; an out-of-range timestamp renders as `?`.
pub fn format_date_in<Tz>(millis: i64, pattern: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(utc) = DateTime::from_timestamp_millis(millis) else {
        return "?".to_string();
    };
    let local = utc.with_timezone(tz);

    let mut out = String::new();
    if write!(out, "{}", local.format(pattern)).is_ok() {
        return out;
    }
    local.format(DEFAULT_DATE_FORMAT).to_string()
}

pub fn done_marker(is_done: bool) -> &'static str {
    if is_done {
        "[x]"
    } else {
        "[ ]"
    }
}
