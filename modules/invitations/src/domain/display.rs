//! Human-facing formatting of event times and comment ages.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a stored start time. Seconds are optional; a bare date means midnight.
pub fn parse_starts_at(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTime {
    /// "Saturday, October 4, 2025"
    pub date: String,
    /// "11:00 AM"; empty when the stored value could not be parsed.
    pub time: String,
}

impl DisplayTime {
    /// "Saturday, October 4, 2025 at 11:00 AM", or just the date part.
    pub fn joined(&self) -> String {
        if self.time.is_empty() {
            self.date.clone()
        } else {
            format!("{} at {}", self.date, self.time)
        }
    }
}

/// Unparseable values are shown verbatim as the date.
pub fn display_starts_at(raw: &str) -> DisplayTime {
    match parse_starts_at(raw) {
        Some(dt) => DisplayTime {
            date: dt.format("%A, %B %-d, %Y").to_string(),
            time: dt.format("%-I:%M %p").to_string(),
        },
        None => DisplayTime {
            date: raw.to_string(),
            time: String::new(),
        },
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(then);
    if diff.num_days() > 0 {
        plural(diff.num_days(), "day")
    } else if diff.num_seconds() > 3600 {
        plural(diff.num_hours(), "hour")
    } else if diff.num_seconds() > 60 {
        plural(diff.num_minutes(), "minute")
    } else {
        "just now".to_string()
    }
}
