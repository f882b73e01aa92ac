//! "Add to calendar" links and iCalendar export.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use super::display::parse_starts_at;
use crate::contract::model::Event;

/// Events have no stored end time; every export assumes this length.
pub const EVENT_DURATION_HOURS: i64 = 3;

const ICS_COMPACT: &str = "%Y%m%dT%H%M%S";
const ICS_LINE_LIMIT: usize = 75;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarLinks {
    pub google: String,
    pub outlook: String,
    /// Site-relative `.ics` download.
    pub ics_path: String,
}

fn window(event: &Event) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = parse_starts_at(&event.starts_at)?;
    Some((start, start + Duration::hours(EVENT_DURATION_HOURS)))
}

/// `None` when the start time cannot be parsed.
pub fn calendar_links(event: &Event) -> Option<CalendarLinks> {
    let (start, end) = window(event)?;
    let title = urlencoding::encode(&event.title);
    let details = urlencoding::encode(&event.description);
    let location = urlencoding::encode(&event.location);

    let google = format!(
        "https://calendar.google.com/calendar/render?action=TEMPLATE&text={title}&dates={}/{}&details={details}&location={location}",
        start.format(ICS_COMPACT),
        end.format(ICS_COMPACT),
    );
    let outlook = format!(
        "https://outlook.live.com/calendar/0/deeplink/compose?subject={title}&startdt={}&enddt={}&body={details}&location={location}",
        start.format("%Y-%m-%dT%H:%M:%S"),
        end.format("%Y-%m-%dT%H:%M:%S"),
    );

    Some(CalendarLinks {
        google,
        outlook,
        ics_path: format!("/calendar/{}", event.id),
    })
}

/// RFC 5545 TEXT escaping.
fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Fold a content line at 75 octets, continuation lines start with a space.
fn push_line(out: &mut String, line: &str) {
    let mut budget = ICS_LINE_LIMIT;
    let mut used = 0;
    for ch in line.chars() {
        let len = ch.len_utf8();
        if used + len > budget {
            out.push_str("\r\n ");
            used = 0;
            budget = ICS_LINE_LIMIT - 1;
        }
        out.push(ch);
        used += len;
    }
    out.push_str("\r\n");
}

/// Single-event VCALENDAR. Start and end are floating local times.
pub fn ics_document(event: &Event, uid_domain: &str, now: DateTime<Utc>) -> Option<String> {
    let (start, end) = window(event)?;
    let mut out = String::new();
    for line in [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//invite-server//EN".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:event-{}@{}", event.id, uid_domain),
        format!("DTSTAMP:{}Z", now.format(ICS_COMPACT)),
        format!("DTSTART:{}", start.format(ICS_COMPACT)),
        format!("DTEND:{}", end.format(ICS_COMPACT)),
        format!("SUMMARY:{}", escape_text(&event.title)),
        format!("DESCRIPTION:{}", escape_text(&event.description)),
        format!("LOCATION:{}", escape_text(&event.location)),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ] {
        push_line(&mut out, &line);
    }
    Some(out)
}
