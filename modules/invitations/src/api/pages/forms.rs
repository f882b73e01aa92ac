//! Form payloads. Numeric inputs arrive as text so a bad value can be
//! reported on the page instead of rejected by the extractor.

use serde::Deserialize;

use crate::contract::model::{CardTheme, EventDraft, PartySize};

#[derive(Debug, Default, Deserialize)]
pub struct EventPostForm {
    #[serde(default)]
    pub action: String,
    pub response: Option<String>,
    pub adults_qty: Option<String>,
    pub kids_qty: Option<String>,
    pub comment: Option<String>,
    pub comment_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnonymousRsvpForm {
    #[serde(default)]
    pub guest_name: String,
    #[serde(default)]
    pub guest_email: String,
    #[serde(default)]
    pub guest_phone: String,
    pub rsvp: Option<String>,
    pub adults_qty: Option<String>,
    pub kids_qty: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PrefillQuery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventQuery {
    pub rsvp_success: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub datetime: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub registry1: String,
    #[serde(default)]
    pub registry2: String,
    /// Absent from older forms; the stored value is kept then.
    pub header_image: Option<String>,
    #[serde(default)]
    pub card_theme: String,
}

impl EventForm {
    pub fn into_draft(self, current_header_image: &str) -> EventDraft {
        EventDraft {
            title: self.title,
            description: self.description,
            host: self.host,
            starts_at: self.datetime,
            location: self.location,
            registry1: self.registry1,
            registry2: self.registry2,
            header_image: self
                .header_image
                .unwrap_or_else(|| current_header_image.to_string()),
            card_theme: CardTheme::parse_lenient(&self.card_theme),
        }
    }
}

/// Blank means `default`; anything else must be a non-negative integer.
pub fn parse_count(raw: Option<&str>, default: u32) -> Option<u32> {
    match raw.map(str::trim) {
        None | Some("") => Some(default),
        Some(v) => v.parse().ok(),
    }
}

/// Party size from the two quantity fields; `None` when either is not a number.
pub fn parse_party(adults: Option<&str>, kids: Option<&str>) -> Option<PartySize> {
    let defaults = PartySize::default();
    Some(PartySize {
        adults: parse_count(adults, defaults.adults)?,
        kids: parse_count(kids, defaults.kids)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_default_when_blank() {
        assert_eq!(parse_count(None, 1), Some(1));
        assert_eq!(parse_count(Some("  "), 0), Some(0));
        assert_eq!(parse_count(Some("3"), 1), Some(3));
        assert_eq!(parse_count(Some("-1"), 1), None);
        assert_eq!(parse_count(Some("two"), 1), None);
    }

    #[test]
    fn event_form_keeps_header_image_when_absent() {
        let form = EventForm {
            title: "Party".into(),
            card_theme: "sunset".into(),
            ..Default::default()
        };
        let draft = form.into_draft("balloons.png");
        assert_eq!(draft.header_image, "balloons.png");
        assert_eq!(draft.card_theme, CardTheme::Sunset);
    }
}
