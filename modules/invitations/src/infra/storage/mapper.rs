//! Conversions between SeaORM rows and contract models.

use anyhow::anyhow;

use super::entities::{account, comment, event, invitee, rsvp};
use crate::contract::model::{
    Account, CardTheme, Comment, Event, Invitee, PartySize, Rsvp, RsvpResponse,
};

impl From<account::Model> for Account {
    fn from(m: account::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            password_hash: m.password_hash,
            is_admin: m.is_admin,
            created_at: m.created_at,
        }
    }
}

impl From<event::Model> for Event {
    fn from(m: event::Model) -> Self {
        Self {
            id: m.id,
            owner_id: m.owner_id,
            title: m.title,
            description: m.description,
            host: m.host,
            starts_at: m.starts_at,
            location: m.location,
            registry1: m.registry1,
            registry2: m.registry2,
            header_image: m.header_image,
            card_theme: CardTheme::parse_lenient(&m.card_theme),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<invitee::Model> for Invitee {
    fn from(m: invitee::Model) -> Self {
        Self {
            id: m.id,
            event_id: m.event_id,
            account_id: m.account_id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            created_at: m.created_at,
        }
    }
}

impl From<comment::Model> for Comment {
    fn from(m: comment::Model) -> Self {
        Self {
            id: m.id,
            event_id: m.event_id,
            account_id: m.account_id,
            author_name: m.author_name,
            body: m.body,
            created_at: m.created_at,
        }
    }
}

impl TryFrom<rsvp::Model> for Rsvp {
    type Error = anyhow::Error;

    fn try_from(m: rsvp::Model) -> Result<Self, Self::Error> {
        let response: RsvpResponse = m
            .response
            .parse()
            .map_err(|e: String| anyhow!("rsvp {}: {e}", m.id))?;
        Ok(Self {
            id: m.id,
            invitee_id: m.invitee_id,
            event_id: m.event_id,
            response,
            party: PartySize {
                adults: u32::try_from(m.adults).unwrap_or(0),
                kids: u32::try_from(m.kids).unwrap_or(0),
            },
            responded_at: m.responded_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn unknown_theme_falls_back_to_default() {
        let now = Utc::now();
        let row = event::Model {
            id: 3,
            owner_id: None,
            title: "Picnic".into(),
            description: String::new(),
            host: String::new(),
            starts_at: String::new(),
            location: String::new(),
            registry1: String::new(),
            registry2: String::new(),
            header_image: String::new(),
            card_theme: "neon".into(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(Event::from(row).card_theme, CardTheme::Ocean);
    }

    #[test]
    fn corrupt_response_is_an_error() {
        let row = rsvp::Model {
            id: 9,
            invitee_id: 1,
            event_id: 1,
            response: "perhaps".into(),
            adults: 1,
            kids: 0,
            responded_at: Utc::now(),
        };
        let err = Rsvp::try_from(row).unwrap_err();
        assert!(err.to_string().contains("rsvp 9"));
    }
}
