use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::model::{Event, Guest, RsvpStats};

/// Links a client needs to present an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLinks {
    pub invite: String,
    pub preview_image: String,
    pub calendar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDto {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub host: String,
    pub starts_at: String,
    pub location: String,
    pub registry_links: Vec<String>,
    pub header_image: Option<String>,
    pub card_theme: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub links: EventLinks,
}

impl EventDto {
    pub fn from_event(e: Event, base_url: &str) -> Self {
        let invite = format!("{base_url}/event/{}", e.id);
        Self {
            links: EventLinks {
                preview_image: format!("{invite}/preview.png"),
                calendar: format!("{base_url}/calendar/{}", e.id),
                invite,
            },
            id: e.id,
            registry_links: [e.registry1, e.registry2]
                .into_iter()
                .filter(|l| !l.is_empty())
                .collect(),
            header_image: (!e.header_image.is_empty()).then_some(e.header_image),
            card_theme: e.card_theme.as_str().to_string(),
            title: e.title,
            description: e.description,
            host: e.host,
            starts_at: e.starts_at,
            location: e.location,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestDto {
    pub invitee_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub anonymous: bool,
    /// `yes`, `no`, `maybe`, or absent when the guest has not answered.
    pub response: Option<String>,
    pub adults: Option<u32>,
    pub kids: Option<u32>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl From<Guest> for GuestDto {
    fn from(g: Guest) -> Self {
        let name = g.name().to_string();
        let email = g.email().map(str::to_owned);
        let rsvp = g.rsvp;
        Self {
            invitee_id: g.invitee.id,
            anonymous: g.invitee.is_anonymous(),
            phone: g.invitee.phone,
            name,
            email,
            response: rsvp.as_ref().map(|r| r.response.as_str().to_string()),
            adults: rsvp.as_ref().map(|r| r.party.adults),
            kids: rsvp.as_ref().map(|r| r.party.kids),
            responded_at: rsvp.as_ref().map(|r| r.responded_at),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatsDto {
    pub attending: u32,
    pub not_attending: u32,
    pub maybe: u32,
    pub no_response: u32,
    pub total_adults: u32,
    pub total_kids: u32,
    pub headcount: u32,
}

impl From<RsvpStats> for StatsDto {
    fn from(s: RsvpStats) -> Self {
        Self {
            attending: s.attending,
            not_attending: s.not_attending,
            maybe: s.maybe,
            no_response: s.no_response,
            total_adults: s.total_adults,
            total_kids: s.total_kids,
            headcount: s.headcount(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsvpListDto {
    pub event_id: i32,
    pub stats: StatsDto,
    pub guests: Vec<GuestDto>,
}
