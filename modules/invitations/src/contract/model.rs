use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

pub type AccountId = i32;
pub type EventId = i32;
pub type InviteeId = i32;

/// Registered account. The first account ever created is the admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Named colour palette used by the invite page and the preview image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CardTheme {
    #[default]
    Ocean,
    Sunset,
    Forest,
    Blush,
}

/// Colours for one card theme: (background start, background end, accent, text).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub from: &'static str,
    pub to: &'static str,
    pub accent: &'static str,
    pub ink: &'static str,
}

impl CardTheme {
    pub const ALL: [CardTheme; 4] = [Self::Ocean, Self::Sunset, Self::Forest, Self::Blush];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ocean => "ocean",
            Self::Sunset => "sunset",
            Self::Forest => "forest",
            Self::Blush => "blush",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ocean => "Ocean",
            Self::Sunset => "Sunset",
            Self::Forest => "Forest",
            Self::Blush => "Blush",
        }
    }

    /// Unknown names fall back to the default theme.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    pub fn palette(&self) -> Palette {
        match self {
            Self::Ocean => Palette {
                from: "#1e3c72",
                to: "#2a5298",
                accent: "#7fd1ff",
                ink: "#ffffff",
            },
            Self::Sunset => Palette {
                from: "#ff7e5f",
                to: "#feb47b",
                accent: "#fff3c4",
                ink: "#3b1d0f",
            },
            Self::Forest => Palette {
                from: "#134e5e",
                to: "#71b280",
                accent: "#e3f6c5",
                ink: "#ffffff",
            },
            Self::Blush => Palette {
                from: "#ee9ca7",
                to: "#ffdde1",
                accent: "#b03a5b",
                ink: "#4a1c2a",
            },
        }
    }
}

impl FromStr for CardTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ocean" => Ok(Self::Ocean),
            "sunset" => Ok(Self::Sunset),
            "forest" => Ok(Self::Forest),
            "blush" => Ok(Self::Blush),
            other => Err(format!("unknown card theme '{other}'")),
        }
    }
}

impl fmt::Display for CardTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    /// `None` for the seeded default event.
    pub owner_id: Option<AccountId>,
    pub title: String,
    pub description: String,
    pub host: String,
    /// Start time as entered, ISO-8601 local time (`2025-10-04T11:00`).
    pub starts_at: String,
    pub location: String,
    pub registry1: String,
    pub registry2: String,
    pub header_image: String,
    pub card_theme: CardTheme,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of an event; used for both creation and full updates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub host: String,
    pub starts_at: String,
    pub location: String,
    pub registry1: String,
    pub registry2: String,
    pub header_image: String,
    pub card_theme: CardTheme,
}

impl From<&Event> for EventDraft {
    fn from(e: &Event) -> Self {
        Self {
            title: e.title.clone(),
            description: e.description.clone(),
            host: e.host.clone(),
            starts_at: e.starts_at.clone(),
            location: e.location.clone(),
            registry1: e.registry1.clone(),
            registry2: e.registry2.clone(),
            header_image: e.header_image.clone(),
            card_theme: e.card_theme,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitee {
    pub id: InviteeId,
    pub event_id: EventId,
    /// `None` for anonymous guests.
    pub account_id: Option<AccountId>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Invitee {
    pub fn is_anonymous(&self) -> bool {
        self.account_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvitee {
    pub event_id: EventId,
    pub account_id: Option<AccountId>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Contact details that may change when a guest responds again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteeContact {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RsvpResponse {
    Yes,
    No,
    Maybe,
}

impl RsvpResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Maybe => "maybe",
        }
    }

    /// Human wording used in pages and emails.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Yes => "Attending",
            Self::No => "Not attending",
            Self::Maybe => "Maybe",
        }
    }
}

impl FromStr for RsvpResponse {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "maybe" => Ok(Self::Maybe),
            other => Err(format!("unknown RSVP response '{other}'")),
        }
    }
}

impl fmt::Display for RsvpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartySize {
    pub adults: u32,
    pub kids: u32,
}

impl Default for PartySize {
    fn default() -> Self {
        Self { adults: 1, kids: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rsvp {
    pub id: i32,
    pub invitee_id: InviteeId,
    pub event_id: EventId,
    pub response: RsvpResponse,
    pub party: PartySize,
    pub responded_at: DateTime<Utc>,
}

/// One row of an event's guest list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guest {
    pub invitee: Invitee,
    pub account: Option<Account>,
    pub rsvp: Option<Rsvp>,
}

impl Guest {
    pub fn name(&self) -> &str {
        self.account
            .as_ref()
            .map(|a| a.name.as_str())
            .unwrap_or(&self.invitee.name)
    }

    pub fn email(&self) -> Option<&str> {
        self.account
            .as_ref()
            .map(|a| a.email.as_str())
            .or(self.invitee.email.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RsvpStats {
    pub attending: u32,
    pub not_attending: u32,
    pub maybe: u32,
    pub no_response: u32,
    pub total_adults: u32,
    pub total_kids: u32,
}

impl RsvpStats {
    /// Party sizes count only for `yes` responses.
    pub fn from_guests(guests: &[Guest]) -> Self {
        guests.iter().fold(Self::default(), |mut acc, g| {
            match g.rsvp.as_ref() {
                Some(r) if r.response == RsvpResponse::Yes => {
                    acc.attending += 1;
                    acc.total_adults += r.party.adults;
                    acc.total_kids += r.party.kids;
                }
                Some(r) if r.response == RsvpResponse::No => acc.not_attending += 1,
                Some(_) => acc.maybe += 1,
                None => acc.no_response += 1,
            }
            acc
        })
    }

    pub fn headcount(&self) -> u32 {
        self.total_adults + self.total_kids
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: i32,
    pub event_id: EventId,
    pub account_id: Option<AccountId>,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub event_id: EventId,
    pub account_id: Option<AccountId>,
    pub author_name: String,
    pub body: String,
}

/// RSVP form data submitted without an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymousRsvp {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub response: RsvpResponse,
    pub party: PartySize,
}

/// Outcome of sending RSVP notification emails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// SMTP credentials are not configured.
    Disabled,
    /// Neither the guest nor a host had an address.
    NoRecipients,
    Failed { reason: String },
}

impl Delivery {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of a recorded RSVP. The RSVP is stored regardless of `delivery`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpReceipt {
    pub invitee: Invitee,
    pub rsvp: Rsvp,
    pub delivery: Delivery,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(response: Option<RsvpResponse>, adults: u32, kids: u32) -> Guest {
        let now = Utc::now();
        Guest {
            invitee: Invitee {
                id: 1,
                event_id: 1,
                account_id: None,
                name: "Ana".into(),
                email: None,
                phone: Some("555".into()),
                created_at: now,
            },
            account: None,
            rsvp: response.map(|response| Rsvp {
                id: 1,
                invitee_id: 1,
                event_id: 1,
                response,
                party: PartySize { adults, kids },
                responded_at: now,
            }),
        }
    }

    #[test]
    fn stats_count_party_only_for_yes() {
        let guests = vec![
            guest(Some(RsvpResponse::Yes), 2, 3),
            guest(Some(RsvpResponse::Yes), 1, 0),
            guest(Some(RsvpResponse::No), 4, 4),
            guest(Some(RsvpResponse::Maybe), 2, 2),
            guest(None, 1, 0),
        ];
        let stats = RsvpStats::from_guests(&guests);
        assert_eq!(stats.attending, 2);
        assert_eq!(stats.not_attending, 1);
        assert_eq!(stats.maybe, 1);
        assert_eq!(stats.no_response, 1);
        assert_eq!(stats.total_adults, 3);
        assert_eq!(stats.total_kids, 3);
        assert_eq!(stats.headcount(), 6);
    }

    #[test]
    fn theme_parsing_is_lenient() {
        assert_eq!(CardTheme::parse_lenient("Sunset"), CardTheme::Sunset);
        assert_eq!(CardTheme::parse_lenient("neon"), CardTheme::Ocean);
        assert_eq!(CardTheme::parse_lenient(""), CardTheme::Ocean);
    }

    #[test]
    fn response_parsing() {
        assert_eq!("YES".parse::<RsvpResponse>(), Ok(RsvpResponse::Yes));
        assert_eq!(" maybe ".parse::<RsvpResponse>(), Ok(RsvpResponse::Maybe));
        assert!("perhaps".parse::<RsvpResponse>().is_err());
    }

    #[test]
    fn guest_prefers_account_identity() {
        let mut g = guest(None, 1, 0);
        assert_eq!(g.name(), "Ana");
        g.account = Some(Account {
            id: 9,
            name: "Ana Maria".into(),
            email: "ana@example.com".into(),
            password_hash: String::new(),
            is_admin: false,
            created_at: Utc::now(),
        });
        assert_eq!(g.name(), "Ana Maria");
        assert_eq!(g.email(), Some("ana@example.com"));
    }
}
