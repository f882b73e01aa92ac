use async_trait::async_trait;

use crate::contract::model::{Delivery, EventId, PartySize, RsvpResponse};

/// Everything needed to tell the guest and the host about one RSVP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpNotice {
    pub event_id: EventId,
    pub event_title: String,
    pub host_name: String,
    pub starts_at: String,
    pub location: String,
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub response: RsvpResponse,
    pub party: PartySize,
    pub anonymous: bool,
    /// Event owner, or the first admin when the event has no owner.
    pub host_email: Option<String>,
}

/// Outbound notification port. Implementations never fail the caller:
/// problems are reported through [`Delivery`].
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_rsvp(&self, notice: &RsvpNotice) -> Delivery;
}
