use async_trait::async_trait;

use crate::contract::model::{
    Account, AccountId, Comment, Event, EventDraft, EventId, Guest, Invitee, InviteeContact,
    InviteeId, NewAccount, NewComment, NewInvitee, PartySize, Rsvp, RsvpResponse,
};

/// Storage port for the invitations domain.
///
/// Implementations stamp `created_at`/`updated_at` themselves. Only
/// `delete_event` is transactional.
#[async_trait]
pub trait InvitationsRepository: Send + Sync {
    // accounts
    async fn insert_account(&self, new: NewAccount) -> anyhow::Result<Account>;
    async fn find_account(&self, id: AccountId) -> anyhow::Result<Option<Account>>;
    async fn find_account_by_email(&self, email: &str) -> anyhow::Result<Option<Account>>;
    async fn count_accounts(&self) -> anyhow::Result<u64>;
    /// Oldest admin account, if any.
    async fn first_admin(&self) -> anyhow::Result<Option<Account>>;

    // events
    async fn insert_event(
        &self,
        owner_id: Option<AccountId>,
        draft: EventDraft,
    ) -> anyhow::Result<Event>;
    async fn find_event(&self, id: EventId) -> anyhow::Result<Option<Event>>;
    /// All events, lowest id first.
    async fn list_events(&self) -> anyhow::Result<Vec<Event>>;
    async fn update_event(&self, id: EventId, draft: EventDraft) -> anyhow::Result<Event>;
    /// Removes the event with its comments, RSVPs and invitees. Returns false if it did not exist.
    async fn delete_event(&self, id: EventId) -> anyhow::Result<bool>;
    async fn count_events(&self) -> anyhow::Result<u64>;

    // invitees
    async fn insert_invitee(&self, new: NewInvitee) -> anyhow::Result<Invitee>;
    async fn update_invitee(&self, id: InviteeId, contact: InviteeContact)
        -> anyhow::Result<Invitee>;
    async fn find_account_invitee(
        &self,
        event_id: EventId,
        account_id: AccountId,
    ) -> anyhow::Result<Option<Invitee>>;
    async fn find_anonymous_invitee_by_phone(
        &self,
        event_id: EventId,
        phone: &str,
    ) -> anyhow::Result<Option<Invitee>>;

    // rsvps
    /// Insert or overwrite the single RSVP belonging to `invitee_id`.
    async fn upsert_rsvp(
        &self,
        invitee_id: InviteeId,
        event_id: EventId,
        response: RsvpResponse,
        party: PartySize,
    ) -> anyhow::Result<Rsvp>;
    async fn find_rsvp_for_invitee(&self, invitee_id: InviteeId) -> anyhow::Result<Option<Rsvp>>;
    /// Invitees of an event with their account and RSVP, ordered by display name.
    async fn list_guests(&self, event_id: EventId) -> anyhow::Result<Vec<Guest>>;
    async fn list_rsvps(&self, event_id: EventId) -> anyhow::Result<Vec<Rsvp>>;

    // comments
    async fn insert_comment(&self, new: NewComment) -> anyhow::Result<Comment>;
    /// Oldest first.
    async fn list_comments(&self, event_id: EventId) -> anyhow::Result<Vec<Comment>>;
}
