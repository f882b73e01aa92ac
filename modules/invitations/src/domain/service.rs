use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument, warn};

use super::calendar;
use super::error::DomainError;
use super::ports::{Notifier, RsvpNotice};
use super::repo::InvitationsRepository;
use crate::contract::model::{
    Account, AccountId, AnonymousRsvp, CardTheme, Comment, Delivery, Event, EventDraft, EventId,
    Guest, Invitee, InviteeContact, NewAccount, NewComment, NewInvitee, PartySize, Rsvp,
    RsvpReceipt, RsvpResponse, RsvpStats,
};
use crate::infra::auth::password;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Host part of the public URL, used for calendar UIDs.
    pub public_host: String,
    pub max_party_size: u32,
    pub max_title_length: usize,
    pub max_comment_length: usize,
    pub max_name_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            public_host: "localhost".to_string(),
            max_party_size: 20,
            max_title_length: 200,
            max_comment_length: 2000,
            max_name_length: 100,
        }
    }
}

/// Invitations domain service: accounts, events, RSVPs and comments.
pub struct Service {
    repo: Arc<dyn InvitationsRepository>,
    notifier: Arc<dyn Notifier>,
    config: ServiceConfig,
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

fn optional(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Service {
    pub fn new(
        repo: Arc<dyn InvitationsRepository>,
        notifier: Arc<dyn Notifier>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ---------------------------------------------------------------- accounts

    /// Create an account. The first account ever registered becomes admin and
    /// every new account is invited to the first event.
    #[instrument(name = "invitations.service.register", skip(self, name, email, password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, DomainError> {
        let name = self.validate_name("name", name)?;
        let email = validate_email(email)?;
        if password.is_empty() {
            return Err(DomainError::validation("password", "cannot be empty"));
        }

        if self
            .repo
            .find_account_by_email(&email)
            .await
            .map_err(db_err)?
            .is_some()
        {
            return Err(DomainError::email_already_registered(email));
        }

        let is_admin = self.repo.count_accounts().await.map_err(db_err)? == 0;
        let password_hash =
            password::hash_password(password).map_err(|e| DomainError::internal(e.to_string()))?;

        let account = self
            .repo
            .insert_account(NewAccount {
                name,
                email,
                password_hash,
                is_admin,
            })
            .await
            .map_err(db_err)?;
        info!(account_id = account.id, is_admin, "account registered");

        if let Some(event) = self.first_event().await? {
            self.ensure_account_invitee(&account, event.id).await?;
            debug!(account_id = account.id, event_id = event.id, "auto-invited new account");
        }

        Ok(account)
    }

    #[instrument(name = "invitations.service.authenticate", skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, DomainError> {
        let email = email.trim().to_ascii_lowercase();
        let account = self
            .repo
            .find_account_by_email(&email)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::InvalidCredentials)?;

        if !password::verify_password(password, &account.password_hash) {
            return Err(DomainError::InvalidCredentials);
        }
        Ok(account)
    }

    pub async fn account(&self, id: AccountId) -> Result<Account, DomainError> {
        self.repo
            .find_account(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::account_not_found(id))
    }

    // ---------------------------------------------------------------- events

    pub async fn first_event(&self) -> Result<Option<Event>, DomainError> {
        Ok(self.list_events().await?.into_iter().next())
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, DomainError> {
        self.repo.list_events().await.map_err(db_err)
    }

    pub async fn event(&self, id: EventId) -> Result<Event, DomainError> {
        self.repo
            .find_event(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::event_not_found(id))
    }

    #[instrument(name = "invitations.service.create_event", skip(self, actor, draft), fields(actor = actor.id))]
    pub async fn create_event(&self, actor: &Account, draft: EventDraft) -> Result<Event, DomainError> {
        if !actor.is_admin {
            return Err(DomainError::forbidden("only admins can create events"));
        }
        let draft = self.validate_draft(draft)?;
        let event = self
            .repo
            .insert_event(Some(actor.id), draft)
            .await
            .map_err(db_err)?;
        info!(event_id = event.id, "event created");
        Ok(event)
    }

    #[instrument(name = "invitations.service.update_event", skip(self, actor, draft), fields(actor = actor.id))]
    pub async fn update_event(
        &self,
        actor: &Account,
        id: EventId,
        draft: EventDraft,
    ) -> Result<Event, DomainError> {
        let event = self.event(id).await?;
        ensure_can_manage(actor, &event)?;
        let draft = self.validate_draft(draft)?;
        let updated = self.repo.update_event(id, draft).await.map_err(db_err)?;
        info!(event_id = id, "event updated");
        Ok(updated)
    }

    #[instrument(name = "invitations.service.delete_event", skip(self, actor), fields(actor = actor.id))]
    pub async fn delete_event(&self, actor: &Account, id: EventId) -> Result<(), DomainError> {
        let event = self.event(id).await?;
        ensure_can_manage(actor, &event)?;
        if !self.repo.delete_event(id).await.map_err(db_err)? {
            return Err(DomainError::event_not_found(id));
        }
        info!(event_id = id, "event deleted");
        Ok(())
    }

    /// Insert the welcome event into an empty database.
    pub async fn seed_default_event(&self) -> Result<Option<Event>, DomainError> {
        if self.repo.count_events().await.map_err(db_err)? > 0 {
            return Ok(None);
        }
        let starts = (Utc::now() + Duration::days(30)).date_naive();
        let draft = EventDraft {
            title: "You're invited!".to_string(),
            description: "Join us for an afternoon of good food and good company. \
                          Sign in as the admin to change these details."
                .to_string(),
            host: "Your Host".to_string(),
            starts_at: format!("{}T11:00", starts.format("%Y-%m-%d")),
            location: "To be announced".to_string(),
            card_theme: CardTheme::Ocean,
            ..EventDraft::default()
        };
        let event = self.repo.insert_event(None, draft).await.map_err(db_err)?;
        info!(event_id = event.id, "seeded default event");
        Ok(Some(event))
    }

    /// `.ics` export for an event.
    pub async fn calendar_export(&self, id: EventId) -> Result<String, DomainError> {
        let event = self.event(id).await?;
        calendar::ics_document(&event, &self.config.public_host, Utc::now()).ok_or_else(|| {
            DomainError::validation("starts_at", "event has no valid start time")
        })
    }

    // ---------------------------------------------------------------- rsvps

    /// The account's current RSVP for an event, if any.
    pub async fn account_rsvp(
        &self,
        event_id: EventId,
        account_id: AccountId,
    ) -> Result<Option<Rsvp>, DomainError> {
        let Some(invitee) = self
            .repo
            .find_account_invitee(event_id, account_id)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        self.repo
            .find_rsvp_for_invitee(invitee.id)
            .await
            .map_err(db_err)
    }

    #[instrument(name = "invitations.service.submit_account_rsvp", skip(self, account), fields(account_id = account.id))]
    pub async fn submit_account_rsvp(
        &self,
        account: &Account,
        event_id: EventId,
        response: RsvpResponse,
        party: PartySize,
    ) -> Result<RsvpReceipt, DomainError> {
        let event = self.event(event_id).await?;
        let party = self.normalize_party(response, party)?;
        let invitee = self.ensure_account_invitee(account, event_id).await?;

        let rsvp = self
            .repo
            .upsert_rsvp(invitee.id, event_id, response, party)
            .await
            .map_err(db_err)?;
        info!(rsvp_id = rsvp.id, response = %response, "account RSVP recorded");

        let delivery = self.notify(&event, &invitee, &rsvp).await;
        Ok(RsvpReceipt {
            invitee,
            rsvp,
            delivery,
        })
    }

    /// Record an RSVP without an account. An earlier anonymous response with
    /// the same phone number is overwritten rather than duplicated.
    #[instrument(name = "invitations.service.submit_anonymous_rsvp", skip(self, form))]
    pub async fn submit_anonymous_rsvp(
        &self,
        event_id: EventId,
        form: AnonymousRsvp,
    ) -> Result<RsvpReceipt, DomainError> {
        let event = self.event(event_id).await?;
        let name = self.validate_name("name", &form.name)?;
        let phone = form.phone.trim().to_string();
        if phone.is_empty() {
            return Err(DomainError::validation("phone", "cannot be empty"));
        }
        let email = match optional(form.email) {
            Some(e) => Some(validate_email(&e)?),
            None => None,
        };
        let party = self.normalize_party(form.response, form.party)?;

        let contact = InviteeContact {
            name,
            email,
            phone: Some(phone.clone()),
        };
        let existing = self
            .repo
            .find_anonymous_invitee_by_phone(event_id, &phone)
            .await
            .map_err(db_err)?;
        let invitee = match existing {
            Some(found) => {
                debug!(invitee_id = found.id, "updating anonymous invitee matched by phone");
                self.repo
                    .update_invitee(found.id, contact)
                    .await
                    .map_err(db_err)?
            }
            None => self
                .repo
                .insert_invitee(NewInvitee {
                    event_id,
                    account_id: None,
                    name: contact.name,
                    email: contact.email,
                    phone: contact.phone,
                })
                .await
                .map_err(db_err)?,
        };

        let rsvp = self
            .repo
            .upsert_rsvp(invitee.id, event_id, form.response, party)
            .await
            .map_err(db_err)?;
        info!(rsvp_id = rsvp.id, response = %form.response, "anonymous RSVP recorded");

        let delivery = self.notify(&event, &invitee, &rsvp).await;
        Ok(RsvpReceipt {
            invitee,
            rsvp,
            delivery,
        })
    }

    pub async fn list_rsvps(&self, event_id: EventId) -> Result<Vec<Rsvp>, DomainError> {
        self.event(event_id).await?;
        self.repo.list_rsvps(event_id).await.map_err(db_err)
    }

    /// Guest list and totals for the admin panel.
    pub async fn guest_list(
        &self,
        actor: &Account,
        event_id: EventId,
    ) -> Result<(Vec<Guest>, RsvpStats), DomainError> {
        let event = self.event(event_id).await?;
        ensure_can_manage(actor, &event)?;
        let guests = self.repo.list_guests(event_id).await.map_err(db_err)?;
        let stats = RsvpStats::from_guests(&guests);
        Ok((guests, stats))
    }

    // ---------------------------------------------------------------- comments

    /// Signed-in authors comment under their account name; others must give a name.
    #[instrument(name = "invitations.service.add_comment", skip(self, author, name, body))]
    pub async fn add_comment(
        &self,
        event_id: EventId,
        author: Option<&Account>,
        name: &str,
        body: &str,
    ) -> Result<Comment, DomainError> {
        self.event(event_id).await?;
        let body = body.trim();
        if body.is_empty() {
            return Err(DomainError::validation("comment", "cannot be empty"));
        }
        if body.chars().count() > self.config.max_comment_length {
            return Err(DomainError::validation(
                "comment",
                format!("must be at most {} characters", self.config.max_comment_length),
            ));
        }
        let author_name = match author {
            Some(account) => account.name.clone(),
            None => self.validate_name("comment_name", name)?,
        };

        self.repo
            .insert_comment(NewComment {
                event_id,
                account_id: author.map(|a| a.id),
                author_name,
                body: body.to_string(),
            })
            .await
            .map_err(db_err)
    }

    pub async fn comments(&self, event_id: EventId) -> Result<Vec<Comment>, DomainError> {
        self.repo.list_comments(event_id).await.map_err(db_err)
    }

    // ---------------------------------------------------------------- helpers

    async fn ensure_account_invitee(
        &self,
        account: &Account,
        event_id: EventId,
    ) -> Result<Invitee, DomainError> {
        if let Some(existing) = self
            .repo
            .find_account_invitee(event_id, account.id)
            .await
            .map_err(db_err)?
        {
            return Ok(existing);
        }
        self.repo
            .insert_invitee(NewInvitee {
                event_id,
                account_id: Some(account.id),
                name: account.name.clone(),
                email: Some(account.email.clone()),
                phone: None,
            })
            .await
            .map_err(db_err)
    }

    async fn host_email(&self, event: &Event) -> Option<String> {
        let owner = match event.owner_id {
            Some(id) => self.repo.find_account(id).await,
            None => Ok(None),
        };
        let account = match owner {
            Ok(Some(account)) => Ok(Some(account)),
            Ok(None) => self.repo.first_admin().await,
            Err(e) => Err(e),
        };
        match account {
            Ok(found) => found.map(|a| a.email),
            Err(e) => {
                warn!(error = %e, event_id = event.id, "could not look up host email");
                None
            }
        }
    }

    /// Runs after the RSVP is committed; never fails the submission.
    async fn notify(&self, event: &Event, invitee: &Invitee, rsvp: &Rsvp) -> Delivery {
        let notice = RsvpNotice {
            event_id: event.id,
            event_title: event.title.clone(),
            host_name: event.host.clone(),
            starts_at: event.starts_at.clone(),
            location: event.location.clone(),
            guest_name: invitee.name.clone(),
            guest_email: invitee.email.clone(),
            response: rsvp.response,
            party: rsvp.party,
            anonymous: invitee.is_anonymous(),
            host_email: self.host_email(event).await,
        };

        let delivery = self.notifier.notify_rsvp(&notice).await;
        match &delivery {
            Delivery::Failed { reason } => {
                warn!(rsvp_id = rsvp.id, %reason, "RSVP notification failed")
            }
            other => debug!(rsvp_id = rsvp.id, outcome = ?other, "RSVP notification done"),
        }
        delivery
    }

    /// Only `yes` keeps a party size; other responses store the default.
    fn normalize_party(
        &self,
        response: RsvpResponse,
        party: PartySize,
    ) -> Result<PartySize, DomainError> {
        if response != RsvpResponse::Yes {
            return Ok(PartySize::default());
        }
        let max = self.config.max_party_size;
        if party.adults < 1 || party.adults > max {
            return Err(DomainError::validation(
                "adults",
                format!("must be between 1 and {max}"),
            ));
        }
        if party.kids > max {
            return Err(DomainError::validation(
                "kids",
                format!("must be between 0 and {max}"),
            ));
        }
        Ok(party)
    }

    fn validate_name(&self, field: &str, raw: &str) -> Result<String, DomainError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(DomainError::validation(field, "cannot be empty"));
        }
        if name.chars().count() > self.config.max_name_length {
            return Err(DomainError::validation(
                field,
                format!("must be at most {} characters", self.config.max_name_length),
            ));
        }
        Ok(name.to_string())
    }

    fn validate_draft(&self, draft: EventDraft) -> Result<EventDraft, DomainError> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::validation("title", "cannot be empty"));
        }
        if title.chars().count() > self.config.max_title_length {
            return Err(DomainError::validation(
                "title",
                format!("must be at most {} characters", self.config.max_title_length),
            ));
        }

        for (field, link) in [("registry1", &draft.registry1), ("registry2", &draft.registry2)] {
            let link = link.trim();
            if link.is_empty() {
                continue;
            }
            match url::Url::parse(link) {
                Ok(u) if matches!(u.scheme(), "http" | "https") => {}
                _ => {
                    return Err(DomainError::validation(
                        field,
                        "must be an http(s) link",
                    ))
                }
            }
        }

        let header_image = draft.header_image.trim().to_string();
        if header_image.contains('/') || header_image.contains('\\') || header_image.contains("..")
        {
            return Err(DomainError::validation(
                "header_image",
                "must be a file name inside the static images directory",
            ));
        }

        Ok(EventDraft {
            title,
            description: draft.description.trim().to_string(),
            host: draft.host.trim().to_string(),
            starts_at: draft.starts_at.trim().to_string(),
            location: draft.location.trim().to_string(),
            registry1: draft.registry1.trim().to_string(),
            registry2: draft.registry2.trim().to_string(),
            header_image,
            card_theme: draft.card_theme,
        })
    }
}

fn ensure_can_manage(actor: &Account, event: &Event) -> Result<(), DomainError> {
    if actor.is_admin || event.owner_id == Some(actor.id) {
        Ok(())
    } else {
        Err(DomainError::forbidden("admin access required"))
    }
}

/// Minimal shape check; normalised to lower case.
fn validate_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_ascii_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(DomainError::validation("email", "is not a valid address"));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert_eq!(validate_email(" Ana@Example.COM ").unwrap(), "ana@example.com");
        assert!(validate_email("ana").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@localhost").is_err());
        assert!(validate_email("ana maria@example.com").is_err());
    }

    #[test]
    fn managers_are_admins_or_owners() {
        let now = Utc::now();
        let account = |id, is_admin| Account {
            id,
            name: "x".into(),
            email: "x@example.com".into(),
            password_hash: String::new(),
            is_admin,
            created_at: now,
        };
        let event = Event {
            id: 1,
            owner_id: Some(2),
            title: "t".into(),
            description: String::new(),
            host: String::new(),
            starts_at: String::new(),
            location: String::new(),
            registry1: String::new(),
            registry2: String::new(),
            header_image: String::new(),
            card_theme: CardTheme::Ocean,
            created_at: now,
            updated_at: now,
        };
        assert!(ensure_can_manage(&account(1, true), &event).is_ok());
        assert!(ensure_can_manage(&account(2, false), &event).is_ok());
        assert!(ensure_can_manage(&account(3, false), &event).is_err());
    }
}
