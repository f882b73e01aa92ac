//! SeaORM-backed implementation of [`InvitationsRepository`].
//!
//! Generic over the connection so tests and the server can hand in any
//! `DatabaseConnection`. Event deletion opens its own transaction.

use std::collections::HashMap;

use anyhow::{anyhow, Context};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::entities::{account, comment, event, invitee, rsvp};
use crate::contract::model::{
    Account, AccountId, Comment, Event, EventDraft, EventId, Guest, Invitee, InviteeContact,
    InviteeId, NewAccount, NewComment, NewInvitee, PartySize, Rsvp, RsvpResponse,
};
use crate::domain::repo::InvitationsRepository;

pub struct SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn party_columns(party: PartySize) -> anyhow::Result<(i32, i32)> {
    let adults = i32::try_from(party.adults).context("adults out of range")?;
    let kids = i32::try_from(party.kids).context("kids out of range")?;
    Ok((adults, kids))
}

fn apply_draft(am: &mut event::ActiveModel, draft: EventDraft) {
    am.title = Set(draft.title);
    am.description = Set(draft.description);
    am.host = Set(draft.host);
    am.starts_at = Set(draft.starts_at);
    am.location = Set(draft.location);
    am.registry1 = Set(draft.registry1);
    am.registry2 = Set(draft.registry2);
    am.header_image = Set(draft.header_image);
    am.card_theme = Set(draft.card_theme.as_str().to_string());
}

#[async_trait::async_trait]
impl<C> InvitationsRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn insert_account(&self, new: NewAccount) -> anyhow::Result<Account> {
        let am = account::ActiveModel {
            name: Set(new.name),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            is_admin: Set(new.is_admin),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let row = am.insert(&self.conn).await.context("insert_account failed")?;
        Ok(row.into())
    }

    async fn find_account(&self, id: AccountId) -> anyhow::Result<Option<Account>> {
        let found = account::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_account failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_account_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        let found = account::Entity::find()
            .filter(account::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_account_by_email failed")?;
        Ok(found.map(Into::into))
    }

    async fn count_accounts(&self) -> anyhow::Result<u64> {
        account::Entity::find()
            .count(&self.conn)
            .await
            .context("count_accounts failed")
    }

    async fn first_admin(&self) -> anyhow::Result<Option<Account>> {
        let found = account::Entity::find()
            .filter(account::Column::IsAdmin.eq(true))
            .order_by_asc(account::Column::Id)
            .one(&self.conn)
            .await
            .context("first_admin failed")?;
        Ok(found.map(Into::into))
    }

    async fn insert_event(
        &self,
        owner_id: Option<AccountId>,
        draft: EventDraft,
    ) -> anyhow::Result<Event> {
        let now = Utc::now();
        let mut am = event::ActiveModel {
            owner_id: Set(owner_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        apply_draft(&mut am, draft);
        let row = am.insert(&self.conn).await.context("insert_event failed")?;
        Ok(row.into())
    }

    async fn find_event(&self, id: EventId) -> anyhow::Result<Option<Event>> {
        let found = event::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_event failed")?;
        Ok(found.map(Into::into))
    }

    async fn list_events(&self) -> anyhow::Result<Vec<Event>> {
        let rows = event::Entity::find()
            .order_by_asc(event::Column::Id)
            .all(&self.conn)
            .await
            .context("list_events failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_event(&self, id: EventId, draft: EventDraft) -> anyhow::Result<Event> {
        let row = event::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("update_event lookup failed")?
            .ok_or_else(|| anyhow!("event {id} not found"))?;
        let mut am = row.into_active_model();
        apply_draft(&mut am, draft);
        am.updated_at = Set(Utc::now());
        let row = am.update(&self.conn).await.context("update_event failed")?;
        Ok(row.into())
    }

    async fn delete_event(&self, id: EventId) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await.context("delete_event begin failed")?;

        comment::Entity::delete_many()
            .filter(comment::Column::EventId.eq(id))
            .exec(&txn)
            .await
            .context("delete_event comments failed")?;
        rsvp::Entity::delete_many()
            .filter(rsvp::Column::EventId.eq(id))
            .exec(&txn)
            .await
            .context("delete_event rsvps failed")?;
        invitee::Entity::delete_many()
            .filter(invitee::Column::EventId.eq(id))
            .exec(&txn)
            .await
            .context("delete_event invitees failed")?;
        let res = event::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .context("delete_event failed")?;

        txn.commit().await.context("delete_event commit failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn count_events(&self) -> anyhow::Result<u64> {
        event::Entity::find()
            .count(&self.conn)
            .await
            .context("count_events failed")
    }

    async fn insert_invitee(&self, new: NewInvitee) -> anyhow::Result<Invitee> {
        let am = invitee::ActiveModel {
            event_id: Set(new.event_id),
            account_id: Set(new.account_id),
            name: Set(new.name),
            email: Set(new.email),
            phone: Set(new.phone),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let row = am.insert(&self.conn).await.context("insert_invitee failed")?;
        Ok(row.into())
    }

    async fn update_invitee(
        &self,
        id: InviteeId,
        contact: InviteeContact,
    ) -> anyhow::Result<Invitee> {
        let row = invitee::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("update_invitee lookup failed")?
            .ok_or_else(|| anyhow!("invitee {id} not found"))?;
        let mut am = row.into_active_model();
        am.name = Set(contact.name);
        am.email = Set(contact.email);
        am.phone = Set(contact.phone);
        let row = am.update(&self.conn).await.context("update_invitee failed")?;
        Ok(row.into())
    }

    async fn find_account_invitee(
        &self,
        event_id: EventId,
        account_id: AccountId,
    ) -> anyhow::Result<Option<Invitee>> {
        let found = invitee::Entity::find()
            .filter(invitee::Column::EventId.eq(event_id))
            .filter(invitee::Column::AccountId.eq(account_id))
            .one(&self.conn)
            .await
            .context("find_account_invitee failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_anonymous_invitee_by_phone(
        &self,
        event_id: EventId,
        phone: &str,
    ) -> anyhow::Result<Option<Invitee>> {
        let found = invitee::Entity::find()
            .filter(invitee::Column::EventId.eq(event_id))
            .filter(invitee::Column::AccountId.is_null())
            .filter(invitee::Column::Phone.eq(phone))
            .order_by_asc(invitee::Column::Id)
            .one(&self.conn)
            .await
            .context("find_anonymous_invitee_by_phone failed")?;
        Ok(found.map(Into::into))
    }

    async fn upsert_rsvp(
        &self,
        invitee_id: InviteeId,
        event_id: EventId,
        response: RsvpResponse,
        party: PartySize,
    ) -> anyhow::Result<Rsvp> {
        let (adults, kids) = party_columns(party)?;
        let existing = rsvp::Entity::find()
            .filter(rsvp::Column::InviteeId.eq(invitee_id))
            .one(&self.conn)
            .await
            .context("upsert_rsvp lookup failed")?;

        let row = match existing {
            Some(found) => {
                let mut am = found.into_active_model();
                am.response = Set(response.as_str().to_string());
                am.adults = Set(adults);
                am.kids = Set(kids);
                am.responded_at = Set(Utc::now());
                am.update(&self.conn).await.context("upsert_rsvp update failed")?
            }
            None => {
                let am = rsvp::ActiveModel {
                    invitee_id: Set(invitee_id),
                    event_id: Set(event_id),
                    response: Set(response.as_str().to_string()),
                    adults: Set(adults),
                    kids: Set(kids),
                    responded_at: Set(Utc::now()),
                    ..Default::default()
                };
                am.insert(&self.conn).await.context("upsert_rsvp insert failed")?
            }
        };
        Rsvp::try_from(row)
    }

    async fn find_rsvp_for_invitee(&self, invitee_id: InviteeId) -> anyhow::Result<Option<Rsvp>> {
        rsvp::Entity::find()
            .filter(rsvp::Column::InviteeId.eq(invitee_id))
            .one(&self.conn)
            .await
            .context("find_rsvp_for_invitee failed")?
            .map(Rsvp::try_from)
            .transpose()
    }

    async fn list_guests(&self, event_id: EventId) -> anyhow::Result<Vec<Guest>> {
        let rows = invitee::Entity::find()
            .filter(invitee::Column::EventId.eq(event_id))
            .find_also_related(account::Entity)
            .all(&self.conn)
            .await
            .context("list_guests failed")?;

        let mut rsvps: HashMap<InviteeId, Rsvp> = self
            .list_rsvps(event_id)
            .await?
            .into_iter()
            .map(|r| (r.invitee_id, r))
            .collect();

        let mut guests: Vec<Guest> = rows
            .into_iter()
            .map(|(inv, acc)| Guest {
                rsvp: rsvps.remove(&inv.id),
                invitee: inv.into(),
                account: acc.map(Into::into),
            })
            .collect();
        guests.sort_by(|a, b| {
            a.name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
                .then(a.invitee.id.cmp(&b.invitee.id))
        });
        Ok(guests)
    }

    async fn list_rsvps(&self, event_id: EventId) -> anyhow::Result<Vec<Rsvp>> {
        rsvp::Entity::find()
            .filter(rsvp::Column::EventId.eq(event_id))
            .order_by_asc(rsvp::Column::Id)
            .all(&self.conn)
            .await
            .context("list_rsvps failed")?
            .into_iter()
            .map(Rsvp::try_from)
            .collect()
    }

    async fn insert_comment(&self, new: NewComment) -> anyhow::Result<Comment> {
        let am = comment::ActiveModel {
            event_id: Set(new.event_id),
            account_id: Set(new.account_id),
            author_name: Set(new.author_name),
            body: Set(new.body),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let row = am.insert(&self.conn).await.context("insert_comment failed")?;
        Ok(row.into())
    }

    async fn list_comments(&self, event_id: EventId) -> anyhow::Result<Vec<Comment>> {
        let rows = comment::Entity::find()
            .filter(comment::Column::EventId.eq(event_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.conn)
            .await
            .context("list_comments failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
