use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rsvps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub invitee_id: i32,
    pub event_id: i32,
    /// "yes", "no" or "maybe"
    pub response: String,
    pub adults: i32,
    pub kids: i32,
    pub responded_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invitee::Entity",
        from = "Column::InviteeId",
        to = "super::invitee::Column::Id",
        on_delete = "Cascade"
    )]
    Invitee,
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,
}

impl Related<super::invitee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invitee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
