use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_id: Option<i32>,
    pub title: String,
    pub description: String,
    pub host: String,
    /// As entered by the host; parsed only for display.
    pub starts_at: String,
    pub location: String,
    pub registry1: String,
    pub registry2: String,
    pub header_image: String,
    pub card_theme: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::OwnerId",
        to = "super::account::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::invitee::Entity")]
    Invitee,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::invitee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invitee.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
