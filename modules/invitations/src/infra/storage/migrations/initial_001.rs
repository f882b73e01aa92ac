use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    IsAdmin,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    Host,
    StartsAt,
    Location,
    Registry1,
    Registry2,
    HeaderImage,
    CardTheme,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Invitees {
    Table,
    Id,
    EventId,
    AccountId,
    Name,
    Email,
    Phone,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Rsvps {
    Table,
    Id,
    InviteeId,
    EventId,
    Response,
    Adults,
    Kids,
    RespondedAt,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    EventId,
    AccountId,
    AuthorName,
    Body,
    CreatedAt,
}

fn id_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn text_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name).string().not_null().default("").to_owned()
}

fn timestamp_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(id_column(Accounts::Id))
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(ColumnDef::new(Accounts::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Accounts::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp_column(Accounts::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(id_column(Events::Id))
                    .col(ColumnDef::new(Events::OwnerId).integer().null())
                    .col(ColumnDef::new(Events::Title).string().not_null())
                    .col(text_column(Events::Description))
                    .col(text_column(Events::Host))
                    .col(text_column(Events::StartsAt))
                    .col(text_column(Events::Location))
                    .col(text_column(Events::Registry1))
                    .col(text_column(Events::Registry2))
                    .col(text_column(Events::HeaderImage))
                    .col(
                        ColumnDef::new(Events::CardTheme)
                            .string()
                            .not_null()
                            .default("ocean"),
                    )
                    .col(timestamp_column(Events::CreatedAt))
                    .col(timestamp_column(Events::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_owner")
                            .from(Events::Table, Events::OwnerId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Invitees::Table)
                    .if_not_exists()
                    .col(id_column(Invitees::Id))
                    .col(ColumnDef::new(Invitees::EventId).integer().not_null())
                    .col(ColumnDef::new(Invitees::AccountId).integer().null())
                    .col(ColumnDef::new(Invitees::Name).string().not_null())
                    .col(ColumnDef::new(Invitees::Email).string().null())
                    .col(ColumnDef::new(Invitees::Phone).string().null())
                    .col(timestamp_column(Invitees::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invitees_event")
                            .from(Invitees::Table, Invitees::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invitees_account")
                            .from(Invitees::Table, Invitees::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // One invitee per (event, account); NULL accounts are not constrained.
        manager
            .create_index(
                Index::create()
                    .name("ux_invitees_event_account")
                    .table(Invitees::Table)
                    .col(Invitees::EventId)
                    .col(Invitees::AccountId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_invitees_event_phone")
                    .table(Invitees::Table)
                    .col(Invitees::EventId)
                    .col(Invitees::Phone)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rsvps::Table)
                    .if_not_exists()
                    .col(id_column(Rsvps::Id))
                    .col(
                        ColumnDef::new(Rsvps::InviteeId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Rsvps::EventId).integer().not_null())
                    .col(ColumnDef::new(Rsvps::Response).string().not_null())
                    .col(ColumnDef::new(Rsvps::Adults).integer().not_null().default(1))
                    .col(ColumnDef::new(Rsvps::Kids).integer().not_null().default(0))
                    .col(timestamp_column(Rsvps::RespondedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rsvps_invitee")
                            .from(Rsvps::Table, Rsvps::InviteeId)
                            .to(Invitees::Table, Invitees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rsvps_event")
                            .from(Rsvps::Table, Rsvps::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(id_column(Comments::Id))
                    .col(ColumnDef::new(Comments::EventId).integer().not_null())
                    .col(ColumnDef::new(Comments::AccountId).integer().null())
                    .col(ColumnDef::new(Comments::AuthorName).string().not_null())
                    .col(ColumnDef::new(Comments::Body).text().not_null())
                    .col(timestamp_column(Comments::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_event")
                            .from(Comments::Table, Comments::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_account")
                            .from(Comments::Table, Comments::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Comments::Table.into_iden(),
            Rsvps::Table.into_iden(),
            Invitees::Table.into_iden(),
            Events::Table.into_iden(),
            Accounts::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
