use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::UserType).string_len(16).not_null())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Phone).string().not_null().default(""))
                    .col(ColumnDef::new(Users::Location).string().not_null().default(""))
                    .col(ColumnDef::new(Users::Bio).text().not_null().default(""))
                    .col(ColumnDef::new(Users::Website).string().not_null().default(""))
                    .col(ColumnDef::new(Users::Github).string().not_null().default(""))
                    .col(ColumnDef::new(Users::Linkedin).string().not_null().default(""))
                    .col(ColumnDef::new(Users::Department).string())
                    .col(ColumnDef::new(Users::Year).string())
                    .col(ColumnDef::new(Users::Profession).string())
                    .col(ColumnDef::new(Users::Interests).text().not_null().default("[]"))
                    .col(ColumnDef::new(Users::Preferences).text().not_null().default("{}"))
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("ux_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ConnectionRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConnectionRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ConnectionRequests::SenderId).uuid().not_null())
                    .col(ColumnDef::new(ConnectionRequests::ReceiverId).uuid().not_null())
                    .col(
                        ColumnDef::new(ConnectionRequests::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(ConnectionRequests::Message)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ConnectionRequests::SentAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConnectionRequests::RespondedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_connection_requests_sender")
                            .from(ConnectionRequests::Table, ConnectionRequests::SenderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_connection_requests_receiver")
                            .from(ConnectionRequests::Table, ConnectionRequests::ReceiverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("ix_connection_requests_pair_status")
                    .table(ConnectionRequests::Table)
                    .col(ConnectionRequests::SenderId)
                    .col(ConnectionRequests::ReceiverId)
                    .col(ConnectionRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("ix_connection_requests_receiver_status")
                    .table(ConnectionRequests::Table)
                    .col(ConnectionRequests::ReceiverId)
                    .col(ConnectionRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Connections::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Connections::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Connections::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Connections::PeerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Connections::ConnectedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_connections_owner")
                            .from(Connections::Table, Connections::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_connections_peer")
                            .from(Connections::Table, Connections::PeerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("ux_connections_owner_peer")
                    .table(Connections::Table)
                    .col(Connections::OwnerId)
                    .col(Connections::PeerId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Connections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConnectionRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    UserType,
    Name,
    Email,
    PasswordHash,
    Phone,
    Location,
    Bio,
    Website,
    Github,
    Linkedin,
    Department,
    Year,
    Profession,
    Interests,
    Preferences,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ConnectionRequests {
    Table,
    Id,
    SenderId,
    ReceiverId,
    Status,
    Message,
    SentAt,
    RespondedAt,
}

#[derive(DeriveIden)]
enum Connections {
    Table,
    Id,
    OwnerId,
    PeerId,
    ConnectedAt,
}
