//! Lowercased copies of the searchable user columns.
//!
//! `lower()` folds ASCII only on `SQLite`, so case-insensitive search runs
//! against values folded in Rust at write time.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite accepts a single ADD COLUMN per ALTER TABLE.
        for column in [Users::NameSearch, Users::ProfessionSearch] {
            if manager
                .has_column(Users::Table.to_string(), column.to_string())
                .await?
            {
                continue;
            }
            manager
                .alter_table(
                    Table::alter()
                        .table(Users::Table)
                        .add_column(ColumnDef::new(column).string().not_null().default(""))
                        .to_owned(),
                )
                .await?;
        }

        backfill(manager).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("ix_users_name_search")
                    .table(Users::Table)
                    .col(Users::NameSearch)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .if_exists()
                    .name("ix_users_name_search")
                    .table(Users::Table)
                    .to_owned(),
            )
            .await?;
        for column in [Users::ProfessionSearch, Users::NameSearch] {
            manager
                .alter_table(
                    Table::alter()
                        .table(Users::Table)
                        .drop_column(column)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}

async fn backfill(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let conn = manager.get_connection();
    let select = Query::select()
        .columns([Users::Id, Users::Name, Users::Profession])
        .from(Users::Table)
        .to_owned();
    let rows = conn
        .query_all(manager.get_database_backend().build(&select))
        .await?;

    for row in rows {
        let id: Uuid = row.try_get("", "id")?;
        let name: String = row.try_get("", "name")?;
        let profession: Option<String> = row.try_get("", "profession")?;
        let update = Query::update()
            .table(Users::Table)
            .values([
                (Users::NameSearch, name.to_lowercase().into()),
                (
                    Users::ProfessionSearch,
                    profession.unwrap_or_default().to_lowercase().into(),
                ),
            ])
            .and_where(Expr::col(Users::Id).eq(id))
            .to_owned();
        manager.exec_stmt(update).await?;
    }
    Ok(())
}

#[derive(DeriveIden, Clone, Copy)]
enum Users {
    Table,
    Id,
    Name,
    Profession,
    NameSearch,
    ProfessionSearch,
}
