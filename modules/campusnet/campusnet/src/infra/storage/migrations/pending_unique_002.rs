use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

const INDEX_NAME: &str = "ux_connection_requests_pending_pair";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // Older databases may already hold duplicates; keep the earliest pending one.
        conn.execute_unprepared(
            r"
UPDATE connection_requests SET status = 'cancelled'
WHERE status = 'pending' AND EXISTS (
    SELECT 1 FROM connection_requests older
    WHERE older.sender_id = connection_requests.sender_id
      AND older.receiver_id = connection_requests.receiver_id
      AND older.status = 'pending'
      AND (older.sent_at < connection_requests.sent_at
           OR (older.sent_at = connection_requests.sent_at
               AND older.id < connection_requests.id))
)",
        )
        .await?;

        // Partial index syntax is shared by SQLite and Postgres.
        conn.execute_unprepared(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {INDEX_NAME} \
             ON connection_requests (sender_id, receiver_id) WHERE status = 'pending'"
        ))
        .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(&format!("DROP INDEX IF EXISTS {INDEX_NAME}"))
            .await?;
        Ok(())
    }
}
