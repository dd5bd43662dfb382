use async_trait::async_trait;
use campusnet_sdk::{Connection, ConnectionRequest, RequestStatus};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::db::{db_err, unique_or_db_err};
use super::entity::{connection, connection_request};
use super::mapper::request_active_model;
use crate::domain::error::DomainError;
use crate::domain::repos::ConnectionsRepository;

const PENDING: &str = "pending";

pub struct SeaOrmConnectionsRepository {
    db: DatabaseConnection,
}

impl SeaOrmConnectionsRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Conditional `pending -> status` transition. Returns affected row count.
async fn close_pending<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    status: RequestStatus,
    responded_at: OffsetDateTime,
) -> Result<u64, DomainError> {
    let result = connection_request::Entity::update_many()
        .col_expr(
            connection_request::Column::Status,
            Expr::value(status.as_str()),
        )
        .col_expr(
            connection_request::Column::RespondedAt,
            Expr::value(Some(responded_at)),
        )
        .filter(connection_request::Column::Id.eq(id))
        .filter(connection_request::Column::Status.eq(PENDING))
        .exec(conn)
        .await
        .map_err(db_err)?;
    Ok(result.rows_affected)
}

fn to_requests(
    models: Vec<connection_request::Model>,
) -> Result<Vec<ConnectionRequest>, DomainError> {
    models.into_iter().map(ConnectionRequest::try_from).collect()
}

#[async_trait]
impl ConnectionsRepository for SeaOrmConnectionsRepository {
    async fn find_request(&self, id: Uuid) -> Result<Option<ConnectionRequest>, DomainError> {
        connection_request::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(ConnectionRequest::try_from)
            .transpose()
    }

    async fn find_pending(
        &self,
        sender: Uuid,
        receiver: Uuid,
    ) -> Result<Option<ConnectionRequest>, DomainError> {
        connection_request::Entity::find()
            .filter(connection_request::Column::SenderId.eq(sender))
            .filter(connection_request::Column::ReceiverId.eq(receiver))
            .filter(connection_request::Column::Status.eq(PENDING))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(ConnectionRequest::try_from)
            .transpose()
    }

    async fn insert_request(&self, request: &ConnectionRequest) -> Result<(), DomainError> {
        request_active_model(request)
            .insert(&self.db)
            .await
            .map_err(|e| unique_or_db_err(e, DomainError::DuplicateRequest))?;
        Ok(())
    }

    async fn pending_for(&self, receiver: Uuid) -> Result<Vec<ConnectionRequest>, DomainError> {
        let models = connection_request::Entity::find()
            .filter(connection_request::Column::ReceiverId.eq(receiver))
            .filter(connection_request::Column::Status.eq(PENDING))
            .order_by_desc(connection_request::Column::SentAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        to_requests(models)
    }

    async fn pending_counterparts(&self, user: Uuid) -> Result<Vec<Uuid>, DomainError> {
        let models = connection_request::Entity::find()
            .filter(connection_request::Column::Status.eq(PENDING))
            .filter(
                Condition::any()
                    .add(connection_request::Column::SenderId.eq(user))
                    .add(connection_request::Column::ReceiverId.eq(user)),
            )
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models
            .into_iter()
            .map(|m| {
                if m.sender_id == user {
                    m.receiver_id
                } else {
                    m.sender_id
                }
            })
            .collect())
    }

    async fn close_request(
        &self,
        id: Uuid,
        status: RequestStatus,
        responded_at: OffsetDateTime,
    ) -> Result<bool, DomainError> {
        Ok(close_pending(&self.db, id, status, responded_at).await? > 0)
    }

    async fn accept_request(
        &self,
        request: &ConnectionRequest,
        responded_at: OffsetDateTime,
    ) -> Result<bool, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        if close_pending(&txn, request.id, RequestStatus::Accepted, responded_at).await? == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Ok(false);
        }

        for (owner, peer) in [
            (request.sender_id, request.receiver_id),
            (request.receiver_id, request.sender_id),
        ] {
            let row = connection::ActiveModel {
                id: Set(Uuid::new_v4()),
                owner_id: Set(owner),
                peer_id: Set(peer),
                connected_at: Set(responded_at),
            };
            connection::Entity::insert(row)
                .on_conflict(
                    OnConflict::columns([connection::Column::OwnerId, connection::Column::PeerId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(true)
    }

    async fn connection_exists(&self, owner: Uuid, peer: Uuid) -> Result<bool, DomainError> {
        let count = connection::Entity::find()
            .filter(connection::Column::OwnerId.eq(owner))
            .filter(connection::Column::PeerId.eq(peer))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }

    async fn connections_of(&self, owner: Uuid) -> Result<Vec<Connection>, DomainError> {
        let models = connection::Entity::find()
            .filter(connection::Column::OwnerId.eq(owner))
            .order_by_desc(connection::Column::ConnectedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_pair(&self, a: Uuid, b: Uuid) -> Result<u64, DomainError> {
        let result = connection::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(connection::Column::OwnerId.eq(a))
                            .add(connection::Column::PeerId.eq(b)),
                    )
                    .add(
                        Condition::all()
                            .add(connection::Column::OwnerId.eq(b))
                            .add(connection::Column::PeerId.eq(a)),
                    ),
            )
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn count_connection_rows(&self) -> Result<u64, DomainError> {
        connection::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn count_pending(&self) -> Result<u64, DomainError> {
        connection_request::Entity::find()
            .filter(connection_request::Column::Status.eq(PENDING))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}
