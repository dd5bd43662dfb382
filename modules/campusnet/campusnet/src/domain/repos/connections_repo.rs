use async_trait::async_trait;
use campusnet_sdk::{Connection, ConnectionRequest, RequestStatus};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;

#[async_trait]
pub trait ConnectionsRepository: Send + Sync {
    async fn find_request(&self, id: Uuid) -> Result<Option<ConnectionRequest>, DomainError>;

    /// Pending request from `sender` to `receiver`, direction-sensitive.
    async fn find_pending(
        &self,
        sender: Uuid,
        receiver: Uuid,
    ) -> Result<Option<ConnectionRequest>, DomainError>;

    async fn insert_request(&self, request: &ConnectionRequest) -> Result<(), DomainError>;

    /// Pending requests addressed to `receiver`, newest `sent_at` first.
    async fn pending_for(&self, receiver: Uuid) -> Result<Vec<ConnectionRequest>, DomainError>;

    /// Ids of every identity sharing a pending request with `user`.
    async fn pending_counterparts(&self, user: Uuid) -> Result<Vec<Uuid>, DomainError>;

    /// Move a pending request to a terminal state without side effects.
    ///
    /// Returns `false` when the request was no longer pending.
    async fn close_request(
        &self,
        id: Uuid,
        status: RequestStatus,
        responded_at: OffsetDateTime,
    ) -> Result<bool, DomainError>;

    /// Mark the request accepted and create both connection rows in one
    /// transaction. Returns `false` (and writes nothing) when the request was
    /// no longer pending.
    async fn accept_request(
        &self,
        request: &ConnectionRequest,
        responded_at: OffsetDateTime,
    ) -> Result<bool, DomainError>;

    /// Whether a row `owner -> peer` exists.
    async fn connection_exists(&self, owner: Uuid, peer: Uuid) -> Result<bool, DomainError>;

    /// Rows owned by `owner`, newest `connected_at` first.
    async fn connections_of(&self, owner: Uuid) -> Result<Vec<Connection>, DomainError>;

    /// Delete both directions. Returns the number of rows removed.
    async fn delete_pair(&self, a: Uuid, b: Uuid) -> Result<u64, DomainError>;

    async fn count_connection_rows(&self) -> Result<u64, DomainError>;

    async fn count_pending(&self) -> Result<u64, DomainError>;
}
