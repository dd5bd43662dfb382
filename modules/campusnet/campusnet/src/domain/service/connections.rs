use std::collections::HashMap;
use std::sync::Arc;

use campusnet_sdk::{
    ConnectionRequest, ConnectionStatus, ConnectionWithPeer, PendingRequest, RequestStatus,
    UserFilter, UserSummary,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::ServiceConfig;
use crate::domain::error::DomainError;
use crate::domain::repos::{ConnectionsRepository, UsersRepository};

const REQUEST: &str = "Connection request";

/// The connection-request workflow.
///
/// Requests move `pending -> accepted | rejected | cancelled` exactly once.
/// Accepting a request yields two symmetric connection rows.
pub struct ConnectionsService {
    repo: Arc<dyn ConnectionsRepository>,
    users: Arc<dyn UsersRepository>,
    config: ServiceConfig,
}

impl ConnectionsService {
    pub fn new(
        repo: Arc<dyn ConnectionsRepository>,
        users: Arc<dyn UsersRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            users,
            config,
        }
    }

    /// # Errors
    /// `Validation` for a self-request or an oversized message, `NotFound`
    /// for an unknown receiver, `AlreadyConnected` / `DuplicateRequest` when
    /// the pair is already linked.
    pub async fn send_request(
        &self,
        sender: Uuid,
        receiver: Uuid,
        message: Option<String>,
    ) -> Result<ConnectionRequest, DomainError> {
        tracing::info!(%sender, %receiver, "Sending connection request");

        if sender == receiver {
            return Err(DomainError::validation(
                "receiverId",
                "You cannot send a connection request to yourself",
            ));
        }
        let message = message.unwrap_or_default();
        if message.chars().count() > self.config.max_message_length {
            return Err(DomainError::validation(
                "message",
                format!(
                    "Message must be at most {} characters",
                    self.config.max_message_length
                ),
            ));
        }
        if self.users.find_by_id(receiver).await?.is_none() {
            return Err(DomainError::not_found("User"));
        }

        if self.repo.connection_exists(sender, receiver).await?
            || self.repo.connection_exists(receiver, sender).await?
        {
            return Err(DomainError::AlreadyConnected);
        }
        if self.repo.find_pending(sender, receiver).await?.is_some() {
            return Err(DomainError::DuplicateRequest);
        }

        let request = ConnectionRequest {
            id: Uuid::new_v4(),
            sender_id: sender,
            receiver_id: receiver,
            status: RequestStatus::Pending,
            message,
            sent_at: OffsetDateTime::now_utc(),
            responded_at: None,
        };
        self.repo.insert_request(&request).await?;

        tracing::info!(request_id = %request.id, "Connection request sent");
        Ok(request)
    }

    /// Pending requests addressed to `receiver`, newest first, with the
    /// sender's public profile. Requests whose sender no longer exists are
    /// skipped.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn list_pending(&self, receiver: Uuid) -> Result<Vec<PendingRequest>, DomainError> {
        tracing::debug!(%receiver, "Listing pending requests");

        let requests = self.repo.pending_for(receiver).await?;
        let sender_ids: Vec<Uuid> = requests.iter().map(|r| r.sender_id).collect();
        let senders = self
            .profiles_by_id(&sender_ids, &UserFilter::default())
            .await?;

        Ok(requests
            .into_iter()
            .filter_map(|request| {
                senders
                    .get(&request.sender_id)
                    .cloned()
                    .map(|sender| PendingRequest { request, sender })
            })
            .collect())
    }

    /// # Errors
    /// `NotFound`, `Forbidden` unless `actor` is the receiver, `Validation`
    /// if the request is no longer pending.
    pub async fn accept(
        &self,
        request_id: Uuid,
        actor: Uuid,
    ) -> Result<ConnectionRequest, DomainError> {
        tracing::info!(%request_id, %actor, "Accepting connection request");

        let mut request = self.load_request(request_id).await?;
        if request.receiver_id != actor {
            return Err(DomainError::forbidden("Unauthorized to accept this request"));
        }
        ensure_pending(&request)?;

        let now = OffsetDateTime::now_utc();
        if !self.repo.accept_request(&request, now).await? {
            return Err(no_longer_pending());
        }
        request.status = RequestStatus::Accepted;
        request.responded_at = Some(now);

        tracing::info!(
            %request_id,
            sender = %request.sender_id,
            receiver = %request.receiver_id,
            "Connection established"
        );
        Ok(request)
    }

    /// # Errors
    /// `NotFound`, `Forbidden` unless `actor` is the receiver, `Validation`
    /// if the request is no longer pending.
    pub async fn reject(
        &self,
        request_id: Uuid,
        actor: Uuid,
    ) -> Result<ConnectionRequest, DomainError> {
        tracing::info!(%request_id, %actor, "Rejecting connection request");

        let request = self.load_request(request_id).await?;
        if request.receiver_id != actor {
            return Err(DomainError::forbidden("Unauthorized to reject this request"));
        }
        self.close(request, RequestStatus::Rejected).await
    }

    /// Sender withdraws their own pending request.
    ///
    /// # Errors
    /// `NotFound`, `Forbidden` unless `actor` is the sender, `Validation`
    /// if the request is no longer pending.
    pub async fn cancel(
        &self,
        request_id: Uuid,
        actor: Uuid,
    ) -> Result<ConnectionRequest, DomainError> {
        tracing::info!(%request_id, %actor, "Cancelling connection request");

        let request = self.load_request(request_id).await?;
        if request.sender_id != actor {
            return Err(DomainError::forbidden("Unauthorized to cancel this request"));
        }
        self.close(request, RequestStatus::Cancelled).await
    }

    /// Deletes both directions. Idempotent.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn remove(&self, owner: Uuid, peer: Uuid) -> Result<(), DomainError> {
        let removed = self.repo.delete_pair(owner, peer).await?;
        tracing::info!(%owner, %peer, removed, "Connection removed");
        Ok(())
    }

    /// Relationship of `a` towards `b`. Connected wins over pending.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn status(&self, a: Uuid, b: Uuid) -> Result<ConnectionStatus, DomainError> {
        if self.repo.connection_exists(a, b).await? {
            return Ok(ConnectionStatus::Connected);
        }
        if self.repo.find_pending(a, b).await?.is_some() {
            return Ok(ConnectionStatus::PendingSent);
        }
        if self.repo.find_pending(b, a).await?.is_some() {
            return Ok(ConnectionStatus::PendingReceived);
        }
        Ok(ConnectionStatus::NotConnected)
    }

    /// The owner's connections, newest first, narrowed by `filter`.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn list_connections(
        &self,
        owner: Uuid,
        filter: &UserFilter,
    ) -> Result<Vec<ConnectionWithPeer>, DomainError> {
        tracing::debug!(%owner, "Listing connections");

        let rows = self.repo.connections_of(owner).await?;
        let peer_ids: Vec<Uuid> = rows.iter().map(|c| c.peer_id).collect();
        let peers = self.profiles_by_id(&peer_ids, filter).await?;

        Ok(rows
            .into_iter()
            .filter_map(|connection| {
                peers
                    .get(&connection.peer_id)
                    .cloned()
                    .map(|peer| ConnectionWithPeer { connection, peer })
            })
            .collect())
    }

    /// Identities the requester could send a request to.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn list_available(
        &self,
        requester: Uuid,
        filter: &UserFilter,
    ) -> Result<Vec<UserSummary>, DomainError> {
        tracing::debug!(%requester, "Listing available users");

        let mut exclude = vec![requester];
        exclude.extend(
            self.repo
                .connections_of(requester)
                .await?
                .into_iter()
                .map(|c| c.peer_id),
        );
        exclude.extend(self.repo.pending_counterparts(requester).await?);
        exclude.sort_unstable();
        exclude.dedup();

        self.users
            .discover(&exclude, filter, self.config.available_users_limit)
            .await
    }

    async fn load_request(&self, id: Uuid) -> Result<ConnectionRequest, DomainError> {
        self.repo
            .find_request(id)
            .await?
            .ok_or_else(|| DomainError::not_found(REQUEST))
    }

    async fn close(
        &self,
        mut request: ConnectionRequest,
        status: RequestStatus,
    ) -> Result<ConnectionRequest, DomainError> {
        ensure_pending(&request)?;

        let now = OffsetDateTime::now_utc();
        if !self.repo.close_request(request.id, status, now).await? {
            return Err(no_longer_pending());
        }
        request.status = status;
        request.responded_at = Some(now);

        tracing::info!(request_id = %request.id, status = %status, "Connection request closed");
        Ok(request)
    }

    async fn profiles_by_id(
        &self,
        ids: &[Uuid],
        filter: &UserFilter,
    ) -> Result<HashMap<Uuid, UserSummary>, DomainError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .users
            .summaries(ids, filter)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect())
    }
}

fn ensure_pending(request: &ConnectionRequest) -> Result<(), DomainError> {
    if request.status.is_terminal() {
        return Err(no_longer_pending());
    }
    Ok(())
}

fn no_longer_pending() -> DomainError {
    DomainError::validation("requestId", "Connection request is no longer pending")
}
