use std::sync::Arc;

use campusnet_sdk::{AdminStats, User, UserPage, UserType};
use uuid::Uuid;

use super::ServiceConfig;
use crate::domain::error::DomainError;
use crate::domain::repos::{ConnectionsRepository, UserListQuery, UsersRepository};

const RECENT_USERS: u64 = 5;

/// Raw listing parameters as they arrive from the caller.
#[derive(Debug, Clone, Default)]
pub struct UserListParams {
    pub user_type: Option<UserType>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

pub struct AdminService {
    users: Arc<dyn UsersRepository>,
    connections: Arc<dyn ConnectionsRepository>,
    config: ServiceConfig,
}

impl AdminService {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        connections: Arc<dyn ConnectionsRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            connections,
            config,
        }
    }

    /// # Errors
    /// Propagates repository failures.
    pub async fn stats(&self) -> Result<AdminStats, DomainError> {
        tracing::debug!("Collecting admin stats");

        let counts = self.users.count_by_type().await?;
        let rows = self.connections.count_connection_rows().await?;
        let pending = self.connections.count_pending().await?;

        Ok(AdminStats {
            total_users: counts.total(),
            student_users: counts.students,
            professional_users: counts.professionals,
            admin_users: counts.admins,
            total_connections: rows / 2,
            pending_requests: pending,
        })
    }

    /// # Errors
    /// Propagates repository failures.
    pub async fn list_users(&self, params: UserListParams) -> Result<UserPage, DomainError> {
        let limit = params
            .limit
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size);
        let page = params.page.unwrap_or(1).max(1);
        let search = params
            .search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        tracing::debug!(page, limit, "Listing users for admin");

        let (users, total) = self
            .users
            .list_page(&UserListQuery {
                user_type: params.user_type,
                search,
                offset: (page - 1).saturating_mul(limit),
                limit,
            })
            .await?;

        Ok(UserPage {
            users,
            page,
            limit,
            total,
        })
    }

    /// The newest registrations, most recent first. Admins are included.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn recent_users(&self) -> Result<Vec<User>, DomainError> {
        let (users, _) = self
            .users
            .list_page(&UserListQuery {
                user_type: None,
                search: None,
                offset: 0,
                limit: RECENT_USERS,
            })
            .await?;
        Ok(users)
    }

    /// Delete a user and everything in the connection graph that mentions it.
    ///
    /// # Errors
    /// `Validation` when an admin targets their own account, `NotFound` for
    /// an unknown user.
    pub async fn delete_user(&self, actor: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        tracing::info!(%actor, %user_id, "Deleting user");

        if actor == user_id {
            return Err(DomainError::validation(
                "userId",
                "Admins cannot delete their own account",
            ));
        }
        if !self.users.delete_with_relations(user_id).await? {
            return Err(DomainError::not_found("User"));
        }

        tracing::info!(%user_id, "User and related connection data deleted");
        Ok(())
    }
}
