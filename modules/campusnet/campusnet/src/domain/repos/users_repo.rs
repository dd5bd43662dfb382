use async_trait::async_trait;
use campusnet_sdk::{User, UserFilter, UserSummary, UserType};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// A user record together with its credential. Never leaves the domain layer.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

/// Counts of identities per role tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserTypeCounts {
    pub students: u64,
    pub professionals: u64,
    pub admins: u64,
}

impl UserTypeCounts {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.students + self.professionals + self.admins
    }
}

/// Admin listing query.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub user_type: Option<UserType>,
    /// Case-insensitive substring on name or e-mail.
    pub search: Option<String>,
    pub offset: u64,
    pub limit: u64,
}

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Lookup by normalized (trimmed, lower-cased) e-mail.
    async fn find_credentials(&self, email: &str) -> Result<Option<StoredUser>, DomainError>;

    async fn find_credentials_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, DomainError>;

    async fn email_exists(&self, email: &str) -> Result<bool, DomainError>;

    async fn insert(&self, user: &StoredUser) -> Result<(), DomainError>;

    /// Persist every profile field of `user` and its `updated_at`.
    async fn update_profile(&self, user: &User) -> Result<(), DomainError>;

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_at: OffsetDateTime,
    ) -> Result<(), DomainError>;

    /// All users of one role tag, ordered by name.
    async fn list_by_type(&self, user_type: UserType) -> Result<Vec<User>, DomainError>;

    /// Public profiles of `ids` that match `filter`. Order is unspecified.
    async fn summaries(
        &self,
        ids: &[Uuid],
        filter: &UserFilter,
    ) -> Result<Vec<UserSummary>, DomainError>;

    /// Non-admin public profiles not in `exclude` that match `filter`.
    async fn discover(
        &self,
        exclude: &[Uuid],
        filter: &UserFilter,
        limit: u64,
    ) -> Result<Vec<UserSummary>, DomainError>;

    async fn count_by_type(&self) -> Result<UserTypeCounts, DomainError>;

    /// One page of users, newest first, and the total matching count.
    async fn list_page(&self, query: &UserListQuery) -> Result<(Vec<User>, u64), DomainError>;

    /// Delete the user together with every connection and request that
    /// mentions it, atomically. Returns `false` if the user did not exist.
    async fn delete_with_relations(&self, id: Uuid) -> Result<bool, DomainError>;
}
