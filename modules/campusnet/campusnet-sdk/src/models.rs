//! Public models for the campusnet module.
//!
//! These are transport-agnostic data structures shared by the domain layer,
//! the storage layer and the REST layer. None of them carries a credential.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Returned when a stored or submitted enum tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Role tag of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserType {
    Student,
    Professional,
    Admin,
}

impl UserType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Professional => "professional",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "professional" => Ok(Self::Professional),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownVariant {
                kind: "user type",
                value: s.to_owned(),
            }),
        }
    }
}

/// Notification and visibility preferences attached to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Preferences {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub weekly_digest: bool,
    pub mentorship_requests: bool,
    pub blog_comments: bool,
    pub profile_visibility: ProfileVisibility,
    pub show_email: bool,
    pub show_phone: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: false,
            weekly_digest: true,
            mentorship_requests: true,
            blog_comments: true,
            profile_visibility: ProfileVisibility::Public,
            show_email: false,
            show_phone: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileVisibility {
    #[default]
    Public,
    Private,
}

/// A registered identity, without its credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub user_type: UserType,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub website: String,
    pub github: String,
    pub linkedin: String,
    pub department: Option<String>,
    pub year: Option<String>,
    pub profession: Option<String>,
    pub interests: Vec<String>,
    pub preferences: Preferences,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Public projection used whenever another identity is shown.
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            profession: self.profession.clone(),
            department: self.department.clone(),
            user_type: self.user_type,
            bio: self.bio.clone(),
        }
    }
}

/// Public profile fields of an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profession: Option<String>,
    pub department: Option<String>,
    pub user_type: UserType,
    pub bio: String,
}

/// Registration data. The password is plaintext and only lives until hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub user_type: UserType,
    pub name: String,
    pub email: String,
    pub password: String,
    pub department: Option<String>,
    pub year: Option<String>,
    pub profession: Option<String>,
    pub interests: Vec<String>,
}

/// Partial profile update. E-mail, password and role are not patchable here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub profession: Option<String>,
    pub interests: Option<Vec<String>>,
    pub preferences: Option<Preferences>,
}

/// Lifecycle state of a connection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(UnknownVariant {
                kind: "request status",
                value: s.to_owned(),
            }),
        }
    }
}

/// A directed request from `sender_id` to `receiver_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: RequestStatus,
    pub message: String,
    pub sent_at: OffsetDateTime,
    pub responded_at: Option<OffsetDateTime>,
}

/// A pending request together with the sender's public profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub request: ConnectionRequest,
    pub sender: UserSummary,
}

/// One direction of an accepted connection. Always stored in pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub peer_id: Uuid,
    pub connected_at: OffsetDateTime,
}

/// A connection of the owner together with the peer's public profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionWithPeer {
    pub connection: Connection,
    pub peer: UserSummary,
}

/// Relationship between two identities as seen from the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    PendingSent,
    PendingReceived,
    NotConnected,
}

impl ConnectionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::PendingSent => "pending_sent",
            Self::PendingReceived => "pending_received",
            Self::NotConnected => "not_connected",
        }
    }
}

/// Optional filters shared by the connection and discovery listings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserFilter {
    /// Case-insensitive substring matched against name or profession.
    pub search: Option<String>,
    pub user_type: Option<UserType>,
}

impl UserFilter {
    /// Trimmed, non-empty search term.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Dashboard counters for administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdminStats {
    pub total_users: u64,
    pub student_users: u64,
    pub professional_users: u64,
    pub admin_users: u64,
    /// Number of connected pairs, not stored rows.
    pub total_connections: u64,
    pub pending_requests: u64,
}

/// One page of the admin user listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPage {
    pub users: Vec<User>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

impl UserPage {
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            0
        } else {
            self.total.div_ceil(self.limit)
        }
    }
}
