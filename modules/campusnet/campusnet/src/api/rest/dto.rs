//! REST DTOs for campusnet.
//!
//! Field names are camelCase on the wire and timestamps are RFC 3339 strings.

use campusnet_sdk::{
    AdminStats, ConnectionRequest, ConnectionWithPeer, NewUser, PendingRequest, Preferences,
    ProfilePatch, ProfileVisibility, User, UserFilter, UserPage, UserSummary, UserType,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::service::UserListParams;

// === Envelopes ===

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// `{success, data, count}`
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// `{success, message, data}`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub success: bool,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: UserDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfessionalsResponse {
    pub success: bool,
    pub professionals: Vec<UserSummaryDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: AdminStatsDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUsersResponse {
    pub success: bool,
    pub users: Vec<UserDto>,
    pub pagination: PaginationDto,
}

/// `{success, users}` without pagination.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecentUsersResponse {
    pub success: bool,
    pub users: Vec<UserDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub version: String,
}

// === Identity DTOs ===

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct PreferencesDto {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub weekly_digest: bool,
    pub mentorship_requests: bool,
    pub blog_comments: bool,
    /// `public` or `private`.
    pub profile_visibility: String,
    pub show_email: bool,
    pub show_phone: bool,
}

impl From<Preferences> for PreferencesDto {
    fn from(p: Preferences) -> Self {
        Self {
            email_notifications: p.email_notifications,
            push_notifications: p.push_notifications,
            weekly_digest: p.weekly_digest,
            mentorship_requests: p.mentorship_requests,
            blog_comments: p.blog_comments,
            profile_visibility: match p.profile_visibility {
                ProfileVisibility::Public => "public",
                ProfileVisibility::Private => "private",
            }
            .to_owned(),
            show_email: p.show_email,
            show_phone: p.show_phone,
        }
    }
}

impl TryFrom<PreferencesDto> for Preferences {
    type Error = DomainError;

    fn try_from(p: PreferencesDto) -> Result<Self, Self::Error> {
        let profile_visibility = match p.profile_visibility.trim().to_ascii_lowercase().as_str() {
            "public" => ProfileVisibility::Public,
            "private" => ProfileVisibility::Private,
            _ => {
                return Err(DomainError::validation(
                    "profileVisibility",
                    "Profile visibility must be public or private",
                ));
            }
        };
        Ok(Self {
            email_notifications: p.email_notifications,
            push_notifications: p.push_notifications,
            weekly_digest: p.weekly_digest,
            mentorship_requests: p.mentorship_requests,
            blog_comments: p.blog_comments,
            profile_visibility,
            show_email: p.show_email,
            show_phone: p.show_phone,
        })
    }
}

/// Full profile of the authenticated user, or of any user for admins.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub user_type: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub website: String,
    pub github: String,
    pub linkedin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    pub interests: Vec<String>,
    pub preferences: PreferencesDto,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            user_type: u.user_type.as_str().to_owned(),
            name: u.name,
            email: u.email,
            phone: u.phone,
            location: u.location,
            bio: u.bio,
            website: u.website,
            github: u.github,
            linkedin: u.linkedin,
            department: u.department,
            year: u.year,
            profession: u.profession,
            interests: u.interests,
            preferences: u.preferences.into(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Public profile of another identity.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub user_type: String,
    pub bio: String,
}

impl From<UserSummary> for UserSummaryDto {
    fn from(s: UserSummary) -> Self {
        Self {
            id: s.id,
            name: s.name,
            email: s.email,
            profession: s.profession,
            department: s.department,
            user_type: s.user_type.as_str().to_owned(),
            bio: s.bio,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_type: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub department: Option<String>,
    pub year: Option<String>,
    pub profession: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl TryFrom<RegisterRequest> for NewUser {
    type Error = DomainError;

    fn try_from(req: RegisterRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            user_type: parse_user_type(&req.user_type)?,
            name: req.name,
            email: req.email,
            password: req.password,
            department: req.department,
            year: req.year,
            profession: req.profession,
            interests: req.interests,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
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
    pub preferences: Option<PreferencesDto>,
}

impl TryFrom<UpdateProfileRequest> for ProfilePatch {
    type Error = DomainError;

    fn try_from(req: UpdateProfileRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req.name,
            phone: req.phone,
            location: req.location,
            bio: req.bio,
            website: req.website,
            github: req.github,
            linkedin: req.linkedin,
            department: req.department,
            year: req.year,
            profession: req.profession,
            interests: req.interests,
            preferences: req.preferences.map(Preferences::try_from).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// === Connection DTOs ===

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequestDto {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub responded_at: Option<OffsetDateTime>,
}

impl From<ConnectionRequest> for ConnectionRequestDto {
    fn from(r: ConnectionRequest) -> Self {
        Self {
            id: r.id,
            sender_id: r.sender_id,
            receiver_id: r.receiver_id,
            status: r.status.as_str().to_owned(),
            message: r.message,
            sent_at: r.sent_at,
            responded_at: r.responded_at,
        }
    }
}

/// A pending request with the sender's public profile.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequestDto {
    pub id: Uuid,
    pub sender: UserSummaryDto,
    pub receiver_id: Uuid,
    pub status: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
}

impl From<PendingRequest> for PendingRequestDto {
    fn from(p: PendingRequest) -> Self {
        Self {
            id: p.request.id,
            sender: p.sender.into(),
            receiver_id: p.request.receiver_id,
            status: p.request.status.as_str().to_owned(),
            message: p.request.message,
            sent_at: p.request.sent_at,
        }
    }
}

/// One of the caller's connections with the peer's public profile.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDto {
    pub id: Uuid,
    pub connected_user: UserSummaryDto,
    #[serde(with = "time::serde::rfc3339")]
    pub connected_at: OffsetDateTime,
}

impl From<ConnectionWithPeer> for ConnectionDto {
    fn from(c: ConnectionWithPeer) -> Self {
        Self {
            id: c.connection.id,
            connected_user: c.peer.into(),
            connected_at: c.connection.connected_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendRequestBody {
    pub receiver_id: Option<Uuid>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestActionBody {
    pub request_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveConnectionBody {
    pub connected_user_id: Option<Uuid>,
}

/// `?search=&userType=` on the connection and discovery listings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilterQuery {
    pub search: Option<String>,
    pub user_type: Option<String>,
}

impl TryFrom<UserFilterQuery> for UserFilter {
    type Error = DomainError;

    fn try_from(q: UserFilterQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            search: q.search,
            user_type: parse_optional_user_type(q.user_type.as_deref())?,
        })
    }
}

// === Admin DTOs ===

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsDto {
    pub total_users: u64,
    pub student_users: u64,
    pub professional_users: u64,
    pub admin_users: u64,
    pub total_connections: u64,
    pub pending_requests: u64,
}

impl From<AdminStats> for AdminStatsDto {
    fn from(s: AdminStats) -> Self {
        Self {
            total_users: s.total_users,
            student_users: s.student_users,
            professional_users: s.professional_users,
            admin_users: s.admin_users,
            total_connections: s.total_connections,
            pending_requests: s.pending_requests,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDto {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_users: u64,
}

impl From<UserPage> for AdminUsersResponse {
    fn from(page: UserPage) -> Self {
        let pagination = PaginationDto {
            current_page: page.page,
            total_pages: page.total_pages(),
            total_users: page.total,
        };
        Self {
            success: true,
            users: page.users.into_iter().map(Into::into).collect(),
            pagination,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUsersQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub user_type: Option<String>,
    pub search: Option<String>,
}

impl TryFrom<AdminUsersQuery> for UserListParams {
    type Error = DomainError;

    fn try_from(q: AdminUsersQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            user_type: parse_optional_user_type(q.user_type.as_deref())?,
            search: q.search,
            page: q.page,
            limit: q.limit,
        })
    }
}

fn parse_user_type(raw: &str) -> Result<UserType, DomainError> {
    raw.parse()
        .map_err(|_| DomainError::validation("userType", format!("Invalid user type '{raw}'")))
}

/// Blank means "no filter".
fn parse_optional_user_type(raw: Option<&str>) -> Result<Option<UserType>, DomainError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_user_type(raw).map(Some),
        None => Ok(None),
    }
}
