//! Authentication gate: bearer token or `token` cookie, resolved to a user.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use campusnet_sdk::{User, UserType};
use thiserror::Error;

use super::dto::ErrorBody;
use super::error::ApiError;
use crate::domain::error::DomainError;
use crate::domain::service::UsersService;
use crate::infra::tokens::{JwtCodec, TokenError};

pub const SESSION_COOKIE: &str = "token";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Access denied. No token provided.")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired. Please log in again.")]
    TokenExpired,

    #[error("Token is valid but user not found")]
    UserNotFound,

    #[error("Admin access required")]
    AdminRequired,

    #[error("Authentication gate is not configured for this route")]
    NotConfigured,
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => Self::TokenExpired,
            TokenError::Invalid(reason) => {
                tracing::debug!(%reason, "Rejected token");
                Self::InvalidToken
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::AdminRequired => StatusCode::FORBIDDEN,
            Self::NotConfigured => {
                tracing::error!("CurrentUser requested on a route without the auth layer");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        };
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<JwtCodec>,
    pub users: Arc<UsersService>,
}

/// The user resolved by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::NotConfigured)
    }
}

/// Verify the session token and attach the [`CurrentUser`] to the request.
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers()) else {
        return AuthError::MissingToken.into_response();
    };

    let user_id = match state.tokens.verify(token).and_then(|c| c.user_id()) {
        Ok(id) => id,
        Err(e) => return AuthError::from(e).into_response(),
    };

    let user = match state.users.find_user(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(%user_id, "Token subject no longer exists");
            return AuthError::UserNotFound.into_response();
        }
        Err(e) => return ApiError::from(e).into_response(),
    };

    tracing::Span::current().record("user_id", tracing::field::display(user.id));
    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

/// Must run after [`require_auth`].
pub async fn require_admin(request: Request, next: Next) -> Response {
    match request.extensions().get::<CurrentUser>() {
        Some(CurrentUser(user)) if user.user_type == UserType::Admin => next.run(request).await,
        Some(CurrentUser(user)) => {
            tracing::warn!(user_id = %user.id, "Non-admin attempted an admin route");
            AuthError::AdminRequired.into_response()
        }
        None => AuthError::NotConfigured.into_response(),
    }
}

/// Bearer token from `Authorization`, falling back to the session cookie.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    extract_bearer_token(headers).or_else(|| extract_cookie(headers, SESSION_COOKIE))
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying a fresh session token.
///
/// # Errors
/// `Internal` if the token contains bytes not allowed in a header.
pub fn session_cookie(token: &str, max_age_secs: i64) -> Result<HeaderValue, DomainError> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Path=/; Max-Age={max_age_secs}; SameSite=Lax"
    ))
    .map_err(|e| DomainError::internal(format!("invalid session cookie: {e}")))
}

/// `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("token=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax")
}
