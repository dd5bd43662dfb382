use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::dto::ErrorBody;
use crate::domain::error::DomainError;

/// Error type returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    /// Malformed request input rejected before reaching the domain layer.
    BadRequest(String),
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Status code and client-facing message for a domain error.
pub fn domain_error_to_status(e: &DomainError) -> (StatusCode, String) {
    match e {
        DomainError::AlreadyConnected | DomainError::DuplicateRequest => {
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        DomainError::Validation { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, e.to_string()),
        DomainError::Forbidden(msg) => {
            tracing::warn!(reason = %msg, "Access forbidden");
            (StatusCode::FORBIDDEN, msg.clone())
        }
        DomainError::EmailTaken => (StatusCode::CONFLICT, e.to_string()),
        DomainError::InvalidCredentials => (StatusCode::UNAUTHORIZED, e.to_string()),
        DomainError::Database { .. } | DomainError::Internal(_) => {
            tracing::error!(error = %e, "Request failed with an internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Domain(e) => domain_error_to_status(&e),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
