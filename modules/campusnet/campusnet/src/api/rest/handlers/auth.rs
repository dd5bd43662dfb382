use std::sync::Arc;

use axum::extract::Extension;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use campusnet_sdk::NewUser;

use crate::api::rest::auth::{clear_session_cookie, session_cookie, CurrentUser};
use crate::api::rest::dto::{
    AuthResponse, LoginRequest, MessageResponse, RegisterRequest, UserResponse,
};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::AppJson;
use crate::domain::service::{AuthSession, UsersService};

fn session_response(
    svc: &UsersService,
    status: StatusCode,
    message: &str,
    session: AuthSession,
) -> ApiResult<Response> {
    let cookie = session_cookie(&session.token, svc.session_ttl_secs())?;
    let body = AuthResponse {
        success: true,
        message: message.to_owned(),
        token: session.token,
        user: session.user.into(),
    };
    Ok((status, AppendHeaders([(SET_COOKIE, cookie)]), Json(body)).into_response())
}

/// POST /api/auth/register
#[tracing::instrument(skip(svc, req), fields(user_type = %req.user_type))]
pub async fn register(
    Extension(svc): Extension<Arc<UsersService>>,
    AppJson(req): AppJson<RegisterRequest>,
) -> ApiResult<Response> {
    let new_user = NewUser::try_from(req)?;
    let session = svc.register(new_user).await?;
    session_response(
        &svc,
        StatusCode::CREATED,
        "User registered successfully",
        session,
    )
}

/// POST /api/auth/login
#[tracing::instrument(skip(svc, req))]
pub async fn login(
    Extension(svc): Extension<Arc<UsersService>>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<Response> {
    let session = svc.login(&req.email, &req.password).await?;
    session_response(&svc, StatusCode::OK, "Login successful", session)
}

/// POST /api/auth/logout
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, clear_session_cookie())]),
        Json(MessageResponse::ok("Logged out successfully")),
    )
}

/// GET /api/auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse {
        success: true,
        message: None,
        user: user.into(),
    })
}
