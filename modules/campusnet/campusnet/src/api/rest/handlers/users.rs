use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;
use campusnet_sdk::ProfilePatch;

use crate::api::rest::auth::CurrentUser;
use crate::api::rest::dto::{
    MessageResponse, ProfessionalsResponse, UpdatePasswordRequest, UpdateProfileRequest,
    UserResponse,
};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::AppJson;
use crate::domain::service::UsersService;

/// GET /api/users/professionals
#[tracing::instrument(skip(svc))]
pub async fn list_professionals(
    Extension(svc): Extension<Arc<UsersService>>,
) -> ApiResult<Json<ProfessionalsResponse>> {
    let professionals = svc.list_professionals().await?;
    Ok(Json(ProfessionalsResponse {
        success: true,
        professionals: professionals.iter().map(|u| u.summary().into()).collect(),
    }))
}

/// PUT /api/users/profile
#[tracing::instrument(skip(svc, user, req), fields(user_id = %user.id))]
pub async fn update_profile(
    CurrentUser(user): CurrentUser,
    Extension(svc): Extension<Arc<UsersService>>,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    let patch = ProfilePatch::try_from(req)?;
    let updated = svc.update_profile(user.id, patch).await?;
    Ok(Json(UserResponse {
        success: true,
        message: Some("Profile updated successfully".to_owned()),
        user: updated.into(),
    }))
}

/// PUT /api/users/password
#[tracing::instrument(skip(svc, user, req), fields(user_id = %user.id))]
pub async fn update_password(
    CurrentUser(user): CurrentUser,
    Extension(svc): Extension<Arc<UsersService>>,
    AppJson(req): AppJson<UpdatePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    svc.update_password(user.id, &req.current_password, &req.new_password)
        .await?;
    Ok(Json(MessageResponse::ok("Password updated successfully")))
}
