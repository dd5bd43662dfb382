use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;
use uuid::Uuid;

use crate::api::rest::auth::CurrentUser;
use crate::api::rest::dto::{
    AdminUsersQuery, AdminUsersResponse, MessageResponse, RecentUsersResponse, StatsResponse,
};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::{AppPath, AppQuery};
use crate::domain::service::{AdminService, UserListParams};

/// GET /api/admin/stats
#[tracing::instrument(skip(svc))]
pub async fn stats(
    Extension(svc): Extension<Arc<AdminService>>,
) -> ApiResult<Json<StatsResponse>> {
    let stats = svc.stats().await?;
    Ok(Json(StatsResponse {
        success: true,
        stats: stats.into(),
    }))
}

/// GET /api/admin/users
#[tracing::instrument(skip(svc, query))]
pub async fn list_users(
    Extension(svc): Extension<Arc<AdminService>>,
    AppQuery(query): AppQuery<AdminUsersQuery>,
) -> ApiResult<Json<AdminUsersResponse>> {
    let params = UserListParams::try_from(query)?;
    let page = svc.list_users(params).await?;
    Ok(Json(page.into()))
}

/// GET /api/admin/users/recent
#[tracing::instrument(skip(svc))]
pub async fn recent_users(
    Extension(svc): Extension<Arc<AdminService>>,
) -> ApiResult<Json<RecentUsersResponse>> {
    let users = svc.recent_users().await?;
    Ok(Json(RecentUsersResponse {
        success: true,
        users: users.into_iter().map(Into::into).collect(),
    }))
}

/// DELETE /api/admin/users/{user_id}
#[tracing::instrument(skip(svc, admin), fields(admin_id = %admin.id))]
pub async fn delete_user(
    CurrentUser(admin): CurrentUser,
    Extension(svc): Extension<Arc<AdminService>>,
    AppPath(user_id): AppPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    svc.delete_user(admin.id, user_id).await?;
    Ok(Json(MessageResponse::ok(
        "User and related data deleted successfully",
    )))
}
