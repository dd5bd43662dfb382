//! Connection workflow endpoints. Every route here sits behind the auth gate.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use campusnet_sdk::UserFilter;
use uuid::Uuid;

use crate::api::rest::auth::CurrentUser;
use crate::api::rest::dto::{
    ConnectionDto, ConnectionRequestDto, DataResponse, ListResponse, MessageResponse,
    PendingRequestDto, RemoveConnectionBody, RequestActionBody, SendRequestBody, StatusResponse,
    UserFilterQuery, UserSummaryDto,
};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::{AppJson, AppPath, AppQuery};
use crate::domain::error::DomainError;
use crate::domain::service::ConnectionsService;

type RequestResponse = Json<DataResponse<ConnectionRequestDto>>;

fn required(id: Option<Uuid>, field: &str, label: &str) -> Result<Uuid, DomainError> {
    id.ok_or_else(|| DomainError::validation(field, format!("{label} is required")))
}

/// POST /api/connections/request/send
#[tracing::instrument(skip(svc, user, req), fields(sender_id = %user.id))]
pub async fn send_request(
    CurrentUser(user): CurrentUser,
    Extension(svc): Extension<Arc<ConnectionsService>>,
    AppJson(req): AppJson<SendRequestBody>,
) -> ApiResult<(StatusCode, RequestResponse)> {
    let receiver = required(req.receiver_id, "receiverId", "Receiver ID")?;
    let request = svc.send_request(user.id, receiver, req.message).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(
            "Connection request sent successfully",
            request.into(),
        )),
    ))
}

/// GET /api/connections/requests/pending
#[tracing::instrument(skip(svc, user), fields(user_id = %user.id))]
pub async fn list_pending(
    CurrentUser(user): CurrentUser,
    Extension(svc): Extension<Arc<ConnectionsService>>,
) -> ApiResult<Json<ListResponse<PendingRequestDto>>> {
    let pending = svc.list_pending(user.id).await?;
    Ok(Json(ListResponse::new(
        pending.into_iter().map(Into::into).collect(),
    )))
}

/// POST /api/connections/request/accept
#[tracing::instrument(skip(svc, user, req), fields(user_id = %user.id))]
pub async fn accept_request(
    CurrentUser(user): CurrentUser,
    Extension(svc): Extension<Arc<ConnectionsService>>,
    AppJson(req): AppJson<RequestActionBody>,
) -> ApiResult<RequestResponse> {
    let request_id = required(req.request_id, "requestId", "Request ID")?;
    let request = svc.accept(request_id, user.id).await?;
    Ok(Json(DataResponse::new(
        "Connection request accepted",
        request.into(),
    )))
}

/// POST /api/connections/request/reject
#[tracing::instrument(skip(svc, user, req), fields(user_id = %user.id))]
pub async fn reject_request(
    CurrentUser(user): CurrentUser,
    Extension(svc): Extension<Arc<ConnectionsService>>,
    AppJson(req): AppJson<RequestActionBody>,
) -> ApiResult<RequestResponse> {
    let request_id = required(req.request_id, "requestId", "Request ID")?;
    let request = svc.reject(request_id, user.id).await?;
    Ok(Json(DataResponse::new(
        "Connection request rejected",
        request.into(),
    )))
}

/// POST /api/connections/request/cancel
#[tracing::instrument(skip(svc, user, req), fields(user_id = %user.id))]
pub async fn cancel_request(
    CurrentUser(user): CurrentUser,
    Extension(svc): Extension<Arc<ConnectionsService>>,
    AppJson(req): AppJson<RequestActionBody>,
) -> ApiResult<RequestResponse> {
    let request_id = required(req.request_id, "requestId", "Request ID")?;
    let request = svc.cancel(request_id, user.id).await?;
    Ok(Json(DataResponse::new(
        "Connection request cancelled",
        request.into(),
    )))
}

/// GET /api/connections
#[tracing::instrument(skip(svc, user, query), fields(user_id = %user.id))]
pub async fn list_connections(
    CurrentUser(user): CurrentUser,
    Extension(svc): Extension<Arc<ConnectionsService>>,
    AppQuery(query): AppQuery<UserFilterQuery>,
) -> ApiResult<Json<ListResponse<ConnectionDto>>> {
    let filter = UserFilter::try_from(query)?;
    let connections = svc.list_connections(user.id, &filter).await?;
    Ok(Json(ListResponse::new(
        connections.into_iter().map(Into::into).collect(),
    )))
}

/// POST /api/connections/remove
#[tracing::instrument(skip(svc, user, req), fields(user_id = %user.id))]
pub async fn remove_connection(
    CurrentUser(user): CurrentUser,
    Extension(svc): Extension<Arc<ConnectionsService>>,
    AppJson(req): AppJson<RemoveConnectionBody>,
) -> ApiResult<Json<MessageResponse>> {
    let peer = required(req.connected_user_id, "connectedUserId", "Connected user ID")?;
    svc.remove(user.id, peer).await?;
    Ok(Json(MessageResponse::ok("Connection removed successfully")))
}

/// GET /api/connections/status/{user_id}
#[tracing::instrument(skip(svc, user), fields(user_id = %user.id))]
pub async fn connection_status(
    CurrentUser(user): CurrentUser,
    Extension(svc): Extension<Arc<ConnectionsService>>,
    AppPath(other): AppPath<Uuid>,
) -> ApiResult<Json<StatusResponse>> {
    let status = svc.status(user.id, other).await?;
    Ok(Json(StatusResponse {
        success: true,
        status: status.as_str().to_owned(),
    }))
}

/// GET /api/connections/available-users
#[tracing::instrument(skip(svc, user, query), fields(user_id = %user.id))]
pub async fn available_users(
    CurrentUser(user): CurrentUser,
    Extension(svc): Extension<Arc<ConnectionsService>>,
    AppQuery(query): AppQuery<UserFilterQuery>,
) -> ApiResult<Json<ListResponse<UserSummaryDto>>> {
    let filter = UserFilter::try_from(query)?;
    let users = svc.list_available(user.id, &filter).await?;
    Ok(Json(ListResponse::new(
        users.into_iter().map(Into::into).collect(),
    )))
}
