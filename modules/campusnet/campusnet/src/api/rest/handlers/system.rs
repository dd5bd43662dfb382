use axum::http::{Method, StatusCode, Uri};
use axum::Json;
use utoipa::OpenApi as _;

use crate::api::rest::dto::{ErrorBody, HealthResponse};
use crate::api::rest::openapi::ApiDoc;

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Server is running".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}

/// GET /api/openapi.json
pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// JSON 404 for anything no route matched.
pub async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<ErrorBody>) {
    tracing::debug!(%method, path = uri.path(), "No route matched");
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new(format!(
            "Route {method} {} not found",
            uri.path()
        ))),
    )
}
