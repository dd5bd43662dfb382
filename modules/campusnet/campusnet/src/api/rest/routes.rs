use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::{Extension, Router};

use super::auth::{require_admin, require_auth, AuthState};
use super::handlers::{admin, auth, connections, system, users};
use crate::domain::service::AppServices;
use crate::infra::tokens::JwtCodec;

/// Every campusnet route under `/api`, with the JSON 404 fallback.
pub fn router(services: &AppServices, tokens: Arc<JwtCodec>) -> Router {
    let gate = middleware::from_fn_with_state(
        AuthState {
            tokens,
            users: Arc::clone(&services.users),
        },
        require_auth,
    );

    let public = Router::new()
        .route("/health", get(system::health))
        .route("/openapi.json", get(system::openapi))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/users/professionals", get(users::list_professionals));

    let authenticated = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/users/profile", put(users::update_profile))
        .route("/users/password", put(users::update_password))
        .route("/connections", get(connections::list_connections))
        .route("/connections/request/send", post(connections::send_request))
        .route(
            "/connections/requests/pending",
            get(connections::list_pending),
        )
        .route(
            "/connections/request/accept",
            post(connections::accept_request),
        )
        .route(
            "/connections/request/reject",
            post(connections::reject_request),
        )
        .route(
            "/connections/request/cancel",
            post(connections::cancel_request),
        )
        .route("/connections/remove", post(connections::remove_connection))
        .route(
            "/connections/status/{user_id}",
            get(connections::connection_status),
        )
        .route(
            "/connections/available-users",
            get(connections::available_users),
        )
        .route_layer(gate.clone());

    let admin_only = Router::new()
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/recent", get(admin::recent_users))
        .route("/admin/users/{user_id}", delete(admin::delete_user))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(gate);

    Router::new()
        .nest("/api", public.merge(authenticated).merge(admin_only))
        .fallback(system::not_found)
        .layer(Extension(Arc::clone(&services.users)))
        .layer(Extension(Arc::clone(&services.connections)))
        .layer(Extension(Arc::clone(&services.admin)))
}
