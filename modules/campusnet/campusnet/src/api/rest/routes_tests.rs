use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use campusnet_sdk::{User, UserType};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tower::ServiceExt as _;
use uuid::Uuid;

use super::routes::router;
use crate::domain::service::test_support::InMemoryStore;
use crate::domain::service::{AppServices, ServiceConfig};
use crate::infra::tokens::{JwtCodec, TokenClaims};

struct TestApp {
    router: Router,
    store: Arc<InMemoryStore>,
    tokens: Arc<JwtCodec>,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::default());
        let tokens = Arc::new(JwtCodec::new("routes-test-secret", 3600));
        let services = AppServices::new(
            store.clone(),
            store.clone(),
            Arc::clone(&tokens),
            &ServiceConfig::default(),
        );
        Self {
            router: router(&services, Arc::clone(&tokens)),
            store,
            tokens,
        }
    }

    fn user(&self, user_type: UserType, name: &str) -> (User, String) {
        let user = self.store.add_user(user_type, name, Some("Engineer"));
        let token = self.tokens.issue(&user).unwrap();
        (user, token)
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

#[tokio::test]
async fn health_and_fallback_are_public() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Server is running");

    let (status, body) = app.call(Method::GET, "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route GET /api/nope not found");
}

#[tokio::test]
async fn gate_reports_each_failure_distinctly() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::GET, "/api/connections", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access denied. No token provided.");

    let (status, body) = app
        .call(Method::GET, "/api/connections", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let now = OffsetDateTime::now_utc().unix_timestamp();
    let expired = app
        .tokens
        .sign(&TokenClaims {
            sub: Uuid::new_v4().to_string(),
            role: "student".to_owned(),
            iat: now - 7200,
            exp: now - 3600,
        })
        .unwrap();
    let (status, body) = app
        .call(Method::GET, "/api/connections", Some(&expired), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired. Please log in again.");

    let ghost = app
        .tokens
        .sign(&TokenClaims {
            sub: Uuid::new_v4().to_string(),
            role: "student".to_owned(),
            iat: now,
            exp: now + 3600,
        })
        .unwrap();
    let (status, body) = app
        .call(Method::GET, "/api/connections", Some(&ghost), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is valid but user not found");
}

#[tokio::test]
async fn token_cookie_authenticates() {
    let app = TestApp::new();
    let (user, token) = app.user(UserType::Student, "Ada");

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, format!("token={token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["user"]["id"], user.id.to_string());
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn request_lifecycle_over_http() {
    let app = TestApp::new();
    let (alice, alice_token) = app.user(UserType::Student, "Alice");
    let (bob, bob_token) = app.user(UserType::Professional, "Bob");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/connections/request/send",
            Some(&alice_token),
            Some(json!({ "receiverId": bob.id, "message": "let's collaborate" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["message"], "let's collaborate");
    let request_id = body["data"]["id"].as_str().unwrap().to_owned();

    let (status, body) = app
        .call(
            Method::POST,
            "/api/connections/request/send",
            Some(&alice_token),
            Some(json!({ "receiverId": bob.id })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Connection request already sent");

    let status_uri = format!("/api/connections/status/{}", bob.id);
    let (_, body) = app
        .call(Method::GET, &status_uri, Some(&alice_token), None)
        .await;
    assert_eq!(body["status"], "pending_sent");

    let (status, body) = app
        .call(
            Method::GET,
            "/api/connections/requests/pending",
            Some(&bob_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["sender"]["name"], "Alice");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/connections/request/accept",
            Some(&alice_token),
            Some(json!({ "requestId": request_id })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Unauthorized to accept this request");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/connections/request/accept",
            Some(&bob_token),
            Some(json!({ "requestId": request_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "accepted");
    assert!(body["data"]["respondedAt"].is_string());

    let (_, body) = app
        .call(Method::GET, "/api/connections", Some(&bob_token), None)
        .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["connectedUser"]["id"], alice.id.to_string());

    let (status, body) = app
        .call(
            Method::POST,
            "/api/connections/remove",
            Some(&alice_token),
            Some(json!({ "connectedUserId": bob.id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Connection removed successfully");
    assert!(app.store.connection_rows().is_empty());
}

#[tokio::test]
async fn malformed_input_is_a_bad_request() {
    let app = TestApp::new();
    let (_, token) = app.user(UserType::Student, "Alice");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/connections/request/send",
            Some(&token),
            Some(json!({ "message": "hi" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Receiver ID is required");

    let (status, body) = app
        .call(
            Method::GET,
            "/api/connections/status/not-a-uuid",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/connections/request/accept",
            Some(&token),
            Some(json!({ "requestId": 42 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_routes_require_admin_role() {
    let app = TestApp::new();
    let (_, student_token) = app.user(UserType::Student, "Alice");
    let (_, admin_token) = app.user(UserType::Admin, "Root");

    let (status, body) = app
        .call(Method::GET, "/api/admin/stats", Some(&student_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");

    let (status, body) = app
        .call(Method::GET, "/api/admin/stats", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalUsers"], 2);
    assert_eq!(body["stats"]["adminUsers"], 1);

    let (status, body) = app
        .call(
            Method::GET,
            "/api/admin/users?page=1&limit=1",
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["totalPages"], 2);
}

#[tokio::test]
async fn register_sets_session_cookie() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "userType": "student",
                "name": "Linus",
                "email": " Linus@Example.com ",
                "password": "penguin42",
                "department": "CS",
                "year": "3",
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["user"]["email"], "linus@example.com");

    let token = body["token"].as_str().unwrap();
    let (status, body) = app.call(Method::GET, "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Linus");
}
