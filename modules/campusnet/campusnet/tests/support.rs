#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Test support utilities for campusnet integration tests.

#![allow(dead_code)] // Not every test binary uses every helper

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use campusnet::domain::repos::{StoredUser, UsersRepository};
use campusnet::infra::storage::SeaOrmUsersRepository;
use campusnet::{AdminBootstrap, CampusnetConfig, CampusnetModule};
use campusnet_sdk::{Preferences, User, UserType};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt as _;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "root@campus.test";
pub const ADMIN_PASSWORD: &str = "root-password";

/// Fresh in-memory `SQLite` database with migrations applied.
///
/// A single pooled connection keeps the in-memory database alive and shared.
///
/// # Panics
/// Panics if the database connection or migrations fail.
pub async fn inmem_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to in-memory database");

    CampusnetModule::migrate(&db)
        .await
        .expect("Failed to run migrations");
    db
}

/// Insert a user row directly, bypassing registration rules.
///
/// # Panics
/// Panics if the insert fails.
pub async fn seed_user(
    db: &DatabaseConnection,
    user_type: UserType,
    name: &str,
    profession: Option<&str>,
) -> User {
    let now = OffsetDateTime::now_utc();
    let id = Uuid::new_v4();
    let user = User {
        id,
        user_type,
        name: name.to_owned(),
        email: format!("{}@campus.test", name.to_lowercase().replace(' ', ".")),
        phone: String::new(),
        location: String::new(),
        bio: format!("{name} bio"),
        website: String::new(),
        github: String::new(),
        linkedin: String::new(),
        department: Some("Engineering".to_owned()),
        year: Some("3".to_owned()),
        profession: profession.map(str::to_owned),
        interests: vec!["rust".to_owned()],
        preferences: Preferences::default(),
        created_at: now,
        updated_at: now,
    };
    SeaOrmUsersRepository::new(db.clone())
        .insert(&StoredUser {
            user: user.clone(),
            password_hash: "unused".to_owned(),
        })
        .await
        .expect("Failed to seed user");
    user
}

/// A fully wired module served through its router.
pub struct TestContext {
    pub db: DatabaseConnection,
    pub router: Router,
}

impl TestContext {
    pub async fn new() -> Self {
        let db = inmem_db().await;
        let cfg = CampusnetConfig {
            jwt_secret: "integration-secret".to_owned(),
            admin: Some(AdminBootstrap {
                name: "Root".to_owned(),
                email: ADMIN_EMAIL.to_owned(),
                password: ADMIN_PASSWORD.to_owned(),
            }),
            ..CampusnetConfig::default()
        };
        let module = CampusnetModule::init(db.clone(), &cfg)
            .await
            .expect("Failed to init module");
        Self {
            db,
            router: module.router(),
        }
    }

    pub async fn call(
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

    /// Register through the API and return `(user_id, token)`.
    pub async fn register(&self, body: Value) -> (Uuid, String) {
        let (status, resp) = self
            .call(Method::POST, "/api/auth/register", None, Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {resp}");
        let id = resp["user"]["id"].as_str().unwrap().parse().unwrap();
        (id, resp["token"].as_str().unwrap().to_owned())
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }
}
