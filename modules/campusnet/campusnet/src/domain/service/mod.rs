//! Domain service layer - business logic and rules.
//!
//! One submodule per resource:
//! - `users` - registration, login, profile and password rules
//! - `connections` - the connection-request workflow
//! - `admin` - statistics and the user-delete cascade
//!
//! The domain layer talks to storage only through the repository traits in
//! `domain::repos`, so every service runs against in-memory fakes in tests.

use std::sync::Arc;

use crate::config::CampusnetConfig;
use crate::domain::repos::{ConnectionsRepository, UsersRepository};
use crate::infra::tokens::JwtCodec;

mod admin;
mod connections;
mod users;

pub use admin::{AdminService, UserListParams};
pub use connections::ConnectionsService;
pub use users::{AuthSession, UsersService};

/// Configuration for the domain services
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub min_password_len: usize,
    pub max_name_length: usize,
    pub max_message_length: usize,
    pub available_users_limit: u64,
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            min_password_len: 6,
            max_name_length: 100,
            max_message_length: 500,
            available_users_limit: 20,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl From<&CampusnetConfig> for ServiceConfig {
    fn from(cfg: &CampusnetConfig) -> Self {
        Self {
            min_password_len: cfg.min_password_len,
            available_users_limit: cfg.available_users_limit,
            default_page_size: cfg.admin_page_size,
            max_page_size: cfg.admin_max_page_size,
            ..Self::default()
        }
    }
}

// DI container - aggregates all domain services
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UsersService>,
    pub connections: Arc<ConnectionsService>,
    pub admin: Arc<AdminService>,
}

impl AppServices {
    pub fn new(
        users_repo: Arc<dyn UsersRepository>,
        connections_repo: Arc<dyn ConnectionsRepository>,
        tokens: Arc<JwtCodec>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            users: Arc::new(UsersService::new(
                Arc::clone(&users_repo),
                tokens,
                config.clone(),
            )),
            connections: Arc::new(ConnectionsService::new(
                Arc::clone(&connections_repo),
                Arc::clone(&users_repo),
                config.clone(),
            )),
            admin: Arc::new(AdminService::new(
                users_repo,
                connections_repo,
                config.clone(),
            )),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support;
