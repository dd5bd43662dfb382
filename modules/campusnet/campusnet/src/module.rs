//! Campusnet module definition.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::api::rest::routes;
use crate::config::CampusnetConfig;
use crate::domain::repos::{ConnectionsRepository, UsersRepository};
use crate::domain::service::{AppServices, ServiceConfig};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{SeaOrmConnectionsRepository, SeaOrmUsersRepository};
use crate::infra::tokens::JwtCodec;

/// Wired campusnet module: services over sea-orm storage plus the REST router.
pub struct CampusnetModule {
    services: AppServices,
    tokens: Arc<JwtCodec>,
}

impl CampusnetModule {
    /// Run migrations, wire repositories and services, and create the
    /// configured admin account if it is missing.
    ///
    /// # Errors
    /// Fails when migrations fail or the admin bootstrap is rejected.
    pub async fn init(db: DatabaseConnection, cfg: &CampusnetConfig) -> anyhow::Result<Self> {
        info!("Initializing campusnet module");

        Self::migrate(&db).await?;

        let users_repo: Arc<dyn UsersRepository> =
            Arc::new(SeaOrmUsersRepository::new(db.clone()));
        let connections_repo: Arc<dyn ConnectionsRepository> =
            Arc::new(SeaOrmConnectionsRepository::new(db));

        let tokens = Arc::new(JwtCodec::new(&cfg.jwt_secret, cfg.token_ttl_secs));
        let services = AppServices::new(
            users_repo,
            connections_repo,
            Arc::clone(&tokens),
            &ServiceConfig::from(cfg),
        );

        if let Some(admin) = &cfg.admin {
            let created = services.users.ensure_admin(admin).await?;
            info!(created, "Admin bootstrap finished");
        }

        Ok(Self { services, tokens })
    }

    /// # Errors
    /// Propagates migration failures.
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running campusnet database migrations");
        Migrator::up(db, None).await?;
        Ok(())
    }

    #[must_use]
    pub fn router(&self) -> axum::Router {
        routes::router(&self.services, Arc::clone(&self.tokens))
    }

    #[must_use]
    pub fn services(&self) -> &AppServices {
        &self.services
    }
}
