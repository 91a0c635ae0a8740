//! Module declaration and lifecycle: init, migrate, REST registration

use crate::api::rest::{register_routes, JwtVerifier};
use crate::config::Config;
use crate::domain::{EventPublisher, ObjectStore, Service};
use crate::infra::storage::{migrations::Migrator, sea_orm_repositories};
use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

/// Infrastructure handed to the module by the host application
pub struct ModuleDeps {
    pub db: Arc<DatabaseConnection>,
    pub object_store: Arc<dyn ObjectStore>,
    pub event_publisher: Arc<dyn EventPublisher>,
}

/// Planning service module
pub struct PlanningServiceModule {
    config: RwLock<Config>,
    service: RwLock<Option<Arc<Service>>>,
}

impl Default for PlanningServiceModule {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl PlanningServiceModule {
    pub fn new(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
            service: RwLock::new(None),
        }
    }

    /// Build repositories and the domain service
    pub fn init(&self, deps: ModuleDeps) -> Result<Arc<Service>> {
        let repos = sea_orm_repositories(deps.db);
        let config = self.config.read().clone();

        let service = Arc::new(Service::new(
            repos,
            deps.event_publisher,
            deps.object_store,
            config,
        ));
        *self.service.write() = Some(service.clone());

        tracing::info!("Planning service initialized");
        Ok(service)
    }

    /// Apply pending database migrations
    pub async fn migrate(&self, db: &DatabaseConnection) -> Result<()> {
        Migrator::up(db, None).await?;
        tracing::info!("Planning service migrations completed");
        Ok(())
    }

    /// Initialized domain service
    pub fn service(&self) -> Result<Arc<Service>> {
        self.service
            .read()
            .as_ref()
            .cloned()
            .ok_or_else(|| anyhow!("Service not initialized"))
    }

    /// Mount the REST routes on `router`
    pub fn register_rest(
        &self,
        router: axum::Router,
        verifier: Arc<JwtVerifier>,
    ) -> Result<axum::Router> {
        let service = self.service()?;

        tracing::info!("Registering planning service REST routes");
        Ok(register_routes(router, service, verifier))
    }
}
