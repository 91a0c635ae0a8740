//! Wiring of the planning module into an HTTP application

use crate::config::{AppConfig, DatabaseConfig, StorageBackend};
use anyhow::{Context, Result};
use axum::Router;
use planning_service::api::rest::JwtVerifier;
use planning_service::domain::ObjectStore;
use planning_service::infra::{FsObjectStore, LoggingEventPublisher, MemoryObjectStore};
use planning_service::{ModuleDeps, PlanningServiceModule};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Open the database pool
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.url.clone());
    let max_connections = if config.is_in_memory() {
        1
    } else {
        config.max_connections
    };
    options
        .max_connections(max_connections)
        .connect_timeout(config.connect_timeout)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .context("failed to connect to the database")?;
    info!(max_connections, "Database connected");
    Ok(db)
}

pub async fn object_store(config: &AppConfig) -> Result<Arc<dyn ObjectStore>> {
    Ok(match config.storage.backend {
        StorageBackend::Fs => Arc::new(FsObjectStore::new(&config.storage.root).await?),
        StorageBackend::Memory => {
            info!("Using in-memory object store; attachments are lost on restart");
            Arc::new(MemoryObjectStore::new())
        }
    })
}

/// Build the router for a migrated database
pub async fn build(config: &AppConfig, db: DatabaseConnection) -> Result<Router> {
    let module = PlanningServiceModule::new(config.planning.clone());
    module.init(ModuleDeps {
        db: Arc::new(db),
        object_store: object_store(config).await?,
        event_publisher: Arc::new(LoggingEventPublisher),
    })?;

    let verifier = Arc::new(JwtVerifier::new(
        &config.auth.jwt_secret,
        config.auth.issuer.as_deref(),
    ));
    let router = module.register_rest(Router::new(), verifier)?;
    Ok(router.layer(TraceLayer::new_for_http()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn serves_health_and_requires_tokens() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "0123456789abcdef0123456789abcdef".to_string();
        config.storage.backend = StorageBackend::Memory;

        let db = connect(&config.database).await.unwrap();
        PlanningServiceModule::default().migrate(&db).await.unwrap();
        let app = build(&config, db).await.unwrap();

        let health = app
            .clone()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);

        let plans = app
            .oneshot(Request::get("/api/plans").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(plans.status(), StatusCode::UNAUTHORIZED);
    }
}
