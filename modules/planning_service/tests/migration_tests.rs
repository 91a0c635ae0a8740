//! Schema migrations against a fresh SQLite database

mod common;

use common::database;
use planning_service::infra::storage::migrations::Migrator;
use sea_orm_migration::MigratorTrait;

#[tokio::test]
async fn migrations_apply_once_under_distinct_names() {
    let db = database().await;

    // Re-running is a no-op once every migration is recorded
    Migrator::up(db.as_ref(), None).await.unwrap();

    let applied = Migrator::get_applied_migrations(db.as_ref()).await.unwrap();
    let names: Vec<&str> = applied.iter().map(|m| m.name()).collect();
    assert_eq!(
        names,
        vec![
            "m20250301_000001_create_catalogs",
            "m20250301_000002_create_planning",
            "m20250301_000003_create_investment",
        ]
    );
    assert!(Migrator::get_pending_migrations(db.as_ref())
        .await
        .unwrap()
        .is_empty());
}
