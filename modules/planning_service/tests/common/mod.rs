//! Common test utilities: an in-memory SQLite database behind the real
//! repositories, a recording event publisher and seed data helpers

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use planning_service::config::Config;
use planning_service::contract::*;
use planning_service::domain::{EventPublisher, PlanningEvent, Repositories, Service};
use planning_service::infra::storage::{migrations::Migrator, sea_orm_repositories};
use planning_service::infra::MemoryObjectStore;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

/// Keeps every published event for later assertions
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<PlanningEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<PlanningEvent> {
        self.events.lock().clone()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.event_type()).collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: PlanningEvent) -> anyhow::Result<()> {
        self.events.lock().push(event);
        Ok(())
    }
}

pub struct TestEnv {
    pub db: Arc<DatabaseConnection>,
    pub service: Arc<Service>,
    pub events: Arc<RecordingPublisher>,
    pub store: Arc<MemoryObjectStore>,
}

/// Fresh migrated in-memory database
pub async fn database() -> Arc<DatabaseConnection> {
    // One connection: every SQLite memory connection is its own database
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    Arc::new(db)
}

pub async fn setup() -> TestEnv {
    setup_with(Config::default(), |_| {}).await
}

/// Environment with a custom config and repositories swapped by `customize`
pub async fn setup_with(config: Config, customize: impl FnOnce(&mut Repositories)) -> TestEnv {
    let db = database().await;
    let mut repos = sea_orm_repositories(db.clone());
    customize(&mut repos);

    let events = Arc::new(RecordingPublisher::default());
    let store = Arc::new(MemoryObjectStore::new());
    let service = Arc::new(Service::new(repos, events.clone(), store.clone(), config));

    TestEnv {
        db,
        service,
        events,
        store,
    }
}

// ===== Callers =====

pub fn admin() -> AuthContext {
    AuthContext::new("admin-1", vec![Role::Admin])
}

pub fn planner() -> AuthContext {
    AuthContext::new("planner-1", vec![Role::Planner])
}

pub fn reviewer() -> AuthContext {
    AuthContext::new("reviewer-1", vec![Role::Reviewer])
}

pub fn auditor() -> AuthContext {
    AuthContext::new("auditor-1", vec![Role::Auditor])
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ===== Seed data =====

pub fn new_plan(code: &str) -> NewInstitutionalPlan {
    NewInstitutionalPlan {
        code: code.to_string(),
        name: "Plan Estratégico Institucional".to_string(),
        institution: "Secretaría Nacional de Planificación".to_string(),
        description: Some("Plan 2025-2028".to_string()),
        start_date: date(2025, 1, 1),
        end_date: date(2028, 12, 31),
        status: PlanStatus::Draft,
    }
}

pub async fn seed_plan(service: &Service, code: &str) -> InstitutionalPlan {
    service
        .create::<InstitutionalPlan>(&planner(), new_plan(code))
        .await
        .unwrap()
}

pub async fn seed_objective(service: &Service, plan_id: i32, code: &str) -> StrategicObjective {
    service
        .create::<StrategicObjective>(
            &planner(),
            NewStrategicObjective {
                plan_id,
                code: code.to_string(),
                name: format!("Objetivo {code}"),
                description: None,
            },
        )
        .await
        .unwrap()
}

pub async fn seed_pnd(service: &Service, code: &str) -> PndObjective {
    service
        .create::<PndObjective>(
            &admin(),
            NewPndObjective {
                code: code.to_string(),
                name: format!("Objetivo nacional {code}"),
                axis: Some("Social".to_string()),
            },
        )
        .await
        .unwrap()
}

pub async fn seed_ods(service: &Service, number: i32) -> OdsGoal {
    service
        .create::<OdsGoal>(
            &admin(),
            NewOdsGoal {
                code: format!("ODS-{number}"),
                number,
                name: format!("Objetivo de desarrollo sostenible {number}"),
            },
        )
        .await
        .unwrap()
}

pub async fn seed_program(service: &Service, objective_id: i32, code: &str) -> Program {
    service
        .create::<Program>(
            &planner(),
            NewProgram {
                strategic_objective_id: objective_id,
                code: code.to_string(),
                name: format!("Programa {code}"),
                description: None,
                responsible: Some("Dirección de Inversión".to_string()),
                budget: Some(2_500_000.0),
            },
        )
        .await
        .unwrap()
}

pub fn new_project(program_id: i32, code: &str) -> NewProject {
    NewProject {
        program_id,
        code: code.to_string(),
        name: format!("Proyecto {code}"),
        description: None,
        typology_id: None,
        sector_id: None,
        location: Some("Quito".to_string()),
        start_date: date(2025, 3, 1),
        end_date: date(2026, 2, 28),
        budget: 750_000.0,
        status: ProjectStatus::Formulation,
    }
}

pub async fn seed_project(service: &Service, program_id: i32, code: &str) -> Project {
    service
        .create::<Project>(&planner(), new_project(program_id, code))
        .await
        .unwrap()
}

/// Plan, objective, program and project chained together
pub async fn seed_project_chain(service: &Service) -> Project {
    let plan = seed_plan(service, "PEI-CHAIN").await;
    let objective = seed_objective(service, plan.id, "OE-CHAIN").await;
    let program = seed_program(service, objective.id, "PRG-CHAIN").await;
    seed_project(service, program.id, "PRY-CHAIN").await
}

pub fn target(pnd_objective_id: i32, ods_goal_id: i32, weight: f64) -> AlignmentTarget {
    AlignmentTarget {
        pnd_objective_id,
        ods_goal_id,
        weight,
    }
}

/// Field names of a validation error
pub fn error_fields(error: &PlanningError) -> Vec<String> {
    match error {
        PlanningError::Validation { errors } => errors.iter().map(|e| e.field.clone()).collect(),
        other => panic!("expected validation error, got {other:?}"),
    }
}
