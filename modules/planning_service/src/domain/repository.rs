//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs

use super::record::Record;
use crate::contract::*;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Soft-delete aware CRUD over one record type
///
/// Every read, listing, update and code lookup ignores soft-deleted rows.
#[async_trait]
pub trait RecordRepository<R: Record>: Send + Sync {
    /// Insert a new record on behalf of `actor`
    async fn create(&self, input: &R::New, actor: &str) -> Result<R>;

    /// Find a live record by identifier
    async fn find_by_id(&self, id: i32) -> Result<Option<R>>;

    /// List live records matching `filter`, ordered by identifier
    async fn list(&self, filter: &R::Filter, page: Page) -> Result<Paged<R>>;

    /// Apply a partial update; `None` when the record is missing or deleted
    async fn update(&self, id: i32, input: &R::Update, actor: &str) -> Result<Option<R>>;

    /// Mark a live record deleted; `false` when there was nothing to delete
    async fn soft_delete(&self, id: i32, actor: &str) -> Result<bool>;

    /// Whether a live record other than `exclude_id` already uses `code`
    async fn code_exists(&self, code: &str, exclude_id: Option<i32>) -> Result<bool>;
}

/// Outcome of a bulk alignment replacement
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentReplacement {
    /// Number of previous alignments soft-deleted
    pub superseded: u64,
    pub created: Vec<ObjectiveAlignment>,
}

/// Generation-level operations on the alignments of a strategic objective
#[async_trait]
pub trait AlignmentRepository: Send + Sync {
    /// Soft-delete every live alignment of the objective and insert
    /// `targets` as the new generation, atomically.
    async fn replace_for_objective(
        &self,
        strategic_objective_id: i32,
        targets: &[AlignmentTarget],
        actor: &str,
    ) -> Result<AlignmentReplacement>;
}

/// Every repository the domain service depends on
#[derive(Clone)]
pub struct Repositories {
    pub plans: Arc<dyn RecordRepository<InstitutionalPlan>>,
    pub objectives: Arc<dyn RecordRepository<StrategicObjective>>,
    pub pnd_objectives: Arc<dyn RecordRepository<PndObjective>>,
    pub ods_goals: Arc<dyn RecordRepository<OdsGoal>>,
    pub alignments: Arc<dyn RecordRepository<ObjectiveAlignment>>,
    pub alignment_sets: Arc<dyn AlignmentRepository>,
    pub programs: Arc<dyn RecordRepository<Program>>,
    pub projects: Arc<dyn RecordRepository<Project>>,
    pub activities: Arc<dyn RecordRepository<Activity>>,
    pub indicators: Arc<dyn RecordRepository<Indicator>>,
    pub goals: Arc<dyn RecordRepository<Goal>>,
    pub typologies: Arc<dyn RecordRepository<Typology>>,
    pub sectors: Arc<dyn RecordRepository<Sector>>,
    pub attachments: Arc<dyn RecordRepository<Attachment>>,
    pub observations: Arc<dyn RecordRepository<ProjectObservation>>,
}
