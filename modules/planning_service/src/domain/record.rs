//! Record abstraction shared by the generic service operations

use super::repository::{RecordRepository, Repositories};
use super::service::Service;
use super::validation::Validate;
use crate::contract::{Audit, PlanningError, Role};
use async_trait::async_trait;

/// A soft-deletable, audited record with typed create/update/filter inputs
pub trait Record: Clone + Send + Sync + 'static {
    type New: Validate + Send + Sync;
    type Update: Validate + Send + Sync;
    type Filter: Default + Send + Sync;

    /// Resource name used in errors, logs and events
    const RESOURCE: &'static str;

    fn id(&self) -> i32;

    fn audit(&self) -> &Audit;
}

/// Record-specific business rules plugged into the generic service flow
#[async_trait]
pub trait RecordOps: Record {
    /// Roles allowed to create, update and delete
    const WRITE_ROLES: &'static [Role];

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self>;

    /// Code that must be unique among live records, if the record has one
    fn new_code(_input: &Self::New) -> Option<&str> {
        None
    }

    fn update_code(_input: &Self::Update) -> Option<&str> {
        None
    }

    /// Checks that need storage: references, hierarchy rules, pair uniqueness
    async fn check_new(_service: &Service, _input: &Self::New) -> Result<(), PlanningError> {
        Ok(())
    }

    async fn check_update(
        _service: &Service,
        _current: &Self,
        _input: &Self::Update,
    ) -> Result<(), PlanningError> {
        Ok(())
    }
}
