//! Per-record business rules: write roles, code uniqueness and the checks
//! that need other records

use super::record::{Record, RecordOps};
use super::repository::{RecordRepository, Repositories};
use super::service::Service;
use crate::contract::*;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Reference catalogs are maintained by administrators only
pub const CATALOG_ROLES: &[Role] = &[Role::Admin];
/// Planning and investment records
pub const PLANNING_ROLES: &[Role] = &[Role::Admin, Role::Planner];
/// Project review
pub const REVIEW_ROLES: &[Role] = &[Role::Admin, Role::Reviewer];

macro_rules! impl_record {
    ($record:ty, $new:ty, $update:ty, $filter:ty, $resource:literal $(,)?) => {
        impl Record for $record {
            type New = $new;
            type Update = $update;
            type Filter = $filter;

            const RESOURCE: &'static str = $resource;

            fn id(&self) -> i32 {
                self.id
            }

            fn audit(&self) -> &Audit {
                &self.audit
            }
        }
    };
}

impl_record!(
    InstitutionalPlan,
    NewInstitutionalPlan,
    InstitutionalPlanUpdate,
    InstitutionalPlanFilter,
    "plan",
);
impl_record!(
    StrategicObjective,
    NewStrategicObjective,
    StrategicObjectiveUpdate,
    StrategicObjectiveFilter,
    "strategic_objective",
);
impl_record!(
    PndObjective,
    NewPndObjective,
    PndObjectiveUpdate,
    PndObjectiveFilter,
    "pnd_objective",
);
impl_record!(OdsGoal, NewOdsGoal, OdsGoalUpdate, OdsGoalFilter, "ods_goal");
impl_record!(
    ObjectiveAlignment,
    NewObjectiveAlignment,
    ObjectiveAlignmentUpdate,
    ObjectiveAlignmentFilter,
    "alignment",
);
impl_record!(Program, NewProgram, ProgramUpdate, ProgramFilter, "program");
impl_record!(Project, NewProject, ProjectUpdate, ProjectFilter, "project");
impl_record!(Activity, NewActivity, ActivityUpdate, ActivityFilter, "activity");
impl_record!(Indicator, NewIndicator, IndicatorUpdate, IndicatorFilter, "indicator");
impl_record!(Goal, NewGoal, GoalUpdate, GoalFilter, "goal");
impl_record!(Typology, NewTypology, TypologyUpdate, TypologyFilter, "typology");
impl_record!(Sector, NewSector, SectorUpdate, SectorFilter, "sector");
impl_record!(Attachment, NewAttachment, AttachmentUpdate, AttachmentFilter, "attachment");
impl_record!(
    ProjectObservation,
    NewProjectObservation,
    ProjectObservationUpdate,
    ProjectObservationFilter,
    "observation",
);

/// Start and end after applying an update to the stored bounds
fn merged_date_order(
    start: NaiveDate,
    end: NaiveDate,
    new_start: Option<NaiveDate>,
    new_end: Option<NaiveDate>,
) -> Result<(), PlanningError> {
    if new_start.unwrap_or(start) > new_end.unwrap_or(end) {
        return Err(PlanningError::invalid(
            "end_date",
            "must not be before start_date",
        ));
    }
    Ok(())
}

// ===== Institutional plans =====

#[async_trait]
impl RecordOps for InstitutionalPlan {
    const WRITE_ROLES: &'static [Role] = PLANNING_ROLES;

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self> {
        repos.plans.as_ref()
    }

    fn new_code(input: &Self::New) -> Option<&str> {
        Some(&input.code)
    }

    fn update_code(input: &Self::Update) -> Option<&str> {
        input.code.as_deref()
    }

    async fn check_update(
        _service: &Service,
        current: &Self,
        input: &Self::Update,
    ) -> Result<(), PlanningError> {
        merged_date_order(
            current.start_date,
            current.end_date,
            input.start_date,
            input.end_date,
        )
    }
}

// ===== Strategic objectives =====

#[async_trait]
impl RecordOps for StrategicObjective {
    const WRITE_ROLES: &'static [Role] = PLANNING_ROLES;

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self> {
        repos.objectives.as_ref()
    }

    fn new_code(input: &Self::New) -> Option<&str> {
        Some(&input.code)
    }

    fn update_code(input: &Self::Update) -> Option<&str> {
        input.code.as_deref()
    }

    async fn check_new(service: &Service, input: &Self::New) -> Result<(), PlanningError> {
        service
            .reference::<InstitutionalPlan>("plan_id", input.plan_id)
            .await?;
        Ok(())
    }

    async fn check_update(
        service: &Service,
        _current: &Self,
        input: &Self::Update,
    ) -> Result<(), PlanningError> {
        if let Some(plan_id) = input.plan_id {
            service
                .reference::<InstitutionalPlan>("plan_id", plan_id)
                .await?;
        }
        Ok(())
    }
}

// ===== Reference catalogs =====

#[async_trait]
impl RecordOps for PndObjective {
    const WRITE_ROLES: &'static [Role] = CATALOG_ROLES;

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self> {
        repos.pnd_objectives.as_ref()
    }

    fn new_code(input: &Self::New) -> Option<&str> {
        Some(&input.code)
    }

    fn update_code(input: &Self::Update) -> Option<&str> {
        input.code.as_deref()
    }
}

#[async_trait]
impl RecordOps for OdsGoal {
    const WRITE_ROLES: &'static [Role] = CATALOG_ROLES;

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self> {
        repos.ods_goals.as_ref()
    }

    fn new_code(input: &Self::New) -> Option<&str> {
        Some(&input.code)
    }

    fn update_code(input: &Self::Update) -> Option<&str> {
        input.code.as_deref()
    }
}

#[async_trait]
impl RecordOps for Typology {
    const WRITE_ROLES: &'static [Role] = CATALOG_ROLES;

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self> {
        repos.typologies.as_ref()
    }

    fn new_code(input: &Self::New) -> Option<&str> {
        Some(&input.code)
    }

    fn update_code(input: &Self::Update) -> Option<&str> {
        input.code.as_deref()
    }
}

#[async_trait]
impl RecordOps for Sector {
    const WRITE_ROLES: &'static [Role] = CATALOG_ROLES;

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self> {
        repos.sectors.as_ref()
    }

    fn new_code(input: &Self::New) -> Option<&str> {
        Some(&input.code)
    }

    fn update_code(input: &Self::Update) -> Option<&str> {
        input.code.as_deref()
    }

    /// The parent must sit exactly one level above the new sector
    async fn check_new(service: &Service, input: &Self::New) -> Result<(), PlanningError> {
        let (Some(parent_id), Some(expected)) = (input.parent_id, input.level.parent_level())
        else {
            return Ok(());
        };
        let parent = service.reference::<Sector>("parent_id", parent_id).await?;
        if parent.level != expected {
            return Err(PlanningError::invalid(
                "parent_id",
                format!(
                    "parent of a {} must be a {expected}, got {}",
                    input.level, parent.level
                ),
            ));
        }
        Ok(())
    }
}

// ===== Alignment =====

/// A live alignment of `strategic_objective_id` other than `exclude_id`
/// already links the same PND objective and ODS goal
async fn ensure_unique_pair(
    service: &Service,
    strategic_objective_id: i32,
    pnd_objective_id: i32,
    ods_goal_id: i32,
    exclude_id: Option<i32>,
) -> Result<(), PlanningError> {
    let taken = service
        .alignments_of(strategic_objective_id)
        .await?
        .iter()
        .any(|a| {
            Some(a.id) != exclude_id
                && a.pnd_objective_id == pnd_objective_id
                && a.ods_goal_id == ods_goal_id
        });
    if taken {
        return Err(PlanningError::conflict(format!(
            "strategic objective {strategic_objective_id} is already aligned to pnd_objective_id={pnd_objective_id}, ods_goal_id={ods_goal_id}"
        )));
    }
    Ok(())
}

#[async_trait]
impl RecordOps for ObjectiveAlignment {
    const WRITE_ROLES: &'static [Role] = PLANNING_ROLES;

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self> {
        repos.alignments.as_ref()
    }

    async fn check_new(service: &Service, input: &Self::New) -> Result<(), PlanningError> {
        service
            .reference::<StrategicObjective>("strategic_objective_id", input.strategic_objective_id)
            .await?;
        service
            .reference::<PndObjective>("pnd_objective_id", input.pnd_objective_id)
            .await?;
        service
            .reference::<OdsGoal>("ods_goal_id", input.ods_goal_id)
            .await?;
        ensure_unique_pair(
            service,
            input.strategic_objective_id,
            input.pnd_objective_id,
            input.ods_goal_id,
            None,
        )
        .await
    }

    async fn check_update(
        service: &Service,
        current: &Self,
        input: &Self::Update,
    ) -> Result<(), PlanningError> {
        if let Some(id) = input.pnd_objective_id {
            service
                .reference::<PndObjective>("pnd_objective_id", id)
                .await?;
        }
        if let Some(id) = input.ods_goal_id {
            service.reference::<OdsGoal>("ods_goal_id", id).await?;
        }
        if input.pnd_objective_id.is_none() && input.ods_goal_id.is_none() {
            return Ok(());
        }
        ensure_unique_pair(
            service,
            current.strategic_objective_id,
            input.pnd_objective_id.unwrap_or(current.pnd_objective_id),
            input.ods_goal_id.unwrap_or(current.ods_goal_id),
            Some(current.id),
        )
        .await
    }
}

// ===== Programs, projects and activities =====

#[async_trait]
impl RecordOps for Program {
    const WRITE_ROLES: &'static [Role] = PLANNING_ROLES;

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self> {
        repos.programs.as_ref()
    }

    fn new_code(input: &Self::New) -> Option<&str> {
        Some(&input.code)
    }

    fn update_code(input: &Self::Update) -> Option<&str> {
        input.code.as_deref()
    }

    async fn check_new(service: &Service, input: &Self::New) -> Result<(), PlanningError> {
        service
            .reference::<StrategicObjective>("strategic_objective_id", input.strategic_objective_id)
            .await?;
        Ok(())
    }

    async fn check_update(
        service: &Service,
        _current: &Self,
        input: &Self::Update,
    ) -> Result<(), PlanningError> {
        if let Some(id) = input.strategic_objective_id {
            service
                .reference::<StrategicObjective>("strategic_objective_id", id)
                .await?;
        }
        Ok(())
    }
}

async fn check_project_references(
    service: &Service,
    program_id: Option<i32>,
    typology_id: Option<i32>,
    sector_id: Option<i32>,
) -> Result<(), PlanningError> {
    if let Some(id) = program_id {
        service.reference::<Program>("program_id", id).await?;
    }
    if let Some(id) = typology_id {
        service.reference::<Typology>("typology_id", id).await?;
    }
    if let Some(id) = sector_id {
        service.reference::<Sector>("sector_id", id).await?;
    }
    Ok(())
}

#[async_trait]
impl RecordOps for Project {
    const WRITE_ROLES: &'static [Role] = PLANNING_ROLES;

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self> {
        repos.projects.as_ref()
    }

    fn new_code(input: &Self::New) -> Option<&str> {
        Some(&input.code)
    }

    fn update_code(input: &Self::Update) -> Option<&str> {
        input.code.as_deref()
    }

    async fn check_new(service: &Service, input: &Self::New) -> Result<(), PlanningError> {
        check_project_references(
            service,
            Some(input.program_id),
            input.typology_id,
            input.sector_id,
        )
        .await
    }

    async fn check_update(
        service: &Service,
        current: &Self,
        input: &Self::Update,
    ) -> Result<(), PlanningError> {
        merged_date_order(
            current.start_date,
            current.end_date,
            input.start_date,
            input.end_date,
        )?;
        check_project_references(service, input.program_id, input.typology_id, input.sector_id)
            .await
    }
}

#[async_trait]
impl RecordOps for Activity {
    const WRITE_ROLES: &'static [Role] = PLANNING_ROLES;

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self> {
        repos.activities.as_ref()
    }

    async fn check_new(service: &Service, input: &Self::New) -> Result<(), PlanningError> {
        service
            .reference::<Project>("project_id", input.project_id)
            .await?;
        Ok(())
    }

    async fn check_update(
        _service: &Service,
        current: &Self,
        input: &Self::Update,
    ) -> Result<(), PlanningError> {
        merged_date_order(
            current.start_date,
            current.end_date,
            input.start_date,
            input.end_date,
        )
    }
}

// ===== Indicators and goals =====

#[async_trait]
impl RecordOps for Indicator {
    const WRITE_ROLES: &'static [Role] = PLANNING_ROLES;

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self> {
        repos.indicators.as_ref()
    }

    fn new_code(input: &Self::New) -> Option<&str> {
        Some(&input.code)
    }

    fn update_code(input: &Self::Update) -> Option<&str> {
        input.code.as_deref()
    }

    async fn check_new(service: &Service, input: &Self::New) -> Result<(), PlanningError> {
        service
            .reference::<StrategicObjective>("strategic_objective_id", input.strategic_objective_id)
            .await?;
        Ok(())
    }
}

/// One live goal per indicator and year
async fn ensure_unique_goal_year(
    service: &Service,
    indicator_id: i32,
    year: i32,
    exclude_id: Option<i32>,
) -> Result<(), PlanningError> {
    let filter = GoalFilter {
        indicator_id: Some(indicator_id),
        year: Some(year),
    };
    let existing = service
        .repositories()
        .goals
        .list(&filter, Page::all())
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, "failed to list goals");
            PlanningError::Internal
        })?;
    if existing.items.iter().any(|g| Some(g.id) != exclude_id) {
        return Err(PlanningError::conflict(format!(
            "indicator {indicator_id} already has a goal for {year}"
        )));
    }
    Ok(())
}

#[async_trait]
impl RecordOps for Goal {
    const WRITE_ROLES: &'static [Role] = PLANNING_ROLES;

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self> {
        repos.goals.as_ref()
    }

    async fn check_new(service: &Service, input: &Self::New) -> Result<(), PlanningError> {
        service
            .reference::<Indicator>("indicator_id", input.indicator_id)
            .await?;
        ensure_unique_goal_year(service, input.indicator_id, input.year, None).await
    }

    async fn check_update(
        service: &Service,
        current: &Self,
        input: &Self::Update,
    ) -> Result<(), PlanningError> {
        match input.year {
            Some(year) if year != current.year => {
                ensure_unique_goal_year(service, current.indicator_id, year, Some(current.id))
                    .await
            }
            _ => Ok(()),
        }
    }
}

// ===== Attachments and observations =====

#[async_trait]
impl RecordOps for Attachment {
    const WRITE_ROLES: &'static [Role] = PLANNING_ROLES;

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self> {
        repos.attachments.as_ref()
    }

    async fn check_new(service: &Service, input: &Self::New) -> Result<(), PlanningError> {
        service
            .reference::<Project>("project_id", input.project_id)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordOps for ProjectObservation {
    const WRITE_ROLES: &'static [Role] = REVIEW_ROLES;

    fn repository(repos: &Repositories) -> &dyn RecordRepository<Self> {
        repos.observations.as_ref()
    }

    async fn check_new(service: &Service, input: &Self::New) -> Result<(), PlanningError> {
        service
            .reference::<Project>("project_id", input.project_id)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn merged_dates_use_stored_bound() {
        let start = date(2025, 1, 1);
        let end = date(2025, 12, 31);

        assert!(merged_date_order(start, end, None, None).is_ok());
        assert!(merged_date_order(start, end, Some(date(2025, 6, 1)), None).is_ok());

        let err = merged_date_order(start, end, None, Some(date(2024, 12, 1))).unwrap_err();
        assert_eq!(
            err,
            PlanningError::invalid("end_date", "must not be before start_date")
        );
        assert!(merged_date_order(start, end, Some(date(2026, 1, 1)), None).is_err());
    }

    #[test]
    fn catalogs_are_admin_only() {
        assert_eq!(<PndObjective as RecordOps>::WRITE_ROLES, &[Role::Admin]);
        assert_eq!(<Sector as RecordOps>::WRITE_ROLES, &[Role::Admin]);
        assert!(<Project as RecordOps>::WRITE_ROLES.contains(&Role::Planner));
        assert!(!<ProjectObservation as RecordOps>::WRITE_ROLES.contains(&Role::Planner));
    }
}
