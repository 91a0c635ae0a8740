//! Binding between contract records and their SeaORM tables
//!
//! A [`RecordTable`] knows how to turn create inputs into active models,
//! apply partial updates and translate list filters into conditions. The
//! generic repository handles everything else.

use super::entity::*;
use crate::contract::*;
use crate::domain::Record;
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryTrait, Select};

pub type NewOf<E> = <<E as RecordTable>::Record as Record>::New;
pub type UpdateOf<E> = <<E as RecordTable>::Record as Record>::Update;
pub type FilterOf<E> = <<E as RecordTable>::Record as Record>::Filter;

pub trait RecordTable: EntityTrait {
    type Record: Record + From<Self::Model>;

    fn id_column() -> Self::Column;
    fn created_by_column() -> Self::Column;
    fn updated_by_column() -> Self::Column;
    fn created_at_column() -> Self::Column;
    fn updated_at_column() -> Self::Column;
    fn deleted_at_column() -> Self::Column;

    /// Column holding the unique business code, for records that have one
    fn code_column() -> Option<Self::Column> {
        None
    }

    /// Active model with the domain fields of `input` set; audit columns
    /// are stamped by the repository
    fn new_active(input: &NewOf<Self>) -> Self::ActiveModel;

    /// Set every field present in `input`
    fn apply_update(active: &mut Self::ActiveModel, input: &UpdateOf<Self>);

    fn apply_filter(query: Select<Self>, filter: &FilterOf<Self>) -> Select<Self>;
}

/// Column accessors shared by every table
macro_rules! audit_columns {
    ($table:ident) => {
        fn id_column() -> Self::Column {
            $table::Column::Id
        }
        fn created_by_column() -> Self::Column {
            $table::Column::CreatedBy
        }
        fn updated_by_column() -> Self::Column {
            $table::Column::UpdatedBy
        }
        fn created_at_column() -> Self::Column {
            $table::Column::CreatedAt
        }
        fn updated_at_column() -> Self::Column {
            $table::Column::UpdatedAt
        }
        fn deleted_at_column() -> Self::Column {
            $table::Column::DeletedAt
        }
    };
}

/// Copy present update fields onto the active model
macro_rules! set_present {
    ($active:ident, $input:ident, [$($field:ident),* $(,)?]) => {
        $(
            if let Some(value) = &$input.$field {
                $active.$field = Set(value.clone());
            }
        )*
    };
}

// ===== Plans and objectives =====

impl RecordTable for plan::Entity {
    type Record = InstitutionalPlan;

    audit_columns!(plan);

    fn code_column() -> Option<Self::Column> {
        Some(plan::Column::Code)
    }

    fn new_active(input: &NewInstitutionalPlan) -> plan::ActiveModel {
        plan::ActiveModel {
            code: Set(input.code.trim().to_string()),
            name: Set(input.name.clone()),
            institution: Set(input.institution.clone()),
            description: Set(input.description.clone()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            status: Set(input.status.as_str().to_string()),
            ..Default::default()
        }
    }

    fn apply_update(active: &mut plan::ActiveModel, input: &InstitutionalPlanUpdate) {
        set_present!(active, input, [name, institution, start_date, end_date]);
        if let Some(code) = &input.code {
            active.code = Set(code.trim().to_string());
        }
        if let Some(description) = &input.description {
            active.description = Set(Some(description.clone()));
        }
        if let Some(status) = input.status {
            active.status = Set(status.as_str().to_string());
        }
    }

    fn apply_filter(query: Select<Self>, filter: &InstitutionalPlanFilter) -> Select<Self> {
        query
            .apply_if(filter.status, |q, status| {
                q.filter(plan::Column::Status.eq(status.as_str()))
            })
            .apply_if(filter.institution.as_deref(), |q, institution| {
                q.filter(plan::Column::Institution.eq(institution))
            })
    }
}

impl RecordTable for strategic_objective::Entity {
    type Record = StrategicObjective;

    audit_columns!(strategic_objective);

    fn code_column() -> Option<Self::Column> {
        Some(strategic_objective::Column::Code)
    }

    fn new_active(input: &NewStrategicObjective) -> strategic_objective::ActiveModel {
        strategic_objective::ActiveModel {
            plan_id: Set(input.plan_id),
            code: Set(input.code.trim().to_string()),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            ..Default::default()
        }
    }

    fn apply_update(
        active: &mut strategic_objective::ActiveModel,
        input: &StrategicObjectiveUpdate,
    ) {
        set_present!(active, input, [plan_id, name]);
        if let Some(code) = &input.code {
            active.code = Set(code.trim().to_string());
        }
        if let Some(description) = &input.description {
            active.description = Set(Some(description.clone()));
        }
    }

    fn apply_filter(query: Select<Self>, filter: &StrategicObjectiveFilter) -> Select<Self> {
        query.apply_if(filter.plan_id, |q, id| {
            q.filter(strategic_objective::Column::PlanId.eq(id))
        })
    }
}

// ===== Reference catalogs =====

impl RecordTable for pnd_objective::Entity {
    type Record = PndObjective;

    audit_columns!(pnd_objective);

    fn code_column() -> Option<Self::Column> {
        Some(pnd_objective::Column::Code)
    }

    fn new_active(input: &NewPndObjective) -> pnd_objective::ActiveModel {
        pnd_objective::ActiveModel {
            code: Set(input.code.trim().to_string()),
            name: Set(input.name.clone()),
            axis: Set(input.axis.clone()),
            ..Default::default()
        }
    }

    fn apply_update(active: &mut pnd_objective::ActiveModel, input: &PndObjectiveUpdate) {
        set_present!(active, input, [name]);
        if let Some(code) = &input.code {
            active.code = Set(code.trim().to_string());
        }
        if let Some(axis) = &input.axis {
            active.axis = Set(Some(axis.clone()));
        }
    }

    fn apply_filter(query: Select<Self>, filter: &PndObjectiveFilter) -> Select<Self> {
        query.apply_if(filter.axis.as_deref(), |q, axis| {
            q.filter(pnd_objective::Column::Axis.eq(axis))
        })
    }
}

impl RecordTable for ods_goal::Entity {
    type Record = OdsGoal;

    audit_columns!(ods_goal);

    fn code_column() -> Option<Self::Column> {
        Some(ods_goal::Column::Code)
    }

    fn new_active(input: &NewOdsGoal) -> ods_goal::ActiveModel {
        ods_goal::ActiveModel {
            code: Set(input.code.trim().to_string()),
            number: Set(input.number),
            name: Set(input.name.clone()),
            ..Default::default()
        }
    }

    fn apply_update(active: &mut ods_goal::ActiveModel, input: &OdsGoalUpdate) {
        set_present!(active, input, [number, name]);
        if let Some(code) = &input.code {
            active.code = Set(code.trim().to_string());
        }
    }

    fn apply_filter(query: Select<Self>, filter: &OdsGoalFilter) -> Select<Self> {
        query.apply_if(filter.number, |q, number| {
            q.filter(ods_goal::Column::Number.eq(number))
        })
    }
}

impl RecordTable for typology::Entity {
    type Record = Typology;

    audit_columns!(typology);

    fn code_column() -> Option<Self::Column> {
        Some(typology::Column::Code)
    }

    fn new_active(input: &NewTypology) -> typology::ActiveModel {
        typology::ActiveModel {
            code: Set(input.code.trim().to_string()),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            ..Default::default()
        }
    }

    fn apply_update(active: &mut typology::ActiveModel, input: &TypologyUpdate) {
        set_present!(active, input, [name]);
        if let Some(code) = &input.code {
            active.code = Set(code.trim().to_string());
        }
        if let Some(description) = &input.description {
            active.description = Set(Some(description.clone()));
        }
    }

    fn apply_filter(query: Select<Self>, _filter: &TypologyFilter) -> Select<Self> {
        query
    }
}

impl RecordTable for sector::Entity {
    type Record = Sector;

    audit_columns!(sector);

    fn code_column() -> Option<Self::Column> {
        Some(sector::Column::Code)
    }

    fn new_active(input: &NewSector) -> sector::ActiveModel {
        sector::ActiveModel {
            code: Set(input.code.trim().to_string()),
            name: Set(input.name.clone()),
            level: Set(input.level.as_str().to_string()),
            parent_id: Set(input.parent_id),
            ..Default::default()
        }
    }

    fn apply_update(active: &mut sector::ActiveModel, input: &SectorUpdate) {
        set_present!(active, input, [name]);
        if let Some(code) = &input.code {
            active.code = Set(code.trim().to_string());
        }
    }

    fn apply_filter(query: Select<Self>, filter: &SectorFilter) -> Select<Self> {
        query
            .apply_if(filter.level, |q, level| {
                q.filter(sector::Column::Level.eq(level.as_str()))
            })
            .apply_if(filter.parent_id, |q, id| {
                q.filter(sector::Column::ParentId.eq(id))
            })
    }
}

// ===== Alignment =====

impl RecordTable for alignment::Entity {
    type Record = ObjectiveAlignment;

    audit_columns!(alignment);

    fn new_active(input: &NewObjectiveAlignment) -> alignment::ActiveModel {
        alignment::ActiveModel {
            strategic_objective_id: Set(input.strategic_objective_id),
            pnd_objective_id: Set(input.pnd_objective_id),
            ods_goal_id: Set(input.ods_goal_id),
            weight: Set(crate::domain::alignment::round_weight(input.weight)),
            ..Default::default()
        }
    }

    fn apply_update(active: &mut alignment::ActiveModel, input: &ObjectiveAlignmentUpdate) {
        set_present!(active, input, [pnd_objective_id, ods_goal_id]);
        if let Some(weight) = input.weight {
            active.weight = Set(crate::domain::alignment::round_weight(weight));
        }
    }

    fn apply_filter(query: Select<Self>, filter: &ObjectiveAlignmentFilter) -> Select<Self> {
        query
            .apply_if(filter.strategic_objective_id, |q, id| {
                q.filter(alignment::Column::StrategicObjectiveId.eq(id))
            })
            .apply_if(filter.pnd_objective_id, |q, id| {
                q.filter(alignment::Column::PndObjectiveId.eq(id))
            })
            .apply_if(filter.ods_goal_id, |q, id| {
                q.filter(alignment::Column::OdsGoalId.eq(id))
            })
    }
}

// ===== Programs, projects and activities =====

impl RecordTable for program::Entity {
    type Record = Program;

    audit_columns!(program);

    fn code_column() -> Option<Self::Column> {
        Some(program::Column::Code)
    }

    fn new_active(input: &NewProgram) -> program::ActiveModel {
        program::ActiveModel {
            strategic_objective_id: Set(input.strategic_objective_id),
            code: Set(input.code.trim().to_string()),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            responsible: Set(input.responsible.clone()),
            budget: Set(input.budget),
            ..Default::default()
        }
    }

    fn apply_update(active: &mut program::ActiveModel, input: &ProgramUpdate) {
        set_present!(active, input, [strategic_objective_id, name]);
        if let Some(code) = &input.code {
            active.code = Set(code.trim().to_string());
        }
        if let Some(description) = &input.description {
            active.description = Set(Some(description.clone()));
        }
        if let Some(responsible) = &input.responsible {
            active.responsible = Set(Some(responsible.clone()));
        }
        if let Some(budget) = input.budget {
            active.budget = Set(Some(budget));
        }
    }

    fn apply_filter(query: Select<Self>, filter: &ProgramFilter) -> Select<Self> {
        query.apply_if(filter.strategic_objective_id, |q, id| {
            q.filter(program::Column::StrategicObjectiveId.eq(id))
        })
    }
}

impl RecordTable for project::Entity {
    type Record = Project;

    audit_columns!(project);

    fn code_column() -> Option<Self::Column> {
        Some(project::Column::Code)
    }

    fn new_active(input: &NewProject) -> project::ActiveModel {
        project::ActiveModel {
            program_id: Set(input.program_id),
            code: Set(input.code.trim().to_string()),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            typology_id: Set(input.typology_id),
            sector_id: Set(input.sector_id),
            location: Set(input.location.clone()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            budget: Set(input.budget),
            status: Set(input.status.as_str().to_string()),
            ..Default::default()
        }
    }

    fn apply_update(active: &mut project::ActiveModel, input: &ProjectUpdate) {
        set_present!(active, input, [program_id, name, start_date, end_date, budget]);
        if let Some(code) = &input.code {
            active.code = Set(code.trim().to_string());
        }
        if let Some(description) = &input.description {
            active.description = Set(Some(description.clone()));
        }
        if let Some(location) = &input.location {
            active.location = Set(Some(location.clone()));
        }
        if let Some(id) = input.typology_id {
            active.typology_id = Set(Some(id));
        }
        if let Some(id) = input.sector_id {
            active.sector_id = Set(Some(id));
        }
        if let Some(status) = input.status {
            active.status = Set(status.as_str().to_string());
        }
    }

    fn apply_filter(query: Select<Self>, filter: &ProjectFilter) -> Select<Self> {
        query
            .apply_if(filter.program_id, |q, id| {
                q.filter(project::Column::ProgramId.eq(id))
            })
            .apply_if(filter.status, |q, status| {
                q.filter(project::Column::Status.eq(status.as_str()))
            })
            .apply_if(filter.sector_id, |q, id| {
                q.filter(project::Column::SectorId.eq(id))
            })
            .apply_if(filter.typology_id, |q, id| {
                q.filter(project::Column::TypologyId.eq(id))
            })
    }
}

impl RecordTable for activity::Entity {
    type Record = Activity;

    audit_columns!(activity);

    fn new_active(input: &NewActivity) -> activity::ActiveModel {
        activity::ActiveModel {
            project_id: Set(input.project_id),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            responsible: Set(input.responsible.clone()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            budget: Set(input.budget),
            ..Default::default()
        }
    }

    fn apply_update(active: &mut activity::ActiveModel, input: &ActivityUpdate) {
        set_present!(active, input, [name, start_date, end_date]);
        if let Some(description) = &input.description {
            active.description = Set(Some(description.clone()));
        }
        if let Some(responsible) = &input.responsible {
            active.responsible = Set(Some(responsible.clone()));
        }
        if let Some(budget) = input.budget {
            active.budget = Set(Some(budget));
        }
    }

    fn apply_filter(query: Select<Self>, filter: &ActivityFilter) -> Select<Self> {
        query.apply_if(filter.project_id, |q, id| {
            q.filter(activity::Column::ProjectId.eq(id))
        })
    }
}

// ===== Indicators and goals =====

impl RecordTable for indicator::Entity {
    type Record = Indicator;

    audit_columns!(indicator);

    fn code_column() -> Option<Self::Column> {
        Some(indicator::Column::Code)
    }

    fn new_active(input: &NewIndicator) -> indicator::ActiveModel {
        indicator::ActiveModel {
            strategic_objective_id: Set(input.strategic_objective_id),
            code: Set(input.code.trim().to_string()),
            name: Set(input.name.clone()),
            unit: Set(input.unit.clone()),
            frequency: Set(input.frequency.as_str().to_string()),
            baseline_value: Set(input.baseline_value),
            baseline_year: Set(input.baseline_year),
            ..Default::default()
        }
    }

    fn apply_update(active: &mut indicator::ActiveModel, input: &IndicatorUpdate) {
        set_present!(active, input, [name, unit]);
        if let Some(code) = &input.code {
            active.code = Set(code.trim().to_string());
        }
        if let Some(frequency) = input.frequency {
            active.frequency = Set(frequency.as_str().to_string());
        }
        if let Some(value) = input.baseline_value {
            active.baseline_value = Set(Some(value));
        }
        if let Some(year) = input.baseline_year {
            active.baseline_year = Set(Some(year));
        }
    }

    fn apply_filter(query: Select<Self>, filter: &IndicatorFilter) -> Select<Self> {
        query.apply_if(filter.strategic_objective_id, |q, id| {
            q.filter(indicator::Column::StrategicObjectiveId.eq(id))
        })
    }
}

impl RecordTable for goal::Entity {
    type Record = Goal;

    audit_columns!(goal);

    fn new_active(input: &NewGoal) -> goal::ActiveModel {
        goal::ActiveModel {
            indicator_id: Set(input.indicator_id),
            year: Set(input.year),
            target_value: Set(input.target_value),
            description: Set(input.description.clone()),
            ..Default::default()
        }
    }

    fn apply_update(active: &mut goal::ActiveModel, input: &GoalUpdate) {
        set_present!(active, input, [year, target_value]);
        if let Some(description) = &input.description {
            active.description = Set(Some(description.clone()));
        }
    }

    fn apply_filter(query: Select<Self>, filter: &GoalFilter) -> Select<Self> {
        query
            .apply_if(filter.indicator_id, |q, id| {
                q.filter(goal::Column::IndicatorId.eq(id))
            })
            .apply_if(filter.year, |q, year| q.filter(goal::Column::Year.eq(year)))
    }
}

// ===== Attachments and observations =====

impl RecordTable for attachment::Entity {
    type Record = Attachment;

    audit_columns!(attachment);

    fn new_active(input: &NewAttachment) -> attachment::ActiveModel {
        attachment::ActiveModel {
            project_id: Set(input.project_id),
            file_name: Set(input.file_name.clone()),
            content_type: Set(input.content_type.clone()),
            size_bytes: Set(input.size_bytes),
            storage_key: Set(input.storage_key.clone()),
            ..Default::default()
        }
    }

    fn apply_update(active: &mut attachment::ActiveModel, input: &AttachmentUpdate) {
        set_present!(active, input, [file_name]);
    }

    fn apply_filter(query: Select<Self>, filter: &AttachmentFilter) -> Select<Self> {
        query.apply_if(filter.project_id, |q, id| {
            q.filter(attachment::Column::ProjectId.eq(id))
        })
    }
}

impl RecordTable for observation::Entity {
    type Record = ProjectObservation;

    audit_columns!(observation);

    fn new_active(input: &NewProjectObservation) -> observation::ActiveModel {
        observation::ActiveModel {
            project_id: Set(input.project_id),
            body: Set(input.body.clone()),
            status: Set(input.status.as_str().to_string()),
            ..Default::default()
        }
    }

    fn apply_update(active: &mut observation::ActiveModel, input: &ProjectObservationUpdate) {
        set_present!(active, input, [body]);
        if let Some(status) = input.status {
            active.status = Set(status.as_str().to_string());
        }
    }

    fn apply_filter(query: Select<Self>, filter: &ProjectObservationFilter) -> Select<Self> {
        query
            .apply_if(filter.project_id, |q, id| {
                q.filter(observation::Column::ProjectId.eq(id))
            })
            .apply_if(filter.status, |q, status| {
                q.filter(observation::Column::Status.eq(status.as_str()))
            })
    }
}
