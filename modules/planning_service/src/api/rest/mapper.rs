//! Mappers between REST DTOs and contract models

use super::dto::*;
use crate::contract::*;

/// Conversion of a request into its contract input; fails on values the
/// JSON types cannot rule out, such as unknown enumeration strings
pub trait IntoDomain<T> {
    fn into_domain(self) -> Result<T, PlanningError>;
}

/// Parse a wire enumeration, reporting unknown values against `$field`
macro_rules! parse_enum {
    ($ty:ty, $field:literal, $value:expr) => {
        <$ty>::parse($value.trim()).ok_or_else(|| {
            PlanningError::invalid($field, format!("must be one of: {}", <$ty>::expected()))
        })
    };
}

macro_rules! parse_opt_enum {
    ($ty:ty, $field:literal, $value:expr) => {
        match $value.as_deref() {
            Some(value) => parse_enum!($ty, $field, value).map(Some),
            None => Ok(None),
        }
    };
}

impl From<Audit> for AuditDto {
    fn from(audit: Audit) -> Self {
        Self {
            created_by: audit.created_by,
            updated_by: audit.updated_by,
            created_at: audit.created_at,
            updated_at: audit.updated_at,
        }
    }
}

impl<T, D: From<T>> From<Paged<T>> for ListResponse<D> {
    fn from(paged: Paged<T>) -> Self {
        Self {
            items: paged.items.into_iter().map(D::from).collect(),
            total: paged.total,
            limit: paged.page.limit,
            offset: paged.page.offset,
        }
    }
}

impl From<PageQuery> for Page {
    fn from(query: PageQuery) -> Self {
        Page::new(query.limit, query.offset)
    }
}

impl From<AuthContext> for MeDto {
    fn from(ctx: AuthContext) -> Self {
        Self {
            subject: ctx.subject,
            display_name: ctx.display_name,
            roles: ctx.roles.iter().map(|r| r.as_str().to_string()).collect(),
        }
    }
}

// ===== Institutional plans =====

impl From<InstitutionalPlan> for PlanDto {
    fn from(plan: InstitutionalPlan) -> Self {
        Self {
            id: plan.id,
            code: plan.code,
            name: plan.name,
            institution: plan.institution,
            description: plan.description,
            start_date: plan.start_date,
            end_date: plan.end_date,
            status: plan.status.as_str().to_string(),
            audit: plan.audit.into(),
        }
    }
}

impl IntoDomain<NewInstitutionalPlan> for CreatePlanRequest {
    fn into_domain(self) -> Result<NewInstitutionalPlan, PlanningError> {
        Ok(NewInstitutionalPlan {
            status: parse_opt_enum!(PlanStatus, "status", self.status)?
                .unwrap_or(PlanStatus::Draft),
            code: self.code,
            name: self.name,
            institution: self.institution,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

impl IntoDomain<InstitutionalPlanUpdate> for UpdatePlanRequest {
    fn into_domain(self) -> Result<InstitutionalPlanUpdate, PlanningError> {
        Ok(InstitutionalPlanUpdate {
            status: parse_opt_enum!(PlanStatus, "status", self.status)?,
            code: self.code,
            name: self.name,
            institution: self.institution,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

impl IntoDomain<InstitutionalPlanFilter> for PlanQuery {
    fn into_domain(self) -> Result<InstitutionalPlanFilter, PlanningError> {
        Ok(InstitutionalPlanFilter {
            status: parse_opt_enum!(PlanStatus, "status", self.status)?,
            institution: self.institution,
        })
    }
}

// ===== Strategic objectives =====

impl From<StrategicObjective> for StrategicObjectiveDto {
    fn from(objective: StrategicObjective) -> Self {
        Self {
            id: objective.id,
            plan_id: objective.plan_id,
            code: objective.code,
            name: objective.name,
            description: objective.description,
            audit: objective.audit.into(),
        }
    }
}

impl IntoDomain<NewStrategicObjective> for CreateStrategicObjectiveRequest {
    fn into_domain(self) -> Result<NewStrategicObjective, PlanningError> {
        Ok(NewStrategicObjective {
            plan_id: self.plan_id,
            code: self.code,
            name: self.name,
            description: self.description,
        })
    }
}

impl IntoDomain<StrategicObjectiveUpdate> for UpdateStrategicObjectiveRequest {
    fn into_domain(self) -> Result<StrategicObjectiveUpdate, PlanningError> {
        Ok(StrategicObjectiveUpdate {
            plan_id: self.plan_id,
            code: self.code,
            name: self.name,
            description: self.description,
        })
    }
}

impl IntoDomain<StrategicObjectiveFilter> for StrategicObjectiveQuery {
    fn into_domain(self) -> Result<StrategicObjectiveFilter, PlanningError> {
        Ok(StrategicObjectiveFilter {
            plan_id: self.plan_id,
        })
    }
}

// ===== PND objectives and ODS goals =====

impl From<PndObjective> for PndObjectiveDto {
    fn from(objective: PndObjective) -> Self {
        Self {
            id: objective.id,
            code: objective.code,
            name: objective.name,
            axis: objective.axis,
            audit: objective.audit.into(),
        }
    }
}

impl IntoDomain<NewPndObjective> for CreatePndObjectiveRequest {
    fn into_domain(self) -> Result<NewPndObjective, PlanningError> {
        Ok(NewPndObjective {
            code: self.code,
            name: self.name,
            axis: self.axis,
        })
    }
}

impl IntoDomain<PndObjectiveUpdate> for UpdatePndObjectiveRequest {
    fn into_domain(self) -> Result<PndObjectiveUpdate, PlanningError> {
        Ok(PndObjectiveUpdate {
            code: self.code,
            name: self.name,
            axis: self.axis,
        })
    }
}

impl IntoDomain<PndObjectiveFilter> for PndObjectiveQuery {
    fn into_domain(self) -> Result<PndObjectiveFilter, PlanningError> {
        Ok(PndObjectiveFilter { axis: self.axis })
    }
}

impl From<OdsGoal> for OdsGoalDto {
    fn from(goal: OdsGoal) -> Self {
        Self {
            id: goal.id,
            code: goal.code,
            number: goal.number,
            name: goal.name,
            audit: goal.audit.into(),
        }
    }
}

impl IntoDomain<NewOdsGoal> for CreateOdsGoalRequest {
    fn into_domain(self) -> Result<NewOdsGoal, PlanningError> {
        Ok(NewOdsGoal {
            code: self.code,
            number: self.number,
            name: self.name,
        })
    }
}

impl IntoDomain<OdsGoalUpdate> for UpdateOdsGoalRequest {
    fn into_domain(self) -> Result<OdsGoalUpdate, PlanningError> {
        Ok(OdsGoalUpdate {
            code: self.code,
            number: self.number,
            name: self.name,
        })
    }
}

impl IntoDomain<OdsGoalFilter> for OdsGoalQuery {
    fn into_domain(self) -> Result<OdsGoalFilter, PlanningError> {
        Ok(OdsGoalFilter {
            number: self.number,
        })
    }
}

// ===== Objective alignment =====

impl From<ObjectiveAlignment> for AlignmentDto {
    fn from(alignment: ObjectiveAlignment) -> Self {
        Self {
            id: alignment.id,
            strategic_objective_id: alignment.strategic_objective_id,
            pnd_objective_id: alignment.pnd_objective_id,
            ods_goal_id: alignment.ods_goal_id,
            weight: alignment.weight,
            audit: alignment.audit.into(),
        }
    }
}

impl IntoDomain<NewObjectiveAlignment> for CreateAlignmentRequest {
    fn into_domain(self) -> Result<NewObjectiveAlignment, PlanningError> {
        Ok(NewObjectiveAlignment {
            strategic_objective_id: self.strategic_objective_id,
            pnd_objective_id: self.pnd_objective_id,
            ods_goal_id: self.ods_goal_id,
            weight: self.weight,
        })
    }
}

impl IntoDomain<ObjectiveAlignmentUpdate> for UpdateAlignmentRequest {
    fn into_domain(self) -> Result<ObjectiveAlignmentUpdate, PlanningError> {
        Ok(ObjectiveAlignmentUpdate {
            pnd_objective_id: self.pnd_objective_id,
            ods_goal_id: self.ods_goal_id,
            weight: self.weight,
        })
    }
}

impl IntoDomain<ObjectiveAlignmentFilter> for AlignmentQuery {
    fn into_domain(self) -> Result<ObjectiveAlignmentFilter, PlanningError> {
        Ok(ObjectiveAlignmentFilter {
            strategic_objective_id: self.strategic_objective_id,
            pnd_objective_id: self.pnd_objective_id,
            ods_goal_id: self.ods_goal_id,
        })
    }
}

impl From<AlignmentTargetDto> for AlignmentTarget {
    fn from(dto: AlignmentTargetDto) -> Self {
        Self {
            pnd_objective_id: dto.pnd_objective_id,
            ods_goal_id: dto.ods_goal_id,
            weight: dto.weight,
        }
    }
}

impl From<AlignmentSummary> for AlignmentSummaryDto {
    fn from(summary: AlignmentSummary) -> Self {
        Self {
            strategic_objective_id: summary.strategic_objective_id,
            alignments: summary.alignments.into_iter().map(Into::into).collect(),
            total_weight: summary.total_weight,
            is_complete: summary.is_complete,
        }
    }
}

// ===== Programs, projects and activities =====

impl From<Program> for ProgramDto {
    fn from(program: Program) -> Self {
        Self {
            id: program.id,
            strategic_objective_id: program.strategic_objective_id,
            code: program.code,
            name: program.name,
            description: program.description,
            responsible: program.responsible,
            budget: program.budget,
            audit: program.audit.into(),
        }
    }
}

impl IntoDomain<NewProgram> for CreateProgramRequest {
    fn into_domain(self) -> Result<NewProgram, PlanningError> {
        Ok(NewProgram {
            strategic_objective_id: self.strategic_objective_id,
            code: self.code,
            name: self.name,
            description: self.description,
            responsible: self.responsible,
            budget: self.budget,
        })
    }
}

impl IntoDomain<ProgramUpdate> for UpdateProgramRequest {
    fn into_domain(self) -> Result<ProgramUpdate, PlanningError> {
        Ok(ProgramUpdate {
            strategic_objective_id: self.strategic_objective_id,
            code: self.code,
            name: self.name,
            description: self.description,
            responsible: self.responsible,
            budget: self.budget,
        })
    }
}

impl IntoDomain<ProgramFilter> for ProgramQuery {
    fn into_domain(self) -> Result<ProgramFilter, PlanningError> {
        Ok(ProgramFilter {
            strategic_objective_id: self.strategic_objective_id,
        })
    }
}

impl From<Project> for ProjectDto {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            program_id: project.program_id,
            code: project.code,
            name: project.name,
            description: project.description,
            typology_id: project.typology_id,
            sector_id: project.sector_id,
            location: project.location,
            start_date: project.start_date,
            end_date: project.end_date,
            budget: project.budget,
            status: project.status.as_str().to_string(),
            audit: project.audit.into(),
        }
    }
}

impl IntoDomain<NewProject> for CreateProjectRequest {
    fn into_domain(self) -> Result<NewProject, PlanningError> {
        Ok(NewProject {
            status: parse_opt_enum!(ProjectStatus, "status", self.status)?
                .unwrap_or(ProjectStatus::Formulation),
            program_id: self.program_id,
            code: self.code,
            name: self.name,
            description: self.description,
            typology_id: self.typology_id,
            sector_id: self.sector_id,
            location: self.location,
            start_date: self.start_date,
            end_date: self.end_date,
            budget: self.budget,
        })
    }
}

impl IntoDomain<ProjectUpdate> for UpdateProjectRequest {
    fn into_domain(self) -> Result<ProjectUpdate, PlanningError> {
        Ok(ProjectUpdate {
            status: parse_opt_enum!(ProjectStatus, "status", self.status)?,
            program_id: self.program_id,
            code: self.code,
            name: self.name,
            description: self.description,
            typology_id: self.typology_id,
            sector_id: self.sector_id,
            location: self.location,
            start_date: self.start_date,
            end_date: self.end_date,
            budget: self.budget,
        })
    }
}

impl IntoDomain<ProjectFilter> for ProjectQuery {
    fn into_domain(self) -> Result<ProjectFilter, PlanningError> {
        Ok(ProjectFilter {
            status: parse_opt_enum!(ProjectStatus, "status", self.status)?,
            program_id: self.program_id,
            sector_id: self.sector_id,
            typology_id: self.typology_id,
        })
    }
}

impl From<Activity> for ActivityDto {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            project_id: activity.project_id,
            name: activity.name,
            description: activity.description,
            responsible: activity.responsible,
            start_date: activity.start_date,
            end_date: activity.end_date,
            budget: activity.budget,
            audit: activity.audit.into(),
        }
    }
}

impl IntoDomain<NewActivity> for CreateActivityRequest {
    fn into_domain(self) -> Result<NewActivity, PlanningError> {
        Ok(NewActivity {
            project_id: self.project_id,
            name: self.name,
            description: self.description,
            responsible: self.responsible,
            start_date: self.start_date,
            end_date: self.end_date,
            budget: self.budget,
        })
    }
}

impl IntoDomain<ActivityUpdate> for UpdateActivityRequest {
    fn into_domain(self) -> Result<ActivityUpdate, PlanningError> {
        Ok(ActivityUpdate {
            name: self.name,
            description: self.description,
            responsible: self.responsible,
            start_date: self.start_date,
            end_date: self.end_date,
            budget: self.budget,
        })
    }
}

impl IntoDomain<ActivityFilter> for ActivityQuery {
    fn into_domain(self) -> Result<ActivityFilter, PlanningError> {
        Ok(ActivityFilter {
            project_id: self.project_id,
        })
    }
}

// ===== Indicators and goals =====

impl From<Indicator> for IndicatorDto {
    fn from(indicator: Indicator) -> Self {
        Self {
            id: indicator.id,
            strategic_objective_id: indicator.strategic_objective_id,
            code: indicator.code,
            name: indicator.name,
            unit: indicator.unit,
            frequency: indicator.frequency.as_str().to_string(),
            baseline_value: indicator.baseline_value,
            baseline_year: indicator.baseline_year,
            audit: indicator.audit.into(),
        }
    }
}

impl IntoDomain<NewIndicator> for CreateIndicatorRequest {
    fn into_domain(self) -> Result<NewIndicator, PlanningError> {
        Ok(NewIndicator {
            frequency: parse_enum!(IndicatorFrequency, "frequency", self.frequency)?,
            strategic_objective_id: self.strategic_objective_id,
            code: self.code,
            name: self.name,
            unit: self.unit,
            baseline_value: self.baseline_value,
            baseline_year: self.baseline_year,
        })
    }
}

impl IntoDomain<IndicatorUpdate> for UpdateIndicatorRequest {
    fn into_domain(self) -> Result<IndicatorUpdate, PlanningError> {
        Ok(IndicatorUpdate {
            frequency: parse_opt_enum!(IndicatorFrequency, "frequency", self.frequency)?,
            code: self.code,
            name: self.name,
            unit: self.unit,
            baseline_value: self.baseline_value,
            baseline_year: self.baseline_year,
        })
    }
}

impl IntoDomain<IndicatorFilter> for IndicatorQuery {
    fn into_domain(self) -> Result<IndicatorFilter, PlanningError> {
        Ok(IndicatorFilter {
            strategic_objective_id: self.strategic_objective_id,
        })
    }
}

impl From<Goal> for GoalDto {
    fn from(goal: Goal) -> Self {
        Self {
            id: goal.id,
            indicator_id: goal.indicator_id,
            year: goal.year,
            target_value: goal.target_value,
            description: goal.description,
            audit: goal.audit.into(),
        }
    }
}

impl IntoDomain<NewGoal> for CreateGoalRequest {
    fn into_domain(self) -> Result<NewGoal, PlanningError> {
        Ok(NewGoal {
            indicator_id: self.indicator_id,
            year: self.year,
            target_value: self.target_value,
            description: self.description,
        })
    }
}

impl IntoDomain<GoalUpdate> for UpdateGoalRequest {
    fn into_domain(self) -> Result<GoalUpdate, PlanningError> {
        Ok(GoalUpdate {
            year: self.year,
            target_value: self.target_value,
            description: self.description,
        })
    }
}

impl IntoDomain<GoalFilter> for GoalQuery {
    fn into_domain(self) -> Result<GoalFilter, PlanningError> {
        Ok(GoalFilter {
            indicator_id: self.indicator_id,
            year: self.year,
        })
    }
}

// ===== Taxonomies =====

impl From<Typology> for TypologyDto {
    fn from(typology: Typology) -> Self {
        Self {
            id: typology.id,
            code: typology.code,
            name: typology.name,
            description: typology.description,
            audit: typology.audit.into(),
        }
    }
}

impl IntoDomain<NewTypology> for CreateTypologyRequest {
    fn into_domain(self) -> Result<NewTypology, PlanningError> {
        Ok(NewTypology {
            code: self.code,
            name: self.name,
            description: self.description,
        })
    }
}

impl IntoDomain<TypologyUpdate> for UpdateTypologyRequest {
    fn into_domain(self) -> Result<TypologyUpdate, PlanningError> {
        Ok(TypologyUpdate {
            code: self.code,
            name: self.name,
            description: self.description,
        })
    }
}

impl IntoDomain<TypologyFilter> for TypologyQuery {
    fn into_domain(self) -> Result<TypologyFilter, PlanningError> {
        Ok(TypologyFilter {})
    }
}

impl From<Sector> for SectorDto {
    fn from(sector: Sector) -> Self {
        Self {
            id: sector.id,
            code: sector.code,
            name: sector.name,
            level: sector.level.as_str().to_string(),
            parent_id: sector.parent_id,
            audit: sector.audit.into(),
        }
    }
}

impl IntoDomain<NewSector> for CreateSectorRequest {
    fn into_domain(self) -> Result<NewSector, PlanningError> {
        Ok(NewSector {
            level: parse_enum!(SectorLevel, "level", self.level)?,
            code: self.code,
            name: self.name,
            parent_id: self.parent_id,
        })
    }
}

impl IntoDomain<SectorUpdate> for UpdateSectorRequest {
    fn into_domain(self) -> Result<SectorUpdate, PlanningError> {
        Ok(SectorUpdate {
            code: self.code,
            name: self.name,
        })
    }
}

impl IntoDomain<SectorFilter> for SectorQuery {
    fn into_domain(self) -> Result<SectorFilter, PlanningError> {
        Ok(SectorFilter {
            level: parse_opt_enum!(SectorLevel, "level", self.level)?,
            parent_id: self.parent_id,
        })
    }
}

// ===== Attachments and observations =====

impl From<Attachment> for AttachmentDto {
    fn from(attachment: Attachment) -> Self {
        Self {
            id: attachment.id,
            project_id: attachment.project_id,
            file_name: attachment.file_name,
            content_type: attachment.content_type,
            size_bytes: attachment.size_bytes,
            audit: attachment.audit.into(),
        }
    }
}

impl IntoDomain<AttachmentUpdate> for UpdateAttachmentRequest {
    fn into_domain(self) -> Result<AttachmentUpdate, PlanningError> {
        Ok(AttachmentUpdate {
            file_name: self.file_name,
        })
    }
}

impl IntoDomain<AttachmentFilter> for AttachmentQuery {
    fn into_domain(self) -> Result<AttachmentFilter, PlanningError> {
        Ok(AttachmentFilter {
            project_id: self.project_id,
        })
    }
}

impl From<ProjectObservation> for ObservationDto {
    fn from(observation: ProjectObservation) -> Self {
        Self {
            id: observation.id,
            project_id: observation.project_id,
            body: observation.body,
            status: observation.status.as_str().to_string(),
            audit: observation.audit.into(),
        }
    }
}

impl IntoDomain<NewProjectObservation> for CreateObservationRequest {
    fn into_domain(self) -> Result<NewProjectObservation, PlanningError> {
        Ok(NewProjectObservation {
            status: parse_opt_enum!(ObservationStatus, "status", self.status)?
                .unwrap_or(ObservationStatus::Open),
            project_id: self.project_id,
            body: self.body,
        })
    }
}

impl IntoDomain<ProjectObservationUpdate> for UpdateObservationRequest {
    fn into_domain(self) -> Result<ProjectObservationUpdate, PlanningError> {
        Ok(ProjectObservationUpdate {
            status: parse_opt_enum!(ObservationStatus, "status", self.status)?,
            body: self.body,
        })
    }
}

impl IntoDomain<ProjectObservationFilter> for ObservationQuery {
    fn into_domain(self) -> Result<ProjectObservationFilter, PlanningError> {
        Ok(ProjectObservationFilter {
            project_id: self.project_id,
            status: parse_opt_enum!(ObservationStatus, "status", self.status)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn plan_request(status: Option<&str>) -> CreatePlanRequest {
        CreatePlanRequest {
            code: "PEI-2025".to_string(),
            name: "Plan".to_string(),
            institution: "Ministerio".to_string(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            status: status.map(String::from),
        }
    }

    #[test]
    fn plan_status_defaults_to_draft() {
        let plan = plan_request(None).into_domain().unwrap();
        assert_eq!(plan.status, PlanStatus::Draft);

        let plan = plan_request(Some("APPROVED")).into_domain().unwrap();
        assert_eq!(plan.status, PlanStatus::Approved);
    }

    #[test]
    fn unknown_enum_value_is_a_field_error() {
        let err = plan_request(Some("ARCHIVED")).into_domain().unwrap_err();
        match err {
            PlanningError::Validation { errors } => {
                assert_eq!(errors[0].field, "status");
                assert!(errors[0].message.contains("DRAFT, IN_REVIEW, APPROVED, CLOSED"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn sector_filter_parses_level() {
        let filter = SectorQuery {
            level: Some("SUBSECTOR".to_string()),
            parent_id: Some(4),
        }
        .into_domain()
        .unwrap();
        assert_eq!(filter.level, Some(SectorLevel::Subsector));
        assert_eq!(filter.parent_id, Some(4));
    }

    #[test]
    fn page_query_is_clamped() {
        let page: Page = PageQuery {
            limit: Some(5000),
            offset: None,
        }
        .into();
        assert_eq!(page.limit, Page::MAX_LIMIT);
        assert_eq!(page.offset, 0);
    }
}
