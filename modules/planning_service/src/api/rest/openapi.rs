//! OpenAPI document of the REST schemas

use super::dto::*;
use super::error::{FieldErrorDto, Problem};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SIPeIP Planning API",
        description = "Institutional plans, investment projects and objective alignment"
    ),
    components(schemas(
        Problem,
        FieldErrorDto,
        AuditDto,
        MeDto,
        HealthDto,
        PlanDto,
        CreatePlanRequest,
        UpdatePlanRequest,
        StrategicObjectiveDto,
        CreateStrategicObjectiveRequest,
        UpdateStrategicObjectiveRequest,
        PndObjectiveDto,
        CreatePndObjectiveRequest,
        UpdatePndObjectiveRequest,
        OdsGoalDto,
        CreateOdsGoalRequest,
        UpdateOdsGoalRequest,
        AlignmentDto,
        CreateAlignmentRequest,
        UpdateAlignmentRequest,
        AlignmentTargetDto,
        ReplaceAlignmentsRequest,
        AlignmentSummaryDto,
        ProgramDto,
        CreateProgramRequest,
        UpdateProgramRequest,
        ProjectDto,
        CreateProjectRequest,
        UpdateProjectRequest,
        ActivityDto,
        CreateActivityRequest,
        UpdateActivityRequest,
        IndicatorDto,
        CreateIndicatorRequest,
        UpdateIndicatorRequest,
        GoalDto,
        CreateGoalRequest,
        UpdateGoalRequest,
        TypologyDto,
        CreateTypologyRequest,
        UpdateTypologyRequest,
        SectorDto,
        CreateSectorRequest,
        UpdateSectorRequest,
        AttachmentDto,
        UpdateAttachmentRequest,
        ObservationDto,
        CreateObservationRequest,
        UpdateObservationRequest,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_record_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        for name in ["Problem", "PlanDto", "AlignmentSummaryDto", "AttachmentDto"] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }
}
