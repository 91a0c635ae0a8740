//! REST DTOs with serde derives for HTTP API
//!
//! Enumerations travel as their upper-case wire strings and are parsed by the
//! mapper so an unknown value is reported as a field error.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ===== Shared DTOs =====

/// Audit trail returned with every record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditDto {
    #[schema(example = "auth0|planner-1")]
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Paged listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// `limit`/`offset` query parameters accepted by every listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Identity of the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeDto {
    #[schema(example = "auth0|planner-1")]
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[schema(example = json!(["PLANNER"]))]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthDto {
    #[schema(example = "ok")]
    pub status: String,
}

// ===== Institutional plans =====

/// Institutional plan response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanDto {
    pub id: i32,
    #[schema(example = "PEI-2025")]
    pub code: String,
    pub name: String,
    pub institution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// DRAFT, IN_REVIEW, APPROVED or CLOSED
    #[schema(example = "DRAFT")]
    pub status: String,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePlanRequest {
    #[schema(example = "PEI-2025")]
    pub code: String,
    pub name: String,
    pub institution: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Defaults to DRAFT
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdatePlanRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub institution: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanQuery {
    pub status: Option<String>,
    pub institution: Option<String>,
}

// ===== Strategic objectives =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StrategicObjectiveDto {
    pub id: i32,
    pub plan_id: i32,
    #[schema(example = "OE-01")]
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateStrategicObjectiveRequest {
    pub plan_id: i32,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateStrategicObjectiveRequest {
    pub plan_id: Option<i32>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrategicObjectiveQuery {
    pub plan_id: Option<i32>,
}

// ===== PND objectives and ODS goals =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PndObjectiveDto {
    pub id: i32,
    #[schema(example = "PND-OBJ-1")]
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<String>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePndObjectiveRequest {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub axis: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdatePndObjectiveRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub axis: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PndObjectiveQuery {
    pub axis: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OdsGoalDto {
    pub id: i32,
    #[schema(example = "ODS-4")]
    pub code: String,
    #[schema(example = 4)]
    pub number: i32,
    pub name: String,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOdsGoalRequest {
    pub code: String,
    pub number: i32,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateOdsGoalRequest {
    pub code: Option<String>,
    pub number: Option<i32>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OdsGoalQuery {
    pub number: Option<i32>,
}

// ===== Objective alignment =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AlignmentDto {
    pub id: i32,
    pub strategic_objective_id: i32,
    pub pnd_objective_id: i32,
    pub ods_goal_id: i32,
    /// Percentage in (0, 100]
    #[schema(example = 60.0)]
    pub weight: f64,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAlignmentRequest {
    pub strategic_objective_id: i32,
    pub pnd_objective_id: i32,
    pub ods_goal_id: i32,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateAlignmentRequest {
    pub pnd_objective_id: Option<i32>,
    pub ods_goal_id: Option<i32>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlignmentQuery {
    pub strategic_objective_id: Option<i32>,
    pub pnd_objective_id: Option<i32>,
    pub ods_goal_id: Option<i32>,
}

/// One item of a bulk alignment replacement
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AlignmentTargetDto {
    pub pnd_objective_id: i32,
    pub ods_goal_id: i32,
    #[schema(example = 40.0)]
    pub weight: f64,
}

/// Bulk replacement of the alignments of a strategic objective
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReplaceAlignmentsRequest {
    /// The complete new set; weights must add up to 100
    pub alignments: Vec<AlignmentTargetDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AlignmentSummaryDto {
    pub strategic_objective_id: i32,
    pub alignments: Vec<AlignmentDto>,
    #[schema(example = 100.0)]
    pub total_weight: f64,
    pub is_complete: bool,
}

// ===== Programs, projects and activities =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProgramDto {
    pub id: i32,
    pub strategic_objective_id: i32,
    #[schema(example = "PRG-01")]
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProgramRequest {
    pub strategic_objective_id: i32,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub responsible: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateProgramRequest {
    pub strategic_objective_id: Option<i32>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub responsible: Option<String>,
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramQuery {
    pub strategic_objective_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectDto {
    pub id: i32,
    pub program_id: i32,
    #[schema(example = "CUP-2025-0001")]
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typology_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[schema(example = 1500000.0)]
    pub budget: f64,
    /// FORMULATION, APPROVED, IN_EXECUTION, SUSPENDED or FINISHED
    #[schema(example = "FORMULATION")]
    pub status: String,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub program_id: i32,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub typology_id: Option<i32>,
    #[serde(default)]
    pub sector_id: Option<i32>,
    #[serde(default)]
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    /// Defaults to FORMULATION
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateProjectRequest {
    pub program_id: Option<i32>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub typology_id: Option<i32>,
    pub sector_id: Option<i32>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectQuery {
    pub program_id: Option<i32>,
    pub status: Option<String>,
    pub sector_id: Option<i32>,
    pub typology_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityDto {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateActivityRequest {
    pub project_id: i32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub responsible: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateActivityRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub responsible: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityQuery {
    pub project_id: Option<i32>,
}

// ===== Indicators and goals =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IndicatorDto {
    pub id: i32,
    pub strategic_objective_id: i32,
    #[schema(example = "IND-01")]
    pub code: String,
    pub name: String,
    #[schema(example = "%")]
    pub unit: String,
    /// MONTHLY, QUARTERLY, SEMIANNUAL or ANNUAL
    #[schema(example = "ANNUAL")]
    pub frequency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_year: Option<i32>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateIndicatorRequest {
    pub strategic_objective_id: i32,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub frequency: String,
    #[serde(default)]
    pub baseline_value: Option<f64>,
    #[serde(default)]
    pub baseline_year: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateIndicatorRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub frequency: Option<String>,
    pub baseline_value: Option<f64>,
    pub baseline_year: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndicatorQuery {
    pub strategic_objective_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GoalDto {
    pub id: i32,
    pub indicator_id: i32,
    #[schema(example = 2026)]
    pub year: i32,
    pub target_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateGoalRequest {
    pub indicator_id: i32,
    pub year: i32,
    pub target_value: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateGoalRequest {
    pub year: Option<i32>,
    pub target_value: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalQuery {
    pub indicator_id: Option<i32>,
    pub year: Option<i32>,
}

// ===== Taxonomies =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TypologyDto {
    pub id: i32,
    #[schema(example = "INFRA")]
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTypologyRequest {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateTypologyRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypologyQuery {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SectorDto {
    pub id: i32,
    #[schema(example = "SOC-SAL")]
    pub code: String,
    pub name: String,
    /// MACROSECTOR, SECTOR or SUBSECTOR
    #[schema(example = "SECTOR")]
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i32>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSectorRequest {
    pub code: String,
    pub name: String,
    pub level: String,
    #[serde(default)]
    pub parent_id: Option<i32>,
}

/// Level and parent are fixed once a sector exists
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateSectorRequest {
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectorQuery {
    pub level: Option<String>,
    pub parent_id: Option<i32>,
}

// ===== Attachments and observations =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachmentDto {
    pub id: i32,
    pub project_id: i32,
    #[schema(example = "estudio-factibilidad.pdf")]
    pub file_name: String,
    #[schema(example = "application/pdf")]
    pub content_type: String,
    pub size_bytes: i64,
    #[serde(flatten)]
    pub audit: AuditDto,
}

/// Query parameters of an upload; the body is the raw file content
#[derive(Debug, Clone, Deserialize)]
pub struct UploadQuery {
    pub file_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateAttachmentRequest {
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachmentQuery {
    pub project_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ObservationDto {
    pub id: i32,
    pub project_id: i32,
    pub body: String,
    /// OPEN or RESOLVED
    #[schema(example = "OPEN")]
    pub status: String,
    #[serde(flatten)]
    pub audit: AuditDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateObservationRequest {
    pub project_id: i32,
    pub body: String,
    /// Defaults to OPEN
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateObservationRequest {
    pub body: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObservationQuery {
    pub project_id: Option<i32>,
    pub status: Option<String>,
}
