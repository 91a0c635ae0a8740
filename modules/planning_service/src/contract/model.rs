//! Contract models for the planning service
//!
//! These models are transport-agnostic and shared by the domain, storage and
//! REST layers. NO serde derives - these are pure domain models.

use super::error::PlanningError;
use chrono::{DateTime, NaiveDate, Utc};

/// Declares a closed string-backed enumeration used for statuses and levels.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// All accepted values, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire and storage representation
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Parse the wire representation (case-sensitive)
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Comma separated list of accepted values, for error messages
            pub fn expected() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Lifecycle of an institutional plan
    PlanStatus {
        Draft => "DRAFT",
        InReview => "IN_REVIEW",
        Approved => "APPROVED",
        Closed => "CLOSED",
    }
}

string_enum! {
    /// Lifecycle of an investment project
    ProjectStatus {
        Formulation => "FORMULATION",
        Approved => "APPROVED",
        InExecution => "IN_EXECUTION",
        Suspended => "SUSPENDED",
        Finished => "FINISHED",
    }
}

string_enum! {
    /// Measurement frequency of an indicator
    IndicatorFrequency {
        Monthly => "MONTHLY",
        Quarterly => "QUARTERLY",
        Semiannual => "SEMIANNUAL",
        Annual => "ANNUAL",
    }
}

string_enum! {
    /// Position of a sector in the three-level taxonomy
    SectorLevel {
        Macrosector => "MACROSECTOR",
        Sector => "SECTOR",
        Subsector => "SUBSECTOR",
    }
}

string_enum! {
    /// Review state of a project observation
    ObservationStatus {
        Open => "OPEN",
        Resolved => "RESOLVED",
    }
}

string_enum! {
    /// Fixed role set issued by the identity provider
    Role {
        Admin => "ADMIN",
        Planner => "PLANNER",
        Reviewer => "REVIEWER",
        Auditor => "AUDITOR",
    }
}

impl SectorLevel {
    /// Level the parent of a sector at this level must have
    pub fn parent_level(self) -> Option<SectorLevel> {
        match self {
            SectorLevel::Macrosector => None,
            SectorLevel::Sector => Some(SectorLevel::Macrosector),
            SectorLevel::Subsector => Some(SectorLevel::Sector),
        }
    }
}

// ===== Audit and paging =====

/// Audit trail and soft-delete marker carried by every record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audit {
    pub created_by: String,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Window over a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    pub const DEFAULT_LIMIT: u64 = 50;
    pub const MAX_LIMIT: u64 = 500;

    /// Largest LIMIT or OFFSET the SQL backends accept (a signed 64-bit value)
    pub const UNBOUNDED: u64 = i64::MAX as u64;

    /// Build a page, clamping the limit into `1..=MAX_LIMIT` and the offset
    /// to `UNBOUNDED`
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self {
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(0).min(Self::UNBOUNDED),
        }
    }

    /// Everything, used by internal lookups
    pub fn all() -> Self {
        Self {
            limit: Self::UNBOUNDED,
            offset: 0,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of records plus the total number of matches
#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: Page,
}

// ===== Institutional plans =====

#[derive(Debug, Clone, PartialEq)]
pub struct InstitutionalPlan {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub institution: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PlanStatus,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInstitutionalPlan {
    pub code: String,
    pub name: String,
    pub institution: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PlanStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstitutionalPlanUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub institution: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<PlanStatus>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstitutionalPlanFilter {
    pub status: Option<PlanStatus>,
    pub institution: Option<String>,
}

// ===== Strategic objectives =====

#[derive(Debug, Clone, PartialEq)]
pub struct StrategicObjective {
    pub id: i32,
    pub plan_id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStrategicObjective {
    pub plan_id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategicObjectiveUpdate {
    pub plan_id: Option<i32>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategicObjectiveFilter {
    pub plan_id: Option<i32>,
}

// ===== National plan objectives and sustainable development goals =====

/// National development plan (PND) objective
#[derive(Debug, Clone, PartialEq)]
pub struct PndObjective {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub axis: Option<String>,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPndObjective {
    pub code: String,
    pub name: String,
    pub axis: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PndObjectiveUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub axis: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PndObjectiveFilter {
    pub axis: Option<String>,
}

/// Sustainable development goal (ODS) target
#[derive(Debug, Clone, PartialEq)]
pub struct OdsGoal {
    pub id: i32,
    pub code: String,
    pub number: i32,
    pub name: String,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOdsGoal {
    pub code: String,
    pub number: i32,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OdsGoalUpdate {
    pub code: Option<String>,
    pub number: Option<i32>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OdsGoalFilter {
    pub number: Option<i32>,
}

// ===== Objective alignment =====

/// Weighted link from a strategic objective to a PND objective and an ODS goal
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveAlignment {
    pub id: i32,
    pub strategic_objective_id: i32,
    pub pnd_objective_id: i32,
    pub ods_goal_id: i32,
    /// Percentage in (0, 100], two decimals
    pub weight: f64,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewObjectiveAlignment {
    pub strategic_objective_id: i32,
    pub pnd_objective_id: i32,
    pub ods_goal_id: i32,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectiveAlignmentUpdate {
    pub pnd_objective_id: Option<i32>,
    pub ods_goal_id: Option<i32>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectiveAlignmentFilter {
    pub strategic_objective_id: Option<i32>,
    pub pnd_objective_id: Option<i32>,
    pub ods_goal_id: Option<i32>,
}

/// One item of a bulk alignment replacement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentTarget {
    pub pnd_objective_id: i32,
    pub ods_goal_id: i32,
    pub weight: f64,
}

/// Current alignment generation of a strategic objective
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentSummary {
    pub strategic_objective_id: i32,
    pub alignments: Vec<ObjectiveAlignment>,
    pub total_weight: f64,
    /// Whether the total weight is 100 within tolerance
    pub is_complete: bool,
}

// ===== Programs, projects and activities =====

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub id: i32,
    pub strategic_objective_id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub responsible: Option<String>,
    pub budget: Option<f64>,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProgram {
    pub strategic_objective_id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub responsible: Option<String>,
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramUpdate {
    pub strategic_objective_id: Option<i32>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub responsible: Option<String>,
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramFilter {
    pub strategic_objective_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: i32,
    pub program_id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub typology_id: Option<i32>,
    pub sector_id: Option<i32>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub status: ProjectStatus,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub program_id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub typology_id: Option<i32>,
    pub sector_id: Option<i32>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectUpdate {
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
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub program_id: Option<i32>,
    pub status: Option<ProjectStatus>,
    pub sector_id: Option<i32>,
    pub typology_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub responsible: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Option<f64>,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub project_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub responsible: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub responsible: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityFilter {
    pub project_id: Option<i32>,
}

// ===== Indicators and goals =====

#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub id: i32,
    pub strategic_objective_id: i32,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub frequency: IndicatorFrequency,
    pub baseline_value: Option<f64>,
    pub baseline_year: Option<i32>,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewIndicator {
    pub strategic_objective_id: i32,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub frequency: IndicatorFrequency,
    pub baseline_value: Option<f64>,
    pub baseline_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub frequency: Option<IndicatorFrequency>,
    pub baseline_value: Option<f64>,
    pub baseline_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorFilter {
    pub strategic_objective_id: Option<i32>,
}

/// Yearly target of an indicator
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: i32,
    pub indicator_id: i32,
    pub year: i32,
    pub target_value: f64,
    pub description: Option<String>,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub indicator_id: i32,
    pub year: i32,
    pub target_value: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalUpdate {
    pub year: Option<i32>,
    pub target_value: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalFilter {
    pub indicator_id: Option<i32>,
    pub year: Option<i32>,
}

// ===== Taxonomies =====

#[derive(Debug, Clone, PartialEq)]
pub struct Typology {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTypology {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypologyUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypologyFilter {}

#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub level: SectorLevel,
    pub parent_id: Option<i32>,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSector {
    pub code: String,
    pub name: String,
    pub level: SectorLevel,
    pub parent_id: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorFilter {
    pub level: Option<SectorLevel>,
    pub parent_id: Option<i32>,
}

// ===== Attachments and observations =====

/// Metadata of a file stored in the object store
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub id: i32,
    pub project_id: i32,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAttachment {
    pub project_id: i32,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentUpdate {
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentFilter {
    pub project_id: Option<i32>,
}

/// Stored content of an attachment
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentContent {
    pub attachment: Attachment,
    pub content: bytes::Bytes,
}

/// Reviewer remark on a project
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectObservation {
    pub id: i32,
    pub project_id: i32,
    pub body: String,
    pub status: ObservationStatus,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProjectObservation {
    pub project_id: i32,
    pub body: String,
    pub status: ObservationStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectObservationUpdate {
    pub body: Option<String>,
    pub status: Option<ObservationStatus>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectObservationFilter {
    pub project_id: Option<i32>,
    pub status: Option<ObservationStatus>,
}

// ===== Authentication context =====

/// Verified caller identity, passed explicitly to every service operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Subject identifier issued by the identity provider
    pub subject: String,
    /// Optional display name for audit logging
    pub display_name: Option<String>,
    pub roles: Vec<Role>,
}

impl AuthContext {
    pub fn new(subject: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            subject: subject.into(),
            display_name: None,
            roles,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Succeeds when the caller holds at least one of `allowed`
    pub fn require_any(&self, allowed: &[Role]) -> Result<(), PlanningError> {
        if allowed.iter().any(|role| self.has_role(*role)) {
            return Ok(());
        }
        Err(PlanningError::Forbidden {
            reason: format!(
                "one of the roles [{}] is required",
                allowed
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_enum_parses_wire_values() {
        assert_eq!(PlanStatus::parse("IN_REVIEW"), Some(PlanStatus::InReview));
        assert_eq!(PlanStatus::parse("in_review"), None);
        assert_eq!(ProjectStatus::InExecution.as_str(), "IN_EXECUTION");
        assert_eq!(SectorLevel::expected(), "MACROSECTOR, SECTOR, SUBSECTOR");
    }

    #[test]
    fn sector_parent_levels() {
        assert_eq!(SectorLevel::Macrosector.parent_level(), None);
        assert_eq!(
            SectorLevel::Subsector.parent_level(),
            Some(SectorLevel::Sector)
        );
    }

    #[test]
    fn page_clamps_limit_and_offset() {
        assert_eq!(Page::new(None, None).limit, Page::DEFAULT_LIMIT);
        assert_eq!(Page::new(Some(0), None).limit, 1);
        assert_eq!(Page::new(Some(10_000), Some(20)).limit, Page::MAX_LIMIT);
        assert_eq!(Page::new(Some(10), Some(20)).offset, 20);
        assert_eq!(Page::new(None, Some(u64::MAX)).offset, Page::UNBOUNDED);
    }

    #[test]
    fn require_any_role() {
        let ctx = AuthContext::new("user-1", vec![Role::Planner]);
        assert!(ctx.require_any(&[Role::Admin, Role::Planner]).is_ok());

        let err = ctx.require_any(&[Role::Admin]).unwrap_err();
        assert!(matches!(err, PlanningError::Forbidden { .. }));
    }
}
