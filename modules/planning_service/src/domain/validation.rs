//! Field-level validation of create and update inputs

use crate::contract::*;
use chrono::NaiveDate;

use super::alignment::weight_error;

pub const CODE_MAX: usize = 30;
pub const NAME_MAX: usize = 200;
pub const TEXT_MAX: usize = 2000;
pub const OBSERVATION_MAX: usize = 4000;
pub const FILE_NAME_MAX: usize = 255;
pub const UNIT_MAX: usize = 50;

const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;
const ODS_RANGE: std::ops::RangeInclusive<i32> = 1..=17;

/// Input that can be checked without touching storage
pub trait Validate {
    fn validate(&self) -> Result<(), PlanningError>;
}

/// Accumulates field errors so a request reports every problem at once
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError::new(field, message));
        self
    }

    /// Required text: not blank and at most `max` characters
    pub fn text(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, "must not be empty");
        } else if value.chars().count() > max {
            self.push(field, format!("must be at most {max} characters"));
        }
        self
    }

    /// Text that, when present, follows the rules of [`FieldErrors::text`]
    pub fn opt_text(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value {
            self.text(field, value, max);
        }
        self
    }

    /// Free text that may be empty but not longer than `max`
    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.push(field, format!("must be at most {max} characters"));
        }
        self
    }

    pub fn positive(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() || value <= 0.0 {
            self.push(field, "must be greater than 0");
        }
        self
    }

    pub fn opt_positive(&mut self, field: &str, value: Option<f64>) -> &mut Self {
        if let Some(value) = value {
            self.positive(field, value);
        }
        self
    }

    pub fn opt_non_negative(&mut self, field: &str, value: Option<f64>) -> &mut Self {
        if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
            self.push(field, "must be 0 or greater");
        }
        self
    }

    pub fn opt_year(&mut self, field: &str, value: Option<i32>) -> &mut Self {
        if value.is_some_and(|v| !YEAR_RANGE.contains(&v)) {
            self.push(
                field,
                format!(
                    "must be between {} and {}",
                    YEAR_RANGE.start(),
                    YEAR_RANGE.end()
                ),
            );
        }
        self
    }

    pub fn opt_ods_number(&mut self, field: &str, value: Option<i32>) -> &mut Self {
        if value.is_some_and(|v| !ODS_RANGE.contains(&v)) {
            self.push(
                field,
                format!(
                    "must be between {} and {}",
                    ODS_RANGE.start(),
                    ODS_RANGE.end()
                ),
            );
        }
        self
    }

    pub fn opt_id(&mut self, field: &str, value: Option<i32>) -> &mut Self {
        if value.is_some_and(|v| v <= 0) {
            self.push(field, "must be a positive identifier");
        }
        self
    }

    /// `start_date` must not be after `end_date`
    pub fn date_order(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> &mut Self {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                self.push("end_date", "must not be before start_date");
            }
        }
        self
    }

    pub fn opt_weight(&mut self, field: &str, value: Option<f64>) -> &mut Self {
        if let Some(error) = value.and_then(|w| weight_error(field, w)) {
            self.errors.push(error);
        }
        self
    }

    pub fn finish(self) -> Result<(), PlanningError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(PlanningError::Validation {
                errors: self.errors,
            })
        }
    }
}

// ===== Institutional plans =====

impl Validate for NewInstitutionalPlan {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .text("code", &self.code, CODE_MAX)
            .text("name", &self.name, NAME_MAX)
            .text("institution", &self.institution, NAME_MAX)
            .max_len("description", self.description.as_deref(), TEXT_MAX)
            .date_order(Some(self.start_date), Some(self.end_date));
        errors.finish()
    }
}

impl Validate for InstitutionalPlanUpdate {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_text("code", self.code.as_deref(), CODE_MAX)
            .opt_text("name", self.name.as_deref(), NAME_MAX)
            .opt_text("institution", self.institution.as_deref(), NAME_MAX)
            .max_len("description", self.description.as_deref(), TEXT_MAX)
            .date_order(self.start_date, self.end_date);
        errors.finish()
    }
}

// ===== Strategic objectives =====

impl Validate for NewStrategicObjective {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_id("plan_id", Some(self.plan_id))
            .text("code", &self.code, CODE_MAX)
            .text("name", &self.name, NAME_MAX)
            .max_len("description", self.description.as_deref(), TEXT_MAX);
        errors.finish()
    }
}

impl Validate for StrategicObjectiveUpdate {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_id("plan_id", self.plan_id)
            .opt_text("code", self.code.as_deref(), CODE_MAX)
            .opt_text("name", self.name.as_deref(), NAME_MAX)
            .max_len("description", self.description.as_deref(), TEXT_MAX);
        errors.finish()
    }
}

// ===== Reference catalogs =====

impl Validate for NewPndObjective {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .text("code", &self.code, CODE_MAX)
            .text("name", &self.name, TEXT_MAX)
            .max_len("axis", self.axis.as_deref(), NAME_MAX);
        errors.finish()
    }
}

impl Validate for PndObjectiveUpdate {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_text("code", self.code.as_deref(), CODE_MAX)
            .opt_text("name", self.name.as_deref(), TEXT_MAX)
            .max_len("axis", self.axis.as_deref(), NAME_MAX);
        errors.finish()
    }
}

impl Validate for NewOdsGoal {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .text("code", &self.code, CODE_MAX)
            .opt_ods_number("number", Some(self.number))
            .text("name", &self.name, TEXT_MAX);
        errors.finish()
    }
}

impl Validate for OdsGoalUpdate {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_text("code", self.code.as_deref(), CODE_MAX)
            .opt_ods_number("number", self.number)
            .opt_text("name", self.name.as_deref(), TEXT_MAX);
        errors.finish()
    }
}

impl Validate for NewTypology {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .text("code", &self.code, CODE_MAX)
            .text("name", &self.name, NAME_MAX)
            .max_len("description", self.description.as_deref(), TEXT_MAX);
        errors.finish()
    }
}

impl Validate for TypologyUpdate {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_text("code", self.code.as_deref(), CODE_MAX)
            .opt_text("name", self.name.as_deref(), NAME_MAX)
            .max_len("description", self.description.as_deref(), TEXT_MAX);
        errors.finish()
    }
}

impl Validate for NewSector {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .text("code", &self.code, CODE_MAX)
            .text("name", &self.name, NAME_MAX)
            .opt_id("parent_id", self.parent_id);
        match (self.level.parent_level(), self.parent_id) {
            (None, Some(_)) => {
                errors.push("parent_id", "a MACROSECTOR cannot have a parent");
            }
            (Some(level), None) => {
                errors.push("parent_id", format!("a {} requires a {level} parent", self.level));
            }
            _ => {}
        }
        errors.finish()
    }
}

impl Validate for SectorUpdate {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_text("code", self.code.as_deref(), CODE_MAX)
            .opt_text("name", self.name.as_deref(), NAME_MAX);
        errors.finish()
    }
}

// ===== Alignment =====

impl Validate for NewObjectiveAlignment {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_id("strategic_objective_id", Some(self.strategic_objective_id))
            .opt_id("pnd_objective_id", Some(self.pnd_objective_id))
            .opt_id("ods_goal_id", Some(self.ods_goal_id))
            .opt_weight("weight", Some(self.weight));
        errors.finish()
    }
}

impl Validate for ObjectiveAlignmentUpdate {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_id("pnd_objective_id", self.pnd_objective_id)
            .opt_id("ods_goal_id", self.ods_goal_id)
            .opt_weight("weight", self.weight);
        errors.finish()
    }
}

// ===== Programs, projects and activities =====

impl Validate for NewProgram {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_id("strategic_objective_id", Some(self.strategic_objective_id))
            .text("code", &self.code, CODE_MAX)
            .text("name", &self.name, NAME_MAX)
            .max_len("description", self.description.as_deref(), TEXT_MAX)
            .max_len("responsible", self.responsible.as_deref(), NAME_MAX)
            .opt_positive("budget", self.budget);
        errors.finish()
    }
}

impl Validate for ProgramUpdate {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_id("strategic_objective_id", self.strategic_objective_id)
            .opt_text("code", self.code.as_deref(), CODE_MAX)
            .opt_text("name", self.name.as_deref(), NAME_MAX)
            .max_len("description", self.description.as_deref(), TEXT_MAX)
            .max_len("responsible", self.responsible.as_deref(), NAME_MAX)
            .opt_positive("budget", self.budget);
        errors.finish()
    }
}

impl Validate for NewProject {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_id("program_id", Some(self.program_id))
            .text("code", &self.code, CODE_MAX)
            .text("name", &self.name, NAME_MAX)
            .max_len("description", self.description.as_deref(), TEXT_MAX)
            .opt_id("typology_id", self.typology_id)
            .opt_id("sector_id", self.sector_id)
            .max_len("location", self.location.as_deref(), NAME_MAX)
            .date_order(Some(self.start_date), Some(self.end_date))
            .positive("budget", self.budget);
        errors.finish()
    }
}

impl Validate for ProjectUpdate {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_id("program_id", self.program_id)
            .opt_text("code", self.code.as_deref(), CODE_MAX)
            .opt_text("name", self.name.as_deref(), NAME_MAX)
            .max_len("description", self.description.as_deref(), TEXT_MAX)
            .opt_id("typology_id", self.typology_id)
            .opt_id("sector_id", self.sector_id)
            .max_len("location", self.location.as_deref(), NAME_MAX)
            .date_order(self.start_date, self.end_date)
            .opt_positive("budget", self.budget);
        errors.finish()
    }
}

impl Validate for NewActivity {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_id("project_id", Some(self.project_id))
            .text("name", &self.name, NAME_MAX)
            .max_len("description", self.description.as_deref(), TEXT_MAX)
            .max_len("responsible", self.responsible.as_deref(), NAME_MAX)
            .date_order(Some(self.start_date), Some(self.end_date))
            .opt_positive("budget", self.budget);
        errors.finish()
    }
}

impl Validate for ActivityUpdate {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_text("name", self.name.as_deref(), NAME_MAX)
            .max_len("description", self.description.as_deref(), TEXT_MAX)
            .max_len("responsible", self.responsible.as_deref(), NAME_MAX)
            .date_order(self.start_date, self.end_date)
            .opt_positive("budget", self.budget);
        errors.finish()
    }
}

// ===== Indicators and goals =====

impl Validate for NewIndicator {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_id("strategic_objective_id", Some(self.strategic_objective_id))
            .text("code", &self.code, CODE_MAX)
            .text("name", &self.name, NAME_MAX)
            .text("unit", &self.unit, UNIT_MAX)
            .opt_non_negative("baseline_value", self.baseline_value)
            .opt_year("baseline_year", self.baseline_year);
        errors.finish()
    }
}

impl Validate for IndicatorUpdate {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_text("code", self.code.as_deref(), CODE_MAX)
            .opt_text("name", self.name.as_deref(), NAME_MAX)
            .opt_text("unit", self.unit.as_deref(), UNIT_MAX)
            .opt_non_negative("baseline_value", self.baseline_value)
            .opt_year("baseline_year", self.baseline_year);
        errors.finish()
    }
}

impl Validate for NewGoal {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_id("indicator_id", Some(self.indicator_id))
            .opt_year("year", Some(self.year))
            .positive("target_value", self.target_value)
            .max_len("description", self.description.as_deref(), TEXT_MAX);
        errors.finish()
    }
}

impl Validate for GoalUpdate {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_year("year", self.year)
            .opt_positive("target_value", self.target_value)
            .max_len("description", self.description.as_deref(), TEXT_MAX);
        errors.finish()
    }
}

// ===== Attachments and observations =====

impl Validate for NewAttachment {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_id("project_id", Some(self.project_id))
            .text("file_name", &self.file_name, FILE_NAME_MAX)
            .text("content_type", &self.content_type, NAME_MAX);
        if self.size_bytes <= 0 {
            errors.push("size_bytes", "must be greater than 0");
        }
        errors.finish()
    }
}

impl Validate for AttachmentUpdate {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors.opt_text("file_name", self.file_name.as_deref(), FILE_NAME_MAX);
        errors.finish()
    }
}

impl Validate for NewProjectObservation {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors
            .opt_id("project_id", Some(self.project_id))
            .text("body", &self.body, OBSERVATION_MAX);
        errors.finish()
    }
}

impl Validate for ProjectObservationUpdate {
    fn validate(&self) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        errors.opt_text("body", self.body.as_deref(), OBSERVATION_MAX);
        errors.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fields(result: Result<(), PlanningError>) -> Vec<String> {
        match result {
            Err(PlanningError::Validation { errors }) => {
                errors.into_iter().map(|e| e.field).collect()
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn plan() -> NewInstitutionalPlan {
        NewInstitutionalPlan {
            code: "PEI-2025".to_string(),
            name: "Plan Estratégico Institucional".to_string(),
            institution: "Ministerio de Finanzas".to_string(),
            description: None,
            start_date: date(2025, 1, 1),
            end_date: date(2028, 12, 31),
            status: PlanStatus::Draft,
        }
    }

    #[test]
    fn valid_plan_passes() {
        assert!(plan().validate().is_ok());
    }

    #[test]
    fn plan_reports_every_bad_field() {
        let mut input = plan();
        input.code = "   ".to_string();
        input.name = "x".repeat(NAME_MAX + 1);
        input.end_date = date(2024, 12, 31);

        assert_eq!(fields(input.validate()), vec!["code", "name", "end_date"]);
    }

    #[test]
    fn update_only_checks_present_fields() {
        assert!(InstitutionalPlanUpdate::default().validate().is_ok());

        let update = InstitutionalPlanUpdate {
            name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(fields(update.validate()), vec!["name"]);
    }

    #[test]
    fn project_budget_must_be_positive() {
        let project = NewProject {
            program_id: 1,
            code: "PRY-1".to_string(),
            name: "Vía Colectora".to_string(),
            description: None,
            typology_id: None,
            sector_id: Some(0),
            location: None,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 6, 30),
            budget: 0.0,
            status: ProjectStatus::Formulation,
        };
        assert_eq!(fields(project.validate()), vec!["sector_id", "budget"]);
    }

    #[test]
    fn sector_parent_rules() {
        let macro_with_parent = NewSector {
            code: "M1".to_string(),
            name: "Social".to_string(),
            level: SectorLevel::Macrosector,
            parent_id: Some(3),
        };
        assert_eq!(fields(macro_with_parent.validate()), vec!["parent_id"]);

        let orphan_subsector = NewSector {
            code: "S1".to_string(),
            name: "Salud pública".to_string(),
            level: SectorLevel::Subsector,
            parent_id: None,
        };
        assert_eq!(fields(orphan_subsector.validate()), vec!["parent_id"]);
    }

    #[test]
    fn ods_number_and_goal_year_ranges() {
        let goal = NewOdsGoal {
            code: "ODS-18".to_string(),
            number: 18,
            name: "Unknown".to_string(),
        };
        assert_eq!(fields(goal.validate()), vec!["number"]);

        let target = NewGoal {
            indicator_id: 1,
            year: 1850,
            target_value: -1.0,
            description: None,
        };
        assert_eq!(fields(target.validate()), vec!["year", "target_value"]);
    }

    #[test]
    fn alignment_weight_range_is_checked() {
        let update = ObjectiveAlignmentUpdate {
            weight: Some(100.5),
            ..Default::default()
        };
        assert_eq!(fields(update.validate()), vec!["weight"]);

        let update = ObjectiveAlignmentUpdate {
            weight: Some(100.0),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }
}
