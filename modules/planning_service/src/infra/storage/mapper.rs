//! Entity to model mappers
//!
//! Conversions from SeaORM models to contract records

use super::entity::*;
use crate::contract::*;
use chrono::{DateTime, Utc};

/// Builds the audit block from the audit columns every model carries
macro_rules! audit_of {
    ($model:expr) => {
        audit(
            $model.created_by,
            $model.updated_by,
            $model.created_at,
            $model.updated_at,
            $model.deleted_at,
        )
    };
}

fn audit(
    created_by: String,
    updated_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
) -> Audit {
    Audit {
        created_by,
        updated_by,
        created_at,
        updated_at,
        deleted_at,
    }
}

/// Stored enum value, falling back to `default` for unknown strings
fn parse_or<T>(value: &str, parse: fn(&str) -> Option<T>, default: T) -> T {
    parse(value).unwrap_or_else(|| {
        tracing::warn!(value, "unknown stored enum value, using default");
        default
    })
}

// ===== Plans and objectives =====

impl From<plan::Model> for InstitutionalPlan {
    fn from(m: plan::Model) -> Self {
        Self {
            id: m.id,
            status: parse_or(&m.status, PlanStatus::parse, PlanStatus::Draft),
            audit: audit_of!(m),
            code: m.code,
            name: m.name,
            institution: m.institution,
            description: m.description,
            start_date: m.start_date,
            end_date: m.end_date,
        }
    }
}

impl From<strategic_objective::Model> for StrategicObjective {
    fn from(m: strategic_objective::Model) -> Self {
        Self {
            id: m.id,
            plan_id: m.plan_id,
            audit: audit_of!(m),
            code: m.code,
            name: m.name,
            description: m.description,
        }
    }
}

// ===== Reference catalogs =====

impl From<pnd_objective::Model> for PndObjective {
    fn from(m: pnd_objective::Model) -> Self {
        Self {
            id: m.id,
            audit: audit_of!(m),
            code: m.code,
            name: m.name,
            axis: m.axis,
        }
    }
}

impl From<ods_goal::Model> for OdsGoal {
    fn from(m: ods_goal::Model) -> Self {
        Self {
            id: m.id,
            number: m.number,
            audit: audit_of!(m),
            code: m.code,
            name: m.name,
        }
    }
}

impl From<typology::Model> for Typology {
    fn from(m: typology::Model) -> Self {
        Self {
            id: m.id,
            audit: audit_of!(m),
            code: m.code,
            name: m.name,
            description: m.description,
        }
    }
}

impl From<sector::Model> for Sector {
    fn from(m: sector::Model) -> Self {
        Self {
            id: m.id,
            level: parse_or(&m.level, SectorLevel::parse, SectorLevel::Macrosector),
            parent_id: m.parent_id,
            audit: audit_of!(m),
            code: m.code,
            name: m.name,
        }
    }
}

// ===== Alignment =====

impl From<alignment::Model> for ObjectiveAlignment {
    fn from(m: alignment::Model) -> Self {
        Self {
            id: m.id,
            strategic_objective_id: m.strategic_objective_id,
            pnd_objective_id: m.pnd_objective_id,
            ods_goal_id: m.ods_goal_id,
            weight: m.weight,
            audit: audit_of!(m),
        }
    }
}

// ===== Programs, projects and activities =====

impl From<program::Model> for Program {
    fn from(m: program::Model) -> Self {
        Self {
            id: m.id,
            strategic_objective_id: m.strategic_objective_id,
            budget: m.budget,
            audit: audit_of!(m),
            code: m.code,
            name: m.name,
            description: m.description,
            responsible: m.responsible,
        }
    }
}

impl From<project::Model> for Project {
    fn from(m: project::Model) -> Self {
        Self {
            id: m.id,
            program_id: m.program_id,
            status: parse_or(&m.status, ProjectStatus::parse, ProjectStatus::Formulation),
            audit: audit_of!(m),
            code: m.code,
            name: m.name,
            description: m.description,
            typology_id: m.typology_id,
            sector_id: m.sector_id,
            location: m.location,
            start_date: m.start_date,
            end_date: m.end_date,
            budget: m.budget,
        }
    }
}

impl From<activity::Model> for Activity {
    fn from(m: activity::Model) -> Self {
        Self {
            id: m.id,
            project_id: m.project_id,
            audit: audit_of!(m),
            name: m.name,
            description: m.description,
            responsible: m.responsible,
            start_date: m.start_date,
            end_date: m.end_date,
            budget: m.budget,
        }
    }
}

// ===== Indicators and goals =====

impl From<indicator::Model> for Indicator {
    fn from(m: indicator::Model) -> Self {
        Self {
            id: m.id,
            strategic_objective_id: m.strategic_objective_id,
            frequency: parse_or(
                &m.frequency,
                IndicatorFrequency::parse,
                IndicatorFrequency::Annual,
            ),
            audit: audit_of!(m),
            code: m.code,
            name: m.name,
            unit: m.unit,
            baseline_value: m.baseline_value,
            baseline_year: m.baseline_year,
        }
    }
}

impl From<goal::Model> for Goal {
    fn from(m: goal::Model) -> Self {
        Self {
            id: m.id,
            indicator_id: m.indicator_id,
            year: m.year,
            target_value: m.target_value,
            audit: audit_of!(m),
            description: m.description,
        }
    }
}

// ===== Attachments and observations =====

impl From<attachment::Model> for Attachment {
    fn from(m: attachment::Model) -> Self {
        Self {
            id: m.id,
            project_id: m.project_id,
            size_bytes: m.size_bytes,
            audit: audit_of!(m),
            file_name: m.file_name,
            content_type: m.content_type,
            storage_key: m.storage_key,
        }
    }
}

impl From<observation::Model> for ProjectObservation {
    fn from(m: observation::Model) -> Self {
        Self {
            id: m.id,
            project_id: m.project_id,
            status: parse_or(&m.status, ObservationStatus::parse, ObservationStatus::Open),
            audit: audit_of!(m),
            body: m.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn unknown_status_falls_back_to_default() {
        let now = Utc::now();
        let model = plan::Model {
            id: 7,
            code: "PEI".to_string(),
            name: "Plan".to_string(),
            institution: "MEF".to_string(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            status: "ARCHIVED".to_string(),
            created_by: "admin".to_string(),
            updated_by: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let record = InstitutionalPlan::from(model);
        assert_eq!(record.status, PlanStatus::Draft);
        assert_eq!(record.audit.created_by, "admin");
        assert_eq!(record.id, 7);
    }
}
