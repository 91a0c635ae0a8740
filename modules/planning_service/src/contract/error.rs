//! Contract error types for the planning service
//!
//! These errors are transport-agnostic; the REST layer maps them to
//! Problem Details responses.

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field path, e.g. `alignments[1].weight`
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Planning service domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanningError {
    /// Record not found (or soft-deleted)
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource type (plan, project, ...)
        resource: String,
        /// Resource identifier
        id: String,
    },

    /// Uniqueness conflict (duplicate code, duplicate alignment pair, ...)
    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    /// Input rejected field by field
    #[error("Validation failed: {}", join_errors(.errors))]
    Validation { errors: Vec<FieldError> },

    /// No valid session
    #[error("Authentication required")]
    Unauthorized,

    /// Session lacks the required role
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// Internal error; details are logged, never returned
    #[error("Internal error")]
    Internal,
}

impl PlanningError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    /// Validation error with a single field
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldError::new(field, message)],
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
