//! HTTP error mapping to RFC-9457 Problem Details

use crate::contract::{FieldError, PlanningError};
use axum::{
    extract::rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// RFC-9457 Problem Details for HTTP API errors
#[derive(Debug, Serialize, ToSchema)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// A URI reference that identifies the specific occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Rejected input fields, for validation problems
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldErrorDto>>,
}

/// One rejected input field
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldErrorDto {
    #[schema(example = "alignments[1].weight")]
    pub field: String,
    #[schema(example = "must be greater than 0 and at most 100")]
    pub message: String,
}

impl From<FieldError> for FieldErrorDto {
    fn from(error: FieldError) -> Self {
        Self {
            field: error.field,
            message: error.message,
        }
    }
}

impl Problem {
    /// Create a new Problem Details response
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            errors: None,
        }
    }

    /// Add detail message
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add instance URI
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Attach the rejected fields
    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = Some(errors.into_iter().map(FieldErrorDto::from).collect());
        self
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized").with_detail(detail)
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Problem::new(StatusCode::BAD_REQUEST, "Bad Request").with_detail(detail)
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/problem+json")],
            Json(self),
        )
            .into_response()
    }
}

impl From<PlanningError> for Problem {
    fn from(error: PlanningError) -> Self {
        map_domain_error(error)
    }
}

/// Map domain errors to HTTP Problem Details
pub fn map_domain_error(error: PlanningError) -> Problem {
    match error {
        PlanningError::NotFound { resource, id } => {
            Problem::new(StatusCode::NOT_FOUND, format!("{} Not Found", resource))
                .with_detail(format!("{} with id '{}' was not found", resource, id))
        }

        PlanningError::Conflict { reason } => {
            Problem::new(StatusCode::CONFLICT, "Conflict").with_detail(reason)
        }

        PlanningError::Validation { errors } => {
            let detail = format!("{} field(s) failed validation", errors.len());
            Problem::new(StatusCode::BAD_REQUEST, "Validation Error")
                .with_detail(detail)
                .with_errors(errors)
        }

        PlanningError::Unauthorized => Problem::unauthorized("A valid bearer token is required"),

        PlanningError::Forbidden { reason } => {
            Problem::new(StatusCode::FORBIDDEN, "Forbidden").with_detail(reason)
        }

        PlanningError::Internal => {
            Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                .with_detail("An unexpected error occurred")
        }
    }
}

impl From<JsonRejection> for Problem {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(error) => {
                let field_error = json_data_field_error(&error.body_text());
                Problem::new(StatusCode::BAD_REQUEST, "Validation Error")
                    .with_detail("request body does not match the expected shape")
                    .with_errors(vec![field_error])
            }
            JsonRejection::JsonSyntaxError(error) => {
                Problem::new(StatusCode::BAD_REQUEST, "Invalid Request Body")
                    .with_detail(error.body_text())
            }
            other => {
                Problem::new(other.status(), "Invalid Request Body").with_detail(other.body_text())
            }
        }
    }
}

const JSON_DATA_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Turn a serde data error such as `alignments[0].weight: invalid type: ...`
/// or ``missing field `name` at line 1 column 9`` into a field error
fn json_data_field_error(text: &str) -> FieldError {
    let message = text.strip_prefix(JSON_DATA_PREFIX).unwrap_or(text);
    let (path, message) = match message.split_once(": ") {
        Some((path, rest)) if is_field_path(path) => (Some(path), rest),
        _ => (None, message),
    };
    let message = message
        .split_once(" at line ")
        .map_or(message, |(head, _)| head);
    let missing = message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(field, _)| field);

    let field = match (path, missing) {
        (Some(path), Some(field)) => format!("{path}.{field}"),
        (Some(path), None) => path.to_string(),
        (None, Some(field)) => field.to_string(),
        (None, None) => "body".to_string(),
    };
    FieldError::new(field, message)
}

fn is_field_path(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'))
}

impl From<QueryRejection> for Problem {
    fn from(rejection: QueryRejection) -> Self {
        Problem::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for Problem {
    fn from(rejection: PathRejection) -> Self {
        Problem::new(rejection.status(), "Invalid Path").with_detail(rejection.body_text())
    }
}

impl From<BytesRejection> for Problem {
    fn from(rejection: BytesRejection) -> Self {
        Problem::new(rejection.status(), "Invalid Request Body").with_detail(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_carries_field_list() {
        let problem = map_domain_error(PlanningError::Validation {
            errors: vec![FieldError::new("budget", "must be greater than 0")],
        });
        assert_eq!(problem.status, 400);

        let body = serde_json::to_value(&problem).unwrap();
        assert_eq!(body["errors"][0]["field"], "budget");
        assert_eq!(body["type"], "https://httpstatuses.io/400");
    }

    #[test]
    fn status_codes_per_variant() {
        let cases = [
            (PlanningError::not_found("plan", 3), 404),
            (PlanningError::conflict("dup"), 409),
            (PlanningError::Unauthorized, 401),
            (
                PlanningError::Forbidden {
                    reason: "no".to_string(),
                },
                403,
            ),
            (PlanningError::Internal, 500),
        ];
        for (error, status) in cases {
            assert_eq!(map_domain_error(error).status, status);
        }
    }

    #[test]
    fn json_data_errors_name_the_field() {
        let cases = [
            (
                "Failed to deserialize the JSON body into the target type: missing field `name` at line 1 column 42",
                "name",
                "missing field `name`",
            ),
            (
                "Failed to deserialize the JSON body into the target type: alignments[0].weight: invalid type: string \"60\", expected f64 at line 1 column 70",
                "alignments[0].weight",
                "invalid type: string \"60\", expected f64",
            ),
            (
                "Failed to deserialize the JSON body into the target type: alignments[1]: missing field `weight` at line 1 column 90",
                "alignments[1].weight",
                "missing field `weight`",
            ),
            (
                "Failed to deserialize the JSON body into the target type: invalid type: integer `5`, expected a map at line 1 column 1",
                "body",
                "invalid type: integer `5`, expected a map",
            ),
        ];
        for (text, field, message) in cases {
            let error = json_data_field_error(text);
            assert_eq!(error.field, field, "{text}");
            assert_eq!(error.message, message, "{text}");
        }
    }

    #[test]
    fn internal_error_hides_details() {
        let problem = map_domain_error(PlanningError::Internal);
        assert_eq!(problem.detail.as_deref(), Some("An unexpected error occurred"));
        assert!(problem.errors.is_none());
    }
}
