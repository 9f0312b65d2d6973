use crate::config::ConfigError;
use crate::policy::{EvaluationError, RuleViolation};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Document {
        path: PathBuf,
        source: serde_json::Error,
    },
    Evaluation(EvaluationError),
    Policy(RuleViolation),
    InvalidDate {
        value: String,
    },
}

impl AppError {
    pub fn document(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Document {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Document { path, source } => {
                write!(f, "malformed document {}: {}", path.display(), source)
            }
            AppError::Evaluation(err) => write!(f, "evaluation error: {}", err),
            AppError::Policy(err) => write!(f, "rejected policy: {}", err),
            AppError::InvalidDate { value } => write!(f, "invalid date: {:?}", value),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Document { source, .. } => Some(source),
            AppError::Evaluation(err) => Some(err),
            AppError::Policy(err) => Some(err),
            AppError::InvalidDate { .. } => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Evaluation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Document { .. } | AppError::Policy(_) | AppError::InvalidDate { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<EvaluationError> for AppError {
    fn from(value: EvaluationError) -> Self {
        Self::Evaluation(value)
    }
}

impl From<RuleViolation> for AppError {
    fn from(value: RuleViolation) -> Self {
        Self::Policy(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluation_errors_map_to_unprocessable() {
        let err = AppError::from(EvaluationError::InvalidExpenseDate {
            value: "yesterday".to_string(),
        });
        assert!(err.to_string().contains("yesterday"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn rejected_policies_and_dates_map_to_bad_request() {
        let policy = AppError::from(RuleViolation::EmptyCategoryRoute {
            rule_id: "desk".to_string(),
            category: "meals".to_string(),
        });
        assert!(policy.to_string().contains("category_routes.meals"));
        assert_eq!(policy.into_response().status(), StatusCode::BAD_REQUEST);

        let date = AppError::InvalidDate {
            value: "soon".to_string(),
        };
        assert_eq!(date.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn io_errors_map_to_internal_error() {
        let err = AppError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "rules.json",
        ));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
