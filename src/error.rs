//! Typed errors and HTTP mapping.

use crate::response::ErrorBody;
use crate::validation::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::OnceLock;
use thiserror::Error;

/// Generic text for failures whose detail must not reach clients.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("invalid pattern for {resource}.{field}: {source}")]
    Pattern {
        resource: &'static str,
        field: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Failures reported by a repository. Never sent to clients as-is.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("{0}")]
    Backend(String),
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
    /// Failure that carries no usable message.
    #[error("unknown repository failure")]
    Opaque,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid validation data")]
    Validation(Vec<ValidationError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid identifier")]
    InvalidId,
    #[error("resource not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Repository(String),
    #[error("internal server error")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            RepositoryError::Opaque => AppError::Repository(INTERNAL_ERROR_MESSAGE.to_string()),
            // Driver text names tables and constraints; shown only under development verbosity.
            RepositoryError::Db(e) => AppError::Internal(e.to_string()),
            other => AppError::Repository(other.to_string()),
        }
    }
}

/// How much of an internal failure is shown to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorVerbosity {
    /// Generic message only.
    Production,
    /// Generic message plus the raw detail under `details`.
    Development,
}

static VERBOSITY: OnceLock<ErrorVerbosity> = OnceLock::new();

/// Set once at startup; later calls are ignored. Unset means [`ErrorVerbosity::Production`].
pub fn set_error_verbosity(verbosity: ErrorVerbosity) {
    if VERBOSITY.set(verbosity).is_err() {
        tracing::debug!("error verbosity already set; keeping existing value");
    }
}

pub fn error_verbosity() -> ErrorVerbosity {
    VERBOSITY.get().copied().unwrap_or(ErrorVerbosity::Production)
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::InvalidId => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Repository(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Envelope for this error under the given verbosity.
    pub fn body(&self, verbosity: ErrorVerbosity) -> ErrorBody {
        let details = match self {
            AppError::Validation(errors) => serde_json::to_value(errors).ok(),
            AppError::Internal(detail) if verbosity == ErrorVerbosity::Development => {
                Some(serde_json::json!({ "message": detail }))
            }
            _ => None,
        };
        ErrorBody::new(self.to_string(), details)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }
        (status, Json(self.body(error_verbosity()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repository_errors_map_to_client_errors() {
        assert!(matches!(
            AppError::from(RepositoryError::Conflict("email taken".into())),
            AppError::Conflict(m) if m == "email taken"
        ));
        assert!(matches!(
            AppError::from(RepositoryError::Backend("disk full".into())),
            AppError::Repository(m) if m == "disk full"
        ));
        assert!(matches!(
            AppError::from(RepositoryError::Opaque),
            AppError::Repository(m) if m == INTERNAL_ERROR_MESSAGE
        ));
    }

    #[test]
    fn database_detail_hidden_in_production() {
        let err = AppError::from(RepositoryError::Db(sqlx::Error::RowNotFound));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let prod = serde_json::to_value(err.body(ErrorVerbosity::Production)).unwrap();
        assert_eq!(prod, json!({"success": false, "error": INTERNAL_ERROR_MESSAGE}));
        let dev = serde_json::to_value(err.body(ErrorVerbosity::Development)).unwrap();
        assert!(dev["details"]["message"].as_str().unwrap().contains("no rows"));
    }

    #[test]
    fn validation_body_carries_details() {
        let err = AppError::Validation(vec![ValidationError {
            field: "email".into(),
            message: "email is required".into(),
        }]);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let body = serde_json::to_value(err.body(ErrorVerbosity::Production)).unwrap();
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": "invalid validation data",
                "details": [{"field": "email", "message": "email is required"}]
            })
        );
    }

    #[test]
    fn internal_detail_only_in_development() {
        let err = AppError::Internal("custom rule for 'x' failed".into());
        let prod = serde_json::to_value(err.body(ErrorVerbosity::Production)).unwrap();
        assert_eq!(prod, json!({"success": false, "error": INTERNAL_ERROR_MESSAGE}));
        let dev = serde_json::to_value(err.body(ErrorVerbosity::Development)).unwrap();
        assert_eq!(dev["details"]["message"], "custom rule for 'x' failed");
    }

    #[test]
    fn status_codes() {
        assert_eq!(AppError::InvalidId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Repository("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
