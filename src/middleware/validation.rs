//! Validation middleware: check a route's schema before its handler runs.

use crate::error::AppError;
use crate::extractors::RequestSources;
use crate::validation::{validate, ValidationSchema};
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which part of the request a schema is checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationSource {
    /// Body, route params and query merged into one record; later sources override earlier ones.
    Merged,
    Body,
    Params,
    Query,
}

impl FromStr for ValidationSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "merged" => Ok(Self::Merged),
            "body" => Ok(Self::Body),
            "params" => Ok(Self::Params),
            "query" => Ok(Self::Query),
            other => Err(format!("unknown validation source '{}'", other)),
        }
    }
}

impl fmt::Display for ValidationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Merged => "merged",
            Self::Body => "body",
            Self::Params => "params",
            Self::Query => "query",
        })
    }
}

/// Middleware state: the schema for one route and how to read the request.
#[derive(Clone, Debug)]
pub struct RequestRules {
    pub schema: Arc<ValidationSchema>,
    pub source: ValidationSource,
    /// Upper bound for buffering the body.
    pub body_limit: usize,
}

impl RequestRules {
    pub fn new(schema: Arc<ValidationSchema>, source: ValidationSource, body_limit: usize) -> Self {
        Self {
            schema,
            source,
            body_limit,
        }
    }

    /// The record this route's schema is checked against.
    pub fn record(&self, sources: RequestSources, path: &str) -> Map<String, Value> {
        match self.source {
            ValidationSource::Merged => {
                let (record, shadowed) = sources.merged();
                if !shadowed.is_empty() {
                    tracing::warn!(
                        path,
                        keys = ?shadowed,
                        "route or query parameters override body fields during validation"
                    );
                }
                record
            }
            ValidationSource::Body => sources.body,
            ValidationSource::Params => sources.params,
            ValidationSource::Query => sources.query,
        }
    }
}

/// Use with `axum::middleware::from_fn_with_state(rules, validate_request)`.
///
/// On failure answers `400` with every field error; a faulty custom rule answers `500`.
/// The buffered body is handed on unchanged.
pub async fn validate_request(
    State(rules): State<RequestRules>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let bytes = match to_bytes(body, rules.body_limit).await {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!(error = %e, "could not buffer request body");
            return AppError::BadRequest("request body too large or unreadable".into()).into_response();
        }
    };
    let sources = match RequestSources::from_parts(&mut parts, &bytes).await {
        Ok(s) => s,
        Err(e) => return e.into_response(),
    };
    let record = rules.record(sources, parts.uri.path());

    match validate(&rules.schema, &record) {
        Ok(result) if result.is_valid => next.run(Request::from_parts(parts, Body::from(bytes))).await,
        Ok(result) => {
            tracing::debug!(path = %parts.uri.path(), errors = result.errors.len(), "validation failed");
            AppError::Validation(result.errors).into_response()
        }
        Err(fault) => AppError::Internal(fault.to_string()).into_response(),
    }
}
