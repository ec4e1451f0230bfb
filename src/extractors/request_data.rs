//! Collect the three request sources a validation schema can be checked against.

use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, Query, RawPathParams},
    http::request::Parts,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Body, route params and query string of one request, each as a flat JSON object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestSources {
    pub body: Map<String, Value>,
    pub params: Map<String, Value>,
    pub query: Map<String, Value>,
}

/// Parse a buffered body. Empty means no fields; anything else must be a JSON object.
pub fn body_fields(bytes: &[u8]) -> Result<Map<String, Value>, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(_) => Err(AppError::BadRequest("request body must be a JSON object".into())),
        Err(_) => Err(AppError::BadRequest("request body is not valid JSON".into())),
    }
}

fn strings_to_object<'a, I>(pairs: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

impl RequestSources {
    /// Reads params and query from `parts`; the body has already been buffered by the caller.
    pub async fn from_parts(parts: &mut Parts, body: &[u8]) -> Result<Self, AppError> {
        let body = body_fields(body)?;
        let params = match RawPathParams::from_request_parts(parts, &()).await {
            Ok(raw) => strings_to_object(raw.iter()),
            Err(_) => Map::new(),
        };
        let Query(query) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|_| AppError::BadRequest("malformed query string".into()))?;
        let query = strings_to_object(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        Ok(Self { body, params, query })
    }

    /// Body, then params, then query; later sources win. Returns the keys that were overridden.
    pub fn merged(&self) -> (Map<String, Value>, Vec<String>) {
        let mut out = self.body.clone();
        let mut shadowed = Vec::new();
        for source in [&self.params, &self.query] {
            for (k, v) in source {
                if out.insert(k.clone(), v.clone()).is_some() {
                    shadowed.push(k.clone());
                }
            }
        }
        (out, shadowed)
    }
}
