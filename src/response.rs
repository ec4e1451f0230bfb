//! Standard response envelope helpers.

use crate::pagination::Pagination;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            data,
            pagination,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details,
        }
    }
}

/// A successful outcome: status code plus envelope. Kept as a value so callers and tests can inspect it.
#[derive(Debug)]
pub struct Reply<T> {
    pub status: StatusCode,
    pub body: ApiResponse<T>,
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn success_one<T>(data: T) -> Reply<T> {
    Reply {
        status: StatusCode::OK,
        body: ApiResponse {
            success: true,
            data: Some(data),
            message: None,
        },
    }
}

pub fn success_created<T>(data: T, message: &str) -> Reply<T> {
    Reply {
        status: StatusCode::CREATED,
        body: ApiResponse {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
        },
    }
}

pub fn success_message(message: &str) -> Reply<()> {
    Reply {
        status: StatusCode::OK,
        body: ApiResponse {
            success: true,
            data: None,
            message: Some(message.to_string()),
        },
    }
}

pub fn success_many<T>(page: PaginatedResponse<T>) -> Reply<PaginatedResponse<T>> {
    success_one(page)
}
