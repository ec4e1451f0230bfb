//! Resource CRUD handlers: list, create, read, update, delete, child listings.

use crate::error::AppError;
use crate::extractors::body_fields;
use crate::repository::JsonRepository;
use crate::service::{PageQuery, ResourceController, ScopedListing};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Handler state for one resource: its controller and the child listings nested under it.
#[derive(Clone)]
pub struct ResourceState {
    pub controller: ResourceController<JsonRepository>,
    pub children: Arc<HashMap<String, ScopedListing<JsonRepository>>>,
}

impl ResourceState {
    pub fn new(controller: ResourceController<JsonRepository>) -> Self {
        Self {
            controller,
            children: Arc::new(HashMap::new()),
        }
    }

    pub fn with_children(mut self, children: HashMap<String, ScopedListing<JsonRepository>>) -> Self {
        self.children = Arc::new(children);
        self
    }
}

pub async fn list(
    State(state): State<ResourceState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    state.controller.list(&PageQuery::from_params(&params)).await
}

pub async fn create(
    State(state): State<ResourceState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload = body_fields(&body)?;
    state.controller.create(payload).await
}

pub async fn read(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.controller.get_one(&id).await
}

pub async fn update(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload = body_fields(&body)?;
    state.controller.update(&id, payload).await
}

pub async fn delete(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.controller.delete(&id).await
}

pub async fn list_children(
    State(state): State<ResourceState>,
    Path((id, child)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let listing = state.children.get(&child).ok_or(AppError::NotFound)?;
    listing.list_for(&id, &PageQuery::from_params(&params)).await
}
