//! Application assembly: one repository per resource, injected into its controller, mounted under `/api/v1`.

use crate::config::{ResourceDefinition, Settings};
use crate::handlers::ResourceState;
use crate::repository::{InMemoryRepository, JsonRepository, JsonRow, PgRepository};
use crate::routes::{common_routes, resource_routes};
use crate::service::{ResourceController, ScopedListing};
use crate::state::AppState;
use axum::Router;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub const API_PREFIX: &str = "/api/v1";

/// Where resource rows live.
#[derive(Clone)]
pub enum Backend {
    Postgres(PgPool),
    Memory,
}

impl Backend {
    fn repository(&self, definition: &ResourceDefinition) -> Arc<JsonRepository> {
        match self {
            Backend::Postgres(pool) => Arc::new(PgRepository::new(pool.clone(), definition.table.clone())),
            Backend::Memory => Arc::new(InMemoryRepository::<JsonRow>::new()),
        }
    }

    fn pool(&self) -> Option<PgPool> {
        match self {
            Backend::Postgres(pool) => Some(pool.clone()),
            Backend::Memory => None,
        }
    }
}

/// Build a controller for every resource, sharing one repository instance per resource.
pub fn controllers(
    backend: &Backend,
    resources: &[ResourceDefinition],
) -> HashMap<&'static str, ResourceController<JsonRepository>> {
    resources
        .iter()
        .map(|def| (def.path, ResourceController::new(def.path, backend.repository(def))))
        .collect()
}

pub fn build_app(settings: &Settings, backend: Backend, resources: &[ResourceDefinition]) -> Router {
    let controllers = controllers(&backend, resources);

    let mut api = Router::new();
    for def in resources {
        let Some(controller) = controllers.get(def.path) else {
            continue;
        };
        let children: HashMap<String, ScopedListing<JsonRepository>> = def
            .children
            .iter()
            .filter_map(|child| {
                let Some(child_controller) = controllers.get(child.path) else {
                    tracing::warn!(parent = def.path, child = child.path, "child listing has no resource; skipped");
                    return None;
                };
                Some((
                    child.path.to_string(),
                    ScopedListing::new(child_controller.clone(), child.foreign_key),
                ))
            })
            .collect();
        let state = ResourceState::new(controller.clone()).with_children(children);
        api = api.nest(
            &format!("/{}", def.path),
            resource_routes(def, state, settings.validation_source, settings.max_body_bytes),
        );
        tracing::debug!(resource = def.path, "mounted");
    }

    Router::new()
        .merge(common_routes(AppState { pool: backend.pool() }))
        .nest(API_PREFIX, api)
        .layer(RequestBodyLimitLayer::new(settings.max_body_bytes))
        .layer(TraceLayer::new_for_http())
}
