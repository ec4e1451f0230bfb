//! Resource CRUD routes, one router per catalog entry.
//! Create and update are wrapped in the validation middleware with the resource's schemas.

use crate::config::ResourceDefinition;
use crate::handlers::resource::{
    create, delete as delete_handler, list, list_children, read, update, ResourceState,
};
use crate::middleware::{validate_request, RequestRules, ValidationSource};
use axum::{handler::Handler, middleware::from_fn_with_state, routing::get, Router};

/// Routes for one resource, meant to be nested under `/<path>`.
pub fn resource_routes(
    definition: &ResourceDefinition,
    state: ResourceState,
    source: ValidationSource,
    body_limit: usize,
) -> Router {
    let create_rules = RequestRules::new(definition.create_schema.clone(), source, body_limit);
    let update_rules = RequestRules::new(definition.update_schema.clone(), source, body_limit);
    let validated_create = create.layer(from_fn_with_state(create_rules, validate_request));
    let validated_update = update.layer(from_fn_with_state(update_rules, validate_request));

    Router::new()
        .route("/", get(list).post(validated_create))
        .route(
            "/:id",
            get(read)
                .put(validated_update.clone())
                .patch(validated_update)
                .delete(delete_handler),
        )
        .route("/:id/:child", get(list_children))
        .with_state(state)
}
