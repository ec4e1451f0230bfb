//! MediBloc API core: declarative request validation and generic resource controllers
//! over a pluggable repository contract.

pub mod app;
pub mod case;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod migration;
pub mod pagination;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod validation;

pub use app::{build_app, Backend, API_PREFIX};
pub use config::{catalog, ResourceDefinition, Settings};
pub use error::{set_error_verbosity, AppError, ConfigError, ErrorVerbosity, RepositoryError};
pub use middleware::{validate_request, RequestRules, ValidationSource};
pub use migration::apply_migrations;
pub use pagination::Pagination;
pub use repository::{FindMany, InMemoryRepository, JsonRepository, PgRepository, Repository};
pub use response::{success_created, success_many, success_message, success_one, ApiResponse, ErrorBody, PaginatedResponse};
pub use routes::{common_routes, resource_routes};
pub use service::{PageQuery, ResourceController, ScopedListing};
pub use state::AppState;
pub use store::ensure_database_exists;
pub use telemetry::init_tracing;
pub use validation::{validate, FieldRule, FieldType, ValidationError, ValidationResult, ValidationSchema};
