//! Shared application state for the common routes.

use sqlx::PgPool;

#[derive(Clone, Default)]
pub struct AppState {
    /// `None` when running on in-memory repositories.
    pub pool: Option<PgPool>,
}
