//! MediBloc API server.
//!
//! Run from repo root: `cargo run -p medibloc-server`
//! Without `DATABASE_URL` the resources are kept in memory.

use medibloc_api::telemetry::DEFAULT_FILTER;
use medibloc_api::{
    apply_migrations, build_app, catalog, ensure_database_exists, init_tracing, set_error_verbosity,
    Backend, Settings,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing(DEFAULT_FILTER);

    let settings = Settings::from_env()?;
    set_error_verbosity(settings.environment.verbosity());
    let resources = catalog(&settings.schema_name)?;

    let backend = match &settings.database_url {
        Some(database_url) => {
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.db_max_connections)
                .connect(database_url)
                .await?;
            apply_migrations(&pool, &resources).await?;
            Backend::Postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory repositories");
            Backend::Memory
        }
    };

    let app = build_app(&settings, backend, &resources);
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("MediBloc API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
