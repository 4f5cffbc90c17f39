//! Startup wiring: connect, ensure schema, serve.

use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::Cli;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Bootstrap the process and run the HTTP listener until shutdown.
///
/// Startup is linear and one-shot: connect to the database, ensure the
/// identity schema exists, assemble the router and bind. Any database
/// failure here is fatal; the listener is never bound and the process
/// exits without serving a single request.
pub async fn run(cli: Cli, config: Config) -> AppResult<()> {
    tracing::info!(environment = ?config.environment, "starting server");

    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    // Idempotent create-if-absent; not a migration system
    db.ensure_schema()
        .await
        .map_err(|e| AppError::internal(format!("Schema ensure failed: {}", e)))?;

    let state = AppState::from_config(Arc::new(db), config);
    let app = create_router(state);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
