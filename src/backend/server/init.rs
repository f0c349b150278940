/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server.
 *
 * # Initialization Process
 *
 * 1. Connect to the database, if configured, and run migrations
 * 2. Build the application state (registry, notifier, JWT keys)
 * 3. Create and configure the router
 */

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
///
/// A missing or unreachable database does not prevent startup; REST
/// endpoints then answer `503` and every audience resolves empty.
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!("Initializing texting backend server");

    let db_pool = load_database(config.database_url.as_deref()).await;
    if db_pool.is_none() {
        tracing::warn!("Running without a database");
    }

    let app_state = AppState::new(config, db_pool);
    let app = create_router(app_state);

    tracing::info!("Router configured");
    app
}
