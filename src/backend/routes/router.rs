/**
 * Router Configuration
 *
 * Combines all route groups into the application router.
 *
 * # Route Order
 *
 * 1. Realtime routes (`/ws`, `/health`)
 * 2. API routes (`/api/...`)
 * 3. Static files under `/static`
 * 4. Fallback handler (JSON 404)
 *
 * Every request is traced through `tower-http`'s `TraceLayer`.
 */

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::chat_routes::configure_chat_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let static_dir = app_state.config.static_dir.clone();

    let router = configure_chat_routes(Router::new());
    let router = configure_api_routes(router);

    router
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(|| async { BackendError::not_found("Not Found") })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
