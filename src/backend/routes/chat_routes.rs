/**
 * Realtime Route Handlers
 *
 * # Routes
 *
 * - `GET /ws` - WebSocket upgrade for event delivery and typing indicators
 * - `GET /health` - Liveness check with the number of connected users
 */

use axum::{extract::State, response::Json, routing::get, Router};
use serde::{Deserialize, Serialize};

use crate::backend::realtime::{handle_ws_upgrade, ConnectionRegistry};
use crate::backend::server::state::AppState;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    /// Users with a registered connection
    pub connections: usize,
}

/// Health check handler (GET /health)
pub async fn health_check(State(registry): State<ConnectionRegistry>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        connections: registry.len(),
    })
}

/// Configure realtime routes
pub fn configure_chat_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/ws", get(handle_ws_upgrade))
        .route("/health", get(health_check))
}
