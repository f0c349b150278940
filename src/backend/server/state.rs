/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` is the central state container. It holds:
 * - The server configuration
 * - The optional PostgreSQL pool (`None` when no database is configured)
 * - The `Notifier`, which owns the connection registry and audience store
 * - The JWT keys used by the auth extractor and the WebSocket upgrade
 *
 * Everything is cheap to clone: pools, registries and keys are shared
 * handles.
 *
 * # Example
 *
 * ```rust,ignore
 * use texting::backend::server::state::AppState;
 * use axum::extract::State;
 *
 * async fn handler(State(app_state): State<AppState>) {
 *     let online = app_state.notifier.registry().len();
 * }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::auth::sessions::JwtKeys;
use crate::backend::error::BackendError;
use crate::backend::realtime::{ConnectionRegistry, Notifier};
use crate::backend::server::config::ServerConfig;
use crate::backend::store::{ChatStore, MemoryChatStore, PgChatStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,

    /// Database connection pool
    ///
    /// This is `None` if the database is not configured. Handlers go
    /// through `AppState::db`, which turns `None` into a 503.
    pub db_pool: Option<PgPool>,

    pub notifier: Notifier,

    pub jwt: JwtKeys,
}

impl AppState {
    /// Assemble the state around an optional pool
    ///
    /// Audiences are read from Postgres when a pool is present and from an
    /// empty in-memory store otherwise.
    pub fn new(config: ServerConfig, db_pool: Option<PgPool>) -> Self {
        let store: Arc<dyn ChatStore> = match &db_pool {
            Some(pool) => Arc::new(PgChatStore::new(pool.clone())),
            None => Arc::new(MemoryChatStore::new()),
        };
        Self::with_store(config, db_pool, store)
    }

    /// Assemble the state with an explicit audience store
    pub fn with_store(config: ServerConfig, db_pool: Option<PgPool>, store: Arc<dyn ChatStore>) -> Self {
        let jwt = JwtKeys::new(&config.jwt_secret, config.token_ttl_secs);
        Self {
            config: Arc::new(config),
            db_pool,
            notifier: Notifier::new(ConnectionRegistry::new(), store),
            jwt,
        }
    }

    /// The database pool, or `503 Service Unavailable`
    pub fn db(&self) -> Result<&PgPool, BackendError> {
        self.db_pool.as_ref().ok_or_else(|| {
            tracing::error!("Database not configured");
            BackendError::database_unavailable()
        })
    }
}

impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for Notifier {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notifier.clone()
    }
}

impl FromRef<AppState> for ConnectionRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notifier.registry().clone()
    }
}
