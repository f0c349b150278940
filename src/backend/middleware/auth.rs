/**
 * Authentication Middleware
 *
 * Extracts and verifies JWT tokens and provides the caller's identity to
 * handlers.
 *
 * REST handlers take an `AuthUser` argument, which reads the
 * `Authorization: Bearer <token>` header. The WebSocket upgrade uses
 * `authenticate_connection`, which also accepts the token as a `token`
 * query parameter because browsers cannot set headers on a WebSocket
 * handshake.
 */

use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::auth::sessions::{user_id_from_token, verify_token, JwtKeys};
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::messaging::UserId;

/// Authenticated user data extracted from JWT token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

/// Token from an `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Identity of a WebSocket upgrade request, `None` if it has no valid token
///
/// The query parameter wins when both are present.
pub fn authenticate_connection(
    keys: &JwtKeys,
    headers: &HeaderMap,
    query_token: Option<&str>,
) -> Option<UserId> {
    let token = query_token
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(headers))?;
    user_id_from_token(keys, token)
}

/// Verify user exists in database
async fn verify_user_exists(pool: &PgPool, user_id: Uuid) -> Result<(), BackendError> {
    get_user_by_id(pool, user_id)
        .await?
        .ok_or_else(BackendError::unauthorized)?;
    Ok(())
}

/// Axum extractor for authenticated user
///
/// Rejects with `401 Unauthorized` when the header is missing, the token
/// does not verify, or (with a database configured) the user no longer
/// exists.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            tracing::warn!("Missing or malformed Authorization header");
            BackendError::unauthorized()
        })?;

        let claims = verify_token(&state.jwt, token).map_err(|e| {
            tracing::warn!("Invalid token: {}", e);
            BackendError::unauthorized()
        })?;

        let user_id = claims.user_id().ok_or_else(|| {
            tracing::warn!("Invalid user ID in token: {}", claims.sub);
            BackendError::unauthorized()
        })?;

        if let Some(pool) = &state.db_pool {
            verify_user_exists(pool, user_id).await?;
        }

        Ok(AuthUser(AuthenticatedUser {
            user_id,
            username: claims.username,
        }))
    }
}
