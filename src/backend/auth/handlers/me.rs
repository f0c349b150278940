/**
 * Current User Handlers
 *
 * GET /api/auth/me returns the caller's profile and PUT /api/auth/me/avatar
 * changes its avatar. Both require a valid bearer token.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::{UpdateAvatarRequest, UserResponse};
use crate::backend::auth::users::{get_user_by_id, update_avatar as store_avatar};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;

/// Get current user handler
///
/// # Errors
///
/// * `401 Unauthorized` - If the token is missing or invalid
/// * `404 Not Found` - If the user no longer exists
/// * `503 Service Unavailable` - If database is not configured
pub async fn get_me(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserResponse>, BackendError> {
    let pool = app_state.db()?;

    let user = get_user_by_id(pool, user.user_id).await?.ok_or_else(|| {
        tracing::warn!("User not found: {}", user.user_id);
        BackendError::not_found("User not found")
    })?;

    Ok(Json(UserResponse::from_user(user, &app_state.config.default_avatar_url)))
}

/// Update avatar handler
///
/// # Errors
///
/// * `400 Bad Request` - If the URL is blank
/// * `404 Not Found` - If the user no longer exists
pub async fn update_avatar(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<UpdateAvatarRequest>,
) -> Result<Json<UserResponse>, BackendError> {
    let pool = app_state.db()?;

    let pfp_url = request.pfp_url.trim();
    if pfp_url.is_empty() {
        return Err(BackendError::bad_request("Avatar URL is required"));
    }

    let updated = store_avatar(pool, user.user_id, pfp_url)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    tracing::info!("Avatar updated for user: {}", updated.username);
    Ok(Json(UserResponse::from_user(updated, &app_state.config.default_avatar_url)))
}
