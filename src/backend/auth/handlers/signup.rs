/**
 * Signup Handler
 *
 * This module implements the user registration handler for POST /api/auth/signup.
 *
 * # Registration Process
 *
 * 1. Validate username format and password length
 * 2. Check if the username is taken
 * 3. Hash password using bcrypt
 * 4. Create user in database
 * 5. Generate JWT token
 * 6. Return token and user info
 */

use axum::{extract::State, response::Json};
use bcrypt::{hash, DEFAULT_COST};

use crate::backend::auth::handlers::types::{AuthResponse, SignupRequest, UserResponse};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{create_user, get_user_by_username};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Validate username format
///
/// Usernames must be:
/// - 3-30 characters long
/// - Contain only alphanumeric characters and underscores
/// - Start with a letter
pub fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Sign up handler
///
/// # Errors
///
/// * `400 Bad Request` - If the username format is invalid or password is too short
/// * `409 Conflict` - If the username is taken
/// * `503 Service Unavailable` - If database is not configured
/// * `500 Internal Server Error` - If hashing, insertion or token generation fails
pub async fn signup(
    State(app_state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    let pool = app_state.db()?;
    tracing::info!("Signup request for username: {}", request.username);

    if !is_valid_username(&request.username) {
        tracing::warn!("Invalid username format: {}", request.username);
        return Err(BackendError::bad_request(
            "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }

    if request.password.len() < 8 {
        tracing::warn!("Password too short");
        return Err(BackendError::bad_request("Password must be at least 8 characters"));
    }

    if get_user_by_username(pool, &request.username).await?.is_some() {
        tracing::warn!("Username already exists: {}", request.username);
        return Err(BackendError::conflict("Username already taken"));
    }

    let password_hash = hash(&request.password, DEFAULT_COST).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        BackendError::internal("Server error")
    })?;

    let pfp_url = request.pfp_url.as_deref().filter(|url| !url.trim().is_empty());
    let user = create_user(pool, &request.username, &password_hash, pfp_url)
        .await
        .map_err(BackendError::from)
        .map_err(|e| {
            // Two signups for the same name can both pass the check above
            if e.is_unique_violation() {
                BackendError::conflict("Username already taken")
            } else {
                e
            }
        })?;

    let token = create_token(&app_state.jwt, user.id, &user.username).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        BackendError::internal("Server error")
    })?;

    tracing::info!("User created successfully: {}", user.username);

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from_user(user, &app_state.config.default_avatar_url),
    }))
}
