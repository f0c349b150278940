/**
 * Authentication Handler Types
 *
 * Request and response bodies of the `/api/auth` endpoints.
 */

use serde::{Deserialize, Serialize};

use crate::backend::auth::users::User;
use crate::shared::messaging::UserId;

/// Sign up request
#[derive(Deserialize, Serialize, Debug)]
pub struct SignupRequest {
    /// User's chosen username (3-30 chars, alphanumeric + underscore)
    pub username: String,
    /// User's password (will be hashed before storage)
    pub password: String,
    #[serde(default)]
    pub pfp_url: Option<String>,
}

/// Login request
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    /// User's password (will be verified against stored hash)
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UpdateAvatarRequest {
    pub pfp_url: String,
}

/// Auth response
///
/// Returned by signup and login handlers.
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    /// JWT token for authentication
    pub token: String,
    pub user: UserResponse,
}

/// User response (without sensitive data)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub pfp_url: String,
}

impl UserResponse {
    /// Public view of `user`, with `default_avatar` when no avatar is set
    pub fn from_user(user: User, default_avatar: &str) -> Self {
        Self {
            id: user.id,
            username: user.username,
            pfp_url: user
                .pfp_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| default_avatar.to_string()),
        }
    }
}
