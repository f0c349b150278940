//! Middleware Module
//!
//! Request authentication shared by the REST handlers and the WebSocket
//! upgrade.
//!
//! - **`auth`** - The `AuthUser` extractor and connection authentication

pub mod auth;

pub use auth::{authenticate_connection, bearer_token, AuthUser, AuthenticatedUser};
