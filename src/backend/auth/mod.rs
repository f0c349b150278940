//! Authentication Module
//!
//! This module handles user registration, login, and session tokens.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model and database operations
//! ├── sessions.rs     - JWT token management
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Signup**: username and password → user created → JWT returned
//! 2. **Login**: username and password verified → JWT returned
//! 3. **Requests**: JWT sent as `Authorization: Bearer`, or as `?token=` on
//!    the WebSocket upgrade
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Tokens are HS256 JWTs signed with `JWT_SECRET` and expire after
//!   `TOKEN_TTL_SECS`
//! - Invalid credentials return 401 (no information leakage)

/// User data model and database operations
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::{get_me, login, signup, update_avatar};
pub use sessions::{create_token, verify_token, Claims, JwtKeys};
