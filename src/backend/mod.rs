//! Backend Module
//!
//! All server-side code: the Axum HTTP server, authentication, the durable
//! chat endpoints, and realtime event delivery over WebSockets.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, initialization
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Users, JWT sessions, auth handlers
//! - **`middleware`** - The `AuthUser` extractor
//! - **`messaging`** - One-to-one conversations
//! - **`groups`** - Group chats
//! - **`realtime`** - Connection registry, fan-out, WebSocket sessions
//! - **`store`** - Reads the realtime layer makes against durable state
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── middleware/     - Request authentication
//! ├── messaging/      - Conversations and direct messages
//! ├── groups/         - Group chats and group messages
//! ├── realtime/       - Event delivery
//! ├── store/          - Audience store
//! └── error/          - Error types
//! ```
//!
//! # Request Flow
//!
//! A mutating request is authenticated by `AuthUser`, authorized against
//! the database, committed, and only then announced to the affected users
//! through the `Notifier`. Notification failures never change the HTTP
//! response.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Real-time event delivery
pub mod realtime;

/// Durable reads for audience resolution
pub mod store;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Request authentication
pub mod middleware;

/// One-to-one conversations
pub mod messaging;

/// Group chats
pub mod groups;

pub use error::BackendError;
pub use realtime::{Audience, ConnectionRegistry, Notifier};
pub use server::{create_app, AppState, ServerConfig};
