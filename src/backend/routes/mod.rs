//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! ├── chat_routes.rs  - WebSocket and health routes
//! └── api_routes.rs   - REST endpoints
//! ```

/// Main router creation
pub mod router;

/// Realtime route handlers
pub mod chat_routes;

/// API endpoint handlers
pub mod api_routes;

pub use router::create_router;
