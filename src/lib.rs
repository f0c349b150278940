//! Texting - Main Library
//!
//! Backend of a small chat service: user accounts, one-to-one
//! conversations and group chats stored in PostgreSQL, and realtime
//! notification of every change to the users it concerns over WebSockets.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types shared with clients
//!   - Message, conversation and group records
//!   - Realtime event frames
//!   - Error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server and REST handlers
//!   - JWT authentication
//!   - Connection registry and audience fan-out
//!
//! # Feature Flags
//!
//! - **`ssr`** - Enables the backend (default)
//!
//! # Usage
//!
//! ```rust,no_run
//! use texting::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::from_env()?).await;
//! // Serve with axum::serve
//! # Ok(())
//! # }
//! ```
//!
//! # Delivery Guarantees
//!
//! Events are pushed best-effort to users connected to this process at the
//! moment of delivery. Durable state is the source of truth; clients that
//! miss an event re-fetch over REST.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
