//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the server and its clients. These types are used for serialization over
//! the REST API and the WebSocket event stream.
//!
//! # Overview
//!
//! The shared module provides transport-agnostic types. All types are
//! designed for serialization and transmission as JSON.

/// Real-time event frames
pub mod event;

/// Shared error types
pub mod error;

/// Messaging records and API bodies
pub mod messaging;

/// Re-export commonly used types for convenience
pub use event::{ChatEvent, ClientFrame};
pub use error::SharedError;
