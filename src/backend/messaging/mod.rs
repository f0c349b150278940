//! Messaging Module
//!
//! One-to-one conversations: creation, listing, message history and
//! message mutations.

pub mod handlers;
pub mod db;

pub use handlers::*;
