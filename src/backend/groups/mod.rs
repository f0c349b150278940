//! Groups Module
//!
//! Group chats: creation, membership, message history and message
//! mutations.

pub mod handlers;
pub mod db;

pub use handlers::*;
