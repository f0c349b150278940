//! Audience Store
//!
//! The realtime layer reads three things from durable state: a user's
//! display name, the two participants of a conversation, and the current
//! members of a group. `ChatStore` is that read contract. The server uses
//! `PgChatStore`; tests and database-less runs use `MemoryChatStore`.
//!
//! Every call is a suspension point. Callers never cache the result, so an
//! audience always reflects the state at the moment it is resolved.

use async_trait::async_trait;
use thiserror::Error;

use crate::shared::messaging::{ConversationId, GroupId, UserId};

/// Postgres-backed store
pub mod postgres;

/// In-memory store
pub mod memory;

pub use memory::MemoryChatStore;
pub use postgres::PgChatStore;

/// Errors from audience reads
#[derive(Debug, Error)]
pub enum StoreError {
    /// No durable store is configured
    #[error("store unavailable")]
    Unavailable,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable reads consumed by the realtime layer
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Display name of a user, `None` if the user does not exist
    async fn username(&self, user_id: UserId) -> Result<Option<String>, StoreError>;

    /// The two participants of a conversation, `None` if it does not exist
    async fn conversation_participants(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<(UserId, UserId)>, StoreError>;

    /// Current members of a group, empty if there are none
    async fn group_member_ids(&self, group_id: GroupId) -> Result<Vec<UserId>, StoreError>;
}
