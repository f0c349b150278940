//! Conversation Data Structure
//!
//! Represents a one-to-one conversation between two users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConversationId, UserId};

/// A conversation as listed for one of its participants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ssr", derive(sqlx::FromRow))]
pub struct ConversationSummary {
    /// Unique conversation ID
    pub id: ConversationId,
    /// The participant who is not the caller
    pub other_user_id: UserId,
    /// Username of the other participant (for display in chat list)
    pub username: String,
    /// When the conversation was created
    pub created_at: DateTime<Utc>,
}

/// Request to open a private chat with another user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    pub recipient_username: String,
}

/// Response to opening a private chat
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateConversationResponse {
    pub conversation_id: ConversationId,
    /// False when the pair already had a conversation
    pub created: bool,
}

/// Order two participants so every pair has one canonical row
pub fn participant_pair(a: UserId, b: UserId) -> (UserId, UserId) {
    if a <= b { (a, b) } else { (b, a) }
}
