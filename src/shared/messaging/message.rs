//! Message Data Structures
//!
//! Represents a single message in a conversation or group chat, plus the
//! request and response bodies of the message endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MessageId, UserId};
use crate::shared::error::SharedError;

/// A stored message joined with its sender's profile
///
/// The same shape is used for direct messages and group messages. Deleted
/// messages keep their row and are flagged with `deleted`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ssr", derive(sqlx::FromRow))]
pub struct MessageRecord {
    /// Unique message ID
    pub id: MessageId,
    /// Message text
    pub message: String,
    /// Author of the message
    pub sender_id: UserId,
    /// Author's username at read time
    pub username: String,
    /// Author's avatar URL
    pub pfp_url: Option<String>,
    /// When the message was stored
    pub created_at: DateTime<Utc>,
    /// Last edit, if any
    pub edited_at: Option<DateTime<Utc>>,
    /// Soft-delete flag
    pub deleted: bool,
    /// Message this one replies to
    pub reply_to_message_id: Option<MessageId>,
    /// Text of the replied-to message
    pub reply_to_message: Option<String>,
    /// Author of the replied-to message
    pub reply_to_username: Option<String>,
}

impl MessageRecord {
    /// Whether this message is a reply to another one
    pub fn is_reply(&self) -> bool {
        self.reply_to_message_id.is_some()
    }
}

/// Request body for sending a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
    #[serde(default)]
    pub reply_to_message_id: Option<MessageId>,
}

/// Response after storing a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendMessageResponse {
    pub success: bool,
    pub id: MessageId,
}

/// Request body for editing a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditMessageRequest {
    pub message: String,
}

/// Query string of the message listing endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<i64>,
}

impl MessagesQuery {
    /// Page size clamped to `1..=max`, `max` when absent
    pub fn page_size(&self, max: i64) -> i64 {
        self.limit.map(|l| l.clamp(1, max)).unwrap_or(max)
    }
}

/// Generic acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Reject empty or whitespace-only message text
pub fn validate_message_text(text: &str) -> Result<(), SharedError> {
    if text.trim().is_empty() {
        return Err(SharedError::validation("message", "Message is required"));
    }
    Ok(())
}
