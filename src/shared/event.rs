/**
 * Real-time Event System
 *
 * This module defines the JSON frames exchanged over a client's WebSocket.
 *
 * # Outbound
 *
 * `ChatEvent` is pushed by the server whenever durable state that a client
 * displays has changed. Every event carries a `type` discriminator and the
 * ids a client needs to patch or re-fetch its local state.
 *
 * # Inbound
 *
 * `ClientFrame` is the only thing a client sends: typing indicators. Any
 * other `type` deserializes to `ClientFrame::Unknown` and is ignored.
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::messaging::{ConversationId, GroupId, MessageId, MessageRecord, UserId};

/// Event pushed to connected clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A participant started typing in a conversation
    UserTyping {
        conversation_id: ConversationId,
        user_id: UserId,
        username: String,
    },
    /// A participant stopped typing
    UserStoppedTyping {
        conversation_id: ConversationId,
        user_id: UserId,
    },
    /// A plain message was sent; carries the full record
    NewMessage {
        conversation_id: ConversationId,
        message: MessageRecord,
    },
    /// A reply was sent; clients re-fetch the conversation
    ReloadMessages {
        conversation_id: ConversationId,
    },
    MessageEdited {
        conversation_id: ConversationId,
        message_id: MessageId,
    },
    MessageDeleted {
        conversation_id: ConversationId,
        message_id: MessageId,
    },
    ConversationDeleted {
        conversation_id: ConversationId,
    },
    NewGroupMessage {
        group_id: GroupId,
    },
    GroupMessageEdited {
        group_id: GroupId,
        message_id: MessageId,
    },
    GroupMessageDeleted {
        group_id: GroupId,
        message_id: MessageId,
    },
    /// Group name or description changed
    GroupUpdated {
        group_id: GroupId,
    },
    MemberAdded {
        group_id: GroupId,
    },
    MemberLeft {
        group_id: GroupId,
    },
}

impl ChatEvent {
    /// Wire name of the event, as written in the `type` field
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::UserTyping { .. } => "user_typing",
            Self::UserStoppedTyping { .. } => "user_stopped_typing",
            Self::NewMessage { .. } => "new_message",
            Self::ReloadMessages { .. } => "reload_messages",
            Self::MessageEdited { .. } => "message_edited",
            Self::MessageDeleted { .. } => "message_deleted",
            Self::ConversationDeleted { .. } => "conversation_deleted",
            Self::NewGroupMessage { .. } => "new_group_message",
            Self::GroupMessageEdited { .. } => "group_message_edited",
            Self::GroupMessageDeleted { .. } => "group_message_deleted",
            Self::GroupUpdated { .. } => "group_updated",
            Self::MemberAdded { .. } => "member_added",
            Self::MemberLeft { .. } => "member_left",
        }
    }

    /// Serialize to the text frame sent to clients
    pub fn to_frame(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Control frame received from a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Typing { conversation_id: ConversationId },
    StoppedTyping { conversation_id: ConversationId },
    /// Any other `type`
    #[serde(other)]
    Unknown,
}

impl ClientFrame {
    /// Parse a text frame
    ///
    /// Returns an error for invalid JSON, a missing `type`, or a known type
    /// with missing or mistyped fields.
    pub fn parse(text: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(text)?)
    }
}
