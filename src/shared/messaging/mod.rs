//! Messaging Module
//!
//! This module contains the data structures exchanged by the chat API:
//!
//! - `MessageRecord` - A stored direct or group message as clients see it
//! - `ConversationSummary` - A one-to-one conversation from one user's side
//! - `GroupSummary` / `GroupMember` - Group chats and their membership
//!
//! Identifiers are UUIDs. The aliases below exist so signatures say which
//! kind of id they take.
//!
//! # Usage
//!
//! ```rust
//! use texting::shared::messaging::{MessageRecord, ConversationSummary, GroupSummary};
//! ```

use uuid::Uuid;

pub mod message;
pub mod conversation;
pub mod group;

/// Identifier of a user account
pub type UserId = Uuid;
/// Identifier of a one-to-one conversation
pub type ConversationId = Uuid;
/// Identifier of a group chat
pub type GroupId = Uuid;
/// Identifier of a direct or group message
pub type MessageId = Uuid;

// Re-export all types
pub use message::{
    MessageRecord, SendMessageRequest, SendMessageResponse, EditMessageRequest,
    MessagesQuery, SuccessResponse, validate_message_text,
};
pub use conversation::{
    ConversationSummary, CreateConversationRequest, CreateConversationResponse,
    participant_pair,
};
pub use group::{
    GroupSummary, GroupMember, CreateGroupRequest, CreateGroupResponse,
    UpdateGroupRequest, AddMemberRequest,
};
