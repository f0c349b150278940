//! Messaging HTTP Handlers
//!
//! REST endpoints for one-to-one conversations and their messages. Every
//! mutation notifies the conversation's participants after it commits.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use sqlx::PgPool;

use super::db;
use crate::backend::auth::users::get_user_by_username;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::Audience;
use crate::backend::server::state::AppState;
use crate::shared::messaging::{
    validate_message_text, ConversationId, ConversationSummary, CreateConversationRequest,
    CreateConversationResponse, EditMessageRequest, MessageId, MessageRecord, MessagesQuery,
    SendMessageRequest, SendMessageResponse, SuccessResponse, UserId,
};
use crate::shared::ChatEvent;

/// Participants of `conversation_id`, if `user_id` is one of them
///
/// `404` for an unknown conversation, `403` for a non-participant.
async fn require_participant(
    pool: &PgPool,
    conversation_id: ConversationId,
    user_id: UserId,
) -> Result<(UserId, UserId), BackendError> {
    let (a, b) = db::get_participants(pool, conversation_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Conversation not found"))?;

    if user_id != a && user_id != b {
        tracing::warn!(user_id = %user_id, conversation_id = %conversation_id, "Not a participant");
        return Err(BackendError::forbidden("Not a participant in this conversation"));
    }

    Ok((a, b))
}

/// Message metadata, if `user_id` sent it
async fn require_own_message(
    pool: &PgPool,
    message_id: MessageId,
    user_id: UserId,
) -> Result<db::MessageMeta, BackendError> {
    let meta = db::get_message_meta(pool, message_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Message not found"))?;

    if meta.sender_id != user_id {
        return Err(BackendError::forbidden("Not the sender of this message"));
    }
    if meta.deleted {
        return Err(BackendError::bad_request("Message has been deleted"));
    }

    Ok(meta)
}

/// Open (or reopen) a conversation with another user
pub async fn create_conversation(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateConversationRequest>,
) -> Result<Json<CreateConversationResponse>, BackendError> {
    let pool = app_state.db()?;

    let recipient = get_user_by_username(pool, request.recipient_username.trim())
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    if recipient.id == user.user_id {
        return Err(BackendError::bad_request("Cannot start a conversation with yourself"));
    }

    let (conversation_id, created) =
        db::find_or_create_conversation(pool, user.user_id, recipient.id).await?;

    tracing::info!(
        conversation_id = %conversation_id,
        created,
        "Conversation opened between {} and {}",
        user.username,
        recipient.username
    );

    Ok(Json(CreateConversationResponse { conversation_id, created }))
}

/// Get conversations for the current user
pub async fn get_conversations(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ConversationSummary>>, BackendError> {
    let pool = app_state.db()?;
    let conversations = db::get_conversations_for_user(pool, user.user_id).await?;
    Ok(Json(conversations))
}

/// Get messages for a conversation
pub async fn get_messages(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(conversation_id): Path<ConversationId>,
    Query(params): Query<MessagesQuery>,
) -> Result<Json<Vec<MessageRecord>>, BackendError> {
    let pool = app_state.db()?;
    require_participant(pool, conversation_id, user.user_id).await?;

    let limit = params.page_size(app_state.config.message_page_limit);
    let messages = db::get_messages_for_conversation(pool, conversation_id, limit).await?;
    Ok(Json(messages))
}

/// Send a message
///
/// Participants receive `new_message` with the stored record for a plain
/// message, and `reload_messages` for a reply.
pub async fn send_message(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(conversation_id): Path<ConversationId>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, BackendError> {
    let pool = app_state.db()?;
    validate_message_text(&request.message)?;
    require_participant(pool, conversation_id, user.user_id).await?;

    if let Some(reply_to) = request.reply_to_message_id {
        let target = db::get_message_meta(pool, reply_to).await?;
        if target.map(|m| m.conversation_id) != Some(conversation_id) {
            return Err(BackendError::bad_request("Reply target not found in this conversation"));
        }
    }

    let id = db::insert_message(
        pool,
        conversation_id,
        user.user_id,
        &request.message,
        request.reply_to_message_id,
    )
    .await?;

    let event = if request.reply_to_message_id.is_some() {
        ChatEvent::ReloadMessages { conversation_id }
    } else {
        sent_message_event(conversation_id, id, db::get_message(pool, id).await)
    };
    app_state.notifier.announce(Audience::Conversation(conversation_id), event);

    Ok(Json(SendMessageResponse { success: true, id }))
}

/// Event for a plain message that has been stored
///
/// Falls back to `reload_messages` when the stored record cannot be read
/// back, so participants still learn about the commit.
fn sent_message_event(
    conversation_id: ConversationId,
    message_id: MessageId,
    stored: Result<Option<MessageRecord>, sqlx::Error>,
) -> ChatEvent {
    match stored {
        Ok(Some(message)) => ChatEvent::NewMessage { conversation_id, message },
        Ok(None) => {
            tracing::warn!(message_id = %message_id, "Stored message not found on reload");
            ChatEvent::ReloadMessages { conversation_id }
        }
        Err(e) => {
            tracing::warn!(message_id = %message_id, error = %e, "Failed to reload stored message");
            ChatEvent::ReloadMessages { conversation_id }
        }
    }
}

/// Edit one of the caller's messages
pub async fn edit_message(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(message_id): Path<MessageId>,
    Json(request): Json<EditMessageRequest>,
) -> Result<Json<SuccessResponse>, BackendError> {
    let pool = app_state.db()?;
    validate_message_text(&request.message)?;
    let meta = require_own_message(pool, message_id, user.user_id).await?;

    db::edit_message(pool, message_id, &request.message).await?;

    app_state.notifier.announce(
        Audience::Conversation(meta.conversation_id),
        ChatEvent::MessageEdited {
            conversation_id: meta.conversation_id,
            message_id,
        },
    );

    Ok(Json(SuccessResponse::ok()))
}

/// Soft-delete one of the caller's messages
pub async fn delete_message(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(message_id): Path<MessageId>,
) -> Result<Json<SuccessResponse>, BackendError> {
    let pool = app_state.db()?;
    let meta = require_own_message(pool, message_id, user.user_id).await?;

    db::soft_delete_message(pool, message_id).await?;

    app_state.notifier.announce(
        Audience::Conversation(meta.conversation_id),
        ChatEvent::MessageDeleted {
            conversation_id: meta.conversation_id,
            message_id,
        },
    );

    Ok(Json(SuccessResponse::ok()))
}

/// Delete a conversation and all of its messages
///
/// The row is gone by the time the event is delivered, so the audience is
/// the pair read during the participant check.
pub async fn delete_conversation(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(conversation_id): Path<ConversationId>,
) -> Result<Json<SuccessResponse>, BackendError> {
    let pool = app_state.db()?;
    let (a, b) = require_participant(pool, conversation_id, user.user_id).await?;

    if !db::delete_conversation(pool, conversation_id).await? {
        return Err(BackendError::not_found("Conversation not found"));
    }

    tracing::info!(conversation_id = %conversation_id, user_id = %user.user_id, "Conversation deleted");

    app_state.notifier.announce(
        Audience::Users(vec![a, b]),
        ChatEvent::ConversationDeleted { conversation_id },
    );

    Ok(Json(SuccessResponse::ok()))
}
