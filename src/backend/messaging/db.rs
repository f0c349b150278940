//! Database operations for one-to-one conversations
//!
//! Conversations store their two participants as an ordered pair
//! (`user1_id < user2_id`), so each pair of users has at most one row.

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::shared::messaging::{
    participant_pair, ConversationId, ConversationSummary, MessageId, MessageRecord, UserId,
};

/// Ownership data needed to authorize an edit or delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageMeta {
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub deleted: bool,
}

const MESSAGE_SELECT: &str = r#"
    SELECT dm.id, dm.message, dm.sender_id, u.username, u.pfp_url,
           dm.created_at, dm.edited_at, dm.deleted,
           dm.reply_to_message_id,
           r.message AS reply_to_message,
           ru.username AS reply_to_username
    FROM direct_messages dm
    JOIN users u ON u.id = dm.sender_id
    LEFT JOIN direct_messages r ON r.id = dm.reply_to_message_id
    LEFT JOIN users ru ON ru.id = r.sender_id
"#;

/// Find the conversation of a pair, creating it if needed
///
/// Returns the id and whether it was created by this call.
pub async fn find_or_create_conversation(
    pool: &PgPool,
    a: UserId,
    b: UserId,
) -> Result<(ConversationId, bool), sqlx::Error> {
    let (user1_id, user2_id) = participant_pair(a, b);

    let inserted = sqlx::query(
        r#"
        INSERT INTO conversations (id, user1_id, user2_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (user1_id, user2_id) DO NOTHING
        RETURNING id
        "#
    )
    .bind(Uuid::new_v4())
    .bind(user1_id)
    .bind(user2_id)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = inserted {
        return Ok((row.get("id"), true));
    }

    let row = sqlx::query("SELECT id FROM conversations WHERE user1_id = $1 AND user2_id = $2")
        .bind(user1_id)
        .bind(user2_id)
        .fetch_one(pool)
        .await?;

    Ok((row.get("id"), false))
}

/// The two participants of a conversation
pub async fn get_participants(
    pool: &PgPool,
    conversation_id: ConversationId,
) -> Result<Option<(UserId, UserId)>, sqlx::Error> {
    let row = sqlx::query("SELECT user1_id, user2_id FROM conversations WHERE id = $1")
        .bind(conversation_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| (r.get("user1_id"), r.get("user2_id"))))
}

/// Get conversations for a user, newest first
pub async fn get_conversations_for_user(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Vec<ConversationSummary>, sqlx::Error> {
    sqlx::query_as::<_, ConversationSummary>(
        r#"
        SELECT c.id, u.id AS other_user_id, u.username, c.created_at
        FROM conversations c
        JOIN users u
          ON u.id = CASE WHEN c.user1_id = $1 THEN c.user2_id ELSE c.user1_id END
        WHERE c.user1_id = $1 OR c.user2_id = $1
        ORDER BY c.created_at DESC
        "#
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// The most recent `limit` messages of a conversation, oldest first
pub async fn get_messages_for_conversation(
    pool: &PgPool,
    conversation_id: ConversationId,
    limit: i64,
) -> Result<Vec<MessageRecord>, sqlx::Error> {
    let query = format!(
        "{MESSAGE_SELECT} WHERE dm.conversation_id = $1 ORDER BY dm.created_at DESC LIMIT $2"
    );
    let mut messages = sqlx::query_as::<_, MessageRecord>(&query)
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    messages.reverse();
    Ok(messages)
}

/// One message with its sender and reply preview
pub async fn get_message(
    pool: &PgPool,
    message_id: MessageId,
) -> Result<Option<MessageRecord>, sqlx::Error> {
    let query = format!("{MESSAGE_SELECT} WHERE dm.id = $1");
    sqlx::query_as::<_, MessageRecord>(&query)
        .bind(message_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_message_meta(
    pool: &PgPool,
    message_id: MessageId,
) -> Result<Option<MessageMeta>, sqlx::Error> {
    let row = sqlx::query("SELECT conversation_id, sender_id, deleted FROM direct_messages WHERE id = $1")
        .bind(message_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| MessageMeta {
        conversation_id: r.get("conversation_id"),
        sender_id: r.get("sender_id"),
        deleted: r.get("deleted"),
    }))
}

/// Store a message in the database
pub async fn insert_message(
    pool: &PgPool,
    conversation_id: ConversationId,
    sender_id: UserId,
    message: &str,
    reply_to_message_id: Option<MessageId>,
) -> Result<MessageId, sqlx::Error> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO direct_messages (id, conversation_id, sender_id, message, reply_to_message_id)
        VALUES ($1, $2, $3, $4, $5)
        "#
    )
    .bind(id)
    .bind(conversation_id)
    .bind(sender_id)
    .bind(message)
    .bind(reply_to_message_id)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn edit_message(pool: &PgPool, message_id: MessageId, message: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE direct_messages SET message = $1, edited_at = now() WHERE id = $2")
        .bind(message)
        .bind(message_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Flag a message as deleted, keeping its row
pub async fn soft_delete_message(pool: &PgPool, message_id: MessageId) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE direct_messages SET deleted = true WHERE id = $1")
        .bind(message_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete a conversation and, by cascade, its messages
pub async fn delete_conversation(pool: &PgPool, conversation_id: ConversationId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
        .bind(conversation_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
