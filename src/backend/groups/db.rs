//! Database operations for group chats

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::shared::messaging::{GroupId, GroupMember, GroupSummary, MessageId, MessageRecord, UserId};

/// Ownership data needed to authorize an edit or delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMessageMeta {
    pub group_id: GroupId,
    pub sender_id: UserId,
    pub deleted: bool,
}

/// Result of a member leaving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// The caller was a member and has been removed
    pub removed: bool,
    /// The caller was the last member, so the group was deleted
    pub group_deleted: bool,
}

const MESSAGE_SELECT: &str = r#"
    SELECT gm.id, gm.message, gm.sender_id, u.username, u.pfp_url,
           gm.created_at, gm.edited_at, gm.deleted,
           gm.reply_to_message_id,
           r.message AS reply_to_message,
           ru.username AS reply_to_username
    FROM group_messages gm
    JOIN users u ON u.id = gm.sender_id
    LEFT JOIN group_messages r ON r.id = gm.reply_to_message_id
    LEFT JOIN users ru ON ru.id = r.sender_id
"#;

/// Create a group with its creator and the named members
///
/// Usernames that do not resolve are skipped.
pub async fn create_group(
    pool: &PgPool,
    name: &str,
    description: &str,
    created_by: UserId,
    member_usernames: &[String],
) -> Result<GroupId, sqlx::Error> {
    let group_id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO group_chats (id, name, description, created_by)
        VALUES ($1, $2, $3, $4)
        "#
    )
    .bind(group_id)
    .bind(name)
    .bind(description)
    .bind(created_by)
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO group_members (group_id, user_id) VALUES ($1, $2)")
        .bind(group_id)
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

    if !member_usernames.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id)
            SELECT $1, id FROM users WHERE username = ANY($2)
            ON CONFLICT DO NOTHING
            "#
        )
        .bind(group_id)
        .bind(member_usernames)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(group_id)
}

/// Groups the user belongs to, newest first, with member counts
pub async fn get_groups_for_user(pool: &PgPool, user_id: UserId) -> Result<Vec<GroupSummary>, sqlx::Error> {
    sqlx::query_as::<_, GroupSummary>(
        r#"
        SELECT g.id, g.name, g.description, g.created_by, g.created_at,
               (SELECT COUNT(*) FROM group_members c WHERE c.group_id = g.id) AS member_count
        FROM group_chats g
        JOIN group_members m ON m.group_id = g.id
        WHERE m.user_id = $1
        ORDER BY g.created_at DESC
        "#
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn group_exists(pool: &PgPool, group_id: GroupId) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM group_chats WHERE id = $1) AS found")
        .bind(group_id)
        .fetch_one(pool)
        .await?;
    Ok(row.get("found"))
}

pub async fn is_member(pool: &PgPool, group_id: GroupId, user_id: UserId) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        "SELECT EXISTS(SELECT 1 FROM group_members WHERE group_id = $1 AND user_id = $2) AS found",
    )
    .bind(group_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(row.get("found"))
}

/// The most recent `limit` messages of a group, oldest first
pub async fn get_group_messages(
    pool: &PgPool,
    group_id: GroupId,
    limit: i64,
) -> Result<Vec<MessageRecord>, sqlx::Error> {
    let query = format!("{MESSAGE_SELECT} WHERE gm.group_id = $1 ORDER BY gm.created_at DESC LIMIT $2");
    let mut messages = sqlx::query_as::<_, MessageRecord>(&query)
        .bind(group_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    messages.reverse();
    Ok(messages)
}

pub async fn get_group_message_meta(
    pool: &PgPool,
    message_id: MessageId,
) -> Result<Option<GroupMessageMeta>, sqlx::Error> {
    let row = sqlx::query("SELECT group_id, sender_id, deleted FROM group_messages WHERE id = $1")
        .bind(message_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| GroupMessageMeta {
        group_id: r.get("group_id"),
        sender_id: r.get("sender_id"),
        deleted: r.get("deleted"),
    }))
}

pub async fn insert_group_message(
    pool: &PgPool,
    group_id: GroupId,
    sender_id: UserId,
    message: &str,
    reply_to_message_id: Option<MessageId>,
) -> Result<MessageId, sqlx::Error> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO group_messages (id, group_id, sender_id, message, reply_to_message_id)
        VALUES ($1, $2, $3, $4, $5)
        "#
    )
    .bind(id)
    .bind(group_id)
    .bind(sender_id)
    .bind(message)
    .bind(reply_to_message_id)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn edit_group_message(pool: &PgPool, message_id: MessageId, message: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE group_messages SET message = $1, edited_at = now() WHERE id = $2")
        .bind(message)
        .bind(message_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn soft_delete_group_message(pool: &PgPool, message_id: MessageId) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE group_messages SET deleted = true WHERE id = $1")
        .bind(message_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Change name and/or description; `None` keeps the current value
pub async fn update_group(
    pool: &PgPool,
    group_id: GroupId,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE group_chats
        SET name = COALESCE($2, name), description = COALESCE($3, description)
        WHERE id = $1
        "#
    )
    .bind(group_id)
    .bind(name)
    .bind(description)
    .execute(pool)
    .await?;
    Ok(())
}

/// Members of a group, oldest membership first
pub async fn get_group_members(pool: &PgPool, group_id: GroupId) -> Result<Vec<GroupMember>, sqlx::Error> {
    sqlx::query_as::<_, GroupMember>(
        r#"
        SELECT u.id, u.username, u.pfp_url, m.joined_at
        FROM group_members m
        JOIN users u ON u.id = m.user_id
        WHERE m.group_id = $1
        ORDER BY m.joined_at ASC
        "#
    )
    .bind(group_id)
    .fetch_all(pool)
    .await
}

/// Add a member; false if they already belonged to the group
pub async fn add_group_member(pool: &PgPool, group_id: GroupId, user_id: UserId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO group_members (group_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(group_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove a member, deleting the group when nobody is left
pub async fn leave_group(pool: &PgPool, group_id: GroupId, user_id: UserId) -> Result<LeaveOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
        .bind(group_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
        > 0;

    let remaining: i64 = sqlx::query("SELECT COUNT(*) AS remaining FROM group_members WHERE group_id = $1")
        .bind(group_id)
        .fetch_one(&mut *tx)
        .await?
        .get("remaining");

    let group_deleted = removed && remaining == 0;
    if group_deleted {
        sqlx::query("DELETE FROM group_chats WHERE id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(LeaveOutcome { removed, group_deleted })
}
