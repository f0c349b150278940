//! Postgres implementation of the audience reads

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::{ChatStore, StoreError};
use crate::shared::messaging::{ConversationId, GroupId, UserId};

/// `ChatStore` over the application's connection pool
#[derive(Clone)]
pub struct PgChatStore {
    pool: PgPool,
}

impl PgChatStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn username(&self, user_id: UserId) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT username FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("username")))
    }

    async fn conversation_participants(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<(UserId, UserId)>, StoreError> {
        let row = sqlx::query("SELECT user1_id, user2_id FROM conversations WHERE id = $1")
            .bind(conversation_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| (r.get("user1_id"), r.get("user2_id"))))
    }

    async fn group_member_ids(&self, group_id: GroupId) -> Result<Vec<UserId>, StoreError> {
        let rows = sqlx::query("SELECT user_id FROM group_members WHERE group_id = $1")
            .bind(group_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|r| r.get("user_id")).collect())
    }
}
