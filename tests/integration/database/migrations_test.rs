//! Database migration tests
//!
//! Tests to ensure migrations run correctly and the chat schema is present.
//! Skipped when `DATABASE_URL` is unset.

#[path = "../../common/mod.rs"]
mod common;

use common::database::TestDatabase;

#[tokio::test]
async fn test_chat_tables_exist() {
    let Some(db) = TestDatabase::connect().await else { return };

    for table in [
        "users",
        "conversations",
        "direct_messages",
        "group_chats",
        "group_members",
        "group_messages",
    ] {
        let result = sqlx::query(&format!("SELECT 1 FROM {table} LIMIT 1"))
            .execute(db.pool())
            .await;
        assert!(result.is_ok(), "{table} table should exist");
    }
}

#[tokio::test]
async fn test_conversation_pair_must_be_ordered() {
    let Some(db) = TestDatabase::connect().await else { return };
    let keys = texting::backend::auth::JwtKeys::new("test-secret", 60);
    let a = db.user(&keys, "order_a").await;
    let b = db.user(&keys, "order_b").await;
    let (low, high) = texting::shared::messaging::participant_pair(a.id, b.id);

    let reversed = sqlx::query("INSERT INTO conversations (id, user1_id, user2_id) VALUES ($1, $2, $3)")
        .bind(uuid::Uuid::new_v4())
        .bind(high)
        .bind(low)
        .execute(db.pool())
        .await;
    assert!(reversed.is_err(), "unordered pair should violate the check constraint");
}
