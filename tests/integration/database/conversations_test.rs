//! Conversation handler tests against PostgreSQL
//!
//! Each test runs the real REST handlers through the router and listens on
//! registered connections for the events they announce. Skipped when
//! `DATABASE_URL` is unset.

#[path = "../../common/mod.rs"]
mod common;

use axum::http::{Method, StatusCode};
use common::database::TestDatabase;
use common::{assert_no_event, call, db_state, listen, next_event, request, TestUser};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use texting::backend::messaging::db::find_or_create_conversation;
use texting::backend::server::AppState;
use uuid::Uuid;

async fn open_conversation(state: &AppState, from: &TestUser, to: &TestUser) -> (Uuid, bool) {
    let (status, body) = call(
        state,
        request(
            Method::POST,
            "/api/conversations",
            Some(&from.token),
            Some(json!({ "recipient_username": to.username })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let id = body["conversation_id"].as_str().expect("conversation id").parse().expect("uuid");
    (id, body["created"].as_bool().expect("created flag"))
}

async fn send(state: &AppState, user: &TestUser, conversation_id: Uuid, body: Value) -> (StatusCode, Value) {
    call(
        state,
        request(
            Method::POST,
            &format!("/api/conversations/{conversation_id}/messages"),
            Some(&user.token),
            Some(body),
        ),
    )
    .await
}

#[tokio::test]
async fn test_conversation_is_created_once_per_pair() {
    let Some(db) = TestDatabase::connect().await else { return };
    let state = db_state(db.pool());
    let alice = db.user(&state.jwt, "alice").await;
    let bob = db.user(&state.jwt, "bob").await;

    let (first, created) = open_conversation(&state, &alice, &bob).await;
    assert!(created);

    let (second, created) = open_conversation(&state, &bob, &alice).await;
    assert_eq!(second, first);
    assert!(!created);

    for (a, b) in [(alice.id, bob.id), (bob.id, alice.id)] {
        let (id, created) = find_or_create_conversation(db.pool(), a, b).await.expect("query");
        assert_eq!(id, first);
        assert!(!created);
    }

    let (status, body) = call(&state, request(Method::GET, "/api/conversations", Some(&bob.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["other_user_id"], alice.id.to_string());
    assert_eq!(listed[0]["username"], alice.username);
}

#[tokio::test]
async fn test_conversation_with_self_or_unknown_user_is_rejected() {
    let Some(db) = TestDatabase::connect().await else { return };
    let state = db_state(db.pool());
    let alice = db.user(&state.jwt, "alice").await;

    let to_self = json!({ "recipient_username": alice.username });
    let (status, _) = call(&state, request(Method::POST, "/api/conversations", Some(&alice.token), Some(to_self))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unknown = json!({ "recipient_username": "nobody_by_this_name" });
    let (status, _) = call(&state, request(Method::POST, "/api/conversations", Some(&alice.token), Some(unknown))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_plain_message_sends_full_record_once() {
    let Some(db) = TestDatabase::connect().await else { return };
    let state = db_state(db.pool());
    let alice = db.user(&state.jwt, "alice").await;
    let bob = db.user(&state.jwt, "bob").await;
    let carol = db.user(&state.jwt, "carol").await;
    let (conversation_id, _) = open_conversation(&state, &alice, &bob).await;

    let mut alice_rx = listen(&state, alice.id);
    let mut bob_rx = listen(&state, bob.id);
    let mut carol_rx = listen(&state, carol.id);

    let (status, body) = send(&state, &alice, conversation_id, json!({ "message": "hello bob" })).await;
    assert_eq!(status, StatusCode::OK);
    let message_id = body["id"].as_str().expect("id").to_string();

    for rx in [&mut alice_rx, &mut bob_rx] {
        let event = next_event(rx).await;
        assert_eq!(event["type"], "new_message");
        assert_eq!(event["conversation_id"], conversation_id.to_string());
        assert_eq!(event["message"]["id"], message_id);
        assert_eq!(event["message"]["message"], "hello bob");
        assert_eq!(event["message"]["username"], alice.username);
        assert_eq!(event["message"]["deleted"], false);
        assert_no_event(rx).await;
    }
    assert_no_event(&mut carol_rx).await;
}

#[tokio::test]
async fn test_reply_sends_reload_messages() {
    let Some(db) = TestDatabase::connect().await else { return };
    let state = db_state(db.pool());
    let alice = db.user(&state.jwt, "alice").await;
    let bob = db.user(&state.jwt, "bob").await;
    let (conversation_id, _) = open_conversation(&state, &alice, &bob).await;

    let (_, first) = send(&state, &alice, conversation_id, json!({ "message": "first" })).await;
    let first_id = first["id"].as_str().expect("id").to_string();

    let mut bob_rx = listen(&state, bob.id);
    let reply = json!({ "message": "a reply", "reply_to_message_id": first_id });
    let (status, _) = send(&state, &bob, conversation_id, reply).await;
    assert_eq!(status, StatusCode::OK);

    let event = next_event(&mut bob_rx).await;
    assert_eq!(event, json!({ "type": "reload_messages", "conversation_id": conversation_id }));
    assert_no_event(&mut bob_rx).await;

    let (status, body) = call(
        &state,
        request(
            Method::GET,
            &format!("/api/conversations/{conversation_id}/messages"),
            Some(&alice.token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = body.as_array().expect("list");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["message"], "first");
    assert_eq!(messages[1]["reply_to_message"], "first");
    assert_eq!(messages[1]["reply_to_username"], alice.username);
}

#[tokio::test]
async fn test_reply_to_foreign_message_is_rejected_without_event() {
    let Some(db) = TestDatabase::connect().await else { return };
    let state = db_state(db.pool());
    let alice = db.user(&state.jwt, "alice").await;
    let bob = db.user(&state.jwt, "bob").await;
    let carol = db.user(&state.jwt, "carol").await;
    let (ab, _) = open_conversation(&state, &alice, &bob).await;
    let (ac, _) = open_conversation(&state, &alice, &carol).await;

    let (_, other) = send(&state, &alice, ac, json!({ "message": "for carol" })).await;

    let mut bob_rx = listen(&state, bob.id);
    let reply = json!({ "message": "wrong thread", "reply_to_message_id": other["id"] });
    let (status, _) = send(&state, &alice, ab, reply).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&state, &carol, ab, json!({ "message": "intruder" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&state, &alice, ab, json!({ "message": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_no_event(&mut bob_rx).await;
}

#[tokio::test]
async fn test_edit_and_delete_are_sender_only() {
    let Some(db) = TestDatabase::connect().await else { return };
    let state = db_state(db.pool());
    let alice = db.user(&state.jwt, "alice").await;
    let bob = db.user(&state.jwt, "bob").await;
    let (conversation_id, _) = open_conversation(&state, &alice, &bob).await;
    let (_, sent) = send(&state, &alice, conversation_id, json!({ "message": "draft" })).await;
    let message_id = sent["id"].as_str().expect("id").to_string();
    let uri = format!("/api/messages/{message_id}");

    let mut bob_rx = listen(&state, bob.id);

    let edit = json!({ "message": "final" });
    let (status, _) = call(&state, request(Method::PUT, &uri, Some(&bob.token), Some(edit.clone()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&state, request(Method::PUT, &uri, Some(&alice.token), Some(edit.clone()))).await;
    assert_eq!(status, StatusCode::OK);
    let event = next_event(&mut bob_rx).await;
    assert_eq!(event["type"], "message_edited");
    assert_eq!(event["message_id"], message_id);

    let (status, _) = call(&state, request(Method::DELETE, &uri, Some(&alice.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let event = next_event(&mut bob_rx).await;
    assert_eq!(event["type"], "message_deleted");
    assert_eq!(event["conversation_id"], conversation_id.to_string());

    let (status, _) = call(&state, request(Method::PUT, &uri, Some(&alice.token), Some(edit))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_no_event(&mut bob_rx).await;
}

#[tokio::test]
async fn test_deleted_conversation_notifies_both_participants() {
    let Some(db) = TestDatabase::connect().await else { return };
    let state = db_state(db.pool());
    let alice = db.user(&state.jwt, "alice").await;
    let bob = db.user(&state.jwt, "bob").await;
    let (conversation_id, _) = open_conversation(&state, &alice, &bob).await;
    send(&state, &alice, conversation_id, json!({ "message": "soon gone" })).await;

    let mut alice_rx = listen(&state, alice.id);
    let mut bob_rx = listen(&state, bob.id);

    let uri = format!("/api/conversations/{conversation_id}");
    let (status, _) = call(&state, request(Method::DELETE, &uri, Some(&bob.token), None)).await;
    assert_eq!(status, StatusCode::OK);

    for rx in [&mut alice_rx, &mut bob_rx] {
        let event = next_event(rx).await;
        assert_eq!(event, json!({ "type": "conversation_deleted", "conversation_id": conversation_id }));
        assert_no_event(rx).await;
    }

    let messages_uri = format!("/api/conversations/{conversation_id}/messages");
    let (status, _) = call(&state, request(Method::GET, &messages_uri, Some(&alice.token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM direct_messages WHERE conversation_id = $1")
        .bind(conversation_id)
        .fetch_one(db.pool())
        .await
        .expect("count");
    assert_eq!(remaining, 0);
}
