//! Common test utilities and helpers
//!
//! Builds application state over an in-memory audience store so the
//! realtime and HTTP layers can be exercised without PostgreSQL, or over a
//! migrated database when `DATABASE_URL` is set (see `database`).

#![allow(dead_code)]


use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use texting::backend::auth::sessions::create_token;
use texting::backend::realtime::ConnectionHandle;
use texting::backend::routes::create_router;
use texting::backend::server::{AppState, ServerConfig};
use texting::backend::store::{ChatStore, MemoryChatStore};
use texting::backend::ConnectionRegistry;
use texting::shared::messaging::{ConversationId, GroupId, UserId};
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;
use uuid::Uuid;

/// A seeded user plus a valid token for it
pub struct TestUser {
    pub id: UserId,
    pub username: String,
    pub token: String,
}

/// Application state over a shared in-memory store
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryChatStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryChatStore::new());
        let dyn_store: Arc<dyn ChatStore> = store.clone();
        let state = AppState::with_store(ServerConfig::default(), None, dyn_store);
        Self { state, store }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        self.state.notifier.registry()
    }

    /// Seed a user and mint a token for it
    pub fn user(&self, username: &str) -> TestUser {
        let id = Uuid::new_v4();
        self.store.add_user(id, username);
        let token = create_token(&self.state.jwt, id, username).expect("Failed to create test token");
        TestUser {
            id,
            username: username.to_string(),
            token,
        }
    }

    pub fn conversation(&self, a: &TestUser, b: &TestUser) -> ConversationId {
        let conversation_id = Uuid::new_v4();
        self.store.add_conversation(conversation_id, a.id, b.id);
        conversation_id
    }

    pub fn group(&self, members: &[&TestUser]) -> GroupId {
        let group_id = Uuid::new_v4();
        for member in members {
            self.store.add_group_member(group_id, member.id);
        }
        group_id
    }

    /// Wait until `user_id` has a registered connection
    pub async fn wait_connected(&self, user_id: UserId) {
        wait_for(|| self.registry().is_connected(user_id)).await;
    }
}

/// Production state (Postgres store) over a migrated pool
pub fn db_state(pool: &PgPool) -> AppState {
    AppState::new(ServerConfig::default(), Some(pool.clone()))
}

/// Register a channel-backed connection for `user_id`
pub fn listen(state: &AppState, user_id: UserId) -> UnboundedReceiver<String> {
    let (handle, rx) = ConnectionHandle::new(user_id);
    state.notifier.registry().register(handle);
    rx
}

/// Next event queued on `rx`, panicking if none arrives in two seconds
pub async fn next_event(rx: &mut UnboundedReceiver<String>) -> Value {
    let frame = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("no event delivered in time")
        .expect("connection channel closed");
    serde_json::from_str(&frame).expect("frame is JSON")
}

/// Assert nothing further is delivered to `rx`
pub async fn assert_no_event(rx: &mut UnboundedReceiver<String>) {
    tokio::time::sleep(Duration::from_millis(150)).await;
    if let Ok(frame) = rx.try_recv() {
        panic!("unexpected event: {frame}");
    }
}

/// Build a request with an optional bearer token and JSON body
pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("valid request")
}

/// Run one request through a fresh router over `state`
pub async fn call(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_router(state.clone())
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Poll `condition` until it holds, panicking after two seconds
pub async fn wait_for(condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
