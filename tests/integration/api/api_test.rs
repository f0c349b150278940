//! HTTP surface tests
//!
//! Drives the router with `tower::ServiceExt::oneshot`; no database is
//! configured, so every endpoint that needs one answers 503.

#[path = "../../common/mod.rs"]
mod common;

use axum::http::{Method, StatusCode};
use common::{call, listen, request, TestApp};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_health_reports_connected_users() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let _rx = listen(&app.state, alice.id);

    let (status, body) = call(&app.state, request(Method::GET, "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "connections": 1 }));
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new();
    let group_id = Uuid::new_v4();

    for uri in [
        "/api/auth/me".to_string(),
        "/api/conversations".to_string(),
        "/api/groups".to_string(),
        format!("/api/groups/{group_id}/members"),
    ] {
        let (status, body) = call(&app.state, request(Method::GET, &uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["status"], 401);
    }
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = TestApp::new();
    let (status, _) = call(
        &app.state,
        request(Method::GET, "/api/conversations", Some("garbage"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_without_database_is_unavailable() {
    let app = TestApp::new();
    let alice = app.user("alice");

    let (status, body) = call(
        &app.state,
        request(Method::GET, "/api/conversations", Some(&alice.token), None),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Database not configured");
}

#[tokio::test]
async fn test_login_without_database_is_unavailable() {
    let app = TestApp::new();
    let body = json!({ "username": "alice", "password": "password123" });
    let (status, _) = call(&app.state, request(Method::POST, "/api/auth/login", None, Some(body))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new();
    let (status, body) = call(&app.state, request(Method::GET, "/api/nope", None, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not Found", "status": 404 }));
}
