//! HTTP integration tests for the remote event receiver endpoint.
//!
//! Drives the full axum router against the in-memory platform backend.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use rer_server::api::{create_router, AppState};
use rer_server::config::Config;
use rer_server::platform::memory::MemoryPlatform;

fn test_app(platform: &MemoryPlatform) -> Router {
    create_router(AppState::new(platform.clone(), Config::default_for_test()))
}

/// POST a JSON event and return the response status and body.
async fn post_json(app: Router, path: &str, body: &Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header(header::HOST, "rer.example")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request build"),
        )
        .await
        .expect("request send");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collect")
        .to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

fn install_event() -> Value {
    json!({
        "event_type": "app_installed",
        "context_token": "token",
        "web_url": "https://tenant.example/site"
    })
}

fn uninstall_event() -> Value {
    json!({
        "event_type": "app_uninstalling",
        "context_token": "token"
    })
}

fn item_event(list_id: Uuid, item_id: i64) -> Value {
    json!({
        "event_type": "item_added",
        "context_token": "token",
        "item_event_properties": {
            "list_id": list_id,
            "list_item_id": item_id
        }
    })
}

#[tokio::test]
async fn install_registers_subscription_bound_to_request_url() {
    let platform = MemoryPlatform::new();
    let list_id = platform.create_list("Announcements");

    let (status, body) = post_json(test_app(&platform), "/events/process", &install_event()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "continue" }));

    let subs = platform.subscriptions(list_id);
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].name, "ItemAddedEvent");
    assert_eq!(subs[0].callback_url, "http://rer.example/events/process");
}

#[tokio::test]
async fn repeated_install_leaves_count_unchanged() {
    let platform = MemoryPlatform::new();
    let list_id = platform.create_list("Announcements");

    for _ in 0..2 {
        let (status, _) =
            post_json(test_app(&platform), "/events/process", &install_event()).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(platform.subscriptions(list_id).len(), 1);
}

#[tokio::test]
async fn install_commit_failure_is_a_server_fault() {
    let platform = MemoryPlatform::new();
    platform.create_list("Announcements");
    platform.fail_next_commit();

    let (status, _) = post_json(test_app(&platform), "/events/process", &install_event()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn install_without_session_reports_success() {
    let platform = MemoryPlatform::new();
    let list_id = platform.create_list("Announcements");
    platform.deny_sessions();

    let (status, _) = post_json(test_app(&platform), "/events/process", &install_event()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(platform.subscriptions(list_id).is_empty());
}

#[tokio::test]
async fn uninstall_succeeds_with_and_without_subscription() {
    let platform = MemoryPlatform::new();
    let list_id = platform.create_list("Announcements");

    // Absent subscription
    let (status, _) = post_json(test_app(&platform), "/events/process", &uninstall_event()).await;
    assert_eq!(status, StatusCode::OK);

    // Present subscription
    post_json(test_app(&platform), "/events/process", &install_event()).await;
    assert_eq!(platform.subscriptions(list_id).len(), 1);
    let (status, _) = post_json(test_app(&platform), "/events/process", &uninstall_event()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(platform.subscriptions(list_id).is_empty());
}

#[tokio::test]
async fn uninstall_failure_is_swallowed() {
    let platform = MemoryPlatform::new();
    // No target list at all; the handler errors internally
    let (status, _) = post_json(test_app(&platform), "/events/process", &uninstall_event()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn item_added_appends_audit_line() {
    let platform = MemoryPlatform::new();
    let list_id = platform.create_list("Photos");
    platform.insert_item(list_id, 42, "Hello");

    let (status, _) = post_json(
        test_app(&platform),
        "/events/process",
        &item_event(list_id, 42),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let title = platform.item_title(list_id, 42).expect("item exists");
    assert!(
        title.starts_with("Hello\nUpdated by RER "),
        "unexpected title: {title:?}"
    );

    // Second trigger appends again
    post_json(
        test_app(&platform),
        "/events/process",
        &item_event(list_id, 42),
    )
    .await;
    let title = platform.item_title(list_id, 42).expect("item exists");
    assert_eq!(title.matches("Updated by RER").count(), 2);
}

#[tokio::test]
async fn item_added_for_missing_item_reports_success() {
    let platform = MemoryPlatform::new();
    let list_id = platform.create_list("Photos");

    let (status, _) = post_json(
        test_app(&platform),
        "/events/process",
        &item_event(list_id, 404),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_event_kind_is_a_noop() {
    let platform = MemoryPlatform::new();
    let list_id = platform.create_list("Announcements");

    let (status, body) = post_json(
        test_app(&platform),
        "/events/process",
        &json!({ "event_type": "web_provisioned" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "continue" }));
    assert!(platform.subscriptions(list_id).is_empty());
}

#[tokio::test]
async fn one_way_endpoint_is_not_implemented() {
    let platform = MemoryPlatform::new();

    let (status, _) = post_json(
        test_app(&platform),
        "/events/process-oneway",
        &install_event(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn health_check_responds() {
    let platform = MemoryPlatform::new();
    let response = test_app(&platform)
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request build"),
        )
        .await
        .expect("request send");
    assert_eq!(response.status(), StatusCode::OK);
}
