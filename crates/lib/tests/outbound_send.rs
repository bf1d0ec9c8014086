//! Integration test: the Send API client against a local mock of the Graph API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use messenger_bot::{Bot, Credentials, Identity, SendError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Requests the mock platform received: (query, body).
type Captured = Arc<Mutex<Vec<(HashMap<String, String>, Value)>>>;

async fn messages_ok(
    State(captured): State<Captured>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let recipient = body["recipient"]["id"].as_str().unwrap_or("").to_string();
    captured.lock().unwrap().push((query, body));
    Json(json!({ "recipient_id": recipient, "message_id": "mid.1" }))
}

async fn messages_rejected() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": {
            "message": "Invalid OAuth access token.",
            "type": "OAuthException",
            "code": 190
        } })),
    )
}

async fn messages_error_in_200() -> Json<Value> {
    Json(json!({ "error": { "message": "(#100) No matching user found", "code": 100 } }))
}

async fn profile(
    Path(user_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if query.get("access_token").map(String::as_str) != Some("T1") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": { "message": "bad token" } })));
    }
    let fields = query.get("fields").cloned().unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "first_name": format!("First {}", user_id),
            "last_name": "Last",
            "timezone": -7,
            "fields_requested": fields
        })),
    )
}

/// Serve `app` on a local port and return its base URL.
async fn start_mock(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local port");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}/v2.6", addr)
}

fn bot(api_base: &str) -> Bot {
    Bot::new(Credentials::new("V1", "T1").expect("credentials")).with_api_base(api_base)
}

#[tokio::test]
async fn send_posts_recipient_and_text_with_access_token() {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/v2.6/me/messages", post(messages_ok))
        .with_state(captured.clone());
    let base = start_mock(app).await;

    let reply = bot(&base)
        .send(&Identity::new("u1"), "hello back")
        .await
        .expect("send");
    assert_eq!(reply.recipient_id.as_deref(), Some("u1"));
    assert_eq!(reply.message_id.as_deref(), Some("mid.1"));

    let captured = captured.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    let (query, body) = &captured[0];
    assert_eq!(query.get("access_token").map(String::as_str), Some("T1"));
    assert_eq!(
        body,
        &json!({ "recipient": { "id": "u1" }, "message": { "text": "hello back" } })
    );
}

#[tokio::test]
async fn platform_error_status_is_surfaced() {
    let app = Router::new().route("/v2.6/me/messages", post(messages_rejected));
    let base = start_mock(app).await;

    let err = bot(&base)
        .send(&Identity::new("u1"), "hi")
        .await
        .expect_err("send should fail");
    match err {
        SendError::Platform { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid OAuth access token. (code 190)");
        }
        other => panic!("expected platform error, got {:?}", other),
    }
}

#[tokio::test]
async fn error_object_in_success_reply_is_a_failure() {
    let app = Router::new().route("/v2.6/me/messages", post(messages_error_in_200));
    let base = start_mock(app).await;

    let err = bot(&base)
        .send(&Identity::new("nobody"), "hi")
        .await
        .expect_err("send should fail");
    assert!(matches!(err, SendError::Platform { status: 200, .. }));
}

#[tokio::test]
async fn unreachable_platform_is_transport_error_without_token() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    drop(listener);

    let err = bot(&format!("http://{}", addr))
        .send(&Identity::new("u1"), "hi")
        .await
        .expect_err("send should fail");
    assert!(matches!(err, SendError::Transport(_)));
    assert!(!err.to_string().contains("T1"));
}

#[tokio::test]
async fn get_profile_reads_fields() {
    let app = Router::new().route("/v2.6/:user_id", get(profile));
    let base = start_mock(app).await;

    let profile = bot(&base)
        .client()
        .get_profile("u42")
        .await
        .expect("profile");
    assert_eq!(profile.first_name.as_deref(), Some("First u42"));
    assert_eq!(profile.last_name.as_deref(), Some("Last"));
    assert_eq!(profile.timezone, Some(-7.0));
    assert_eq!(profile.gender, None);
}
