//! End-to-end tests for the relay endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use backlog_chat_server::{AppState, ServerConfig, serve};

const MESSAGE_PATH: &str = "/v1/spaces/xxxx/messages";

fn fixture(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

fn create_issue_event() -> Value {
    fixture(include_str!(
        "../../backlog-chat/tests/fixtures/create_issue.event.json"
    ))
}

fn create_issue_message() -> Value {
    fixture(include_str!(
        "../../backlog-chat/tests/fixtures/create_issue.message.json"
    ))
}

/// Start the relay in the background, forwarding to `chat_api`.
async fn start_relay(chat_api: &str) -> SocketAddr {
    let config = ServerConfig::new("https://backlog.com", chat_api);
    let state = Arc::new(AppState::new(config).unwrap());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, state, std::future::pending()));
    addr
}

async fn post_webhook(addr: SocketAddr, query: &str, body: &Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}{MESSAGE_PATH}?{query}"))
        .json(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_issue_is_relayed() {
    let chat = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGE_PATH))
        .and(query_param("key", "foo"))
        .and(query_param("token", "bar"))
        .and(body_json(create_issue_message()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "spaces/xxxx/messages/1"})))
        .expect(1)
        .mount(&chat)
        .await;

    let addr = start_relay(&chat.uri()).await;
    let response = post_webhook(addr, "key=foo&token=bar", &create_issue_event()).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"message": "OK"}));
}

#[tokio::test]
async fn test_unsupported_event_is_acknowledged_without_delivery() {
    let chat = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&chat)
        .await;

    let addr = start_relay(&chat.uri()).await;
    let event = json!({
        "id": 1,
        "type": 8,
        "created": "2017-07-19T11:02:22Z",
        "createdUser": {"id": 1, "name": "John Doe", "roleType": 1},
        "content": {"id": 1, "name": "file.txt"}
    });
    let response = post_webhook(addr, "key=foo&token=bar", &event).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"message": "OK"}));
}

#[tokio::test]
async fn test_unsupported_event_without_credentials_is_acknowledged() {
    let chat = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&chat)
        .await;

    let addr = start_relay(&chat.uri()).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}{MESSAGE_PATH}"))
        .json(&json!({"id": 1, "type": 8, "content": {}}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"message": "OK"}));
}

#[tokio::test]
async fn test_missing_token_is_bad_request() {
    let chat = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&chat)
        .await;

    let addr = start_relay(&chat.uri()).await;
    let response = post_webhook(addr, "key=foo", &create_issue_event()).await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_malformed_payload_is_server_error() {
    let chat = MockServer::start().await;
    let addr = start_relay(&chat.uri()).await;

    let mut event = create_issue_event();
    event["content"]
        .as_object_mut()
        .unwrap()
        .remove("summary");
    let response = post_webhook(addr, "key=foo&token=bar", &event).await;

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "render_error");
}

#[tokio::test]
async fn test_chat_api_failure_is_still_acknowledged() {
    let chat = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&chat)
        .await;

    let addr = start_relay(&chat.uri()).await;
    let response = post_webhook(addr, "key=foo&token=bar", &create_issue_event()).await;

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_unreachable_chat_api_is_bad_gateway() {
    // Bind and drop a listener to get a port nothing listens on.
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_addr = closed.local_addr().unwrap();
    drop(closed);

    let addr = start_relay(&format!("http://{closed_addr}")).await;
    let response = post_webhook(addr, "key=foo&token=bar", &create_issue_event()).await;

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "delivery_error");
}

#[tokio::test]
async fn test_health() {
    let chat = MockServer::start().await;
    let addr = start_relay(&chat.uri()).await;

    let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}
