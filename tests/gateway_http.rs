//! End-to-end tests against the axum router

use std::sync::Arc;

use a2a_gateway::{
    config::GatewayConfig,
    layer::UserAgentLayer,
    protocol::AgentDescriptor,
    provider::{HttpProvider, PayloadFormat, ProviderConfig, ProviderRegistry},
    server::GatewayServer,
    service::TaskDispatcher,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{
    matchers::{body_json, body_string, header, header_exists, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn placeholder_router() -> Router {
    GatewayServer::new(TaskDispatcher::placeholder(), AgentDescriptor::default()).router()
}

fn wiremock_router(server: &MockServer, format: PayloadFormat, route: &str) -> Router {
    let config = ProviderConfig::new("mock", format!("{}{}", server.uri(), route))
        .with_model("test-model")
        .with_token("sk-test")
        .with_format(format);
    let registry = ProviderRegistry::new(vec![config], None, None).unwrap();
    let provider = HttpProvider::http(UserAgentLayer::fixed("gateway-test/1.0"));
    let dispatcher = TaskDispatcher::new(Arc::new(provider), registry)
        .with_legacy_preprocessor("compact-json".parse().unwrap());

    GatewayServer::new(dispatcher, AgentDescriptor::default()).router()
}

async fn post_rpc(router: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

fn tasks_send(id: Value, text: &str) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tasks/send",
        "params": {"message": {"parts": [{"type": "text", "text": text}]}}
    })
    .to_string()
}

#[tokio::test]
async fn test_hi_scenario() {
    let (status, body) = post_rpc(placeholder_router(), tasks_send(json!("abc"), "hi")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], "abc");
    assert_eq!(body["result"]["status"]["state"], "completed");
    assert_eq!(body["result"]["artifacts"][0]["parts"][0]["text"], "Processed: hi");
    assert_eq!(body["result"]["artifacts"][0]["index"], 0);
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_invalid_request_is_400() {
    let body = json!({"jsonrpc": "1.0", "id": 3, "method": "tasks/send", "params": {}});

    let (status, body) = post_rpc(placeholder_router(), body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["id"], 3);
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(body["error"]["message"], "Invalid Request");
}

#[tokio::test]
async fn test_missing_params_keeps_null_id() {
    let body = json!({"jsonrpc": "2.0", "method": "tasks/send"});

    let (status, body) = post_rpc(placeholder_router(), body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["id"].is_null());
    assert_eq!(body["error"]["code"], -32600);
}

#[tokio::test]
async fn test_unknown_method_is_400() {
    let body = json!({"jsonrpc": "2.0", "id": "x", "method": "tasks/cancel", "params": {}});

    let (status, body) = post_rpc(placeholder_router(), body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["id"], "x");
    assert_eq!(body["error"]["code"], -32601);
    assert_eq!(body["error"]["message"], "Method not found");
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let (status, body) = post_rpc(placeholder_router(), "hello?").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["id"].is_null());
    assert_eq!(body["error"]["code"], -32700);
}

#[tokio::test]
async fn test_descriptor_is_stable() {
    let descriptor = AgentDescriptor::new("Test Gateway", "for tests", "http://gw.test");
    let router =
        GatewayServer::new(TaskDispatcher::placeholder(), descriptor.clone()).router();

    let (status, first) = get(router.clone(), "/.well-known/agent.json").await;
    let (_, second) = get(router, "/.well-known/agent.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    let served: AgentDescriptor = serde_json::from_slice(&first).unwrap();
    assert_eq!(served, descriptor);
}

#[tokio::test]
async fn test_legacy_path_in_placeholder_mode() {
    let (status, body) = get(placeholder_router(), "/api/ai").await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], r#"Processed: {"message":"Hello from WASM!"}"#);
}

#[tokio::test]
async fn test_router_from_default_config() {
    let config = GatewayConfig::from_lookup(|_| None).unwrap();
    let router = GatewayServer::from_config(&config).unwrap().router();

    let (status, body) = post_rpc(router, tasks_send(json!(1), "cfg")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["artifacts"][0]["parts"][0]["text"], "Processed: cfg");
}

#[tokio::test]
async fn test_tasks_send_through_chat_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("user-agent", "gateway-test/1.0"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "model": "test-model",
            "messages": [{"role": "user", "content": "hi"}],
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello there"}}],
            "usage": {"prompt_tokens": 1, "completion_tokens": 2, "total_tokens": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let router = wiremock_router(&server, PayloadFormat::Chat, "/v1/chat/completions");
    let (status, body) = post_rpc(router, tasks_send(json!(11), "hi")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 11);
    assert_eq!(body["result"]["artifacts"][0]["parts"][0]["text"], "Hello there");
}

#[tokio::test]
async fn test_upstream_failure_is_rpc_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let router = wiremock_router(&server, PayloadFormat::Chat, "/v1/chat/completions");
    let (status, body) = post_rpc(router, tasks_send(json!("r"), "hi")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "r");
    assert!(body.get("result").is_none());
    assert_eq!(body["error"]["code"], -32000);
    assert_eq!(body["error"]["message"], "Failed to fetch data from AI API");
    assert_eq!(body["error"]["data"]["status"]["state"], "failed");
}

#[tokio::test]
async fn test_legacy_path_forwards_compact_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ai"))
        .and(header_exists("user-agent"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"message":"Hello from WASM!"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "hi from upstream"})))
        .expect(1)
        .mount(&server)
        .await;

    let router = wiremock_router(&server, PayloadFormat::Message, "/ai");
    let (status, body) = get(router, "/api/ai").await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"reply": "hi from upstream"}));
}

#[tokio::test]
async fn test_legacy_path_failure_is_500() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let router = wiremock_router(&server, PayloadFormat::Message, "/ai");
    let (status, body) = get(router, "/api/ai").await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to fetch data from AI API"}));
}
