use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use hearth::{
    ProviderError,
    failover::{FailoverRouter, ProviderSpec},
    providers::{ChatAdapter, Completion, ProviderKind},
    server::{HearthState, hearth_router},
};
use hearth_schema::ChatMessage;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use url::Url;

const KEY: &str = "pwd";

#[derive(Debug)]
struct EchoAdapter;

#[async_trait]
impl ChatAdapter for EchoAdapter {
    async fn send_message(
        &self,
        message: &str,
        context: &[ChatMessage],
    ) -> Result<Completion, ProviderError> {
        Ok(Completion {
            text: format!("echo({}): {message}", context.len()),
            tokens_used: 3,
        })
    }
}

fn echo_spec() -> ProviderSpec {
    ProviderSpec {
        name: "OpenAI".to_string(),
        kind: ProviderKind::OpenAi,
        base_url: Url::parse("http://example.test/v1").expect("invalid url"),
        model: "gpt-4".to_string(),
        daily_limit: 100,
        adapter: Arc::new(EchoAdapter),
    }
}

async fn app_with(specs: Vec<ProviderSpec>, api_key: &str) -> Router {
    let router = FailoverRouter::spawn(specs, 20)
        .await
        .expect("spawn router");
    hearth_router(HearthState::new(router, api_key))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-api-key", KEY)
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-api-key", KEY)
        .body(Body::empty())
        .expect("failed to build request")
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn chat_route_answers_and_records_context() {
    let app = app_with(vec![echo_spec()], KEY).await;

    let resp = app
        .clone()
        .oneshot(post_json("/api/chat", r#"{"message":"hello"}"#))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body = json_body(resp).await;
    assert_eq!(body["response"], "echo(0): hello");
    assert_eq!(body["provider"], "OpenAI");
    assert_eq!(body["tokens_used"], 3);
    assert!(body["timestamp"].is_string());

    // Second turn sees the first one as context.
    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/chat",
            r#"{"message":"again","preserveContext":true}"#,
        ))
        .await
        .expect("request failed");
    let body = json_body(resp).await;
    assert_eq!(body["response"], "echo(2): again");

    // Reset, then the next turn starts clean.
    let resp = app
        .clone()
        .oneshot(post_json("/api/reset-conversation", ""))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert!(body["message"].is_string());

    let resp = app
        .oneshot(post_json("/api/chat", r#"{"message":"fresh"}"#))
        .await
        .expect("request failed");
    let body = json_body(resp).await;
    assert_eq!(body["response"], "echo(0): fresh");
}

#[tokio::test]
async fn chat_route_rejects_bad_requests_and_requires_key() {
    let app = app_with(vec![echo_spec()], KEY).await;

    // 1) no key -> 401
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"message":"hi"}"#))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // 2) wrong key via bearer -> 401
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/ai-status")
                .header("authorization", "Bearer nope")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // 3) correct key + invalid JSON -> 400 INVALID_JSON
    let resp = app
        .clone()
        .oneshot(post_json("/api/chat", "not-json"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"]["code"], "INVALID_JSON");

    // 4) missing message -> 400 INVALID_REQUEST
    let resp = app
        .clone()
        .oneshot(post_json("/api/chat", "{}"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"]["code"], "INVALID_REQUEST");

    // 5) blank message -> 400 INVALID_REQUEST
    let resp = app
        .clone()
        .oneshot(post_json("/api/chat", r#"{"message":"  "}"#))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 6) key in query string is accepted
    let resp = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/ai-status?key={KEY}"))
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn chat_without_providers_is_service_unavailable() {
    let app = app_with(Vec::new(), KEY).await;

    let resp = app
        .oneshot(post_json("/api/chat", r#"{"message":"hi"}"#))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(resp).await["error"]["code"], "NO_PROVIDERS");
}

#[tokio::test]
async fn status_route_reports_counters() {
    let app = app_with(vec![echo_spec()], KEY).await;

    let resp = app
        .clone()
        .oneshot(post_json("/api/chat", r#"{"message":"hi"}"#))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(get("/api/ai-status"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["total_providers"], 1);
    assert_eq!(body["available_providers"], 1);
    assert_eq!(body["providers"][0]["name"], "OpenAI");
    assert_eq!(body["providers"][0]["kind"], "openai");
    assert_eq!(body["providers"][0]["messages_used"], 1);
    assert_eq!(body["providers"][0]["daily_limit"], 100);
}

#[tokio::test]
async fn health_is_open_and_unknown_paths_are_404() {
    let app = app_with(Vec::new(), KEY).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "ok");

    let resp = app
        .oneshot(get("/nope"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_api_key_leaves_routes_open() {
    let app = app_with(vec![echo_spec()], "").await;

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/ai-status")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}
