use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokenscope_engine::{
    ProviderError, TokenQuery, TokenResult, TokenizerProvider, WhitespaceTokenizer,
};
use tokenscope_server::{build_router, AppState, HEALTH_PATH};
use tower::ServiceExt;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// Provider that always fails the way a crashing tokenizer would.
struct FailingProvider {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl TokenizerProvider for FailingProvider {
    async fn count(&self, _query: &TokenQuery) -> Result<TokenResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Reported("model not loaded".into()))
    }
}

fn post_json(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/count-tokens")
        .header("Content-Type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn builtin_state() -> AppState {
    AppState::new(Arc::new(WhitespaceTokenizer))
}

#[tokio::test]
async fn counts_tokens_with_visualization() {
    init_logging();
    let body = json!({
        "text": "ab cd",
        "provider": "llama",
        "model": "llama-3.2-90b",
        "visualize": true
    });

    let (status, body) = send(builtin_state(), post_json(body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokenCount"], json!(2));
    assert_eq!(body["price"].as_f64(), Some(0.000004));
    assert_eq!(
        body["visualization"],
        json!({
            "text": "ab cd",
            "tokenIds": [0, 1],
            "tokens": ["ab", "cd"],
            "charToToken": [0, 0, 1, 1]
        })
    );
}

#[tokio::test]
async fn omits_visualization_unless_requested() {
    init_logging();
    let body = json!({
        "text": "hello there world",
        "provider": "mistral",
        "model": "mistral-large-2"
    });

    let (status, body) = send(builtin_state(), post_json(body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokenCount"], json!(3));
    assert!(body.get("visualization").is_none());
}

#[tokio::test]
async fn missing_fields_are_rejected_without_calling_the_tokenizer() {
    init_logging();
    let provider = Arc::new(FailingProvider {
        calls: AtomicUsize::new(0),
    });
    let state = AppState::new(provider.clone());
    let body = json!({ "text": "hello", "provider": "" });

    let (status, body) = send(state, post_json(body.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "text, provider and model are required (missing: provider, model)" })
    );
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    init_logging();
    let (status, body) = send(builtin_state(), post_json("{\"text\": ")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("invalid request body"), "{message}");
}

#[tokio::test]
async fn tokenizer_failure_is_a_server_error() {
    init_logging();
    let state = AppState::new(Arc::new(FailingProvider {
        calls: AtomicUsize::new(0),
    }));
    let body = json!({
        "text": "hello",
        "provider": "cohere",
        "model": "command-r"
    });

    let (status, body) = send(state, post_json(body.to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "model not loaded" }));
}

#[tokio::test]
async fn health_reports_ok() {
    init_logging();
    let request = Request::builder()
        .uri(HEALTH_PATH)
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(builtin_state(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}
