//! GeminiClient against a local mock of the generateContent endpoint

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use codecraft::app::config::GenerationSettings;
use codecraft::app::generation::{
    clean_generated_markup, GeminiClient, GenerationClient, GenerationError,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const MODEL: &str = "gemini-test";

#[derive(Clone)]
struct MockGemini {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

async fn generate_content(
    State(mock): State<MockGemini>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    mock.seen
        .lock()
        .expect("mock state poisoned")
        .push((call, api_key, body));
    (mock.status, Json(mock.reply.clone()))
}

/// Serve one canned reply and return the endpoint plus the request log
async fn start_mock(status: StatusCode, reply: Value) -> (String, MockGemini) {
    let mock = MockGemini {
        status,
        reply,
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/v1beta/models/:call", post(generate_content))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("mock server address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server failed");
    });

    (format!("http://{}", addr), mock)
}

fn settings(endpoint: &str, api_key: Option<&str>) -> GenerationSettings {
    GenerationSettings {
        endpoint: endpoint.to_string(),
        model: MODEL.to_string(),
        api_key: api_key.map(str::to_string),
        request_timeout_secs: 5,
        ..Default::default()
    }
}

fn text_reply(text: &str) -> Value {
    json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    })
}

#[tokio::test]
async fn test_generate_returns_candidate_text() {
    let (endpoint, mock) = start_mock(StatusCode::OK, text_reply("```html\n<h1>Hi</h1>\n```")).await;
    let client = GeminiClient::new(&settings(&endpoint, Some("test-key"))).expect("client");

    let raw = client.generate("a greeting").await.expect("generation");

    assert_eq!(raw, "```html\n<h1>Hi</h1>\n```");
    assert_eq!(clean_generated_markup(&raw).expect("markup"), "\n<h1>Hi</h1>\n");

    let seen = mock.seen.lock().expect("mock state poisoned");
    assert_eq!(seen.len(), 1);
    let (call, api_key, body) = &seen[0];
    assert_eq!(call, "gemini-test:generateContent");
    assert_eq!(api_key.as_deref(), Some("test-key"));
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "a greeting");
    assert!(body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .is_some_and(|text| !text.is_empty()));
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (endpoint, _mock) = start_mock(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": { "message": "backend unavailable" } }),
    )
    .await;
    let client = GeminiClient::new(&settings(&endpoint, Some("test-key"))).expect("client");

    let result = client.generate("anything").await;

    match result {
        Err(GenerationError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("backend unavailable"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_api_key_sends_nothing() {
    let (endpoint, mock) = start_mock(StatusCode::OK, text_reply("<p>x</p>")).await;
    let client = GeminiClient::new(&settings(&endpoint, None)).expect("client");

    let result = client.generate("anything").await;

    assert!(matches!(result, Err(GenerationError::MissingApiKey)));
    assert!(mock.seen.lock().expect("mock state poisoned").is_empty());
}

#[tokio::test]
async fn test_no_candidates_is_empty_response() {
    let (endpoint, _mock) = start_mock(StatusCode::OK, json!({ "candidates": [] })).await;
    let client = GeminiClient::new(&settings(&endpoint, Some("test-key"))).expect("client");

    let result = client.generate("anything").await;

    assert!(matches!(result, Err(GenerationError::EmptyResponse)));
}

#[test]
fn test_invalid_endpoint_rejected_at_construction() {
    let result = GeminiClient::new(&settings("not a url", Some("k")));

    assert!(matches!(result, Err(GenerationError::Endpoint(_))));
}
