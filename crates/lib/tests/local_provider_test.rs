//! # Ollama Backend Tests
//!
//! Verifies the `/api/generate` wire contract and the mapping of failures
//! (missing model, upstream errors, unreachable server, timeouts) against a
//! mock HTTP server.

use docextract::providers::ai::local::{OllamaBackend, DEFAULT_NUM_CTX};
use docextract::{CompletionBackend, ExtractError, GenerationOptions};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer, timeout: Duration) -> OllamaBackend {
    OllamaBackend::new(&server.uri(), "llama3.1:latest".to_string(), timeout)
        .expect("client should build")
}

#[tokio::test]
async fn test_successful_generation_sends_non_streaming_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llama3.1:latest",
            "prompt": "Extract the timeline.",
            "stream": false,
            "options": { "temperature": 0.0, "num_ctx": DEFAULT_NUM_CTX }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.1:latest",
            "response": "  Timeline: 09/2023-06/2024 (Fall)\n",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, Duration::from_secs(5));
    let result = backend
        .complete("Extract the timeline.", &GenerationOptions::deterministic())
        .await
        .expect("generation should succeed");

    assert_eq!(result, "Timeline: 09/2023-06/2024 (Fall)");
}

#[tokio::test]
async fn test_top_p_and_context_window_are_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" })))
        .mount(&server)
        .await;

    let backend = backend_for(&server, Duration::from_secs(5));
    let options = GenerationOptions {
        temperature: 0.0,
        top_p: 0.05,
        num_ctx: Some(8192),
    };
    backend.complete("p", &options).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["stream"], json!(false));
    assert_eq!(body["options"]["num_ctx"], json!(8192));
    let top_p = body["options"]["top_p"].as_f64().unwrap();
    assert!((top_p - 0.05).abs() < 1e-6);
}

#[tokio::test]
async fn test_missing_response_field_reads_as_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "done": true })))
        .mount(&server)
        .await;

    let backend = backend_for(&server, Duration::from_secs(5));
    let result = backend
        .complete("p", &GenerationOptions::deterministic())
        .await
        .unwrap();
    assert_eq!(result, "");
}

#[tokio::test]
async fn test_model_not_found_is_detected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "model 'llama3.1:latest' not found, try pulling it first"
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server, Duration::from_secs(5));
    let result = backend
        .complete("p", &GenerationOptions::deterministic())
        .await;

    match result {
        Err(ExtractError::ModelNotFound { model, detail }) => {
            assert_eq!(model, "llama3.1:latest");
            assert_eq!(
                detail,
                "model 'llama3.1:latest' not found, try pulling it first"
            );
        }
        other => panic!("expected ModelNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_other_error_status_is_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "out of memory" })),
        )
        .mount(&server)
        .await;

    let backend = backend_for(&server, Duration::from_secs(5));
    let result = backend
        .complete("p", &GenerationOptions::deterministic())
        .await;

    match result {
        Err(ExtractError::UpstreamFailure { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "out of memory");
        }
        other => panic!("expected UpstreamFailure, got {other:?}"),
    }
}

/// Any status other than 200 is a failure, including other 2xx codes.
#[tokio::test]
async fn test_non_200_success_status_is_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(202).set_body_string("accepted"))
        .mount(&server)
        .await;

    let backend = backend_for(&server, Duration::from_secs(5));
    let result = backend
        .complete("p", &GenerationOptions::deterministic())
        .await;
    assert!(matches!(
        result,
        Err(ExtractError::UpstreamFailure { status: 202, .. })
    ));
}

#[tokio::test]
async fn test_unreachable_server_is_connection_failure() {
    // Bind and immediately release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let backend = OllamaBackend::new(
        &format!("http://127.0.0.1:{port}"),
        "llama3.1:latest".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();
    let result = backend
        .complete("p", &GenerationOptions::deterministic())
        .await;

    let err = result.expect_err("nothing is listening");
    assert!(
        matches!(err, ExtractError::ConnectionFailure { .. }),
        "got {err:?}"
    );
    assert!(err.hint().unwrap().contains("Ollama"));
}

#[tokio::test]
async fn test_slow_server_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": "late" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let backend = backend_for(&server, Duration::from_millis(200));
    let result = backend
        .complete("p", &GenerationOptions::deterministic())
        .await;

    assert!(matches!(result, Err(ExtractError::Timeout(d)) if d == Duration::from_millis(200)));
}
