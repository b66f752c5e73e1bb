// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

//! Gateway tests for both backends.
//!
//! Uses `wiremock` to mock HTTP endpoints so no real LLM servers are needed.

mod helpers;

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use codesonar::config::{Config, Provider};
use codesonar::domain::AnalysisRequest;
use codesonar::error::Error;
use codesonar::services::gateway::AnalysisGateway;
use codesonar::services::gateway::ollama::OllamaGateway;
use codesonar::services::gateway::openai::OpenAiGateway;
use codesonar::services::validator::validate;

use helpers::submission;

// ─── Test helpers ────────────────────────────────────────────────────────────

fn ollama_config(server_url: &str) -> Config {
    Config {
        provider: Provider::Ollama,
        model: "qwen3:4b".into(),
        ollama_host: server_url.to_string(),
        timeout_secs: 5,
        ..Config::default()
    }
}

fn openai_config(server_url: &str) -> Config {
    Config {
        provider: Provider::OpenAI,
        model: "gpt-4o-mini".into(),
        openai_base_url: Some(server_url.to_string()),
        api_key: Some("test-key".into()),
        timeout_secs: 5,
        ..Config::default()
    }
}

fn request() -> AnalysisRequest {
    validate(&submission("print('hello world')", "python")).unwrap()
}

fn cancel() -> CancellationToken {
    CancellationToken::new()
}

/// Ollama wraps model output in the `response` field of its own envelope.
fn ollama_body(model_output: &str) -> serde_json::Value {
    serde_json::json!({ "response": model_output, "done": true })
}

/// OpenAI chat envelope with the model output as the first choice.
fn openai_body(model_output: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": model_output } }]
    })
}

// ─── Ollama: analysis calls ──────────────────────────────────────────────────

#[tokio::test]
async fn ollama_suggestions_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(serde_json::json!({
            "model": "qwen3:4b",
            "stream": false,
            "format": "json"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_body(
            r#"{"suggestions": ["Consider adding a docstring", "Use f-strings"]}"#,
        )))
        .mount(&server)
        .await;

    let gateway = OllamaGateway::new(&ollama_config(&server.uri()));
    let report = gateway.request_suggestions(&request(), cancel()).await.unwrap();

    assert_eq!(
        report.suggestions,
        vec!["Consider adding a docstring", "Use f-strings"]
    );
}

#[tokio::test]
async fn ollama_explanation_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_body(
            r#"{"explanation": "Prints a greeting.", "bugs": [], "vulnerabilities": ["none found"]}"#,
        )))
        .mount(&server)
        .await;

    let gateway = OllamaGateway::new(&ollama_config(&server.uri()));
    let report = gateway.request_explanation(&request(), cancel()).await.unwrap();

    assert_eq!(report.explanation, "Prints a greeting.");
    assert!(report.bugs.is_empty());
    assert_eq!(report.vulnerabilities, vec!["none found"]);
}

#[tokio::test]
async fn ollama_tolerates_code_fences_around_json() {
    let server = MockServer::start().await;

    let fenced = "```json\n{\"suggestions\": [\"split this function\"]}\n```";
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_body(fenced)))
        .mount(&server)
        .await;

    let gateway = OllamaGateway::new(&ollama_config(&server.uri()));
    let report = gateway.request_suggestions(&request(), cancel()).await.unwrap();

    assert_eq!(report.suggestions, vec!["split this function"]);
}

#[tokio::test]
async fn ollama_schema_violation_is_gateway_error() {
    let server = MockServer::start().await;

    // Valid JSON, wrong shape: suggestions must be an array of strings
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ollama_body(r#"{"suggestions": "not a list"}"#)),
        )
        .mount(&server)
        .await;

    let gateway = OllamaGateway::new(&ollama_config(&server.uri()));
    let err = gateway.request_suggestions(&request(), cancel()).await.unwrap_err();

    match err {
        Error::Gateway { call, message } => {
            assert_eq!(call, "suggestions");
            assert!(message.contains("violates schema"), "got: {message}");
        }
        other => panic!("expected Gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn ollama_prose_without_json_is_gateway_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ollama_body("Sure! Here are my thoughts on your code.")),
        )
        .mount(&server)
        .await;

    let gateway = OllamaGateway::new(&ollama_config(&server.uri()));
    let err = gateway.request_explanation(&request(), cancel()).await.unwrap_err();

    match err {
        Error::Gateway { message, .. } => {
            assert!(message.contains("no JSON object"), "got: {message}");
        }
        other => panic!("expected Gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn ollama_http_error_is_gateway_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model exploded"))
        .mount(&server)
        .await;

    let gateway = OllamaGateway::new(&ollama_config(&server.uri()));
    let err = gateway.request_suggestions(&request(), cancel()).await.unwrap_err();

    match err {
        Error::Gateway { message, .. } => {
            assert!(message.contains("HTTP 500"), "got: {message}");
        }
        other => panic!("expected Gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn ollama_connection_refused_maps_to_not_running() {
    // Use a port that is almost certainly not listening
    let gateway = OllamaGateway::new(&ollama_config("http://127.0.0.1:1"));
    let err = gateway.request_suggestions(&request(), cancel()).await.unwrap_err();

    assert!(
        matches!(err, Error::OllamaNotRunning { .. }),
        "expected OllamaNotRunning, got: {err:?}"
    );
}

#[tokio::test]
async fn ollama_timeout_is_gateway_error() {
    let server = MockServer::start().await;

    // Response arrives well after the 1s client timeout
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ollama_body(r#"{"suggestions": []}"#))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = Config {
        timeout_secs: 1,
        ..ollama_config(&server.uri())
    };
    let gateway = OllamaGateway::new(&config);
    let err = gateway.request_suggestions(&request(), cancel()).await.unwrap_err();

    match err {
        Error::Gateway { call, message } => {
            assert_eq!(call, "suggestions");
            assert_eq!(message, "request timed out");
        }
        other => panic!("expected Gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn ollama_cancellation_mid_flight() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ollama_body(r#"{"suggestions": []}"#))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let gateway = OllamaGateway::new(&ollama_config(&server.uri()));
    let err = gateway.request_suggestions(&request(), token).await.unwrap_err();

    assert!(matches!(err, Error::Cancelled), "got: {err:?}");
}

#[tokio::test]
async fn ollama_pre_cancelled_token_short_circuits() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_body("{}")))
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    token.cancel();

    let gateway = OllamaGateway::new(&ollama_config(&server.uri()));
    let err = gateway.request_suggestions(&request(), token).await.unwrap_err();

    assert!(matches!(err, Error::Cancelled), "got: {err:?}");
}

// ─── Ollama: preflight ───────────────────────────────────────────────────────

#[tokio::test]
async fn ollama_health_check_lists_models() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": [
                {"name": "qwen3:4b"},
                {"name": "llama3:8b"}
            ]
        })))
        .mount(&server)
        .await;

    let gateway = OllamaGateway::new(&ollama_config(&server.uri()));
    let models = gateway.health_check().await.unwrap();

    assert_eq!(models.len(), 2);
    assert!(models.contains(&"qwen3:4b".to_string()));
}

#[tokio::test]
async fn ollama_verify_rejects_missing_model() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": [{"name": "llama3:8b"}]
        })))
        .mount(&server)
        .await;

    let gateway = OllamaGateway::new(&ollama_config(&server.uri()));
    let err = gateway.verify().await.unwrap_err();

    match err {
        Error::ModelNotFound { model, available } => {
            assert_eq!(model, "qwen3:4b");
            assert_eq!(available, vec!["llama3:8b"]);
        }
        other => panic!("expected ModelNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn ollama_verify_accepts_latest_tagged_model() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": [{"name": "qwen3:4b:latest"}]
        })))
        .mount(&server)
        .await;

    let gateway = OllamaGateway::new(&ollama_config(&server.uri()));
    assert!(gateway.verify().await.is_ok());
}

// ─── OpenAI ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn openai_suggestions_success_with_bearer_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "stream": false,
            "response_format": {"type": "json_object"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_body(
            r#"{"suggestions": ["Prefer const over let"]}"#,
        )))
        .mount(&server)
        .await;

    let gateway = OpenAiGateway::new(&openai_config(&server.uri()));
    let report = gateway.request_suggestions(&request(), cancel()).await.unwrap();

    assert_eq!(report.suggestions, vec!["Prefer const over let"]);
}

#[tokio::test]
async fn openai_explanation_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_body(
            r#"{"explanation": "A tiny script.", "bugs": ["off-by-one"], "vulnerabilities": []}"#,
        )))
        .mount(&server)
        .await;

    let gateway = OpenAiGateway::new(&openai_config(&server.uri()));
    let report = gateway.request_explanation(&request(), cancel()).await.unwrap();

    assert_eq!(report.explanation, "A tiny script.");
    assert_eq!(report.bugs, vec!["off-by-one"]);
}

#[tokio::test]
async fn openai_empty_choices_is_gateway_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let gateway = OpenAiGateway::new(&openai_config(&server.uri()));
    let err = gateway.request_suggestions(&request(), cancel()).await.unwrap_err();

    match err {
        Error::Gateway { message, .. } => assert_eq!(message, "empty completion"),
        other => panic!("expected Gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn openai_quota_error_is_gateway_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limit exceeded"))
        .mount(&server)
        .await;

    let gateway = OpenAiGateway::new(&openai_config(&server.uri()));
    let err = gateway.request_explanation(&request(), cancel()).await.unwrap_err();

    match err {
        Error::Gateway { call, message } => {
            assert_eq!(call, "explanation");
            assert!(message.contains("HTTP 429"), "got: {message}");
        }
        other => panic!("expected Gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn openai_timeout_is_gateway_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(openai_body(
                    r#"{"explanation": "late", "bugs": [], "vulnerabilities": []}"#,
                ))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = Config {
        timeout_secs: 1,
        ..openai_config(&server.uri())
    };
    let gateway = OpenAiGateway::new(&config);
    let err = gateway.request_explanation(&request(), cancel()).await.unwrap_err();

    match err {
        Error::Gateway { call, message } => {
            assert_eq!(call, "explanation");
            assert_eq!(message, "request timed out");
        }
        other => panic!("expected Gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn openai_verify_rejects_bad_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let gateway = OpenAiGateway::new(&openai_config(&server.uri()));
    let err = gateway.verify().await.unwrap_err();

    match err {
        Error::Gateway { message, .. } => assert_eq!(message, "invalid API key"),
        other => panic!("expected Gateway error, got {other:?}"),
    }
}
