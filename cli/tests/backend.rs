//! # Causeur Inference Backend Integration Tests
//!
//! File: cli/tests/backend.rs
//!
//! ## Overview
//!
//! Runs the real HTTP backends against an in-process axum server that plays
//! the hosted inference endpoint: single-shot JSON answers, server-sent event
//! streams, error statuses and a closed port.
//!

mod common;
use common::*;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use causeur::bot::backend::{connect, GenerationError, GenerationRequest};
use causeur::bot::dispatcher::{Dispatcher, NETWORK_MESSAGE};
use causeur::bot::postprocess::ReplyLimits;
use causeur::bot::ReplySource;
use causeur::core::config::BackendSettings;
use serde_json::{json, Value};

const TOKEN: &str = "hf_test_token";

fn request(streaming: bool) -> GenerationRequest {
    GenerationRequest {
        prompt: "<s>[INST] Quelle est la capitale de la France ? [/INST]".to_string(),
        max_new_tokens: 150,
        temperature: 0.5,
        streaming,
        stop: vec!["</s>".to_string()],
    }
}

fn settings(endpoint: &str, streaming: bool) -> BackendSettings {
    BackendSettings {
        endpoint: endpoint.to_string(),
        model: "org/test-model".to_string(),
        timeout_secs: 5,
        streaming,
        ..Default::default()
    }
}

/// Answers like the hosted endpoint, after checking auth and the payload.
async fn inference(
    Path((org, model)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "missing token").into_response();
    }
    if org != "org" || model != "test-model" {
        return (StatusCode::NOT_FOUND, "unknown model").into_response();
    }
    assert_eq!(body["parameters"]["max_new_tokens"], 150);
    assert_eq!(body["parameters"]["return_full_text"], false);
    assert_eq!(body["parameters"]["stop"], json!(["</s>"]));

    if body["stream"] == json!(true) {
        let events = concat!(
            ": keep-alive\n\n",
            "data: {\"token\": {\"text\": \"Paris\"}}\n\n",
            "data: {\"token\": {\"text\": \" est la\"}}\n\n",
            "data: {\"token\": {\"text\": \" capitale.\"}}\n\n",
            "data: {\"token\": {\"text\": \"</s>\"}}\n\n",
            "data: [DONE]\n\n",
        );
        ([("content-type", "text/event-stream")], events).into_response()
    } else {
        Json(json!([{ "generated_text": " Paris est la capitale de la France." }]))
            .into_response()
    }
}

async fn mock_endpoint() -> String {
    spawn_endpoint(Router::new().route("/models/{org}/{model}", post(inference))).await
}

#[tokio::test]
async fn single_shot_returns_generated_text() {
    let base = mock_endpoint().await;
    let backend = connect(&settings(&base, false), TOKEN).unwrap();

    let text = backend.generate(&request(false)).await.unwrap();
    assert_eq!(text, " Paris est la capitale de la France.");
}

#[tokio::test]
async fn streaming_concatenates_fragments_in_order() {
    let base = mock_endpoint().await;
    let backend = connect(&settings(&base, true), TOKEN).unwrap();
    assert!(backend.streams());

    let text = backend.generate(&request(true)).await.unwrap();
    assert_eq!(text, "Paris est la capitale.</s>");
}

#[tokio::test]
async fn streamed_answer_is_cleaned_by_dispatcher() {
    let base = mock_endpoint().await;
    let backend_settings = settings(&base, true);
    let backend = connect(&backend_settings, TOKEN).unwrap();
    let dispatcher = Dispatcher::new(backend, &backend_settings, ReplyLimits::default());

    let reply = dispatcher.generate("Quelle est la capitale de la France ?").await;
    assert_eq!(reply.source, ReplySource::Generated);
    assert_eq!(reply.text, "Paris est la capitale.");
}

#[tokio::test]
async fn wrong_token_is_a_server_error() {
    let base = mock_endpoint().await;
    let backend = connect(&settings(&base, false), "hf_wrong").unwrap();

    match backend.generate(&request(false)).await {
        Err(GenerationError::Server { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("missing token"));
        }
        other => panic!("expected a server error, got {:?}", other),
    }
}

#[tokio::test]
async fn error_status_is_a_server_error() {
    let router = Router::new().route(
        "/models/{org}/{model}",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "Model is currently loading") }),
    );
    let base = spawn_endpoint(router).await;
    let backend = connect(&settings(&base, false), TOKEN).unwrap();

    let err = backend.generate(&request(false)).await.unwrap_err();
    assert!(matches!(err, GenerationError::Server { status: 503, .. }));
}

#[tokio::test]
async fn unexpected_body_is_malformed() {
    let router = Router::new().route(
        "/models/{org}/{model}",
        post(|| async { Json(json!({ "answer": "Paris" })) }),
    );
    let base = spawn_endpoint(router).await;
    let backend = connect(&settings(&base, false), TOKEN).unwrap();

    let err = backend.generate(&request(false)).await.unwrap_err();
    assert!(matches!(err, GenerationError::Malformed(_)));
}

#[tokio::test]
async fn error_event_in_stream_is_remote() {
    let router = Router::new().route(
        "/models/{org}/{model}",
        post(|| async {
            (
                [("content-type", "text/event-stream")],
                "data: {\"token\": {\"text\": \"Par\"}}\n\ndata: {\"error\": \"Input validation error\"}\n\n",
            )
        }),
    );
    let base = spawn_endpoint(router).await;
    let backend = connect(&settings(&base, true), TOKEN).unwrap();

    let err = backend.generate(&request(true)).await.unwrap_err();
    assert!(matches!(err, GenerationError::Remote(msg) if msg.contains("Input validation")));
}

#[tokio::test]
async fn closed_port_is_a_network_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend_settings = settings(&format!("http://{}", addr), false);
    let backend = connect(&backend_settings, TOKEN).unwrap();
    let err = backend.generate(&request(false)).await.unwrap_err();
    assert!(matches!(err, GenerationError::Network(_)), "got {:?}", err);

    let dispatcher = Dispatcher::new(backend, &backend_settings, ReplyLimits::default());
    let reply = dispatcher.generate("Une question").await;
    assert_eq!(reply.source, ReplySource::Fallback);
    assert_eq!(reply.text, NETWORK_MESSAGE);
}
