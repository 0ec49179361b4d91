//! # Hugging Face Inference Backends
//!
//! File: cli/src/bot/backend/huggingface.rs
//!
//! ## Overview
//!
//! Talks to a text-generation inference endpoint
//! (`POST {endpoint}/models/{model}`) authenticated with a bearer token.
//!
//! Request body:
//!
//! ```json
//! {
//!   "inputs": "<s>[INST] ... [/INST]",
//!   "parameters": {
//!     "max_new_tokens": 150, "temperature": 0.5, "do_sample": true,
//!     "return_full_text": false, "stop": ["</s>"]
//!   },
//!   "stream": false
//! }
//! ```
//!
//! A single-shot answer is `[{"generated_text": "..."}]` (some deployments send
//! the bare object). A streamed answer is a server-sent event stream with one
//! `data: {"token": {"text": "..."}}` line per fragment.
//!
use super::{GenerationError, GenerationRequest, TextGenerator};
use crate::core::config::BackendSettings;
use crate::core::error::Result;
use anyhow::Context;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Upper bound for establishing the TCP/TLS connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest error body kept in a `GenerationError::Server`.
const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Serialize)]
struct InferencePayload<'a> {
    inputs: &'a str,
    parameters: InferenceParameters<'a>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct InferenceParameters<'a> {
    max_new_tokens: u32,
    temperature: f32,
    do_sample: bool,
    return_full_text: bool,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop: &'a [String],
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceAnswer {
    Batch(Vec<GeneratedText>),
    Single(GeneratedText),
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    token: Option<StreamToken>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamToken {
    #[serde(default)]
    text: String,
}

/// Connection details shared by both backend flavours.
#[derive(Debug, Clone)]
pub struct InferenceEndpoint {
    client: Client,
    url: String,
    api_token: String,
}

impl InferenceEndpoint {
    pub fn new(settings: &BackendSettings, api_token: &str) -> Result<Self> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .user_agent(concat!("causeur/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build the inference HTTP client")?;

        let url = format!(
            "{}/models/{}",
            settings.endpoint.trim_end_matches('/'),
            settings.model
        );

        Ok(Self {
            client,
            url,
            api_token: api_token.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends the request and turns non-2xx answers into `Server` errors.
    async fn send(
        &self,
        request: &GenerationRequest,
        stream: bool,
    ) -> std::result::Result<Response, GenerationError> {
        let payload = InferencePayload {
            inputs: &request.prompt,
            parameters: InferenceParameters {
                max_new_tokens: request.max_new_tokens,
                temperature: request.temperature,
                do_sample: true,
                return_full_text: false,
                stop: &request.stop,
            },
            stream,
        };

        debug!("POST {} (stream: {})", self.url, stream);
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Inference endpoint answered {}: {}", status, body);
            return Err(GenerationError::Server {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        Ok(response)
    }
}

/// One request, one complete answer.
#[derive(Debug, Clone)]
pub struct SingleShotBackend {
    endpoint: InferenceEndpoint,
}

impl SingleShotBackend {
    pub fn new(endpoint: InferenceEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl TextGenerator for SingleShotBackend {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<String, GenerationError> {
        let response = self.endpoint.send(request, false).await?;
        let body = response.text().await?;
        parse_answer(&body)
    }
}

/// One request, answered as a stream of text fragments.
#[derive(Debug, Clone)]
pub struct StreamingBackend {
    endpoint: InferenceEndpoint,
}

impl StreamingBackend {
    pub fn new(endpoint: InferenceEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl TextGenerator for StreamingBackend {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<String, GenerationError> {
        let response = self.endpoint.send(request, true).await?;

        let mut stream = response.bytes_stream();
        // Raw bytes are buffered so a multi-byte character split across two
        // chunks is decoded only once its line is complete.
        let mut buffer: Vec<u8> = Vec::new();
        let mut text = String::new();
        let mut fragments = 0usize;

        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);

            while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                if let Some(fragment) = parse_event_line(&String::from_utf8_lossy(&line))? {
                    fragments += 1;
                    text.push_str(&fragment);
                }
            }
        }

        if !buffer.is_empty() {
            if let Some(fragment) = parse_event_line(&String::from_utf8_lossy(&buffer))? {
                fragments += 1;
                text.push_str(&fragment);
            }
        }

        debug!("Stream finished after {} fragments", fragments);
        Ok(text)
    }

    fn streams(&self) -> bool {
        true
    }
}

/// Extracts the generated text from a single-shot answer body.
pub(crate) fn parse_answer(body: &str) -> std::result::Result<String, GenerationError> {
    let answer: InferenceAnswer = serde_json::from_str(body)
        .map_err(|e| GenerationError::Malformed(format!("{} in {:?}", e, truncate(body))))?;

    match answer {
        InferenceAnswer::Batch(items) => items
            .into_iter()
            .next()
            .map(|item| item.generated_text)
            .ok_or_else(|| GenerationError::Malformed("empty result list".to_string())),
        InferenceAnswer::Single(item) => Ok(item.generated_text),
    }
}

/// Parses one server-sent event line.
///
/// Returns `Ok(None)` for blank lines, comments, non-data fields and the
/// `[DONE]` marker; `Ok(Some(text))` for a token, which may be empty.
pub(crate) fn parse_event_line(line: &str) -> std::result::Result<Option<String>, GenerationError> {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim_start();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    let event: StreamEvent = serde_json::from_str(data)
        .map_err(|e| GenerationError::Malformed(format!("{} in {:?}", e, truncate(data))))?;

    if let Some(message) = event.error {
        return Err(GenerationError::Remote(message));
    }
    trace!("Stream fragment: {:?}", event.token.as_ref().map(|t| &t.text));
    Ok(event.token.map(|token| token.text))
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_ERROR_BODY).collect()
}
