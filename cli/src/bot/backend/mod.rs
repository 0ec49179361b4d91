//! # Text Generation Backends
//!
//! File: cli/src/bot/backend/mod.rs
//!
//! ## Overview
//!
//! The language model is an external collaborator reached over HTTP. This
//! module defines the one capability the rest of the bot needs from it,
//! [`TextGenerator`], together with the request and error types exchanged
//! through it.
//!
//! ## Architecture
//!
//! - `huggingface`: the hosted inference endpoint, in two flavours sharing one
//!   HTTP client:
//!   - [`SingleShotBackend`]: one request, one JSON answer.
//!   - [`StreamingBackend`]: one request, a server-sent event stream of text
//!     fragments concatenated in arrival order.
//! - [`connect`] picks the flavour from configuration.
//!
//! Backends make exactly one attempt per call. Deciding what the user sees
//! when that attempt fails is the dispatcher's job.
//!
use crate::core::config::BackendSettings;
use crate::core::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub mod huggingface;

pub use huggingface::{InferenceEndpoint, SingleShotBackend, StreamingBackend};

/// Everything a backend needs for one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub streaming: bool,
    /// Sequences at which generation should stop.
    pub stop: Vec<String>,
}

/// Why a generation produced no text.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("the inference service did not answer in time")]
    Timeout,

    #[error("could not reach the inference service: {0}")]
    Network(String),

    #[error("the inference service answered with status {status}: {body}")]
    Server { status: u16, body: String },

    #[error("the inference service reported an error: {0}")]
    Remote(String),

    #[error("unexpected response from the inference service: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout
        } else if err.is_decode() {
            GenerationError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            GenerationError::Server {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            // Connect failures, resets and broken bodies all land here.
            GenerationError::Network(err.to_string())
        }
    }
}

/// The capability of turning a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<String, GenerationError>;

    /// Whether this backend receives its answer as a stream of fragments.
    fn streams(&self) -> bool {
        false
    }
}

/// Builds the backend described by `settings`, authenticated with `api_token`.
pub fn connect(settings: &BackendSettings, api_token: &str) -> Result<Arc<dyn TextGenerator>> {
    let endpoint = InferenceEndpoint::new(settings, api_token)?;
    info!(
        "Using inference endpoint {} ({} mode)",
        endpoint.url(),
        if settings.streaming { "streaming" } else { "single-shot" }
    );
    let backend: Arc<dyn TextGenerator> = if settings.streaming {
        Arc::new(StreamingBackend::new(endpoint))
    } else {
        Arc::new(SingleShotBackend::new(endpoint))
    };
    Ok(backend)
}
