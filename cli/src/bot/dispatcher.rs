//! # Generative Fallback Dispatcher
//!
//! File: cli/src/bot/dispatcher.rs
//!
//! ## Overview
//!
//! Handles every message the canned table did not answer: builds the prompt,
//! makes exactly one backend call under a fixed timeout and post-processes the
//! text. It never returns an error. Each failure is turned into a fixed
//! apology in French:
//!
//! | failure                                   | reply                    |
//! |-------------------------------------------|--------------------------|
//! | no answer before the timeout              | [`TIMEOUT_MESSAGE`]      |
//! | connection refused, reset, DNS failure    | [`NETWORK_MESSAGE`]      |
//! | server error, malformed or unexpected body | [`GENERIC_ERROR_MESSAGE`] |
//!
//! There are no retries.
//!
use super::backend::{GenerationError, GenerationRequest, TextGenerator};
use super::postprocess::{clean_reply, ReplyLimits};
use super::prompt::PromptTemplate;
use super::Reply;
use crate::core::config::BackendSettings;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const TIMEOUT_MESSAGE: &str =
    "⏳ Le service met trop de temps à répondre. Réessaie dans un instant.";
pub const NETWORK_MESSAGE: &str =
    "🚨 Erreur de connexion : impossible de joindre le service de génération.";
pub const GENERIC_ERROR_MESSAGE: &str =
    "🚨 Une erreur est survenue pendant la génération de la réponse.";

/// Which apology a failed generation resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    Timeout,
    Network,
    Generic,
}

impl FallbackKind {
    pub fn message(&self) -> &'static str {
        match self {
            FallbackKind::Timeout => TIMEOUT_MESSAGE,
            FallbackKind::Network => NETWORK_MESSAGE,
            FallbackKind::Generic => GENERIC_ERROR_MESSAGE,
        }
    }
}

impl From<&GenerationError> for FallbackKind {
    fn from(err: &GenerationError) -> Self {
        match err {
            GenerationError::Timeout => FallbackKind::Timeout,
            GenerationError::Network(_) => FallbackKind::Network,
            GenerationError::Server { .. }
            | GenerationError::Remote(_)
            | GenerationError::Malformed(_) => FallbackKind::Generic,
        }
    }
}

/// Sends unmatched messages to the language model.
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn TextGenerator>,
    template: PromptTemplate,
    max_new_tokens: u32,
    temperature: f32,
    timeout: Duration,
    limits: ReplyLimits,
}

impl Dispatcher {
    pub fn new(
        backend: Arc<dyn TextGenerator>,
        settings: &BackendSettings,
        limits: ReplyLimits,
    ) -> Self {
        Self {
            backend,
            template: settings.template,
            max_new_tokens: settings.max_new_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
            limits,
        }
    }

    /// Overrides the time allowed for one backend call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn request_for(&self, message: &str) -> GenerationRequest {
        GenerationRequest {
            prompt: self.template.render(message),
            max_new_tokens: self.max_new_tokens,
            temperature: self.temperature,
            streaming: self.backend.streams(),
            stop: self.template.stop_sequences(),
        }
    }

    /// Produces a reply for `message`; never fails.
    pub async fn generate(&self, message: &str) -> Reply {
        let request = self.request_for(message);
        debug!(
            "Dispatching to backend (template: {}, streaming: {}, max_new_tokens: {})",
            self.template.name(),
            request.streaming,
            request.max_new_tokens
        );

        let outcome = match tokio::time::timeout(self.timeout, self.backend.generate(&request)).await
        {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout),
        };

        match outcome {
            Ok(raw) => {
                info!("Backend produced {} characters", raw.chars().count());
                Reply::generated(clean_reply(&raw, &self.limits))
            }
            Err(err) => {
                let kind = FallbackKind::from(&err);
                warn!("Generation failed ({:?}): {}", kind, err);
                Reply::fallback(kind)
            }
        }
    }
}
