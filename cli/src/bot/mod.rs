//! # Causeur Chatbot Core
//!
//! File: cli/src/bot/mod.rs
//!
//! ## Overview
//!
//! The part of Causeur every front end shares: take one user message, answer
//! it with exactly one reply, and record the exchange in the transcript.
//!
//! ## Architecture
//!
//! ```text
//! message ─▶ validate ─▶ canned table ──hit──▶ reply
//!                              │
//!                             miss
//!                              ▼
//!                        dispatcher ─▶ backend ─▶ post-process ─▶ reply
//!                              │
//!                           failure ─────────────▶ fallback reply
//! ```
//!
//! - `normalize`: canonical text form used for matching
//! - `canned`: the trigger/reply table
//! - `prompt`: instruction templates wrapped around the message
//! - `backend`: the `TextGenerator` capability and its HTTP implementations
//! - `postprocess`: cleaning and bounding generated text
//! - `dispatcher`: prompt → backend → post-process, with failure recovery
//!
//! Front ends depend on the [`Responder`] trait only; [`Chatbot`] is the
//! implementation wired up at startup.
//!
use crate::common::transcript::TranscriptLog;
use crate::core::config::Settings;
use crate::core::error::{CauseurError, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

pub mod backend;
pub mod canned;
pub mod dispatcher;
pub mod normalize;
pub mod postprocess;
pub mod prompt;

use canned::CannedTable;
use dispatcher::{Dispatcher, FallbackKind};
use postprocess::ReplyLimits;

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Canned,
    Generated,
    Fallback,
}

/// The single answer produced for one user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

impl Reply {
    pub fn canned(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: ReplySource::Canned,
        }
    }

    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: ReplySource::Generated,
        }
    }

    pub fn fallback(kind: FallbackKind) -> Self {
        Self {
            text: kind.message().to_string(),
            source: ReplySource::Fallback,
        }
    }
}

/// Anything that can answer a user message.
///
/// Returns `CauseurError::EmptyMessage` for blank input; every other outcome,
/// including backend failures, is an `Ok` reply.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, message: &str) -> Result<Reply>;
}

/// The application context: canned table, dispatcher and transcript, built
/// once at startup and shared read-only afterwards.
pub struct Chatbot {
    canned: CannedTable,
    dispatcher: Dispatcher,
    transcript: TranscriptLog,
}

impl Chatbot {
    pub fn new(canned: CannedTable, dispatcher: Dispatcher, transcript: TranscriptLog) -> Self {
        Self {
            canned,
            dispatcher,
            transcript,
        }
    }

    /// Wires the chatbot from loaded settings and the backend credential.
    pub fn from_settings(settings: &Settings, api_token: &str) -> Result<Self> {
        let backend = backend::connect(&settings.backend, api_token)?;
        let limits = ReplyLimits {
            min_chars: settings.reply.min_chars,
            max_chars: settings.reply.max_chars,
        };
        let dispatcher = Dispatcher::new(backend, &settings.backend, limits);
        let canned = CannedTable::new(settings.canned_entries());
        let transcript = TranscriptLog::open(&settings.transcript.directory)?;

        info!(
            "Chatbot ready: {} canned entries, model {}, transcript {}",
            canned.len(),
            settings.backend.model,
            transcript.path().display()
        );
        Ok(Self::new(canned, dispatcher, transcript))
    }

    pub fn transcript(&self) -> &TranscriptLog {
        &self.transcript
    }

    /// Releases the transcript; call once at shutdown.
    pub async fn close(&self) {
        self.transcript.close().await;
    }
}

#[async_trait]
impl Responder for Chatbot {
    async fn respond(&self, message: &str) -> Result<Reply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(CauseurError::EmptyMessage.into());
        }

        let reply = match self.canned.lookup(message) {
            Some(entry) => {
                debug!("Canned trigger {:?} matched", entry.trigger);
                Reply::canned(entry.reply.clone())
            }
            None => self.dispatcher.generate(message).await,
        };

        // A transcript failure must not cost the user their answer.
        if let Err(e) = self.transcript.record(message, &reply.text).await {
            warn!("Could not append to transcript: {:#}", e);
        }

        Ok(reply)
    }
}
