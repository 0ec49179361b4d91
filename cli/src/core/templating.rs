//! # Causeur Page Rendering
//!
//! File: cli/src/core/templating.rs
//!
//! ## Overview
//!
//! Renders the single HTML page of the web front end with the Tera engine.
//! The template is compiled into the binary, so the server needs no asset
//! directory at runtime. Autoescaping is on: user input and model output are
//! both untrusted.
//!
//! ## Examples
//!
//! ```rust,ignore
//! let pages = PageRenderer::new()?;
//! let html = pages.render_chat(&ChatView {
//!     user_input: "Bonjour".into(),
//!     response: Some("Bonjour ! Je suis là pour t'aider.".into()),
//!     error: None,
//! })?;
//! ```
//!
use crate::core::error::{CauseurError, Result};
use anyhow::anyhow;
use serde::Serialize;
use tera::Tera;
use tracing::debug;

const CHAT_TEMPLATE_NAME: &str = "chat.html";
const CHAT_TEMPLATE: &str = include_str!("../../templates/chat.html.tera");

/// Values shown on the chat page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatView {
    /// The question, echoed back into the input field.
    pub user_input: String,
    pub response: Option<String>,
    pub error: Option<String>,
}

/// Holds the compiled page templates.
#[derive(Debug)]
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![CHAT_TEMPLATE_NAME]);
        tera.add_raw_template(CHAT_TEMPLATE_NAME, CHAT_TEMPLATE)
            .map_err(|e| {
                anyhow!(CauseurError::Template { source: e })
                    .context("Failed to compile the chat page template")
            })?;
        debug!("Compiled page template '{}'", CHAT_TEMPLATE_NAME);
        Ok(Self { tera })
    }

    pub fn render_chat(&self, view: &ChatView) -> Result<String> {
        let context = tera::Context::from_serialize(view).map_err(|e| {
            anyhow!(CauseurError::Template { source: e })
                .context("Failed to create Tera context for the chat page")
        })?;
        self.tera.render(CHAT_TEMPLATE_NAME, &context).map_err(|e| {
            anyhow!(CauseurError::Template { source: e })
                .context("Tera rendering failed for the chat page")
        })
    }
}
