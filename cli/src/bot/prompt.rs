//! # Prompt Templates
//!
//! File: cli/src/bot/prompt.rs
//!
//! Wraps the user's message in an instruction asking the model for a short
//! answer in French. Two families are supported:
//!
//! - `instruct`: the single-turn `[INST] ... [/INST]` wrapper used by Mistral
//!   instruct models.
//! - `chat`: a system/user/assistant role wrapper with explicit stop sequences,
//!   for models trained on role markers.
//!
use serde::Deserialize;

/// Instruction placed in front of the question.
pub const INSTRUCTION: &str = "Réponds brièvement en français à la question suivante :";

/// System message for the role-based template.
pub const SYSTEM_MESSAGE: &str =
    "Tu es un assistant francophone. Réponds brièvement, clairement et uniquement en français.";

/// Which wrapper to put around the user's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptTemplate {
    #[default]
    Instruct,
    Chat,
}

impl PromptTemplate {
    /// Builds the full prompt for `message`.
    pub fn render(&self, message: &str) -> String {
        match self {
            PromptTemplate::Instruct => {
                format!("<s>[INST] {} {} [/INST]", INSTRUCTION, message)
            }
            PromptTemplate::Chat => format!(
                "<|system|>\n{}</s>\n<|user|>\n{}</s>\n<|assistant|>\n",
                SYSTEM_MESSAGE, message
            ),
        }
    }

    /// Sequences at which the backend should stop generating.
    pub fn stop_sequences(&self) -> Vec<String> {
        match self {
            PromptTemplate::Instruct => vec!["</s>".to_string()],
            PromptTemplate::Chat => vec![
                "</s>".to_string(),
                "<|user|>".to_string(),
                "<|system|>".to_string(),
            ],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PromptTemplate::Instruct => "instruct",
            PromptTemplate::Chat => "chat",
        }
    }
}
