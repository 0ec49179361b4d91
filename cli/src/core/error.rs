//! # Causeur Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types shared by the whole application. Domain
//! errors are variants of `CauseurError` (derived with `thiserror`); everything
//! else travels as `anyhow::Error` so callers can attach context.
//!
//! ## Architecture
//!
//! - `CauseurError`: the errors callers need to tell apart
//!   - configuration problems (fatal at startup)
//!   - an empty user message (reported back to the user, no backend call)
//!   - filesystem and template failures
//! - `Result<T>`: an alias for `anyhow::Result<T>`
//!
//! Backend failures have their own type, `bot::backend::GenerationError`,
//! because the dispatcher always recovers from them and never lets them reach
//! this layer.
//!
//! ## Examples
//!
//! ```rust,ignore
//! match bot.respond(input).await {
//!     Ok(reply) => println!("{}", reply.text),
//!     Err(e) if matches!(e.downcast_ref::<CauseurError>(), Some(CauseurError::EmptyMessage)) => {
//!         println!("Please type something first.");
//!     }
//!     Err(e) => return Err(e),
//! }
//! ```
//!
use thiserror::Error;

/// Custom error type for the Causeur application.
#[derive(Error, Debug)]
pub enum CauseurError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Le message est vide. Pose une question.")]
    EmptyMessage,

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Template rendering error: {source}")]
    Template {
        #[from]
        source: tera::Error,
    },
}

impl CauseurError {
    /// True when the error is the user's fault rather than the server's.
    pub fn is_validation(&self) -> bool {
        matches!(self, CauseurError::EmptyMessage)
    }
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_err = CauseurError::Config("HUGGINGFACE_API_KEY is not set".to_string());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: HUGGINGFACE_API_KEY is not set"
        );

        assert_eq!(
            CauseurError::EmptyMessage.to_string(),
            "Le message est vide. Pose une question."
        );
    }

    #[test]
    fn test_only_empty_message_is_validation() {
        assert!(CauseurError::EmptyMessage.is_validation());
        assert!(!CauseurError::Config("x".into()).is_validation());
        assert!(!CauseurError::FileSystem("x".into()).is_validation());
    }

    #[test]
    fn test_downcast_from_anyhow() {
        let err: anyhow::Error = CauseurError::EmptyMessage.into();
        let err = err.context("while handling a form submission");
        assert!(matches!(
            err.downcast_ref::<CauseurError>(),
            Some(CauseurError::EmptyMessage)
        ));
    }
}
