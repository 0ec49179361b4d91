//! # Causeur Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces used by the chatbot and every front end:
//! - `config`: configuration loading, merging, and validation
//! - `error`: error types and the crate-wide `Result` alias
//! - `templating`: HTML rendering for the web front end
//!
//! ```rust,ignore
//! use crate::core::config; // For loading settings
//! use crate::core::error::{CauseurError, Result}; // For error handling
//! use crate::core::templating::PageRenderer; // For the chat page
//! ```
//!
pub mod config;
pub mod error;
pub mod templating;
