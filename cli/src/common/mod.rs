//! # Causeur Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared utilities that are neither chatbot logic (`bot::`) nor core
//! infrastructure (`core::`):
//!
//! - **`fs`**: filesystem helpers (directory creation, file reading).
//! - **`transcript`**: the append-only conversation log written for every
//!   exchange.
//!

/// Utilities for filesystem operations.
pub mod fs;
/// Append-only conversation transcript.
pub mod transcript;
