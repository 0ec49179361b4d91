//! # Causeur
//!
//! File: cli/src/lib.rs
//!
//! A small French-language chatbot: a table of canned answers checked first,
//! then a hosted text-generation model for everything else. The binary in
//! `main.rs` is a thin wrapper; everything lives here so integration tests can
//! drive the chatbot without going through the command line.
//!
//! - `bot`: normalization, canned matching, generation and post-processing
//! - `commands`: the `serve`, `chat` and `ask` front ends
//! - `common`: filesystem helpers and the conversation transcript
//! - `core`: configuration, errors and page rendering
//!
pub mod bot;
pub mod commands;
pub mod common;
pub mod core;
