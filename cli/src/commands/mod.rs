//! # Causeur Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! One module per top-level subcommand. Each is a thin front end over the
//! shared `bot::Responder`:
//!
//! - `serve`: HTTP server with the HTML form and the JSON API
//! - `chat`: interactive terminal session
//! - `ask`: answer a single message and exit
//!
//! Every module exposes an argument struct (`ServeArgs`, `ChatArgs`,
//! `AskArgs`) and a `handle_*` function called from `main.rs`.
//!
pub mod ask;
pub mod chat;
pub mod serve;
