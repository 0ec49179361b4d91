//! # One-Shot Question
//!
//! File: cli/src/commands/ask.rs
//!
//! `causeur ask <message...>` answers a single message and prints only the
//! reply text, which makes it easy to use from scripts:
//!
//! ```bash
//! causeur ask Quelle est la capitale de la France ?
//! ```
//!
use crate::bot::{ReplySource, Responder};
use crate::core::error::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug, Clone)]
pub struct AskArgs {
    /// The message; several words are joined with spaces.
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub message: Vec<String>,

    /// Also print where the reply came from (canned, generated, fallback).
    #[arg(long)]
    pub show_source: bool,
}

pub async fn handle_ask(args: AskArgs, responder: Arc<dyn Responder>) -> Result<()> {
    let message = args.message.join(" ");
    let reply = responder.respond(&message).await?;
    info!("Reply source: {:?}", reply.source);
    if args.show_source {
        println!("[{}] {}", source_label(&reply.source), reply.text);
    } else {
        println!("{}", reply.text);
    }
    Ok(())
}

fn source_label(source: &ReplySource) -> &'static str {
    match source {
        ReplySource::Canned => "canned",
        ReplySource::Generated => "generated",
        ReplySource::Fallback => "fallback",
    }
}
