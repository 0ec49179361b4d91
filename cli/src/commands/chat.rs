//! # Interactive Terminal Session
//!
//! File: cli/src/commands/chat.rs
//!
//! ## Overview
//!
//! `causeur chat` reads one message per line and prints the assistant's reply
//! under it, until `quit`, `exit`, `bye` or end of input. `/clear` wipes the
//! screen. Blank lines are ignored.
//!
//! The loop is written against `AsyncBufRead`/`AsyncWrite` rather than the
//! real terminal so tests can drive it with in-memory buffers.
//!
use crate::bot::Responder;
use crate::core::error::{CauseurError, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

const PROMPT: &str = "Vous: ";
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";
const GOODBYE: &str = "À bientôt !";
const EXIT_WORDS: &[&str] = &["quit", "exit", "bye"];

#[derive(Parser, Debug, Clone, Default)]
pub struct ChatArgs {
    /// Do not print the welcome banner.
    #[arg(long)]
    pub quiet: bool,
}

pub async fn handle_chat(args: ChatArgs, responder: Arc<dyn Responder>) -> Result<()> {
    info!("Starting interactive session");
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    if !args.quiet {
        stdout
            .write_all(
                "Chatbot IA. Tape ta question, /clear pour effacer, quit pour sortir.\n\n"
                    .as_bytes(),
            )
            .await?;
    }
    run_session(responder.as_ref(), stdin, &mut stdout).await
}

/// Runs the read/answer loop until an exit word or end of input.
pub async fn run_session<R, W>(responder: &dyn Responder, input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            output.write_all(b"\n").await?;
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&message.to_lowercase().as_str()) {
            break;
        }
        if message == "/clear" {
            output.write_all(CLEAR_SCREEN.as_bytes()).await?;
            continue;
        }

        match responder.respond(message).await {
            Ok(reply) => {
                debug!("Reply source: {:?}", reply.source);
                output
                    .write_all(format!("Assistant: {}\n\n", reply.text).as_bytes())
                    .await?;
            }
            Err(e) => match e.downcast_ref::<CauseurError>() {
                Some(err) if err.is_validation() => {
                    output.write_all(format!("{}\n\n", err).as_bytes()).await?;
                }
                _ => return Err(e),
            },
        }
    }
    output
        .write_all(format!("{}\n", GOODBYE).as_bytes())
        .await?;
    output.flush().await?;
    Ok(())
}
