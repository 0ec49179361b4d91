//! # Causeur Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the Causeur CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Loading `.env`, the configuration files and the API credential
//! - Building the shared chatbot once and routing to a front end
//!
//! ## Examples
//!
//! ```bash
//! # Web front end on http://localhost:5000
//! causeur serve
//!
//! # Terminal session with debug logging
//! causeur -vv chat
//!
//! # One question, one answer
//! causeur ask Bonjour
//! ```
//!
//! Command processing flow:
//! 1. Parse command-line args via Clap
//! 2. Configure logging based on verbosity level
//! 3. Load settings and the credential (missing credential: exit 1)
//! 4. Route to the command handler, then close the transcript
//! 5. Format and display any errors that occur
//!
use causeur::bot::{Chatbot, Responder};
use causeur::commands;
use causeur::core::config;
use causeur::core::error::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "causeur",
    about = "💬 Causeur: a French-language chatbot",
    long_about = "Answers French questions with canned replies first and a hosted\n\
                  text-generation model for everything else. Needs HUGGINGFACE_API_KEY.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Use this configuration file instead of the user and project files.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Enum defining all available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    /// Serve the chat page and the JSON API over HTTP.
    #[command(alias = "s")]
    Serve(commands::serve::ServeArgs),
    /// Chat interactively in the terminal.
    #[command(alias = "c")]
    Chat(commands::chat::ChatArgs),
    /// Answer a single message and exit.
    #[command(alias = "a")]
    Ask(commands::ask::AskArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    if let Ok(path) = dotenv::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }
    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => config::load_settings_from(path)?,
        None => config::load_settings()?,
    };
    let api_token = config::api_token()?;
    let chatbot = Arc::new(Chatbot::from_settings(&settings, &api_token)?);
    let responder: Arc<dyn Responder> = chatbot.clone();

    let command_result = match cli.command {
        Commands::Serve(args) => {
            commands::serve::handle_serve(args, &settings.server, responder).await
        }
        Commands::Chat(args) => commands::chat::handle_chat(args, responder).await,
        Commands::Ask(args) => commands::ask::handle_ask(args, responder).await,
    };

    chatbot.close().await;
    command_result
}
