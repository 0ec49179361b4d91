//! # Causeur Web Front End
//!
//! File: cli/src/commands/serve/mod.rs
//!
//! ## Overview
//!
//! `causeur serve` exposes the chatbot over HTTP:
//! - `GET /` and `POST /`: an HTML form (field `query`) showing the reply
//! - `POST /api/chat`: JSON `{"message": "..."}` → `{"response", "source"}`
//! - `GET /health`: liveness probe
//!
//! ## Architecture
//!
//! - `server_logic.rs`: address resolution, port fallback, router and
//!   middleware, graceful shutdown
//! - `handlers.rs`: the request handlers and their shared state
//!
//! ## Examples
//!
//! ```bash
//! # Serve on the configured address (127.0.0.1:5000 by default)
//! causeur serve
//!
//! # Listen on every interface, allow cross-origin API calls
//! causeur serve --host 0.0.0.0 --port 8080 --cors
//! ```
//!
use crate::bot::Responder;
use crate::core::config::ServerSettings;
use crate::core::error::Result;
use clap::Parser;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::info;

pub mod handlers;
pub mod server_logic;

/// Arguments for `causeur serve`. Unset values come from the `[server]`
/// configuration section.
#[derive(Parser, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Interface to bind to.
    #[arg(long, env = "CAUSEUR_HOST")]
    pub host: Option<IpAddr>,

    /// Port to listen on; the next free port is used if it is taken.
    #[arg(long, short, env = "CAUSEUR_PORT")]
    pub port: Option<u16>,

    /// Allow cross-origin requests to the JSON API.
    #[arg(long)]
    pub cors: bool,
}

/// Entry point for `causeur serve`. Runs until Ctrl+C or SIGTERM.
pub async fn handle_serve(
    args: ServeArgs,
    settings: &ServerSettings,
    responder: Arc<dyn Responder>,
) -> Result<()> {
    info!("Handling serve command with args: {:?}", args);
    let config = server_logic::ServerConfig::resolve(&args, settings)?;
    info!("Effective server config: {:?}", config);
    server_logic::run_server(config, responder).await
}
