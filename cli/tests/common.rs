//! # Causeur Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each `.rs` file
//! in that directory is compiled as its own test crate and pulls this module
//! in with `mod common;`.
//!
//! - `causeur_cmd()`: the compiled binary, ready for `assert_cmd` assertions
//! - `write_config()`: a configuration file keeping transcripts in a temp dir
//! - `ScriptedGenerator`: a `TextGenerator` with a canned outcome and a call counter
//! - `spawn_endpoint()`: serves an axum router on a free local port
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use async_trait::async_trait;
use causeur::bot::backend::{GenerationError, GenerationRequest, TextGenerator};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Helper function to create an `assert_cmd::Command` for the compiled
/// `causeur` binary.
///
/// ## Panics
/// Panics if the `causeur` binary cannot be found via `Command::cargo_bin`.
pub fn causeur_cmd() -> Command {
    Command::cargo_bin("causeur").expect("Failed to find causeur binary for testing")
}

/// Writes `causeur.toml` into `dir` with transcripts under `dir/logs` and the
/// backend pointed at a closed local port. `extra` is appended verbatim.
pub fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let logs = dir.join("logs");
    let content = format!(
        "[backend]\nendpoint = \"http://127.0.0.1:9\"\ntimeout_secs = 2\n\n\
         [transcript]\ndirectory = {:?}\n\n{}",
        logs.to_string_lossy(),
        extra
    );
    let path = dir.join("causeur.toml");
    std::fs::write(&path, content).expect("Failed to write test config");
    path
}

/// Reads every transcript file written under `dir`.
pub fn read_transcripts(dir: &Path) -> String {
    let mut content = String::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.filter_map(Result::ok) {
            content.push_str(&std::fs::read_to_string(entry.path()).unwrap_or_default());
        }
    }
    content
}

/// What a `ScriptedGenerator` does when called.
pub enum Script {
    Answer(String),
    Fail(fn() -> GenerationError),
    Hang,
}

/// A `TextGenerator` that follows a script and records the prompts it saw.
pub struct ScriptedGenerator {
    script: Script,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(text: &str) -> Self {
        Self::new(Script::Answer(text.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        match &self.script {
            Script::Answer(text) => Ok(text.clone()),
            Script::Fail(make) => Err(make()),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("trop tard".to_string())
            }
        }
    }
}

/// Serves `router` on 127.0.0.1 with an OS-assigned port and returns its base URL.
pub async fn spawn_endpoint(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock endpoint");
    let addr = listener.local_addr().expect("Mock endpoint has no address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}
