//! # Causeur Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges, validates and exposes Causeur's settings. Every
//! value has a default in code, so running without any configuration file
//! behaves exactly like the stock chatbot.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. A file passed explicitly with `--config` (replaces 2 and 3)
//! 2. Project-specific `.causeur.toml` in the current directory or an ancestor
//!    (the search stops at the first directory containing `.git`)
//! 3. User-specific `<config dir>/causeur/config.toml`
//! 4. Default values defined in the code
//!
//! After merging, `~` in paths is expanded and the result is validated. The
//! backend credential never lives in these files: it is read from the
//! `HUGGINGFACE_API_KEY` environment variable (a `.env` file is loaded into the
//! environment at startup).
//!
//! ## Example file
//!
//! ```toml
//! [backend]
//! model = "mistralai/Mistral-7B-Instruct-v0.3"
//! temperature = 0.5
//! streaming = true
//!
//! [reply]
//! max_chars = 300
//!
//! [transcript]
//! directory = "~/causeur/logs"
//!
//! [server]
//! port = 8080
//!
//! [[canned]]
//! trigger = "bonjour"
//! reply = "Salut !"
//! ```
//!
//! A non-empty `[[canned]]` list replaces the built-in table entirely.
//!
use crate::bot::canned::{builtin_entries, CannedEntry};
use crate::bot::prompt::PromptTemplate;
use crate::common::fs::io::read_file_to_string;
use crate::core::error::{CauseurError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable holding the inference API token.
pub const API_KEY_VAR: &str = "HUGGINGFACE_API_KEY";

const PROJECT_CONFIG_FILENAME: &str = ".causeur.toml";

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub reply: ReplySettings,
    #[serde(default)]
    pub transcript: TranscriptSettings,
    #[serde(default)]
    pub server: ServerSettings,
    /// Replacement canned table; empty means "use the built-in one".
    #[serde(default)]
    pub canned: Vec<CannedEntry>,
}

impl Settings {
    /// The canned table in effect.
    pub fn canned_entries(&self) -> Vec<CannedEntry> {
        if self.canned.is_empty() {
            builtin_entries()
        } else {
            self.canned.clone()
        }
    }
}

/// Hosted text-generation backend.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct BackendSettings {
    /// Base URL of the inference API; the model path is appended.
    pub endpoint: String,
    /// Model identifier, e.g. `mistralai/Mistral-7B-Instruct-v0.3`.
    pub model: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
    /// Upper bound on one backend call, in seconds.
    pub timeout_secs: u64,
    /// Receive the answer as a server-sent event stream.
    pub streaming: bool,
    pub template: PromptTemplate,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            max_new_tokens: 150,
            temperature: 0.5,
            timeout_secs: 20,
            streaming: false,
            template: PromptTemplate::default(),
        }
    }
}

/// Length bounds applied to generated replies.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct ReplySettings {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for ReplySettings {
    fn default() -> Self {
        Self {
            min_chars: 3,
            max_chars: 500,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct TranscriptSettings {
    /// Directory receiving `Chat_<date>_<time>.txt` files (can use ~).
    pub directory: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            directory: default_transcript_dir(),
        }
    }
}

/// Web front end. Command-line flags override these.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allow cross-origin requests to the JSON API.
    pub cors: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 5000,
            cors: false,
        }
    }
}

fn default_endpoint() -> String {
    "https://api-inference.huggingface.co".to_string()
}
fn default_model() -> String {
    "mistralai/Mistral-7B-Instruct-v0.3".to_string()
}
fn default_transcript_dir() -> String {
    "logs".to_string()
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Loads user and project configuration, merged over the defaults.
pub fn load_settings() -> Result<Settings> {
    let user_settings = load_user_settings()?;
    let project_settings = load_project_settings()?;
    finish(merge_settings(
        user_settings.unwrap_or_default(),
        project_settings,
    ))
}

/// Loads a single explicitly named file over the defaults.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    info!("Loading configuration from: {}", path.display());
    finish(load_settings_from_path(path)?)
}

fn finish(mut settings: Settings) -> Result<Settings> {
    expand_settings_paths(&mut settings);
    validate_settings(&settings).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", settings);
    Ok(settings)
}

/// Reads the inference API token from the environment.
///
/// # Errors
///
/// `CauseurError::Config` when the variable is unset or blank.
pub fn api_token() -> Result<String> {
    token_from(std::env::var(API_KEY_VAR).ok())
}

fn token_from(value: Option<String>) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(anyhow!(CauseurError::Config(format!(
            "{} is not set. Add it to your environment or to a .env file.",
            API_KEY_VAR
        )))),
    }
}

fn load_user_settings() -> Result<Option<Settings>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "Causeur", "causeur") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_settings_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_settings() -> Result<Option<Settings>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(path) = find_project_config_path(&current_dir) {
        info!("Loading project configuration from: {}", path.display());
        load_settings_from_path(&path).map(Some)
    } else {
        debug!("No project configuration file (.causeur.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_settings_from_path(path: &Path) -> Result<Settings> {
    let content = read_file_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .map_err(|e| anyhow!(CauseurError::Config(e.to_string())))
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Project values win wherever they differ from the defaults.
fn merge_settings(user: Settings, project: Option<Settings>) -> Settings {
    let project = match project {
        Some(p) => p,
        None => return user,
    };
    let defaults = Settings::default();

    fn pick<T: PartialEq>(project: T, user: T, default: &T) -> T {
        if project != *default {
            project
        } else {
            user
        }
    }

    Settings {
        backend: BackendSettings {
            endpoint: pick(
                project.backend.endpoint,
                user.backend.endpoint,
                &defaults.backend.endpoint,
            ),
            model: pick(
                project.backend.model,
                user.backend.model,
                &defaults.backend.model,
            ),
            max_new_tokens: pick(
                project.backend.max_new_tokens,
                user.backend.max_new_tokens,
                &defaults.backend.max_new_tokens,
            ),
            temperature: pick(
                project.backend.temperature,
                user.backend.temperature,
                &defaults.backend.temperature,
            ),
            timeout_secs: pick(
                project.backend.timeout_secs,
                user.backend.timeout_secs,
                &defaults.backend.timeout_secs,
            ),
            streaming: pick(
                project.backend.streaming,
                user.backend.streaming,
                &defaults.backend.streaming,
            ),
            template: pick(
                project.backend.template,
                user.backend.template,
                &defaults.backend.template,
            ),
        },
        reply: ReplySettings {
            min_chars: pick(
                project.reply.min_chars,
                user.reply.min_chars,
                &defaults.reply.min_chars,
            ),
            max_chars: pick(
                project.reply.max_chars,
                user.reply.max_chars,
                &defaults.reply.max_chars,
            ),
        },
        transcript: TranscriptSettings {
            directory: pick(
                project.transcript.directory,
                user.transcript.directory,
                &defaults.transcript.directory,
            ),
        },
        server: ServerSettings {
            host: pick(project.server.host, user.server.host, &defaults.server.host),
            port: pick(project.server.port, user.server.port, &defaults.server.port),
            cors: pick(project.server.cors, user.server.cors, &defaults.server.cors),
        },
        canned: pick(project.canned, user.canned, &defaults.canned),
    }
}

fn expand_settings_paths(settings: &mut Settings) {
    settings.transcript.directory =
        shellexpand::tilde(&settings.transcript.directory).into_owned();
    debug!(
        "Expanded transcript directory: {}",
        settings.transcript.directory
    );
}

fn validate_settings(settings: &Settings) -> Result<()> {
    let invalid = |msg: String| -> Result<()> { Err(anyhow!(CauseurError::Config(msg))) };

    let backend = &settings.backend;
    if !backend.endpoint.starts_with("http://") && !backend.endpoint.starts_with("https://") {
        return invalid(format!(
            "backend.endpoint must be an http(s) URL, got '{}'.",
            backend.endpoint
        ));
    }
    if backend.model.trim().is_empty() {
        return invalid("backend.model cannot be empty.".to_string());
    }
    if backend.max_new_tokens == 0 {
        return invalid("backend.max_new_tokens must be at least 1.".to_string());
    }
    if !backend.temperature.is_finite() || backend.temperature <= 0.0 {
        return invalid(format!(
            "backend.temperature must be a positive number, got {}.",
            backend.temperature
        ));
    }
    if backend.timeout_secs == 0 {
        return invalid("backend.timeout_secs must be at least 1.".to_string());
    }

    if settings.reply.max_chars == 0 {
        return invalid("reply.max_chars must be at least 1.".to_string());
    }
    if settings.reply.min_chars > settings.reply.max_chars {
        return invalid(format!(
            "reply.min_chars ({}) exceeds reply.max_chars ({}).",
            settings.reply.min_chars, settings.reply.max_chars
        ));
    }

    if settings.transcript.directory.trim().is_empty() {
        return invalid("transcript.directory cannot be empty.".to_string());
    }
    let transcript_dir = PathBuf::from(&settings.transcript.directory);
    if transcript_dir.exists() && !transcript_dir.is_dir() {
        return invalid(format!(
            "Configured transcript path '{}' exists but is not a directory.",
            transcript_dir.display()
        ));
    }

    for entry in &settings.canned {
        if entry.trigger.trim().is_empty() || entry.reply.trim().is_empty() {
            return invalid(format!(
                "Canned entries need a non-empty trigger and reply (trigger: '{}').",
                entry.trigger
            ));
        }
    }
    Ok(())
}
