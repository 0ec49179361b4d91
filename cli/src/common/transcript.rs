//! # Conversation Transcript
//!
//! File: cli/src/common/transcript.rs
//!
//! ## Overview
//!
//! Append-only text record of every exchange. One file per process start,
//! named after the start minute (`Chat_2026-10-16_14-05.txt`), inside a
//! directory that is created when missing.
//!
//! Each exchange is written as a two-line record followed by a blank line:
//!
//! ```text
//! [14:05:12] Vous: Bonjour
//! [14:05:12] Assistant: Bonjour ! Je suis là pour t'aider. ...
//! ```
//!
//! ## Concurrency
//!
//! Requests may finish concurrently (the web server handles them on separate
//! tasks). Writers take an async mutex, then open the file in append mode,
//! write the whole record in one call and close it again, so records never
//! interleave.
//!
use super::fs::io::ensure_dir_exists;
use crate::core::error::Result;
use anyhow::Context;
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Who said a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "Vous",
            Speaker::Assistant => "Assistant",
        }
    }
}

/// One line of the transcript.
#[derive(Debug, Clone)]
pub struct TranscriptLine {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl fmt::Display for TranscriptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Line breaks inside the text would split the record.
        let text = self.text.replace(|c: char| c == '\r' || c == '\n', " ");
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format("%H:%M:%S"),
            self.speaker.label(),
            text
        )
    }
}

/// File name for a transcript started at `started`.
pub fn file_name_for(started: &DateTime<Local>) -> String {
    started.format("Chat_%Y-%m-%d_%H-%M.txt").to_string()
}

/// Handle to the transcript file of this process.
#[derive(Debug)]
pub struct TranscriptLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TranscriptLog {
    /// Prepares a transcript in `directory` named after the current time.
    ///
    /// The file itself is created by the first recorded exchange.
    pub fn open(directory: impl AsRef<Path>) -> Result<Self> {
        Self::open_at(directory, Local::now())
    }

    pub fn open_at(directory: impl AsRef<Path>, started: DateTime<Local>) -> Result<Self> {
        let directory = directory.as_ref();
        ensure_dir_exists(directory).with_context(|| {
            format!(
                "Failed to prepare transcript directory {}",
                directory.display()
            )
        })?;
        let path = directory.join(file_name_for(&started));
        debug!("Transcript file: {}", path.display());
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one user/assistant exchange.
    pub async fn record(&self, user_text: &str, assistant_text: &str) -> Result<()> {
        let now = Local::now();
        let user = TranscriptLine {
            speaker: Speaker::User,
            text: user_text.to_string(),
            timestamp: now,
        };
        let assistant = TranscriptLine {
            speaker: Speaker::Assistant,
            text: assistant_text.to_string(),
            timestamp: now,
        };
        let record = format!("{}\n{}\n\n", user, assistant);

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open transcript {}", self.path.display()))?;
        file.write_all(record.as_bytes())
            .await
            .with_context(|| format!("Failed to write transcript {}", self.path.display()))?;
        file.flush().await?;
        Ok(())
    }

    /// Waits for any in-flight write, then reports where the transcript lives.
    pub async fn close(&self) {
        let _guard = self.write_lock.lock().await;
        if self.path.exists() {
            info!("Conversation saved to {}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn file_name_follows_start_minute() {
        let started = Local.with_ymd_and_hms(2026, 10, 16, 9, 5, 42).unwrap();
        assert_eq!(file_name_for(&started), "Chat_2026-10-16_09-05.txt");
    }

    #[test]
    fn open_creates_missing_directory() -> Result<()> {
        let base = tempdir()?;
        let nested = base.path().join("logs/conversations");
        let log = TranscriptLog::open(&nested)?;
        assert!(nested.is_dir());
        assert!(log.path().starts_with(&nested));
        assert!(!log.path().exists(), "file appears only after the first record");
        Ok(())
    }

    #[test]
    fn line_display_flattens_newlines() {
        let line = TranscriptLine {
            speaker: Speaker::Assistant,
            text: "Première ligne\nSeconde ligne".to_string(),
            timestamp: Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        };
        assert_eq!(
            line.to_string(),
            "[03:04:05] Assistant: Première ligne Seconde ligne"
        );
    }

    #[tokio::test]
    async fn record_appends_two_line_entries() -> Result<()> {
        let dir = tempdir()?;
        let log = TranscriptLog::open(dir.path())?;

        log.record("Bonjour", "Bonjour ! Je suis là pour t'aider.").await?;
        log.record("Merci", "Avec plaisir.").await?;

        let content = std::fs::read_to_string(log.path())?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].ends_with("] Vous: Bonjour"));
        assert!(lines[1].ends_with("] Assistant: Bonjour ! Je suis là pour t'aider."));
        assert_eq!(lines[2], "");
        assert!(lines[3].ends_with("] Vous: Merci"));
        assert!(lines[4].ends_with("] Assistant: Avec plaisir."));
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_records_do_not_interleave() -> Result<()> {
        let dir = tempdir()?;
        let log = Arc::new(TranscriptLog::open(dir.path())?);

        let mut tasks = Vec::new();
        for i in 0..20 {
            let log = Arc::clone(&log);
            tasks.push(tokio::spawn(async move {
                log.record(&format!("question {}", i), &format!("réponse {}", i))
                    .await
            }));
        }
        for task in tasks {
            task.await??;
        }

        let content = std::fs::read_to_string(log.path())?;
        let records: Vec<&str> = content.split("\n\n").filter(|r| !r.is_empty()).collect();
        assert_eq!(records.len(), 20);
        for record in records {
            let lines: Vec<&str> = record.lines().collect();
            assert_eq!(lines.len(), 2);
            let n = lines[0].rsplit(' ').next().unwrap();
            assert!(lines[0].contains("Vous: question "));
            assert!(lines[1].ends_with(&format!("Assistant: réponse {}", n)));
        }
        Ok(())
    }
}
