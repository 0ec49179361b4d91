//! # Canned Responses
//!
//! File: cli/src/bot/canned.rs
//!
//! ## Overview
//!
//! A small ordered table of trigger phrases and fixed replies, checked before
//! anything is sent to the language model. Matching is deliberately loose: a
//! trigger fires when its normalized form appears anywhere inside the
//! normalized message, so "salut, bonjour à toi" still hits `bonjour`.
//!
//! When several triggers match, the first one in declared order wins. The
//! built-in table lists the longer, more specific phrasings before the short
//! ones they contain.
//!
use super::normalize::normalize;
use serde::Deserialize;

/// The reply given to every "who made you" variant.
const AUTHOR_REPLY: &str = "Raphaël Niamé (+225) 05 06 53 15 22.";

/// Built-in table, in matching order.
const BUILTIN_ENTRIES: &[(&str, &str)] = &[
    (
        "bonjour",
        "Bonjour ! Je suis là pour t'aider. Comment puis-je t'assister aujourd'hui ?",
    ),
    ("qui t'a conçu", AUTHOR_REPLY),
    (
        "comment vas tu",
        "Je vais bien, merci pour ton intérêt. Comment ça va pour toi ?",
    ),
    ("qui t'a fait", AUTHOR_REPLY),
    ("qui t'a créé", AUTHOR_REPLY),
    (
        "qui est raphael niamé",
        "C'est un développeur freelance d'applications.",
    ),
    (
        "raphael niamé",
        "C'est un développeur freelance d'applications.",
    ),
    (
        "qui est oulai",
        "C'est le père de Tchounatchou ou Djouniédjou.",
    ),
    ("oulai", "C'est le père de Tchounatchou ou Djouniédjou."),
    (
        "qui est diarrassouba soma",
        "C'est un célèbre agent immobilier.",
    ),
    ("qui soma", "C'est un célèbre agent immobilier."),
    ("diarrassouba", "C'est un célèbre agent immobilier."),
];

/// One trigger phrase and the reply it produces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CannedEntry {
    pub trigger: String,
    pub reply: String,
}

impl CannedEntry {
    pub fn new(trigger: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            reply: reply.into(),
        }
    }
}

/// Returns the reply of the first entry whose normalized trigger occurs in the
/// normalized `input`, or `None` when nothing matches.
///
/// This is the table-agnostic form of [`CannedTable::lookup`]; it normalizes
/// every trigger on each call.
pub fn lookup<'a>(input: &str, table: &'a [CannedEntry]) -> Option<&'a str> {
    let normalized_input = normalize(input);
    table
        .iter()
        .find(|entry| trigger_matches(&normalize(&entry.trigger), &normalized_input))
        .map(|entry| entry.reply.as_str())
}

fn trigger_matches(normalized_trigger: &str, normalized_input: &str) -> bool {
    // An empty trigger would otherwise match every message.
    !normalized_trigger.is_empty() && normalized_input.contains(normalized_trigger)
}

/// The process-wide table with triggers normalized once up front.
#[derive(Debug, Clone)]
pub struct CannedTable {
    entries: Vec<(String, CannedEntry)>,
}

impl CannedTable {
    pub fn new(entries: Vec<CannedEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (normalize(&entry.trigger), entry))
            .collect();
        Self { entries }
    }

    /// The table shipped with the application.
    pub fn builtin() -> Self {
        Self::new(builtin_entries())
    }

    /// Finds the first matching entry for a raw user message.
    pub fn lookup(&self, input: &str) -> Option<&CannedEntry> {
        let normalized_input = normalize(input);
        self.entries
            .iter()
            .find(|(trigger, _)| trigger_matches(trigger, &normalized_input))
            .map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CannedTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// The built-in entries as owned values, e.g. for merging with configuration.
pub fn builtin_entries() -> Vec<CannedEntry> {
    BUILTIN_ENTRIES
        .iter()
        .map(|(trigger, reply)| CannedEntry::new(*trigger, *reply))
        .collect()
}
