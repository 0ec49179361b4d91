//! # Reply Post-Processing
//!
//! File: cli/src/bot/postprocess.rs
//!
//! Raw model output often carries leftovers of the prompt format (`</s>`,
//! `[/INST]`, role markers, an "Assistant :" prefix). `clean_reply` removes
//! them and bounds the length of what reaches the user.
//!
use regex::Regex;
use std::sync::OnceLock;

/// Shown when the model produced nothing usable.
pub const DEFAULT_REPLY: &str = "Désolé, je n'ai pas pu générer une réponse appropriée.";

/// Appended to replies cut at the length cap.
pub const ELLIPSIS: &str = "...";

/// Format tokens removed wherever they appear.
pub const DELIMITERS: &[&str] = &[
    "<s>",
    "</s>",
    "[INST]",
    "[/INST]",
    "<<SYS>>",
    "<</SYS>>",
    "<|system|>",
    "<|user|>",
    "<|assistant|>",
    "<|end|>",
    "<|endoftext|>",
];

fn role_prefix() -> &'static Regex {
    static ROLE_PREFIX: OnceLock<Regex> = OnceLock::new();
    ROLE_PREFIX.get_or_init(|| {
        Regex::new(r"(?i)^\s*(assistant|réponse|reponse|answer|bot)\s*:\s*")
            .expect("role prefix pattern is valid")
    })
}

/// Length bounds applied to generated replies, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyLimits {
    /// Replies shorter than this are replaced by [`DEFAULT_REPLY`].
    pub min_chars: usize,
    /// Replies longer than this are cut and get [`ELLIPSIS`] appended.
    pub max_chars: usize,
}

impl Default for ReplyLimits {
    fn default() -> Self {
        Self {
            min_chars: 3,
            max_chars: 500,
        }
    }
}

/// Turns raw generated text into the reply shown to the user.
pub fn clean_reply(raw: &str, limits: &ReplyLimits) -> String {
    let mut text = strip_delimiters(raw.trim());
    text = role_prefix().replace(&text, "").trim().to_string();

    let length = text.chars().count();
    if length < limits.min_chars {
        return DEFAULT_REPLY.to_string();
    }
    if length > limits.max_chars {
        let mut truncated: String = text.chars().take(limits.max_chars).collect();
        truncated.push_str(ELLIPSIS);
        return truncated;
    }
    text
}

/// Removes every delimiter token, repeating until none is left so that
/// removals cannot splice a new delimiter together.
fn strip_delimiters(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let mut changed = false;
        for delimiter in DELIMITERS {
            if current.contains(delimiter) {
                current = current.replace(delimiter, "");
                changed = true;
            }
        }
        if !changed {
            return current.trim().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(raw: &str) -> String {
        clean_reply(raw, &ReplyLimits::default())
    }

    #[test]
    fn plain_answer_is_only_trimmed() {
        assert_eq!(
            clean("  Paris est la capitale de la France.\n"),
            "Paris est la capitale de la France."
        );
    }

    #[test]
    fn strips_stop_sequences_anywhere() {
        assert_eq!(clean("Paris.</s>"), "Paris.");
        assert_eq!(clean("<s> Bonjour </s></s>"), "Bonjour");
        let cleaned = clean("[INST] question [/INST] Voici la réponse.</s>");
        for delimiter in DELIMITERS {
            assert!(!cleaned.contains(delimiter), "{} left in {:?}", delimiter, cleaned);
        }
    }

    #[test]
    fn strips_role_markers() {
        let cleaned = clean("<|assistant|>\nLa Loire est le plus long fleuve.<|end|>\n<|user|>");
        assert_eq!(cleaned, "La Loire est le plus long fleuve.");
    }

    #[test]
    fn nested_delimiters_do_not_survive() {
        let cleaned = clean("Oui <</s>s> d'accord");
        assert!(!cleaned.contains("<s>"));
        assert!(!cleaned.contains("</s>"));
    }

    #[test]
    fn strips_leading_role_prefix() {
        assert_eq!(clean("Assistant : Il fait beau."), "Il fait beau.");
        assert_eq!(clean("Réponse: Douze."), "Douze.");
        assert_eq!(clean("answer:  Yes it is."), "Yes it is.");
        // Only a leading prefix is removed.
        assert_eq!(
            clean("Le mot assistant: un nom."),
            "Le mot assistant: un nom."
        );
    }

    #[test]
    fn empty_or_tiny_output_yields_default() {
        assert_eq!(clean(""), DEFAULT_REPLY);
        assert_eq!(clean("   "), DEFAULT_REPLY);
        assert_eq!(clean("a"), DEFAULT_REPLY);
        assert_eq!(clean("ok"), DEFAULT_REPLY);
        assert_eq!(clean("</s>"), DEFAULT_REPLY);
        assert_eq!(clean("Assistant:"), DEFAULT_REPLY);
        assert_eq!(clean("oui"), "oui");
    }

    #[test]
    fn long_output_is_truncated_with_marker() {
        let raw = "a".repeat(501);
        let cleaned = clean(&raw);
        assert_eq!(cleaned.chars().count(), 500 + ELLIPSIS.chars().count());
        assert!(cleaned.ends_with(ELLIPSIS));
        assert!(cleaned.starts_with(&"a".repeat(500)));
    }

    #[test]
    fn output_at_the_cap_is_kept_whole() {
        let raw = "b".repeat(500);
        assert_eq!(clean(&raw), raw);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let raw = "é".repeat(600);
        let cleaned = clean(&raw);
        assert_eq!(cleaned.chars().count(), 503);
    }

    #[test]
    fn custom_limits_are_honored() {
        let limits = ReplyLimits {
            min_chars: 1,
            max_chars: 5,
        };
        assert_eq!(clean_reply("x", &limits), "x");
        assert_eq!(clean_reply("abcdefgh", &limits), "abcde...");
    }
}
