//! # Text Normalization
//!
//! File: cli/src/bot/normalize.rs
//!
//! Canonical form used for trigger matching: ASCII-folded, lowercase, no
//! punctuation, single spaces, no leading or trailing space.
//!
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Reduces `text` to its matching form.
///
/// The text is decomposed (NFKD) so accented letters become a base letter
/// followed by combining marks. The marks are dropped, as is anything still
/// outside ASCII afterwards. Every remaining character that is neither
/// alphanumeric nor whitespace is removed, letters are lowercased and runs of
/// whitespace collapse to a single space.
///
/// The function is idempotent: `normalize(&normalize(x)) == normalize(x)`.
///
/// ```
/// use causeur::bot::normalize::normalize;
///
/// assert_eq!(normalize("Raphaël Niamé"), normalize("raphael niame"));
/// assert_eq!(normalize("  Qui t'a   conçu ? "), "qui ta concu");
/// ```
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    folded.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}
