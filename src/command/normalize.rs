//! Utterance text normalization
//!
//! Speech recognizers routinely return homophones of what was said
//! ("by milk" for "buy milk"). Normalization lowercases the utterance and
//! rewrites each word through a fixed homophone table before any pattern
//! matching or title comparison happens.

/// Homophone and common-misspelling rewrites, applied word-by-word
///
/// No value here is itself a key, which keeps normalization idempotent.
const HOMOPHONES: &[(&str, &str)] = &[
    ("by", "buy"),
    ("bye", "buy"),
    ("bi", "buy"),
    ("to", "two"),
    ("too", "two"),
    ("their", "there"),
    ("they're", "there"),
    ("for", "four"),
    ("fore", "four"),
    ("hear", "here"),
    ("wright", "write"),
    ("rite", "write"),
    ("right", "write"),
    ("wood", "would"),
    ("weather", "whether"),
    ("meet", "meat"),
    ("mail", "male"),
    ("made", "maid"),
    ("higher", "hire"),
];

/// Lowercase and canonicalize an utterance
///
/// Splits on whitespace, rewrites each word found in the homophone
/// table, and rejoins with single spaces. Total and deterministic.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| {
            HOMOPHONES
                .iter()
                .find(|(from, _)| *from == word)
                .map_or(word, |(_, canonical)| *canonical)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
