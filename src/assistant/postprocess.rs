//! Cleanup of raw model output
//!
//! Turns decoded text into at most `n` bullet sentences. The splitter and
//! the meta-phrase list are plain data so they can be tuned on their own.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker the model sometimes echoes from the template
pub const ANSWER_MARKER: &str = "Answer:";

/// Sentence boundary: whitespace right after `.`, `!` or `?`.
///
/// `regex` has no look-behind, so the punctuation is captured and kept
/// with the sentence it ends.
pub const SENTENCE_SPLIT_PATTERN: &str = r"([.!?])\s+";

/// Lowercase phrases that mark a sentence as leaked template text
pub const META_PHRASES: &[&str] = &[
    "your explanation should",
    "you should explain",
    "do not mention these instructions",
    "in your answer",
    "explain the answer",
];

pub const BULLET: &str = "- ";

const TERMINAL_PUNCTUATION: [char; 3] = ['.', '!', '?'];

static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(SENTENCE_SPLIT_PATTERN).expect("sentence split pattern is valid")
});

/// Keep only what follows the first `Answer:` marker, if any.
pub fn strip_answer_marker(text: &str) -> &str {
    match text.split_once(ANSWER_MARKER) {
        Some((_, rest)) => rest.trim(),
        None => text,
    }
}

/// Split text into trimmed, non-empty sentences.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for caps in SENTENCE_SPLIT.captures_iter(text) {
        let (Some(whole), Some(punct)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        sentences.push(&text[start..punct.end()]);
        start = whole.end();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when the sentence leaks instructions instead of answering.
pub fn is_meta(sentence: &str) -> bool {
    let lower = sentence.to_lowercase();
    META_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Full cleanup: marker strip, split, meta filter, truncate, bullet.
///
/// Returns `None` when nothing usable is left.
pub fn postprocess(text: &str, sentence_count: usize) -> Option<String> {
    let text = strip_answer_marker(text.trim());

    let bullets: Vec<String> = split_sentences(text)
        .into_iter()
        .filter(|s| !is_meta(s))
        .take(sentence_count)
        .map(|s| format!("{BULLET}{s}"))
        .collect();

    let mut result = bullets.join("\n").trim().to_string();
    if result.is_empty() {
        return None;
    }
    if !result.ends_with(TERMINAL_PUNCTUATION) {
        result.push('.');
    }
    Some(result)
}
