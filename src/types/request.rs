//! Answer request
//!
//! One question plus the two slider values, kept in range.

use std::ops::RangeInclusive;

/// Allowed number of bullet sentences in an answer
pub const SENTENCE_COUNT_RANGE: RangeInclusive<u32> = 1..=10;
pub const DEFAULT_SENTENCE_COUNT: u32 = 3;

/// Allowed new-token budget for one generation
pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 64..=512;
pub const MAX_TOKENS_STEP: u32 = 32;
pub const DEFAULT_MAX_TOKENS: u32 = 256;

/// A single question to the assistant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRequest {
    pub question: String,
    pub sentence_count: u32,
    pub max_tokens: u32,
}

impl AnswerRequest {
    /// Build a request, clamping both numbers into their slider ranges.
    ///
    /// `max_tokens` is also snapped down onto the slider step.
    pub fn new(question: impl Into<String>, sentence_count: u32, max_tokens: u32) -> Self {
        let sentence_count =
            sentence_count.clamp(*SENTENCE_COUNT_RANGE.start(), *SENTENCE_COUNT_RANGE.end());

        let min_tokens = *MAX_TOKENS_RANGE.start();
        let max_tokens = max_tokens.clamp(min_tokens, *MAX_TOKENS_RANGE.end());
        let max_tokens = min_tokens + (max_tokens - min_tokens) / MAX_TOKENS_STEP * MAX_TOKENS_STEP;

        Self {
            question: question.into(),
            sentence_count,
            max_tokens,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.question.trim().is_empty()
    }
}

impl Default for AnswerRequest {
    fn default() -> Self {
        Self::new(String::new(), DEFAULT_SENTENCE_COUNT, DEFAULT_MAX_TOKENS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_sliders() {
        let request = AnswerRequest::default();
        assert_eq!(request.sentence_count, 3);
        assert_eq!(request.max_tokens, 256);
        assert!(request.is_blank());
    }

    #[test]
    fn test_sentence_count_is_clamped() {
        assert_eq!(AnswerRequest::new("q", 0, 256).sentence_count, 1);
        assert_eq!(AnswerRequest::new("q", 42, 256).sentence_count, 10);
        assert_eq!(AnswerRequest::new("q", 7, 256).sentence_count, 7);
    }

    #[test]
    fn test_max_tokens_is_clamped_and_stepped() {
        assert_eq!(AnswerRequest::new("q", 3, 1).max_tokens, 64);
        assert_eq!(AnswerRequest::new("q", 3, 4096).max_tokens, 512);
        assert_eq!(AnswerRequest::new("q", 3, 100).max_tokens, 96);
        assert_eq!(AnswerRequest::new("q", 3, 512).max_tokens, 512);
    }

    #[test]
    fn test_blank_question() {
        assert!(AnswerRequest::new(" \t\n", 3, 256).is_blank());
        assert!(!AnswerRequest::new("I burned my hand", 3, 256).is_blank());
    }
}
