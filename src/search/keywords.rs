//! Keyword extraction from free-text error logs.
//!
//! Each line is matched against the fixed error signatures in
//! [`ERROR_SIGNATURES`]. In [`ExtractMode::WithTokens`] every whitespace token
//! longer than three characters is kept as well. The result is deduplicated
//! and carries no meaningful order.

use super::patterns::{ERROR_SIGNATURES, TRAILING_PUNCTUATION};
use std::collections::HashSet;

/// Which keyword sources to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Error-signature patterns only. Used for session similarity.
    PatternsOnly,
    /// Patterns plus generic tokens. Used for knowledge relevance.
    WithTokens,
}

/// Extracts deduplicated keywords from `text`.
///
/// Pure and deterministic; performs no I/O.
#[must_use]
pub fn extract_keywords(text: &str, mode: ExtractMode) -> Vec<String> {
    let mut keywords = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |keyword: &str| {
        if seen.insert(keyword.to_string()) {
            keywords.push(keyword.to_string());
        }
    };

    for line in text.split('\n') {
        for pattern in ERROR_SIGNATURES.iter() {
            for captures in pattern.captures_iter(line) {
                if let Some(group) = captures.get(1) {
                    push(group.as_str().trim());
                }
            }
        }

        if mode == ExtractMode::WithTokens {
            for token in line.split_whitespace() {
                if token.chars().count() <= 3 {
                    continue;
                }
                let cleaned = token.trim_end_matches(TRAILING_PUNCTUATION);
                if cleaned.is_empty() {
                    continue;
                }
                push(cleaned);
            }
        }
    }

    keywords
}
