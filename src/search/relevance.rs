//! Relevance scoring.
//!
//! Two independent heuristics:
//!
//! - **Session similarity**: fraction of pattern keywords from the query that
//!   appear verbatim in a stored session's error log.
//! - **Knowledge relevance**: fraction of query keywords that overlap
//!   (case-insensitive substring, either direction) with keywords from the
//!   entry's problem text, falling back to fixed scores when nothing overlaps.
//!
//! Both keep results scoring strictly above [`RELEVANCE_THRESHOLD`], sorted by
//! descending score with ties left in input order.

use super::keywords::{ExtractMode, extract_keywords};
use crate::models::{ErrorSession, KnowledgeEntry};
use serde::Serialize;

/// Results must score strictly above this to be returned.
pub const RELEVANCE_THRESHOLD: f64 = 0.3;

/// Fallback score when the query text contains the entry's error type.
pub const ERROR_TYPE_FALLBACK_SCORE: f64 = 0.4;

/// Fallback score when the query and problem prefixes contain one another.
pub const PREFIX_FALLBACK_SCORE: f64 = 0.5;

/// Fallback score when no other tier applies.
pub const BASELINE_FALLBACK_SCORE: f64 = 0.1;

/// Number of characters compared by the prefix fallback.
pub const PREFIX_WINDOW: usize = 200;

/// An item paired with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<T> {
    /// The scored item.
    pub item: T,
    /// Heuristic score between 0.0 and 1.0.
    pub score: f64,
}

/// Scores one session's error log against pattern keywords from a query.
///
/// Returns 0.0 when `keywords` is empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn session_similarity(error_log: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let matches = keywords
        .iter()
        .filter(|keyword| error_log.contains(keyword.as_str()))
        .count();
    matches as f64 / keywords.len() as f64
}

/// Scores one knowledge entry against a query.
///
/// `query_keywords` must come from [`extract_keywords`] in
/// [`ExtractMode::WithTokens`] over `query`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn knowledge_relevance(entry: &KnowledgeEntry, query_keywords: &[String], query: &str) -> f64 {
    let entry_keywords: Vec<String> = extract_keywords(entry.problem(), ExtractMode::WithTokens)
        .into_iter()
        .map(|k| k.to_lowercase())
        .collect();

    let match_count = query_keywords
        .iter()
        .filter(|keyword| {
            let keyword = keyword.to_lowercase();
            entry_keywords
                .iter()
                .any(|k| k.contains(&keyword) || keyword.contains(k.as_str()))
        })
        .count();

    if match_count > 0 {
        return match_count as f64 / query_keywords.len() as f64;
    }

    fallback_score(entry, query)
}

/// Scores an entry that shares no keywords with the query.
fn fallback_score(entry: &KnowledgeEntry, query: &str) -> f64 {
    if let Some(error_type) = entry.error_type()
        && query.contains(error_type)
    {
        return ERROR_TYPE_FALLBACK_SCORE;
    }

    let query_sample = prefix_lowercase(query);
    let problem_sample = prefix_lowercase(entry.problem());
    if query_sample.contains(&problem_sample) || problem_sample.contains(&query_sample) {
        return PREFIX_FALLBACK_SCORE;
    }

    BASELINE_FALLBACK_SCORE
}

/// First [`PREFIX_WINDOW`] characters, lower-cased.
fn prefix_lowercase(text: &str) -> String {
    text.chars()
        .take(PREFIX_WINDOW)
        .collect::<String>()
        .to_lowercase()
}

/// Ranks sessions by similarity to `error_log`.
#[must_use]
pub fn rank_sessions(error_log: &str, sessions: Vec<ErrorSession>) -> Vec<Ranked<ErrorSession>> {
    let keywords = extract_keywords(error_log, ExtractMode::PatternsOnly);
    let scored = sessions.into_iter().map(|session| {
        let score = session_similarity(session.error_log(), &keywords);
        Ranked {
            item: session,
            score,
        }
    });
    keep_relevant(scored)
}

/// Ranks knowledge entries by relevance to `error_log`.
#[must_use]
pub fn rank_knowledge(
    error_log: &str,
    entries: Vec<KnowledgeEntry>,
) -> Vec<Ranked<KnowledgeEntry>> {
    let keywords = extract_keywords(error_log, ExtractMode::WithTokens);
    let scored = entries.into_iter().map(|entry| {
        let score = knowledge_relevance(&entry, &keywords, error_log);
        Ranked { item: entry, score }
    });
    keep_relevant(scored)
}

/// Drops scores at or below the threshold and sorts the rest, stable on ties.
fn keep_relevant<T>(scored: impl Iterator<Item = Ranked<T>>) -> Vec<Ranked<T>> {
    let mut kept: Vec<Ranked<T>> = scored
        .filter(|ranked| ranked.score > RELEVANCE_THRESHOLD)
        .collect();
    kept.sort_by(|a, b| b.score.total_cmp(&a.score));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KnowledgeDraft, Record, keys};

    const SAMPLE: &str = "TypeError: Cannot read property 'foo' of undefined at app.js:10";

    fn session(id: &str, log: &str) -> ErrorSession {
        ErrorSession::from_record(
            Record::new()
                .with(keys::ID, id)
                .with(keys::ERROR_LOG, log),
        )
    }

    fn knowledge(problem: &str, error_type: Option<&str>) -> KnowledgeEntry {
        let mut draft = KnowledgeDraft::new("title", problem, "solution");
        if let Some(error_type) = error_type {
            draft = draft.with_error_type(error_type);
        }
        KnowledgeEntry::from_record(draft.into())
    }

    #[test]
    fn test_session_similarity_identical_log() {
        let keywords = extract_keywords(SAMPLE, ExtractMode::PatternsOnly);
        assert!((session_similarity(SAMPLE, &keywords) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_session_similarity_partial_and_empty() {
        let keywords = extract_keywords(SAMPLE, ExtractMode::PatternsOnly);
        let score = session_similarity("TypeError somewhere else", &keywords);
        assert!((score - 1.0 / 3.0).abs() < 1e-9);
        assert!(session_similarity(SAMPLE, &[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rank_sessions_threshold_and_order() {
        let sessions = vec![
            session("a", "TypeError somewhere else"),
            session("b", "TypeError: Cannot read property 'x'"),
            session("c", SAMPLE),
            session("d", "nothing in common"),
        ];
        let ranked = rank_sessions(SAMPLE, sessions);
        let ids: Vec<&str> = ranked.iter().map(|r| r.item.id()).collect();
        // a scores 1/3 which is above 0.3; d scores 0
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert!((ranked[0].score - 1.0).abs() < f64::EPSILON);
        assert!(ranked.iter().all(|r| r.score > RELEVANCE_THRESHOLD));
    }

    #[test]
    fn test_rank_sessions_ties_keep_input_order() {
        let sessions = vec![
            session("first", SAMPLE),
            session("second", SAMPLE),
            session("third", SAMPLE),
        ];
        let ranked = rank_sessions(SAMPLE, sessions);
        let ids: Vec<&str> = ranked.iter().map(|r| r.item.id()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rank_sessions_without_keywords_is_empty() {
        let ranked = rank_sessions("plain words only", vec![session("a", "plain words only")]);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_knowledge_keyword_overlap_is_case_insensitive() {
        let entry = knowledge("typeerror when reading USER", None);
        let query = "TypeError reading user";
        let keywords = extract_keywords(query, ExtractMode::WithTokens);
        assert_eq!(keywords.len(), 3);
        let score = knowledge_relevance(&entry, &keywords, query);
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_knowledge_fallback_error_type() {
        let entry = knowledge("zzzz qqqq", Some("Database Error"));
        let query = "got a Database Error yesterday";
        let keywords = extract_keywords(query, ExtractMode::WithTokens);
        let score = knowledge_relevance(&entry, &keywords, query);
        assert!((score - ERROR_TYPE_FALLBACK_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_knowledge_fallback_prefix_containment() {
        // no tokens longer than three characters, so no keywords at all
        let entry = knowledge("a b c", None);
        let query = "x a b c y";
        let keywords = extract_keywords(query, ExtractMode::WithTokens);
        assert!(keywords.is_empty());
        let score = knowledge_relevance(&entry, &keywords, query);
        assert!((score - PREFIX_FALLBACK_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_knowledge_error_type_tier_wins_over_prefix_tier() {
        let entry = knowledge("a b c", Some("b c"));
        let query = "x a b c y";
        let keywords = extract_keywords(query, ExtractMode::WithTokens);
        let score = knowledge_relevance(&entry, &keywords, query);
        assert!((score - ERROR_TYPE_FALLBACK_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_knowledge_fallback_baseline() {
        let entry = knowledge("zzzz qqqq", Some("Database Error"));
        let query = "wwww vvvv";
        let keywords = extract_keywords(query, ExtractMode::WithTokens);
        let score = knowledge_relevance(&entry, &keywords, query);
        assert!((score - BASELINE_FALLBACK_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_knowledge_empty_error_type_is_contained_in_any_query() {
        let entry = knowledge("zzzz qqqq", Some(""));
        let query = "wwww vvvv";
        let keywords = extract_keywords(query, ExtractMode::WithTokens);
        let score = knowledge_relevance(&entry, &keywords, query);
        assert!((score - ERROR_TYPE_FALLBACK_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_knowledge_missing_error_type_falls_through() {
        let entry = knowledge("zzzz qqqq", None);
        let query = "wwww vvvv";
        let keywords = extract_keywords(query, ExtractMode::WithTokens);
        let score = knowledge_relevance(&entry, &keywords, query);
        assert!((score - BASELINE_FALLBACK_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_prefix_window_is_200_chars() {
        let shared = "e".repeat(200);
        let entry = knowledge(&format!("{shared} tail of the problem"), None);
        let query = format!("{shared} different tail");
        let score = fallback_score(&entry, &query);
        assert!((score - PREFIX_FALLBACK_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rank_knowledge_drops_low_scores() {
        let entries = vec![
            knowledge("wwww vvvv", None),
            knowledge("zzzz qqqq", Some("Database Error")),
            knowledge("Database connection refused by server", None),
        ];
        let ranked = rank_knowledge("Database Error: connection refused", entries);
        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].score >= ranked[1].score);
        assert_eq!(ranked[0].item.problem(), "Database connection refused by server");
        assert!((ranked[1].score - ERROR_TYPE_FALLBACK_SCORE).abs() < f64::EPSILON);
    }
}
