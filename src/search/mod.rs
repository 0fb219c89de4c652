//! Keyword extraction and relevance heuristics.
//!
//! Nothing here touches the filesystem; the stores in
//! [`crate::services`] load records and hand them to these functions.

mod classify;
mod keywords;
mod patterns;
mod relevance;

pub use classify::classify_error_type;
pub use keywords::{ExtractMode, extract_keywords};
pub use patterns::UNKNOWN_ERROR_TYPE;
pub use relevance::{
    BASELINE_FALLBACK_SCORE, ERROR_TYPE_FALLBACK_SCORE, PREFIX_FALLBACK_SCORE, RELEVANCE_THRESHOLD,
    Ranked, knowledge_relevance, rank_knowledge, rank_sessions, session_similarity,
};
