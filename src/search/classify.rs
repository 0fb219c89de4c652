//! Coarse error classification.

use super::patterns::{ERROR_TYPE_SIGNATURES, UNKNOWN_ERROR_TYPE};

/// Labels an error log with the first matching error type.
///
/// Signatures are tried in a fixed order, so a log mentioning both a
/// `TypeError` and a timeout is a "Syntax Error". Falls back to
/// [`UNKNOWN_ERROR_TYPE`].
#[must_use]
pub fn classify_error_type(error_log: &str) -> &'static str {
    ERROR_TYPE_SIGNATURES
        .iter()
        .find(|signature| signature.pattern.is_match(error_log))
        .map_or(UNKNOWN_ERROR_TYPE, |signature| signature.error_type)
}
