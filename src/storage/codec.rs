//! Record codec.
//!
//! Converts records to and from their on-disk JSON form and builds the
//! `{id}-{fragment}.json` file names records are stored under.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use crate::models::{Record, RecordId};
use crate::{Error, Result};
use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

/// Maximum length, in characters, of a sanitized name fragment.
pub const MAX_NAME_LEN: usize = 50;

/// Characters kept from a long first line before the ellipsis is appended.
const SUMMARY_KEEP: usize = 47;

/// File extension of every record file.
pub const RECORD_EXTENSION: &str = "json";

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("static regex: unsafe filename chars"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex: whitespace run"));

/// Serializes a record as 2-space indented JSON.
pub fn serialize(record: &Record) -> Result<String> {
    serde_json::to_string_pretty(record).map_err(|e| Error::operation("serialize_record", e))
}

/// Parses a record from JSON text. The top level must be an object.
pub fn deserialize(text: &str) -> Result<Record> {
    serde_json::from_str(text).map_err(|e| Error::operation("deserialize_record", e))
}

/// Makes `text` safe for use inside a file name.
///
/// Replaces `< > : " / \ | ? *` with `_`, collapses whitespace runs to a single
/// `_`, then truncates to [`MAX_NAME_LEN`] characters.
#[must_use]
pub fn sanitize_name(text: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(text, "_");
    let collapsed = WHITESPACE_RUN.replace_all(&replaced, "_");
    collapsed.chars().take(MAX_NAME_LEN).collect()
}

/// Builds a short display fragment from the first line of an error log.
///
/// Lines longer than 50 characters keep their first 47 characters plus `...`.
#[must_use]
pub fn summarize_first_line(error_log: &str) -> String {
    let first_line = error_log.split('\n').next().unwrap_or_default().trim();
    if first_line.chars().count() > MAX_NAME_LEN {
        let head: String = first_line.chars().take(SUMMARY_KEEP).collect();
        format!("{head}...")
    } else {
        first_line.to_string()
    }
}

/// Returns the file name a record with `id` is stored under.
#[must_use]
pub fn record_file_name(id: &str, fragment: &str) -> String {
    format!("{id}-{}.{RECORD_EXTENSION}", sanitize_name(fragment))
}

/// Returns the file-name prefix that identifies records with `id`.
#[must_use]
pub fn record_prefix(id: &str) -> String {
    format!("{id}-")
}

/// Formats a number in lowercase base36.
#[must_use]
pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        // value % 36 always fits in usize
        #[allow(clippy::cast_possible_truncation)]
        let digit = (value % 36) as usize;
        digits.push(BASE36_DIGITS[digit]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Returns `len` random lowercase base36 characters.
#[must_use]
pub fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(BASE36_DIGITS[rng.gen_range(0..BASE36_DIGITS.len())]))
        .collect()
}

/// Generates a session id: `{base36(epoch ms)}-{4 random base36 chars}`.
///
/// There is no collision check against existing records.
#[must_use]
pub fn generate_session_id() -> RecordId {
    RecordId::new(format!(
        "{}-{}",
        to_base36(crate::current_timestamp_millis()),
        random_base36(4)
    ))
}

/// Generates a knowledge id: `k-{base36(epoch ms)}-{3 random base36 chars}`.
#[must_use]
pub fn generate_knowledge_id() -> RecordId {
    RecordId::new(format!(
        "k-{}-{}",
        to_base36(crate::current_timestamp_millis()),
        random_base36(3)
    ))
}

/// Checks that an id can be used as a file-name prefix.
///
/// Rejects empty ids, path separators and `..`.
#[must_use]
pub fn is_safe_id(id: &str) -> bool {
    !id.trim().is_empty()
        && !id.contains(['/', '\\', '\0'])
        && !id.contains("..")
        && id.len() <= 128
}
