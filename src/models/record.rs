//! Record identifiers and the open, ordered record map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Reserved record keys as they appear on disk.
pub mod keys {
    /// Record id.
    pub const ID: &str = "id";
    /// Raw error log of a session.
    pub const ERROR_LOG: &str = "errorLog";
    /// Lifecycle status of a session.
    pub const STATUS: &str = "status";
    /// Short error classification.
    pub const ERROR_TYPE: &str = "errorType";
    /// Ordered list of related file paths.
    pub const RELATED_FILES: &str = "relatedFiles";
    /// Creation timestamp (RFC 3339).
    pub const CREATED_AT: &str = "createdAt";
    /// Knowledge title.
    pub const TITLE: &str = "title";
    /// Knowledge problem narrative.
    pub const PROBLEM: &str = "problem";
    /// Knowledge solution narrative.
    pub const SOLUTION: &str = "solution";
    /// Knowledge tags.
    pub const TAGS: &str = "tags";
    /// Set when an investigation starts.
    pub const INVESTIGATION_START_TIME: &str = "investigationStartTime";
    /// Set when a session is resolved.
    pub const RESOLVED_TIME: &str = "resolvedTime";
}

/// Identifier of a session or knowledge record.
///
/// The id is also the leading part of the record's file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a new record ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A stored record: an insertion-ordered map from string keys to JSON values.
///
/// Sessions and knowledge entries are views over this map. Keys outside the
/// reserved set in [`keys`] are kept verbatim, so callers can attach their own
/// fields through a merge and read them back later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value under `key` if it is a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns the string elements of the array under `key`.
    ///
    /// Missing keys, non-array values and non-string elements yield nothing.
    #[must_use]
    pub fn string_list(&self, key: &str) -> Vec<String> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Sets `key` to `value`. An existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder form of [`Record::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Shallow merge: every key of `partial` overwrites or extends this record.
    pub fn merge(&mut self, partial: Self) {
        for (key, value) in partial.0 {
            self.0.insert(key, value);
        }
    }

    /// Parses the `createdAt` field as an RFC 3339 timestamp.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.get_str(keys::CREATED_AT)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Number of keys in the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the record has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over keys and values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the record, returning the underlying map.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(crate::Error::InvalidInput(format!(
                "record must be a JSON object, got {other}"
            ))),
        }
    }
}

/// Formats a timestamp the way records store it: RFC 3339, UTC, milliseconds.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
