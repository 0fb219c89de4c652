//! Error session view and status.

use super::record::{Record, keys};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an error session.
///
/// The on-disk value is an open string; [`SessionStatus::parse`] returns `None`
/// for anything outside the four known states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Freshly created.
    New,
    /// Someone is looking at it.
    Investigating,
    /// A solution was found.
    Resolved,
    /// Moved to the archived directory.
    Archived,
}

impl SessionStatus {
    /// Returns the on-disk string for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Investigating => "investigating",
            Self::Resolved => "resolved",
            Self::Archived => "archived",
        }
    }

    /// Parses a status string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "new" => Some(Self::New),
            "investigating" => Some(Self::Investigating),
            "resolved" => Some(Self::Resolved),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single error-investigation record tied to one pasted error log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorSession {
    record: Record,
}

impl ErrorSession {
    /// Wraps a stored record.
    #[must_use]
    pub const fn from_record(record: Record) -> Self {
        Self { record }
    }

    /// Session id, or an empty string if the record has none.
    #[must_use]
    pub fn id(&self) -> &str {
        self.record.get_str(keys::ID).unwrap_or_default()
    }

    /// Raw error log.
    #[must_use]
    pub fn error_log(&self) -> &str {
        self.record.get_str(keys::ERROR_LOG).unwrap_or_default()
    }

    /// Raw status string.
    #[must_use]
    pub fn status_str(&self) -> &str {
        self.record.get_str(keys::STATUS).unwrap_or_default()
    }

    /// Parsed status, if it is one of the known states.
    #[must_use]
    pub fn status(&self) -> Option<SessionStatus> {
        SessionStatus::parse(self.status_str())
    }

    /// Error classification, if set.
    #[must_use]
    pub fn error_type(&self) -> Option<&str> {
        self.record.get_str(keys::ERROR_TYPE)
    }

    /// Related file paths in insertion order.
    #[must_use]
    pub fn related_files(&self) -> Vec<String> {
        self.record.string_list(keys::RELATED_FILES)
    }

    /// Raw `createdAt` string.
    #[must_use]
    pub fn created_at_raw(&self) -> Option<&str> {
        self.record.get_str(keys::CREATED_AT)
    }

    /// Parsed creation time.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.record.created_at()
    }

    /// The full underlying record, including free-form fields.
    #[must_use]
    pub const fn record(&self) -> &Record {
        &self.record
    }

    /// Consumes the session, returning its record.
    #[must_use]
    pub fn into_record(self) -> Record {
        self.record
    }
}
