//! # Casefile
//!
//! Debug session and knowledge store for error investigations.
//!
//! Casefile keeps pasted error logs as *sessions* and curated problem/solution
//! notes as *knowledge entries*, one JSON file per record, and finds earlier
//! sessions and notes that look related to a new error log.
//!
//! ## Layout
//!
//! - [`storage`]: record codec and directory-backed record access
//! - [`search`]: keyword extraction, relevance scoring, error-type classification
//! - [`services`]: session store, knowledge store, investigation workflow
//! - [`gc`]: the startup sweep that archives stale sessions
//!
//! ## Example
//!
//! ```rust,ignore
//! use casefile::config::CasefileConfig;
//! use casefile::services::{KnowledgeStore, SessionStore};
//!
//! let paths = CasefileConfig::new().with_project_root("/path/to/project").paths();
//! let sessions = SessionStore::new(&paths);
//! sessions.initialize()?;
//!
//! let id = sessions.create("TypeError: Cannot read property 'foo' of undefined")?;
//! let similar = sessions.find_similar("TypeError: Cannot read property 'bar'");
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod cli;
pub mod config;
pub mod gc;
pub mod models;
pub mod observability;
pub mod search;
pub mod services;
pub mod storage;

pub use config::{CasefileConfig, DebugPaths};
pub use gc::{LifecycleSweeper, SweepResult};
pub use models::{
    ErrorSession, KnowledgeDraft, KnowledgeEntry, KnowledgeFilter, Record, RecordId,
    SessionStatus,
};
pub use search::{ExtractMode, Ranked, classify_error_type, extract_keywords};
pub use services::{Investigation, InvestigationService, KnowledgeStore, SessionStore};

/// Error type for casefile operations.
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Empty error log, empty knowledge title/problem/solution |
/// | `NotFound` | `update`/`archive` on an id with no matching record file |
/// | `OperationFailed` | I/O or (de)serialization failures on a write path |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised before any filesystem access takes place.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A record required by a write operation does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The kind of record that was looked up (`session`, `knowledge`).
        kind: &'static str,
        /// The id that failed to resolve.
        id: String,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - A record or derived document cannot be written or removed
    /// - A directory cannot be created or listed
    /// - A record cannot be serialized
    /// - A configuration file cannot be read or parsed
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from an operation name and any displayable cause.
    pub fn operation(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }

    /// Returns `true` if this is a [`Error::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for casefile operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in milliseconds.
///
/// Falls back to 0 if the system clock is before the Unix epoch.
#[must_use]
pub fn current_timestamp_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
