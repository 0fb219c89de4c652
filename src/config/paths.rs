//! Resolved on-disk locations.

use super::{DEFAULT_NOTES_FILE, DEFAULT_SHARED_DOC_FILE, DEFAULT_SHARED_DOC_MARKER};
use std::path::{Path, PathBuf};

/// Active sessions subdirectory.
pub const SESSIONS_DIR: &str = "sessions";

/// Archived sessions subdirectory.
pub const ARCHIVED_DIR: &str = "archived";

/// Knowledge entries subdirectory.
pub const KNOWLEDGE_DIR: &str = "knowledge";

/// Every location the stores read or write, fully resolved.
///
/// Built by [`CasefileConfig::paths`](super::CasefileConfig::paths) or directly
/// with [`DebugPaths::new`] for a given debug directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugPaths {
    /// Project root.
    pub project_root: PathBuf,
    /// Base debug directory.
    pub debug_dir: PathBuf,
    /// Active sessions.
    pub sessions_dir: PathBuf,
    /// Archived sessions.
    pub archived_dir: PathBuf,
    /// Knowledge entries.
    pub knowledge_dir: PathBuf,
    /// Running notes document.
    pub notes_file: PathBuf,
    /// Shared project document.
    pub shared_doc_file: PathBuf,
    /// Heading marker inside the shared document.
    pub shared_doc_marker: String,
}

impl DebugPaths {
    /// Lays out the store directories under `debug_dir`; the derived documents
    /// default to their standard names under `project_root`.
    #[must_use]
    pub fn new(project_root: impl AsRef<Path>, debug_dir: impl Into<PathBuf>) -> Self {
        let project_root = project_root.as_ref().to_path_buf();
        let debug_dir = debug_dir.into();
        Self {
            sessions_dir: debug_dir.join(SESSIONS_DIR),
            archived_dir: debug_dir.join(ARCHIVED_DIR),
            knowledge_dir: debug_dir.join(KNOWLEDGE_DIR),
            notes_file: project_root.join(DEFAULT_NOTES_FILE),
            shared_doc_file: project_root.join(DEFAULT_SHARED_DOC_FILE),
            shared_doc_marker: DEFAULT_SHARED_DOC_MARKER.to_string(),
            project_root,
            debug_dir,
        }
    }

    /// Standard layout for a project: `{root}/logs/debug`.
    #[must_use]
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        let root = project_root.as_ref();
        Self::new(root, root.join(super::DEFAULT_DEBUG_DIR))
    }

    /// Sets the notes document.
    #[must_use]
    pub fn with_notes_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.notes_file = path.into();
        self
    }

    /// Sets the shared document and its heading marker.
    #[must_use]
    pub fn with_shared_doc(mut self, path: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        self.shared_doc_file = path.into();
        self.shared_doc_marker = marker.into();
        self
    }
}
