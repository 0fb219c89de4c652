//! Project documents derived from knowledge entries.
//!
//! Two markdown files are kept in step with the knowledge store:
//!
//! - the running notes document, which gets one full section per entry and
//!   is created with a header when missing
//! - the shared project document, which gets a short summary right after a
//!   heading marker, but only if the document already exists

use crate::config::DebugPaths;
use crate::models::KnowledgeEntry;
use crate::{Error, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Header written to a new notes document.
pub const NOTES_HEADER: &str = "# Implementation Notes\n\n";

/// Writes knowledge entries into the project's markdown documents.
#[derive(Debug, Clone)]
pub struct ProjectDocs {
    /// Running notes document.
    notes_file: PathBuf,
    /// Shared project document.
    shared_doc_file: PathBuf,
    /// Heading the summaries go under.
    marker: String,
}

/// Outcome of a shared document update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedDocUpdate {
    /// Summary inserted after the existing marker.
    Inserted,
    /// Marker was missing; it was appended along with the summary.
    MarkerAppended,
    /// Document does not exist; nothing written.
    Skipped,
}

impl ProjectDocs {
    /// Creates a writer for the documents in `paths`.
    #[must_use]
    pub fn new(paths: &DebugPaths) -> Self {
        Self {
            notes_file: paths.notes_file.clone(),
            shared_doc_file: paths.shared_doc_file.clone(),
            marker: paths.shared_doc_marker.clone(),
        }
    }

    /// Path of the notes document.
    #[must_use]
    pub fn notes_file(&self) -> &Path {
        &self.notes_file
    }

    /// Path of the shared document.
    #[must_use]
    pub fn shared_doc_file(&self) -> &Path {
        &self.shared_doc_file
    }

    /// Appends a section for `entry` to the notes document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document or its directory cannot be written.
    pub fn append_notes(&self, entry: &KnowledgeEntry) -> Result<()> {
        let mut content = if self.notes_file.exists() {
            read(&self.notes_file, "read_notes_file")?
        } else {
            if let Some(parent) = self.notes_file.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                    operation: "create_notes_dir".to_string(),
                    cause: format!("{}: {e}", parent.display()),
                })?;
            }
            NOTES_HEADER.to_string()
        };

        content.push_str(&render_notes_section(entry));
        write(&self.notes_file, &content, "write_notes_file")?;
        debug!(file = %self.notes_file.display(), "Updated notes document");
        Ok(())
    }

    /// Inserts a summary of `entry` into the shared document.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing document cannot be read or written.
    pub fn update_shared_doc(&self, entry: &KnowledgeEntry) -> Result<SharedDocUpdate> {
        if !self.shared_doc_file.exists() {
            return Ok(SharedDocUpdate::Skipped);
        }

        let content = read(&self.shared_doc_file, "read_shared_doc")?;
        let (updated, outcome) = insert_summary(&content, &self.marker, entry);
        write(&self.shared_doc_file, &updated, "write_shared_doc")?;
        debug!(file = %self.shared_doc_file.display(), ?outcome, "Updated shared document");
        Ok(outcome)
    }
}

/// Renders the full notes section for one entry.
#[must_use]
pub fn render_notes_section(entry: &KnowledgeEntry) -> String {
    let mut section = String::new();
    let _ = write!(section, "\n## {}\n\n", entry.title());
    let _ = write!(section, "### Problem\n{}\n\n", entry.problem());
    let _ = write!(section, "### Solution\n{}\n\n", entry.solution());

    let files = entry.related_files();
    if !files.is_empty() {
        section.push_str("### Related Files\n");
        for file in &files {
            let _ = writeln!(section, "- `{file}`");
        }
        section.push('\n');
    }

    let tags = entry.tags();
    if !tags.is_empty() {
        section.push_str("### Tags\n");
        let rendered: Vec<String> = tags.iter().map(|tag| format!("`{tag}`")).collect();
        section.push_str(&rendered.join(", "));
        section.push_str("\n\n");
    }

    let _ = write!(
        section,
        "### Added\n{}\n\n",
        entry.created_at_raw().unwrap_or_default()
    );
    section.push_str("---\n");
    section
}

/// Inserts a short summary of `entry` directly after `marker`.
///
/// When `marker` is absent it is appended first, so the summary lands at the
/// end of the document.
#[must_use]
pub fn insert_summary(
    content: &str,
    marker: &str,
    entry: &KnowledgeEntry,
) -> (String, SharedDocUpdate) {
    let (base, split_at, outcome) = match content.find(marker) {
        Some(index) => (
            content.to_string(),
            index + marker.len(),
            SharedDocUpdate::Inserted,
        ),
        None => {
            let appended = format!("{content}\n{marker}\n\n");
            let end = appended.len();
            (appended, end, SharedDocUpdate::MarkerAppended)
        },
    };

    let (head, tail) = base.split_at(split_at);
    let mut updated = String::with_capacity(base.len() + 256);
    updated.push_str(head);
    updated.push_str(&render_summary(entry));
    updated.push_str(tail);
    (updated, outcome)
}

/// Renders the short shared-document summary for one entry.
fn render_summary(entry: &KnowledgeEntry) -> String {
    let first_line = |text: &str| text.split('\n').next().unwrap_or_default().to_string();

    let mut summary = String::new();
    let _ = write!(summary, "\n\n### {}\n", entry.title());
    let _ = writeln!(summary, "- Problem: {}", first_line(entry.problem()));
    let _ = writeln!(summary, "- Solution: {}", first_line(entry.solution()));

    let files = entry.related_files();
    if let Some(first) = files.first() {
        let _ = write!(summary, "- Files: `{first}`");
        if files.len() > 1 {
            let _ = write!(summary, " and {} more", files.len() - 1);
        }
        summary.push('\n');
    }

    summary.push_str("- Note: refer to the solution above when this error comes up again\n");
    summary
}

fn read(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::OperationFailed {
        operation: operation.to_string(),
        cause: format!("{}: {e}", path.display()),
    })
}

fn write(path: &Path, content: &str, operation: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::OperationFailed {
        operation: operation.to_string(),
        cause: format!("{}: {e}", path.display()),
    })
}
