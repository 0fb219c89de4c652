//! Error session store.
//!
//! Sessions live one file per record in an active directory until they are
//! archived, either explicitly or by the [`LifecycleSweeper`] that runs from
//! [`SessionStore::initialize`].
//!
//! There is no record-level locking. Two callers updating or archiving the
//! same id concurrently race and the last write wins.

use super::newest_first;
use crate::config::DebugPaths;
use crate::gc::{LifecycleSweeper, SweepResult};
use crate::models::{ErrorSession, Record, RecordId, SessionStatus, format_timestamp, keys};
use crate::search::{Ranked, rank_sessions};
use crate::storage::{RecordDirectory, RecordFile, codec};
use crate::{Error, Result};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Record kind used in errors and logs.
const KIND: &str = "session";

/// Store for error-investigation sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// Active sessions.
    active: RecordDirectory,
    /// Archived sessions.
    archived: RecordDirectory,
}

impl SessionStore {
    /// Creates a store over the session directories in `paths`.
    ///
    /// Nothing is touched on disk until [`initialize`](Self::initialize).
    #[must_use]
    pub fn new(paths: &DebugPaths) -> Self {
        Self {
            active: RecordDirectory::new(&paths.sessions_dir, KIND),
            archived: RecordDirectory::new(&paths.archived_dir, KIND),
        }
    }

    /// Creates both directories and archives stale sessions.
    ///
    /// Safe to call repeatedly; each call sweeps again.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created or listed.
    pub fn initialize(&self) -> Result<SweepResult> {
        self.active.ensure()?;
        self.archived.ensure()?;
        LifecycleSweeper::new().sweep(self)
    }

    /// Directory of active sessions.
    #[must_use]
    pub const fn active_records(&self) -> &RecordDirectory {
        &self.active
    }

    /// Directory of archived sessions.
    #[must_use]
    pub const fn archived_records(&self) -> &RecordDirectory {
        &self.archived
    }

    /// Creates a new session for `error_log`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the log is empty or whitespace, or
    /// an error if the record cannot be written.
    #[instrument(
        name = "casefile.session.create",
        skip(self, error_log),
        fields(component = "session", operation = "create", session_id = tracing::field::Empty)
    )]
    pub fn create(&self, error_log: &str) -> Result<RecordId> {
        if error_log.trim().is_empty() {
            return Err(Error::InvalidInput("Error log cannot be empty".to_string()));
        }

        let id = codec::generate_session_id();
        tracing::Span::current().record("session_id", id.as_str());

        let record = Record::new()
            .with(keys::ID, id.as_str())
            .with(keys::ERROR_LOG, error_log)
            .with(keys::STATUS, SessionStatus::New.as_str())
            .with(keys::CREATED_AT, format_timestamp(Utc::now()));

        let file_name = codec::record_file_name(id.as_str(), &codec::summarize_first_line(error_log));
        self.active.ensure()?;
        self.active.write(&file_name, &record)?;

        metrics::counter!("casefile_sessions_created_total").increment(1);
        info!(session_id = %id, file = %file_name, "Created session");
        Ok(id)
    }

    /// Looks up an active session. Unreadable records come back as `None`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<ErrorSession> {
        self.active
            .find(id)
            .map(|(_, record)| ErrorSession::from_record(record))
    }

    /// Looks up an archived session.
    #[must_use]
    pub fn get_archived(&self, id: &str) -> Option<ErrorSession> {
        self.archived
            .find(id)
            .map(|(_, record)| ErrorSession::from_record(record))
    }

    /// Shallow-merges `partial` into the session and rewrites its file in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no active session has this id, or an
    /// error if the record cannot be read or written.
    #[instrument(
        name = "casefile.session.update",
        skip(self, partial),
        fields(component = "session", operation = "update", field_count = partial.len())
    )]
    pub fn update(&self, id: &str, partial: Record) -> Result<()> {
        let (file, mut record) = self.load_active(id)?;
        record.merge(partial);
        self.active.write(&file.file_name, &record)?;
        debug!(session_id = id, "Updated session");
        Ok(())
    }

    /// Appends file paths to `relatedFiles`, skipping ones already listed.
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    pub fn add_related_files<I, S>(&self, id: &str, files: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (file, mut record) = self.load_active(id)?;
        let mut related = record.string_list(keys::RELATED_FILES);
        for path in files {
            let path = path.into();
            if !related.contains(&path) {
                related.push(path);
            }
        }
        record.set(keys::RELATED_FILES, Value::from(related));
        self.active.write(&file.file_name, &record)?;
        Ok(())
    }

    /// Moves a session to the archive with `status` set to `archived`.
    ///
    /// The archived copy is written before the active file is deleted. If the
    /// delete fails the session exists in both places and the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no active session has this id, or an
    /// error if the copy or delete fails.
    #[instrument(
        name = "casefile.session.archive",
        skip(self),
        fields(component = "session", operation = "archive")
    )]
    pub fn archive(&self, id: &str) -> Result<()> {
        let (file, mut record) = self.load_active(id)?;
        record.set(keys::STATUS, SessionStatus::Archived.as_str());

        self.archived.ensure()?;
        self.archived.write(&file.file_name, &record)?;
        self.active.remove(&file)?;

        metrics::counter!("casefile_sessions_archived_total").increment(1);
        info!(session_id = id, file = %file.file_name, "Archived session");
        Ok(())
    }

    /// All active sessions, newest first.
    #[must_use]
    pub fn list_all(&self) -> Vec<ErrorSession> {
        Self::sorted(&self.active)
    }

    /// All archived sessions, newest first.
    #[must_use]
    pub fn list_archived(&self) -> Vec<ErrorSession> {
        Self::sorted(&self.archived)
    }

    /// Active sessions similar to `error_log`, best match first.
    #[must_use]
    pub fn find_similar(&self, error_log: &str) -> Vec<ErrorSession> {
        self.find_similar_scored(error_log)
            .into_iter()
            .map(|ranked| ranked.item)
            .collect()
    }

    /// Like [`find_similar`](Self::find_similar), keeping the scores.
    #[must_use]
    pub fn find_similar_scored(&self, error_log: &str) -> Vec<Ranked<ErrorSession>> {
        rank_sessions(error_log, self.list_all())
    }

    /// Resolves and reads an active session for a write path.
    fn load_active(&self, id: &str) -> Result<(RecordFile, Record)> {
        let file = self.active.resolve(id)?.ok_or_else(|| Error::NotFound {
            kind: KIND,
            id: id.to_string(),
        })?;
        let record = self.active.read(&file)?;
        Ok((file, record))
    }

    fn sorted(dir: &RecordDirectory) -> Vec<ErrorSession> {
        let mut sessions: Vec<ErrorSession> = dir
            .load_all()
            .into_iter()
            .map(ErrorSession::from_record)
            .collect();
        newest_first(&mut sessions, ErrorSession::created_at);
        sessions
    }
}
