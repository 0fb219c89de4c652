//! Investigation workflow.
//!
//! Opening an investigation creates a session for the pasted error log,
//! classifies it, and gathers everything already known about similar errors.
//! The resulting brief is what gets handed to the assistant that works on the
//! fix.

use super::{KnowledgeStore, SessionStore};
use crate::models::{ErrorSession, KnowledgeEntry, Record, RecordId, SessionStatus};
use crate::models::{format_timestamp, keys};
use crate::search::{Ranked, classify_error_type};
use crate::{Error, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};

/// Everything gathered when an investigation is opened.
#[derive(Debug, Clone, Serialize)]
pub struct Investigation {
    /// The new session, as stored after classification.
    pub session: ErrorSession,
    /// Classified error type.
    pub error_type: String,
    /// Earlier sessions with a similar log.
    pub similar: Vec<Ranked<ErrorSession>>,
    /// Knowledge entries related to the log.
    pub related: Vec<Ranked<KnowledgeEntry>>,
    /// Markdown brief for the assistant.
    pub brief: String,
}

impl Investigation {
    /// Id of the new session.
    #[must_use]
    pub fn id(&self) -> &str {
        self.session.id()
    }
}

/// Runs investigations over a session store and a knowledge store.
#[derive(Debug, Clone)]
pub struct InvestigationService {
    sessions: SessionStore,
    knowledge: KnowledgeStore,
}

impl InvestigationService {
    /// Creates a service over both stores.
    #[must_use]
    pub const fn new(sessions: SessionStore, knowledge: KnowledgeStore) -> Self {
        Self {
            sessions,
            knowledge,
        }
    }

    /// The session store.
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// The knowledge store.
    #[must_use]
    pub const fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    /// Opens an investigation for `error_log`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank log, or an error if the
    /// session cannot be created or updated.
    #[instrument(
        name = "casefile.investigation.open",
        skip(self, error_log),
        fields(component = "investigation", operation = "open")
    )]
    pub fn open(&self, error_log: &str) -> Result<Investigation> {
        if error_log.trim().is_empty() {
            return Err(Error::InvalidInput("Error log cannot be empty".to_string()));
        }

        let id = self.sessions.create(error_log)?;
        let error_type = classify_error_type(error_log);
        self.sessions.update(
            id.as_str(),
            Record::new()
                .with(keys::ERROR_TYPE, error_type)
                .with(keys::STATUS, SessionStatus::Investigating.as_str())
                .with(keys::INVESTIGATION_START_TIME, format_timestamp(Utc::now())),
        )?;

        let session = self.sessions.get(id.as_str()).ok_or_else(|| Error::NotFound {
            kind: "session",
            id: id.to_string(),
        })?;

        let similar: Vec<Ranked<ErrorSession>> = self
            .sessions
            .find_similar_scored(error_log)
            .into_iter()
            .filter(|ranked| ranked.item.id() != id.as_str())
            .collect();
        let related = self.knowledge.find_related_scored(error_log, None);

        info!(
            session_id = %id,
            error_type,
            similar = similar.len(),
            related = related.len(),
            "Opened investigation"
        );

        Ok(Investigation {
            session,
            error_type: error_type.to_string(),
            similar,
            related,
            brief: render_brief(error_log),
        })
    }

    /// Marks a session resolved with its solution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the session does not exist.
    pub fn resolve(&self, id: &str, solution: &str) -> Result<()> {
        self.sessions.update(
            id,
            Record::new()
                .with(keys::STATUS, SessionStatus::Resolved.as_str())
                .with(keys::RESOLVED_TIME, format_timestamp(Utc::now()))
                .with(keys::SOLUTION, solution),
        )
    }

    /// Records what was learned as a knowledge entry.
    ///
    /// # Errors
    ///
    /// Same as [`KnowledgeStore::add`].
    pub fn record_knowledge(&self, entry: impl Into<Record>) -> Result<RecordId> {
        self.knowledge.add(entry)
    }
}

/// Builds the markdown brief for an error log.
#[must_use]
pub fn render_brief(error_log: &str) -> String {
    format!("# Error Information\n\n```\n{error_log}\n```\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DebugPaths;
    use crate::models::KnowledgeDraft;
    use tempfile::TempDir;

    const LOG: &str = "TypeError: Cannot read property 'foo' of undefined at app.js:10";

    fn service() -> (TempDir, InvestigationService) {
        let tmp = TempDir::new().unwrap();
        let paths = DebugPaths::for_project(tmp.path());
        let sessions = SessionStore::new(&paths);
        let knowledge = KnowledgeStore::new(&paths);
        sessions.initialize().unwrap();
        knowledge.initialize().unwrap();
        (tmp, InvestigationService::new(sessions, knowledge))
    }

    #[test]
    fn test_render_brief() {
        assert_eq!(render_brief("boom"), "# Error Information\n\n```\nboom\n```\n\n");
    }

    #[test]
    fn test_open_classifies_and_marks_investigating() {
        let (_tmp, service) = service();
        let investigation = service.open(LOG).unwrap();

        assert_eq!(investigation.error_type, "Syntax Error");
        assert_eq!(investigation.session.status(), Some(SessionStatus::Investigating));
        assert_eq!(investigation.session.error_type(), Some("Syntax Error"));
        assert!(
            investigation
                .session
                .record()
                .contains_key(keys::INVESTIGATION_START_TIME)
        );
        assert!(investigation.similar.is_empty());
        assert!(investigation.brief.contains(LOG));
    }

    #[test]
    fn test_open_excludes_new_session_from_similar() {
        let (_tmp, service) = service();
        let first = service.open(LOG).unwrap();
        let second = service.open(LOG).unwrap();

        assert_eq!(second.similar.len(), 1);
        assert_eq!(second.similar[0].item.id(), first.id());
    }

    #[test]
    fn test_open_rejects_blank_log() {
        let (_tmp, service) = service();
        assert!(matches!(service.open(" "), Err(Error::InvalidInput(_))));
        assert!(service.sessions().list_all().is_empty());
    }

    #[test]
    fn test_resolve_and_record_knowledge() {
        let (_tmp, service) = service();
        let investigation = service.open(LOG).unwrap();
        service.resolve(investigation.id(), "check foo first").unwrap();

        let session = service.sessions().get(investigation.id()).unwrap();
        assert_eq!(session.status(), Some(SessionStatus::Resolved));
        assert_eq!(session.record().get_str(keys::SOLUTION), Some("check foo first"));
        assert!(session.record().contains_key(keys::RESOLVED_TIME));

        service
            .record_knowledge(
                KnowledgeDraft::new("foo missing", LOG, "check foo first")
                    .with_error_type("Syntax Error"),
            )
            .unwrap();
        let again = service.open(LOG).unwrap();
        assert_eq!(again.related.len(), 1);
        assert_eq!(again.related[0].item.title(), "foo missing");

        assert!(service.resolve("missing", "x").unwrap_err().is_not_found());
    }
}
