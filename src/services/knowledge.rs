//! Knowledge entry store.
//!
//! Entries are curated problem/solution notes. Adding one also updates the
//! project's notes document and shared document; those writes are best
//! effort and never fail the add.

use super::docs::ProjectDocs;
use super::newest_first;
use crate::config::DebugPaths;
use crate::models::{
    KnowledgeEntry, KnowledgeFilter, Record, RecordId, format_timestamp, keys, split_tags,
};
use crate::search::{Ranked, rank_knowledge};
use crate::storage::{RecordDirectory, codec};
use crate::{Error, Result};
use chrono::Utc;
use serde_json::Value;
use tracing::{info, instrument, warn};

/// Record kind used in errors and logs.
const KIND: &str = "knowledge";

/// Store for knowledge entries.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    /// Knowledge entries.
    entries: RecordDirectory,
    /// Derived markdown documents.
    docs: ProjectDocs,
}

impl KnowledgeStore {
    /// Creates a store over the knowledge directory and documents in `paths`.
    #[must_use]
    pub fn new(paths: &DebugPaths) -> Self {
        Self {
            entries: RecordDirectory::new(&paths.knowledge_dir, KIND),
            docs: ProjectDocs::new(paths),
        }
    }

    /// Creates the knowledge directory. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn initialize(&self) -> Result<()> {
        self.entries.ensure()
    }

    /// Directory of knowledge entries.
    #[must_use]
    pub const fn records(&self) -> &RecordDirectory {
        &self.entries
    }

    /// Adds an entry and returns its id.
    ///
    /// Accepts a [`KnowledgeDraft`](crate::models::KnowledgeDraft) or a raw
    /// [`Record`]. A missing id is generated, a comma-delimited `tags` string
    /// is split into a list, and a missing `createdAt` defaults to now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `title`, `problem` or `solution` is
    /// missing or blank, or if a supplied id is not usable in a file name.
    /// Returns an error if the entry cannot be written.
    #[instrument(
        name = "casefile.knowledge.add",
        skip(self, entry),
        fields(component = "knowledge", operation = "add", knowledge_id = tracing::field::Empty)
    )]
    pub fn add(&self, entry: impl Into<Record>) -> Result<RecordId> {
        let mut input = entry.into();
        for key in [keys::TITLE, keys::PROBLEM, keys::SOLUTION] {
            if input.get_str(key).is_none_or(|value| value.trim().is_empty()) {
                return Err(Error::InvalidInput(format!("Knowledge {key} cannot be empty")));
            }
        }

        let id = match input.remove(keys::ID) {
            Some(Value::String(id)) if !id.is_empty() => {
                if !codec::is_safe_id(&id) {
                    return Err(Error::InvalidInput(format!("Invalid knowledge id: {id}")));
                }
                RecordId::new(id)
            },
            _ => codec::generate_knowledge_id(),
        };
        tracing::Span::current().record("knowledge_id", id.as_str());

        if let Some(raw) = input.get_str(keys::TAGS).map(str::to_string) {
            input.set(keys::TAGS, Value::from(split_tags(&raw)));
        }
        if !input.contains_key(keys::CREATED_AT) {
            input.set(keys::CREATED_AT, format_timestamp(Utc::now()));
        }

        let mut record = Record::new().with(keys::ID, id.as_str());
        record.merge(input);

        let title = record.get_str(keys::TITLE).unwrap_or_default();
        let file_name = codec::record_file_name(id.as_str(), title);
        self.entries.ensure()?;
        self.entries.write(&file_name, &record)?;

        metrics::counter!("casefile_knowledge_added_total").increment(1);
        info!(knowledge_id = %id, file = %file_name, "Added knowledge entry");

        self.update_documents(&KnowledgeEntry::from_record(record));
        Ok(id)
    }

    /// Looks up an entry. Unreadable records come back as `None`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<KnowledgeEntry> {
        self.entries
            .find(id)
            .map(|(_, record)| KnowledgeEntry::from_record(record))
    }

    /// All entries passing `filter`, newest first.
    #[must_use]
    pub fn list_all(&self, filter: &KnowledgeFilter) -> Vec<KnowledgeEntry> {
        let mut entries: Vec<KnowledgeEntry> = self
            .entries
            .load_all()
            .into_iter()
            .map(KnowledgeEntry::from_record)
            .filter(|entry| filter.matches(entry))
            .collect();
        newest_first(&mut entries, KnowledgeEntry::created_at);
        entries
    }

    /// Entries relevant to `error_log`, best match first.
    ///
    /// With a non-empty `error_type`, only entries of exactly that type are scored.
    #[must_use]
    pub fn find_related(&self, error_log: &str, error_type: Option<&str>) -> Vec<KnowledgeEntry> {
        self.find_related_scored(error_log, error_type)
            .into_iter()
            .map(|ranked| ranked.item)
            .collect()
    }

    /// Like [`find_related`](Self::find_related), keeping the scores.
    #[must_use]
    pub fn find_related_scored(
        &self,
        error_log: &str,
        error_type: Option<&str>,
    ) -> Vec<Ranked<KnowledgeEntry>> {
        let mut filter = KnowledgeFilter::new();
        // an empty error type means no filter
        if let Some(error_type) = error_type.filter(|t| !t.is_empty()) {
            filter = filter.with_error_type(error_type);
        }
        rank_knowledge(error_log, self.list_all(&filter))
    }

    /// Best-effort update of the notes and shared documents.
    fn update_documents(&self, entry: &KnowledgeEntry) {
        if let Err(e) = self.docs.append_notes(entry) {
            warn!(
                knowledge_id = entry.id(),
                file = %self.docs.notes_file().display(),
                error = %e,
                "Failed to update notes document"
            );
        }
        if let Err(e) = self.docs.update_shared_doc(entry) {
            warn!(
                knowledge_id = entry.id(),
                file = %self.docs.shared_doc_file().display(),
                error = %e,
                "Failed to update shared document"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KnowledgeDraft;
    use std::fs;
    use tempfile::TempDir;

    fn store() -> (TempDir, KnowledgeStore) {
        let tmp = TempDir::new().unwrap();
        let store = KnowledgeStore::new(&DebugPaths::for_project(tmp.path()));
        store.initialize().unwrap();
        (tmp, store)
    }

    #[test]
    fn test_add_generates_id_and_defaults() {
        let (_tmp, store) = store();
        let id = store
            .add(KnowledgeDraft::new("Fix: null user?", "user is undefined", "guard it"))
            .unwrap();
        assert!(id.as_str().starts_with("k-"));

        let entry = store.get(id.as_str()).unwrap();
        assert_eq!(entry.id(), id.as_str());
        assert_eq!(entry.title(), "Fix: null user?");
        assert!(entry.created_at().is_some());

        let files = store.records().files().unwrap();
        assert_eq!(files[0].file_name, format!("{id}-Fix__null_user_.json"));

        let keys: Vec<&String> = entry.record().iter().map(|(k, _)| k).collect();
        assert_eq!(keys.first().map(|k| k.as_str()), Some("id"));
    }

    #[test]
    fn test_add_rejects_missing_fields() {
        let (_tmp, store) = store();
        let err = store.add(KnowledgeDraft::new("", "p", "s")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let raw = Record::new().with(keys::TITLE, "t").with(keys::PROBLEM, "p");
        assert!(matches!(store.add(raw), Err(Error::InvalidInput(_))));
        assert!(store.list_all(&KnowledgeFilter::new()).is_empty());
    }

    #[test]
    fn test_add_rejects_unsafe_id() {
        let (_tmp, store) = store();
        let draft = KnowledgeDraft::new("t", "p", "s").with_id("../escape");
        assert!(matches!(store.add(draft), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_add_keeps_supplied_id_and_timestamp() {
        let (_tmp, store) = store();
        let draft = KnowledgeDraft::new("t", "p", "s")
            .with_id("k-custom-1")
            .with_created_at("2026-01-02T03:04:05.000Z");
        let id = store.add(draft).unwrap();
        assert_eq!(id.as_str(), "k-custom-1");
        let entry = store.get("k-custom-1").unwrap();
        assert_eq!(entry.created_at_raw(), Some("2026-01-02T03:04:05.000Z"));
    }

    #[test]
    fn test_add_splits_string_tags() {
        let (_tmp, store) = store();
        let raw = Record::new()
            .with(keys::TITLE, "t")
            .with(keys::PROBLEM, "p")
            .with(keys::SOLUTION, "s")
            .with(keys::TAGS, " db, ,timeout ,");
        let id = store.add(raw).unwrap();
        assert_eq!(store.get(id.as_str()).unwrap().tags(), vec!["db", "timeout"]);
    }

    #[test]
    fn test_add_writes_notes_document() {
        let (tmp, store) = store();
        store
            .add(KnowledgeDraft::new("Pool exhausted", "too many clients", "raise limit"))
            .unwrap();
        let notes = fs::read_to_string(tmp.path().join("docs/implementation_notes.md")).unwrap();
        assert!(notes.contains("## Pool exhausted"));
        assert!(!tmp.path().join("CLAUDE.md").exists());
    }

    #[test]
    fn test_add_survives_unwritable_notes() {
        let (tmp, store) = store();
        // a directory where the notes file should be makes the write fail
        fs::create_dir_all(tmp.path().join("docs/implementation_notes.md")).unwrap();
        let id = store.add(KnowledgeDraft::new("t", "p", "s")).unwrap();
        assert!(store.get(id.as_str()).is_some());
    }

    #[test]
    fn test_list_all_filters() {
        let (_tmp, store) = store();
        store
            .add(
                KnowledgeDraft::new("Pool", "too many clients", "raise limit")
                    .with_error_type("Database Error")
                    .with_created_at("2026-01-01T00:00:00.000Z"),
            )
            .unwrap();
        store
            .add(
                KnowledgeDraft::new("Port", "address in use", "kill it")
                    .with_error_type("Connection Error")
                    .with_tags(["Network"])
                    .with_created_at("2026-02-01T00:00:00.000Z"),
            )
            .unwrap();

        let all = store.list_all(&KnowledgeFilter::new());
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title(), "Port");

        let db = store.list_all(&KnowledgeFilter::new().with_error_type("Database Error"));
        assert_eq!(db.len(), 1);
        assert_eq!(db[0].title(), "Pool");

        let by_tag = store.list_all(&KnowledgeFilter::new().with_keyword("network"));
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].title(), "Port");

        let none = store.list_all(
            &KnowledgeFilter::new()
                .with_error_type("Database Error")
                .with_keyword("address"),
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_find_related_with_type_prefilter() {
        let (_tmp, store) = store();
        store
            .add(
                KnowledgeDraft::new("Refused", "connection refused by database server", "start it")
                    .with_error_type("Database Error"),
            )
            .unwrap();
        store
            .add(
                KnowledgeDraft::new("Refused too", "connection refused by proxy", "restart proxy")
                    .with_error_type("Connection Error"),
            )
            .unwrap();

        let log = "connection refused while starting";
        assert_eq!(store.find_related(log, None).len(), 2);

        let filtered = store.find_related_scored(log, Some("Database Error"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].item.title(), "Refused");
        assert!(filtered[0].score > 0.3);
    }

    #[test]
    fn test_find_related_empty_type_is_no_filter() {
        let (_tmp, store) = store();
        store
            .add(
                KnowledgeDraft::new("Refused", "connection refused by database server", "start it")
                    .with_error_type("Database Error"),
            )
            .unwrap();

        let log = "connection refused while starting";
        assert_eq!(store.find_related(log, Some("")).len(), 1);
        assert_eq!(store.find_related(log, Some("Build Error")).len(), 0);
    }
}
