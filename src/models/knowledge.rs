//! Knowledge entries, drafts and list filters.

use super::record::{Record, keys};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// A curated problem/solution note, independent of any single session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KnowledgeEntry {
    record: Record,
}

impl KnowledgeEntry {
    /// Wraps a stored record.
    #[must_use]
    pub const fn from_record(record: Record) -> Self {
        Self { record }
    }

    /// Entry id, or an empty string if the record has none.
    #[must_use]
    pub fn id(&self) -> &str {
        self.record.get_str(keys::ID).unwrap_or_default()
    }

    /// Short human label.
    #[must_use]
    pub fn title(&self) -> &str {
        self.record.get_str(keys::TITLE).unwrap_or_default()
    }

    /// Problem narrative.
    #[must_use]
    pub fn problem(&self) -> &str {
        self.record.get_str(keys::PROBLEM).unwrap_or_default()
    }

    /// Solution narrative.
    #[must_use]
    pub fn solution(&self) -> &str {
        self.record.get_str(keys::SOLUTION).unwrap_or_default()
    }

    /// Error classification used by relevance scoring.
    #[must_use]
    pub fn error_type(&self) -> Option<&str> {
        self.record.get_str(keys::ERROR_TYPE)
    }

    /// Tags.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.record.string_list(keys::TAGS)
    }

    /// Related file paths.
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

    /// The full underlying record.
    #[must_use]
    pub const fn record(&self) -> &Record {
        &self.record
    }

    /// Consumes the entry, returning its record.
    #[must_use]
    pub fn into_record(self) -> Record {
        self.record
    }
}

/// Splits a comma-delimited tag string into trimmed, non-empty tags.
#[must_use]
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Input for a new knowledge entry.
///
/// `id` and `created_at` are filled in by the store when left empty.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeDraft {
    /// Caller-supplied id.
    pub id: Option<String>,
    /// Short human label.
    pub title: String,
    /// Error classification.
    pub error_type: Option<String>,
    /// Problem narrative.
    pub problem: String,
    /// Solution narrative.
    pub solution: String,
    /// Related file paths.
    pub related_files: Vec<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Caller-supplied creation time (RFC 3339).
    pub created_at: Option<String>,
}

impl KnowledgeDraft {
    /// Creates a draft from the three required fields.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        problem: impl Into<String>,
        solution: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            problem: problem.into(),
            solution: solution.into(),
            ..Default::default()
        }
    }

    /// Sets the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the error type.
    #[must_use]
    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the tags from a comma-delimited string.
    #[must_use]
    pub fn with_tags_str(mut self, raw: &str) -> Self {
        self.tags = split_tags(raw);
        self
    }

    /// Sets the related files.
    #[must_use]
    pub fn with_related_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the creation time.
    #[must_use]
    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }
}

impl From<KnowledgeDraft> for Record {
    fn from(draft: KnowledgeDraft) -> Self {
        let mut record = Self::new();
        if let Some(id) = draft.id {
            record.set(keys::ID, id);
        }
        record.set(keys::TITLE, draft.title);
        if let Some(error_type) = draft.error_type {
            record.set(keys::ERROR_TYPE, error_type);
        }
        record.set(keys::PROBLEM, draft.problem);
        record.set(keys::SOLUTION, draft.solution);
        record.set(
            keys::RELATED_FILES,
            Value::from(draft.related_files),
        );
        record.set(keys::TAGS, Value::from(draft.tags));
        if let Some(created_at) = draft.created_at {
            record.set(keys::CREATED_AT, created_at);
        }
        record
    }
}

/// Filter for listing knowledge entries.
///
/// Both criteria are optional and combine with AND.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeFilter {
    /// Exact error type match.
    pub error_type: Option<String>,
    /// Case-insensitive substring match against title, problem, solution or any tag.
    pub keyword: Option<String>,
}

impl KnowledgeFilter {
    /// Creates an empty filter (matches everything).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to an exact error type.
    #[must_use]
    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    /// Restricts to entries mentioning a keyword.
    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Returns `true` if the entry passes every configured criterion.
    #[must_use]
    pub fn matches(&self, entry: &KnowledgeEntry) -> bool {
        if let Some(ref error_type) = self.error_type
            && entry.error_type() != Some(error_type.as_str())
        {
            return false;
        }

        let Some(ref keyword) = self.keyword else {
            return true;
        };
        let keyword = keyword.to_lowercase();
        let mentions = |text: &str| text.to_lowercase().contains(&keyword);

        mentions(entry.title())
            || mentions(entry.problem())
            || mentions(entry.solution())
            || entry.tags().iter().any(|tag| mentions(tag))
    }
}
