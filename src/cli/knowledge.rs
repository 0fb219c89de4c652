//! Knowledge CLI commands.

// CLI commands take owned strings from clap parsing
#![allow(clippy::needless_pass_by_value)]

use super::{OutputFormat, preview, write_json};
use crate::models::{KnowledgeDraft, KnowledgeEntry, KnowledgeFilter};
use crate::services::KnowledgeStore;
use anyhow::anyhow;
use std::io::{self, Write};

/// Width of the title column.
const TITLE_WIDTH: usize = 32;

/// Arguments for the `knowledge add` command.
#[derive(Debug, Clone, Default)]
pub struct AddKnowledgeArgs {
    /// Short label.
    pub title: String,
    /// Problem narrative.
    pub problem: String,
    /// Solution narrative.
    pub solution: String,
    /// Optional error type.
    pub error_type: Option<String>,
    /// Comma-separated tags.
    pub tags: Option<String>,
    /// Related files.
    pub files: Vec<String>,
}

impl From<AddKnowledgeArgs> for KnowledgeDraft {
    fn from(args: AddKnowledgeArgs) -> Self {
        let mut draft = Self::new(args.title, args.problem, args.solution)
            .with_related_files(args.files);
        if let Some(error_type) = args.error_type {
            draft = draft.with_error_type(error_type);
        }
        if let Some(tags) = args.tags {
            draft = draft.with_tags_str(&tags);
        }
        draft
    }
}

/// Writes knowledge entries as a table.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_knowledge_table<W: Write>(
    writer: &mut W,
    entries: &[KnowledgeEntry],
    scores: Option<&[f64]>,
) -> io::Result<()> {
    let score_header = if scores.is_some() { "SCORE  " } else { "" };
    writeln!(
        writer,
        "{:<22}{score_header}{:<24}{:<34}TAGS",
        "ID", "ERROR TYPE", "TITLE"
    )?;
    for (index, entry) in entries.iter().enumerate() {
        let score = scores
            .and_then(|s| s.get(index))
            .map(|score| format!("{score:<7.2}"))
            .unwrap_or_default();
        writeln!(
            writer,
            "{:<22}{score}{:<24}{:<34}{}",
            entry.id(),
            entry.error_type().unwrap_or("-"),
            preview(entry.title(), TITLE_WIDTH),
            entry.tags().join(",")
        )?;
    }
    Ok(())
}

/// Adds a knowledge entry and prints its id.
///
/// # Errors
///
/// Returns an error if a required field is blank or the entry cannot be
/// written.
pub fn cmd_knowledge_add<W: Write>(
    store: &KnowledgeStore,
    args: AddKnowledgeArgs,
    writer: &mut W,
) -> anyhow::Result<()> {
    let id = store.add(KnowledgeDraft::from(args))?;
    writeln!(writer, "{id}")?;
    Ok(())
}

/// Prints a knowledge entry as JSON.
///
/// # Errors
///
/// Returns an error if the entry does not exist.
pub fn cmd_knowledge_get<W: Write>(
    store: &KnowledgeStore,
    id: String,
    writer: &mut W,
) -> anyhow::Result<()> {
    let entry = store
        .get(&id)
        .ok_or_else(|| anyhow!("knowledge not found: {id}"))?;
    write_json(writer, &entry)
}

/// Lists knowledge entries.
///
/// # Errors
///
/// Returns an error if output fails.
pub fn cmd_knowledge_list<W: Write>(
    store: &KnowledgeStore,
    filter: KnowledgeFilter,
    format: OutputFormat,
    writer: &mut W,
) -> anyhow::Result<()> {
    let entries = store.list_all(&filter);
    match format {
        OutputFormat::Table => {
            write_knowledge_table(writer, &entries, None)?;
            Ok(())
        },
        OutputFormat::Json => write_json(writer, &entries),
    }
}

/// Lists knowledge related to an error log, with scores.
///
/// # Errors
///
/// Returns an error if output fails.
pub fn cmd_knowledge_related<W: Write>(
    store: &KnowledgeStore,
    error_log: String,
    error_type: Option<String>,
    format: OutputFormat,
    writer: &mut W,
) -> anyhow::Result<()> {
    let ranked = store.find_related_scored(&error_log, error_type.as_deref());
    match format {
        OutputFormat::Table => {
            if ranked.is_empty() {
                writeln!(writer, "No related knowledge found")?;
                return Ok(());
            }
            let scores: Vec<f64> = ranked.iter().map(|r| r.score).collect();
            let entries: Vec<KnowledgeEntry> = ranked.into_iter().map(|r| r.item).collect();
            write_knowledge_table(writer, &entries, Some(&scores))?;
            Ok(())
        },
        OutputFormat::Json => write_json(writer, &ranked),
    }
}
