//! Session CLI commands.

// CLI commands take owned strings from clap parsing
#![allow(clippy::needless_pass_by_value)]

use super::{OutputFormat, preview, write_json};
use crate::models::{ErrorSession, Record};
use crate::search::Ranked;
use crate::services::SessionStore;
use anyhow::{Context, anyhow, bail};
use serde_json::Value;
use std::io::{self, Write};

/// Width of the error preview column.
const ERROR_PREVIEW_WIDTH: usize = 60;

/// Parses a `key=value` assignment for `session update --set`.
///
/// The value is parsed as JSON when possible (`true`, `3`, `["a"]`) and kept
/// as a plain string otherwise.
///
/// # Errors
///
/// Returns an error if there is no `=` or the key is empty.
pub fn parse_assignment(raw: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("empty key in '{raw}'");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Writes sessions as a table.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_session_table<W: Write>(
    writer: &mut W,
    sessions: &[ErrorSession],
    scores: Option<&[f64]>,
) -> io::Result<()> {
    if scores.is_some() {
        writeln!(writer, "{:<18}{:<7}{:<15}ERROR", "ID", "SCORE", "STATUS")?;
    } else {
        writeln!(writer, "{:<18}{:<15}{:<26}ERROR", "ID", "STATUS", "CREATED")?;
    }
    for (index, session) in sessions.iter().enumerate() {
        let error = preview(session.error_log(), ERROR_PREVIEW_WIDTH);
        match scores.and_then(|s| s.get(index)) {
            Some(score) => writeln!(
                writer,
                "{:<18}{:<7.2}{:<15}{}",
                session.id(),
                score,
                session.status_str(),
                error
            )?,
            None => writeln!(
                writer,
                "{:<18}{:<15}{:<26}{}",
                session.id(),
                session.status_str(),
                session.created_at_raw().unwrap_or("-"),
                error
            )?,
        }
    }
    Ok(())
}

/// Creates a session and prints its id.
///
/// # Errors
///
/// Returns an error if the log is blank or the session cannot be written.
pub fn cmd_session_create<W: Write>(
    store: &SessionStore,
    error_log: String,
    writer: &mut W,
) -> anyhow::Result<()> {
    let id = store.create(&error_log)?;
    writeln!(writer, "{id}")?;
    Ok(())
}

/// Prints a session as JSON, looking in the archive when it is not active.
///
/// # Errors
///
/// Returns an error if the session does not exist.
pub fn cmd_session_get<W: Write>(
    store: &SessionStore,
    id: String,
    writer: &mut W,
) -> anyhow::Result<()> {
    let session = store
        .get(&id)
        .or_else(|| store.get_archived(&id))
        .ok_or_else(|| anyhow!("session not found: {id}"))?;
    write_json(writer, &session)
}

/// Applies `key=value` assignments to a session.
///
/// # Errors
///
/// Returns an error if an assignment is malformed or the session does not
/// exist.
pub fn cmd_session_update<W: Write>(
    store: &SessionStore,
    id: String,
    assignments: Vec<String>,
    writer: &mut W,
) -> anyhow::Result<()> {
    if assignments.is_empty() {
        bail!("nothing to update; pass at least one --set key=value");
    }
    let mut partial = Record::new();
    for raw in &assignments {
        let (key, value) = parse_assignment(raw)?;
        partial.set(key, value);
    }
    let fields = partial.len();
    store
        .update(&id, partial)
        .with_context(|| format!("failed to update session {id}"))?;
    writeln!(writer, "Updated {fields} field(s) on {id}")?;
    Ok(())
}

/// Archives a session.
///
/// # Errors
///
/// Returns an error if the session does not exist or cannot be moved.
pub fn cmd_session_archive<W: Write>(
    store: &SessionStore,
    id: String,
    writer: &mut W,
) -> anyhow::Result<()> {
    store.archive(&id)?;
    writeln!(writer, "Archived {id}")?;
    Ok(())
}

/// Lists active or archived sessions.
///
/// # Errors
///
/// Returns an error if output fails.
pub fn cmd_session_list<W: Write>(
    store: &SessionStore,
    archived: bool,
    format: OutputFormat,
    writer: &mut W,
) -> anyhow::Result<()> {
    let sessions = if archived {
        store.list_archived()
    } else {
        store.list_all()
    };
    match format {
        OutputFormat::Table => {
            write_session_table(writer, &sessions, None)?;
            Ok(())
        },
        OutputFormat::Json => write_json(writer, &sessions),
    }
}

/// Lists sessions similar to an error log, with scores.
///
/// # Errors
///
/// Returns an error if output fails.
pub fn cmd_session_similar<W: Write>(
    store: &SessionStore,
    error_log: String,
    format: OutputFormat,
    writer: &mut W,
) -> anyhow::Result<()> {
    let ranked: Vec<Ranked<ErrorSession>> = store.find_similar_scored(&error_log);
    match format {
        OutputFormat::Table => {
            if ranked.is_empty() {
                writeln!(writer, "No similar sessions found")?;
                return Ok(());
            }
            let scores: Vec<f64> = ranked.iter().map(|r| r.score).collect();
            let sessions: Vec<ErrorSession> = ranked.into_iter().map(|r| r.item).collect();
            write_session_table(writer, &sessions, Some(&scores))?;
            Ok(())
        },
        OutputFormat::Json => write_json(writer, &ranked),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DebugPaths;
    use crate::models::{SessionStatus, keys};
    use tempfile::TempDir;

    fn store() -> (TempDir, SessionStore) {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::new(&DebugPaths::for_project(tmp.path()));
        store.initialize().unwrap();
        (tmp, store)
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("status=resolved").unwrap(),
            ("status".to_string(), Value::String("resolved".to_string()))
        );
        assert_eq!(
            parse_assignment("attempts=3").unwrap(),
            ("attempts".to_string(), Value::from(3))
        );
        assert_eq!(
            parse_assignment("relatedFiles=[\"a.ts\"]").unwrap().1,
            serde_json::json!(["a.ts"])
        );
        assert_eq!(
            parse_assignment("note=a=b").unwrap().1,
            Value::String("a=b".to_string())
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_create_update_archive_flow() {
        let (_tmp, store) = store();
        let mut out = Vec::new();
        cmd_session_create(&store, "Error: boom".to_string(), &mut out).unwrap();
        let id = String::from_utf8(out).unwrap().trim().to_string();

        let mut out = Vec::new();
        cmd_session_update(
            &store,
            id.clone(),
            vec!["status=resolved".to_string()],
            &mut out,
        )
        .unwrap();
        assert_eq!(
            store.get(&id).unwrap().status(),
            Some(SessionStatus::Resolved)
        );

        let mut out = Vec::new();
        cmd_session_archive(&store, id.clone(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("Archived {id}\n"));

        let mut out = Vec::new();
        cmd_session_get(&store, id.clone(), &mut out).unwrap();
        let json: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json[keys::STATUS], "archived");
    }

    #[test]
    fn test_update_requires_assignments() {
        let (_tmp, store) = store();
        let id = store.create("Error").unwrap();
        let mut out = Vec::new();
        assert!(cmd_session_update(&store, id.to_string(), Vec::new(), &mut out).is_err());
    }

    #[test]
    fn test_get_missing() {
        let (_tmp, store) = store();
        let mut out = Vec::new();
        let err = cmd_session_get(&store, "nope".to_string(), &mut out).unwrap_err();
        assert!(err.to_string().contains("session not found"));
    }

    #[test]
    fn test_list_table_and_json() {
        let (_tmp, store) = store();
        let id = store.create("Error: listed").unwrap();

        let mut out = Vec::new();
        cmd_session_list(&store, false, OutputFormat::Table, &mut out).unwrap();
        let table = String::from_utf8(out).unwrap();
        assert!(table.starts_with("ID"));
        assert!(table.contains(id.as_str()));
        assert!(table.contains("Error: listed"));

        let mut out = Vec::new();
        cmd_session_list(&store, false, OutputFormat::Json, &mut out).unwrap();
        let json: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(1));

        let mut out = Vec::new();
        cmd_session_list(&store, true, OutputFormat::Json, &mut out).unwrap();
        let json: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn test_similar_output() {
        let (_tmp, store) = store();
        let log = "TypeError: Cannot read property 'foo' of undefined at app.js:10";
        store.create(log).unwrap();

        let mut out = Vec::new();
        cmd_session_similar(&store, log.to_string(), OutputFormat::Json, &mut out).unwrap();
        let json: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json[0]["score"], 1.0);

        let mut out = Vec::new();
        cmd_session_similar(&store, "nothing".to_string(), OutputFormat::Table, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No similar sessions found\n");
    }
}
