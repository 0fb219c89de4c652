//! Investigation, sweep and classification commands.

// CLI commands take owned strings from clap parsing
#![allow(clippy::needless_pass_by_value)]

use super::{OutputFormat, write_json};
use crate::search::classify_error_type;
use crate::services::{InvestigationService, SessionStore};
use std::io::Write;

/// Opens an investigation and prints the session id, error type, matches and
/// brief.
///
/// # Errors
///
/// Returns an error if the log is blank or the session cannot be written.
pub fn cmd_investigate<W: Write>(
    service: &InvestigationService,
    error_log: String,
    format: OutputFormat,
    writer: &mut W,
) -> anyhow::Result<()> {
    let investigation = service.open(&error_log)?;
    if format == OutputFormat::Json {
        return write_json(writer, &investigation);
    }

    writeln!(writer, "Session:    {}", investigation.id())?;
    writeln!(writer, "Error type: {}", investigation.error_type)?;

    if !investigation.similar.is_empty() {
        writeln!(writer, "\nSimilar sessions:")?;
        for ranked in &investigation.similar {
            writeln!(
                writer,
                "  {:.2}  {}  [{}]",
                ranked.score,
                ranked.item.id(),
                ranked.item.status_str()
            )?;
        }
    }

    if !investigation.related.is_empty() {
        writeln!(writer, "\nRelated knowledge:")?;
        for ranked in &investigation.related {
            writeln!(
                writer,
                "  {:.2}  {}  {}",
                ranked.score,
                ranked.item.id(),
                ranked.item.title()
            )?;
        }
    }

    writeln!(writer)?;
    write!(writer, "{}", investigation.brief)?;
    Ok(())
}

/// Initializes the session store, which sweeps stale sessions, and prints
/// the sweep summary.
///
/// # Errors
///
/// Returns an error if the session directories cannot be created or listed.
pub fn cmd_sweep<W: Write>(store: &SessionStore, writer: &mut W) -> anyhow::Result<()> {
    let result = store.initialize()?;
    writeln!(writer, "{}", result.summary())?;
    Ok(())
}

/// Prints the error type of a log.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn cmd_classify<W: Write>(error_log: String, writer: &mut W) -> anyhow::Result<()> {
    writeln!(writer, "{}", classify_error_type(&error_log))?;
    Ok(())
}
