//! CLI command implementations.
//!
//! The binary parses arguments with clap and hands off to the `cmd_*`
//! functions here. Each one writes to a caller-supplied writer so output can
//! be checked in tests.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `session` | Create, inspect, update, archive and search sessions |
//! | `knowledge` | Add, inspect, list and search knowledge entries |
//! | `investigate` | Open an investigation for an error log |
//! | `sweep` | Archive sessions older than 48 hours |
//! | `classify` | Print the error type of a log |
//!
//! # Example Usage
//!
//! ```bash
//! casefile session create --stdin < error.log
//! casefile session similar "TypeError: Cannot read property 'id' of undefined"
//! casefile knowledge add --title "Null user" --problem "user is undefined" \
//!     --solution "guard the lookup" --tags auth,null
//! casefile investigate --from-file error.log
//! ```

mod investigate;
mod knowledge;
mod session;

pub use investigate::{cmd_classify, cmd_investigate, cmd_sweep};
pub use knowledge::{
    AddKnowledgeArgs, cmd_knowledge_add, cmd_knowledge_get, cmd_knowledge_list,
    cmd_knowledge_related, write_knowledge_table,
};
pub use session::{
    cmd_session_archive, cmd_session_create, cmd_session_get, cmd_session_list,
    cmd_session_similar, cmd_session_update, parse_assignment, write_session_table,
};

use anyhow::{Context, bail};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format (default).
    #[default]
    Table,
    /// JSON format.
    Json,
}

impl OutputFormat {
    /// Parses output format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Where an error log comes from on the command line.
#[derive(Debug, Clone, Default)]
pub struct LogInput {
    /// Inline text.
    pub text: Option<String>,
    /// File to read.
    pub file: Option<std::path::PathBuf>,
    /// Read standard input.
    pub stdin: bool,
}

impl LogInput {
    /// Resolves the log text. Exactly one source must be given.
    ///
    /// # Errors
    ///
    /// Returns an error if no source or several sources are given, or if the
    /// file or stdin cannot be read.
    pub fn read(&self) -> anyhow::Result<String> {
        let sources =
            usize::from(self.text.is_some()) + usize::from(self.file.is_some()) + usize::from(self.stdin);
        if sources != 1 {
            bail!("provide exactly one of LOG, --from-file or --stdin");
        }

        if let Some(ref text) = self.text {
            return Ok(text.clone());
        }
        if let Some(ref file) = self.file {
            return read_file(file);
        }
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read error log from stdin")?;
        Ok(text)
    }
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Writes a value as pretty JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// First line of `text`, cut to `max` characters with `...` when longer.
fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > max {
        let head: String = line.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("table"), OutputFormat::Table);
        assert_eq!(OutputFormat::parse("whatever"), OutputFormat::Table);
    }

    #[test]
    fn test_log_input_requires_one_source() {
        assert!(LogInput::default().read().is_err());

        let both = LogInput {
            text: Some("x".to_string()),
            stdin: true,
            ..LogInput::default()
        };
        assert!(both.read().is_err());

        let text = LogInput {
            text: Some("boom".to_string()),
            ..LogInput::default()
        };
        assert_eq!(text.read().unwrap(), "boom");
    }

    #[test]
    fn test_log_input_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("error.log");
        std::fs::write(&path, "Error: from file\n").unwrap();
        let input = LogInput {
            file: Some(path),
            ..LogInput::default()
        };
        assert_eq!(input.read().unwrap(), "Error: from file\n");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short\nsecond", 10), "short");
        assert_eq!(preview("abcdefghijkl", 8), "abcde...");
        assert_eq!(preview("", 8), "");
    }
}
