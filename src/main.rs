//! Binary entry point for casefile.
//!
//! This binary provides the CLI interface for the casefile session and
//! knowledge store.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use casefile::cli::{self, AddKnowledgeArgs, LogInput, OutputFormat};
use casefile::config::CasefileConfig;
use casefile::models::KnowledgeFilter;
use casefile::observability::{self, LoggingConfig};
use casefile::services::{InvestigationService, KnowledgeStore, SessionStore};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Casefile - debug sessions and knowledge for error investigations.
#[derive(Parser)]
#[command(name = "casefile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "CASEFILE_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Project root (overrides config and `CASEFILE_PROJECT_ROOT`).
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Manage error sessions.
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Manage knowledge entries.
    Knowledge {
        #[command(subcommand)]
        action: KnowledgeAction,
    },

    /// Open an investigation for an error log.
    Investigate {
        #[command(flatten)]
        log: LogArgs,

        /// Output format: table or json.
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Archive sessions untouched for 48 hours.
    Sweep,

    /// Print the error type of a log.
    Classify {
        #[command(flatten)]
        log: LogArgs,
    },
}

/// Session subcommands.
#[derive(Subcommand)]
enum SessionAction {
    /// Create a session from an error log.
    Create {
        #[command(flatten)]
        log: LogArgs,
    },

    /// Show a session as JSON.
    Get {
        /// Session id.
        id: String,
    },

    /// Set fields on a session.
    Update {
        /// Session id.
        id: String,

        /// Field assignment, `key=value`; values are parsed as JSON when possible.
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Move a session to the archive.
    Archive {
        /// Session id.
        id: String,
    },

    /// List sessions, newest first.
    List {
        /// List archived sessions instead of active ones.
        #[arg(long)]
        archived: bool,

        /// Output format: table or json.
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Find sessions similar to an error log.
    Similar {
        #[command(flatten)]
        log: LogArgs,

        /// Output format: table or json.
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}

/// Knowledge subcommands.
#[derive(Subcommand)]
enum KnowledgeAction {
    /// Add a knowledge entry.
    Add {
        /// Short label.
        #[arg(long)]
        title: String,

        /// What went wrong.
        #[arg(long)]
        problem: String,

        /// How it was fixed.
        #[arg(long)]
        solution: String,

        /// Error type, e.g. "Database Error".
        #[arg(long)]
        error_type: Option<String>,

        /// Tags (comma-separated).
        #[arg(short, long)]
        tags: Option<String>,

        /// Related file; repeat for several.
        #[arg(long = "file")]
        files: Vec<String>,
    },

    /// Show a knowledge entry as JSON.
    Get {
        /// Knowledge id.
        id: String,
    },

    /// List knowledge entries, newest first.
    List {
        /// Only entries with exactly this error type.
        #[arg(long)]
        error_type: Option<String>,

        /// Case-insensitive match on title, problem, solution or tags.
        #[arg(short, long)]
        keyword: Option<String>,

        /// Output format: table or json.
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Find knowledge related to an error log.
    Related {
        #[command(flatten)]
        log: LogArgs,

        /// Only entries with exactly this error type.
        #[arg(long)]
        error_type: Option<String>,

        /// Output format: table or json.
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}

/// Error log source.
#[derive(Args)]
struct LogArgs {
    /// Error log text.
    log: Option<String>,

    /// Read the error log from a file.
    #[arg(long, value_name = "FILE")]
    from_file: Option<PathBuf>,

    /// Read the error log from standard input.
    #[arg(long)]
    stdin: bool,
}

impl LogArgs {
    fn read(self) -> anyhow::Result<String> {
        LogInput {
            text: self.log,
            file: self.from_file,
            stdin: self.stdin,
        }
        .read()
    }
}

/// Main entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CasefileConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };
    let config = match cli.project {
        Some(ref root) => config.with_project_root(root),
        None => config,
    };

    if let Err(e) =
        observability::init(LoggingConfig::from_settings(Some(&config.logging), cli.verbose))
    {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = run_command(cli.command, &config, &mut out);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command<W: Write>(
    command: Commands,
    config: &CasefileConfig,
    out: &mut W,
) -> anyhow::Result<()> {
    let paths = config.paths();

    match command {
        Commands::Session { action } => {
            let store = SessionStore::new(&paths);
            store.initialize()?;
            run_session(action, &store, out)
        },
        Commands::Knowledge { action } => {
            let store = KnowledgeStore::new(&paths);
            store.initialize()?;
            run_knowledge(action, &store, out)
        },
        Commands::Investigate { log, format } => {
            let sessions = SessionStore::new(&paths);
            sessions.initialize()?;
            let knowledge = KnowledgeStore::new(&paths);
            knowledge.initialize()?;
            let service = InvestigationService::new(sessions, knowledge);
            cli::cmd_investigate(&service, log.read()?, OutputFormat::parse(&format), out)
        },
        Commands::Sweep => cli::cmd_sweep(&SessionStore::new(&paths), out),
        Commands::Classify { log } => cli::cmd_classify(log.read()?, out),
    }
}

fn run_session<W: Write>(
    action: SessionAction,
    store: &SessionStore,
    out: &mut W,
) -> anyhow::Result<()> {
    match action {
        SessionAction::Create { log } => cli::cmd_session_create(store, log.read()?, out),
        SessionAction::Get { id } => cli::cmd_session_get(store, id, out),
        SessionAction::Update { id, set } => cli::cmd_session_update(store, id, set, out),
        SessionAction::Archive { id } => cli::cmd_session_archive(store, id, out),
        SessionAction::List { archived, format } => {
            cli::cmd_session_list(store, archived, OutputFormat::parse(&format), out)
        },
        SessionAction::Similar { log, format } => {
            cli::cmd_session_similar(store, log.read()?, OutputFormat::parse(&format), out)
        },
    }
}

fn run_knowledge<W: Write>(
    action: KnowledgeAction,
    store: &KnowledgeStore,
    out: &mut W,
) -> anyhow::Result<()> {
    match action {
        KnowledgeAction::Add {
            title,
            problem,
            solution,
            error_type,
            tags,
            files,
        } => cli::cmd_knowledge_add(
            store,
            AddKnowledgeArgs {
                title,
                problem,
                solution,
                error_type,
                tags,
                files,
            },
            out,
        ),
        KnowledgeAction::Get { id } => cli::cmd_knowledge_get(store, id, out),
        KnowledgeAction::List {
            error_type,
            keyword,
            format,
        } => {
            let mut filter = KnowledgeFilter::new();
            if let Some(error_type) = error_type {
                filter = filter.with_error_type(error_type);
            }
            if let Some(keyword) = keyword {
                filter = filter.with_keyword(keyword);
            }
            cli::cmd_knowledge_list(store, filter, OutputFormat::parse(&format), out)
        },
        KnowledgeAction::Related {
            log,
            error_type,
            format,
        } => cli::cmd_knowledge_related(
            store,
            log.read()?,
            error_type,
            OutputFormat::parse(&format),
            out,
        ),
    }
}
