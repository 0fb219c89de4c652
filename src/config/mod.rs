//! Configuration management.
//!
//! Configuration is resolved in layers, later layers winning:
//!
//! 1. Built-in defaults (project root `.`, debug directory `logs/debug`)
//! 2. A TOML file: `--config`, else `CASEFILE_CONFIG_PATH`, else
//!    `{config_dir}/casefile/config.toml`
//! 3. Environment variables `CASEFILE_PROJECT_ROOT` and `CASEFILE_DEBUG_DIR`
//! 4. Explicit builder calls such as [`CasefileConfig::with_project_root`]
//!
//! ```toml
//! project_root = "/work/shop"
//! debug_dir = "logs/debug"
//! notes_file = "docs/implementation_notes.md"
//! shared_doc_file = "CLAUDE.md"
//! shared_doc_marker = "## Implementation Notes"
//!
//! [logging]
//! format = "json"
//! filter = "casefile=debug"
//! file = "/tmp/casefile.log"
//! ```

mod paths;

pub use paths::DebugPaths;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CASEFILE_CONFIG_PATH";

/// Environment variable overriding the project root.
pub const PROJECT_ROOT_ENV: &str = "CASEFILE_PROJECT_ROOT";

/// Environment variable overriding the debug directory.
pub const DEBUG_DIR_ENV: &str = "CASEFILE_DEBUG_DIR";

/// Default debug directory, relative to the project root.
pub const DEFAULT_DEBUG_DIR: &str = "logs/debug";

/// Default notes document, relative to the project root.
pub const DEFAULT_NOTES_FILE: &str = "docs/implementation_notes.md";

/// Default shared document, relative to the project root.
pub const DEFAULT_SHARED_DOC_FILE: &str = "CLAUDE.md";

/// Heading after which knowledge summaries are inserted into the shared document.
///
/// Shared documents that already carry a differently worded heading (for
/// example `## 実装注意点`) need `shared_doc_marker` set to that heading, or a
/// second heading is appended.
pub const DEFAULT_SHARED_DOC_MARKER: &str = "## Implementation Notes";

/// Main configuration for casefile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasefileConfig {
    /// Root of the project whose errors are being tracked.
    pub project_root: PathBuf,
    /// Debug directory; relative paths resolve against `project_root`.
    pub debug_dir: PathBuf,
    /// Running notes document; relative paths resolve against `project_root`.
    pub notes_file: PathBuf,
    /// Shared project document; relative paths resolve against `project_root`.
    pub shared_doc_file: PathBuf,
    /// Heading marker inside the shared document.
    pub shared_doc_marker: String,
    /// Logging settings from the config file.
    pub logging: LoggingSettings,
}

/// Logging section in config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// Output format: "pretty" or "json".
    pub format: Option<String>,
    /// `EnvFilter` directive, e.g. `casefile=debug`.
    pub filter: Option<String>,
    /// Log file path; logs go to stderr when unset.
    pub file: Option<String>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Project root.
    pub project_root: Option<String>,
    /// Debug directory.
    pub debug_dir: Option<String>,
    /// Notes document.
    pub notes_file: Option<String>,
    /// Shared document.
    pub shared_doc_file: Option<String>,
    /// Shared document heading marker.
    pub shared_doc_marker: Option<String>,
    /// Logging configuration.
    pub logging: Option<LoggingSettings>,
}

impl Default for CasefileConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            debug_dir: PathBuf::from(DEFAULT_DEBUG_DIR),
            notes_file: PathBuf::from(DEFAULT_NOTES_FILE),
            shared_doc_file: PathBuf::from(DEFAULT_SHARED_DOC_FILE),
            shared_doc_marker: DEFAULT_SHARED_DOC_MARKER.to_string(),
            logging: LoggingSettings::default(),
        }
    }
}

impl CasefileConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        Self::parse(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for [`ConfigFile`].
    pub fn parse(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks `CASEFILE_CONFIG_PATH`, then the platform config dir
    /// (`~/.config/casefile/config.toml` on Linux). Unreadable files are
    /// ignored. Returns defaults if nothing is found.
    #[must_use]
    pub fn load_default() -> Self {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV)
            && let Ok(config) = Self::load_from_file(Path::new(&path))
        {
            return config;
        }

        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let platform_config = base_dirs.config_dir().join("casefile").join("config.toml");
        if platform_config.exists()
            && let Ok(config) = Self::load_from_file(&platform_config)
        {
            return config;
        }

        Self::default()
    }

    /// Loads an explicit file if given, else the default location, then applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `path` cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Applies `CASEFILE_PROJECT_ROOT` and `CASEFILE_DEBUG_DIR`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(root) = env_path(PROJECT_ROOT_ENV) {
            self.project_root = root;
        }
        if let Some(dir) = env_path(DEBUG_DIR_ENV) {
            self.debug_dir = dir;
        }
        self
    }

    /// Converts a `ConfigFile` to `CasefileConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(root) = file.project_root {
            config.project_root = PathBuf::from(root);
        }
        if let Some(dir) = file.debug_dir {
            config.debug_dir = PathBuf::from(dir);
        }
        if let Some(notes) = file.notes_file {
            config.notes_file = PathBuf::from(notes);
        }
        if let Some(shared) = file.shared_doc_file {
            config.shared_doc_file = PathBuf::from(shared);
        }
        if let Some(marker) = file.shared_doc_marker {
            config.shared_doc_marker = marker;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }

    /// Sets the project root.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = path.into();
        self
    }

    /// Sets the debug directory.
    #[must_use]
    pub fn with_debug_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_dir = path.into();
        self
    }

    /// Resolves every configured location against the project root.
    #[must_use]
    pub fn paths(&self) -> DebugPaths {
        let resolve = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.project_root.join(path)
            }
        };

        DebugPaths::new(&self.project_root, resolve(&self.debug_dir))
            .with_notes_file(resolve(&self.notes_file))
            .with_shared_doc(resolve(&self.shared_doc_file), &self.shared_doc_marker)
    }
}

/// Reads a non-empty path from the environment.
fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}
