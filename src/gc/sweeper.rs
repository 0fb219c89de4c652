//! Age-based session archival.

use crate::models::keys;
use crate::services::SessionStore;
use crate::storage::RecordFile;
use crate::{Error, Result};
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info, instrument, warn};

/// Sessions whose file is at least this old are archived.
pub const ARCHIVE_AFTER: Duration = Duration::from_secs(48 * 60 * 60);

/// Safely converts Duration to milliseconds as u64, capping at `u64::MAX`.
#[inline]
fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Converts u64 to f64 for metrics, capping at `u32::MAX`.
#[inline]
fn u64_to_f64(value: u64) -> f64 {
    let capped = u32::try_from(value).unwrap_or(u32::MAX);
    f64::from(capped)
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepResult {
    /// Active session files examined.
    pub checked: usize,
    /// Sessions moved to the archive.
    pub archived: usize,
    /// Files that were old enough but could not be archived.
    pub failed: usize,
    /// Duration of the sweep in milliseconds.
    pub duration_ms: u64,
}

impl SweepResult {
    /// Returns `true` if anything was archived.
    #[must_use]
    pub const fn has_archived(&self) -> bool {
        self.archived > 0
    }

    /// Returns a human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = if self.archived == 0 {
            format!(
                "No stale sessions found ({} sessions checked in {}ms)",
                self.checked, self.duration_ms
            )
        } else {
            format!(
                "Archived {} stale sessions - checked {} in {}ms",
                self.archived, self.checked, self.duration_ms
            )
        };
        if self.failed > 0 {
            summary.push_str(&format!(", {} failed", self.failed));
        }
        summary
    }
}

/// Moves stale active sessions into the archive.
#[derive(Debug, Clone)]
pub struct LifecycleSweeper {
    /// Minimum file age before a session is archived.
    max_age: Duration,
}

impl Default for LifecycleSweeper {
    fn default() -> Self {
        Self {
            max_age: ARCHIVE_AFTER,
        }
    }
}

impl LifecycleSweeper {
    /// Creates a sweeper with the standard 48 hour threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the age threshold.
    #[must_use]
    pub const fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Sweeps against the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the active directory cannot be listed. Failures on
    /// individual files are logged and counted instead.
    pub fn sweep(&self, store: &SessionStore) -> Result<SweepResult> {
        self.sweep_at(store, SystemTime::now())
    }

    /// Sweeps against an explicit clock reading.
    ///
    /// A file is stale when `now - modified >= max_age`. Files modified after
    /// `now` are never stale.
    ///
    /// # Errors
    ///
    /// Returns an error if the active directory cannot be listed.
    #[instrument(
        name = "casefile.gc.sweep",
        skip(self, store),
        fields(
            component = "gc",
            operation = "sweep",
            max_age_secs = self.max_age.as_secs()
        )
    )]
    pub fn sweep_at(&self, store: &SessionStore, now: SystemTime) -> Result<SweepResult> {
        let start = Instant::now();
        let mut result = SweepResult::default();

        let files = store.active_records().files()?;
        debug!(file_count = files.len(), "Checking sessions for archival");

        for file in files {
            result.checked += 1;

            let modified = match file.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    warn!(file = %file.file_name, error = %e, "Failed to stat session file");
                    result.failed += 1;
                    continue;
                },
            };

            let Ok(age) = now.duration_since(modified) else {
                continue;
            };
            if age < self.max_age {
                continue;
            }

            match Self::archive_file(store, &file) {
                Ok(id) => {
                    debug!(session_id = %id, age_secs = age.as_secs(), "Archived stale session");
                    result.archived += 1;
                },
                Err(e) => {
                    warn!(file = %file.file_name, error = %e, "Failed to archive stale session");
                    result.failed += 1;
                },
            }
        }

        result.duration_ms = duration_to_millis(start.elapsed());

        metrics::counter!("casefile_sweep_runs_total").increment(1);
        metrics::histogram!("casefile_sweep_duration_ms").record(u64_to_f64(result.duration_ms));

        info!(
            checked = result.checked,
            archived = result.archived,
            failed = result.failed,
            duration_ms = result.duration_ms,
            "Lifecycle sweep completed"
        );

        Ok(result)
    }

    /// Archives the session stored in `file`, using the id recorded inside it.
    fn archive_file(store: &SessionStore, file: &RecordFile) -> Result<String> {
        let record = store.active_records().read(file)?;
        let id = record
            .get_str(keys::ID)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::InvalidInput(format!("{} has no id", file.file_name)))?
            .to_string();
        store.archive(&id)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold() {
        assert_eq!(LifecycleSweeper::new().max_age(), Duration::from_secs(172_800));
    }

    #[test]
    fn test_summary() {
        let mut result = SweepResult {
            checked: 4,
            archived: 0,
            failed: 0,
            duration_ms: 3,
        };
        assert_eq!(result.summary(), "No stale sessions found (4 sessions checked in 3ms)");
        assert!(!result.has_archived());

        result.archived = 2;
        result.failed = 1;
        assert_eq!(
            result.summary(),
            "Archived 2 stale sessions - checked 4 in 3ms, 1 failed"
        );
        assert!(result.has_archived());
    }
}
