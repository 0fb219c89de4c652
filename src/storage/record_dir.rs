//! Directory-backed record access.
//!
//! A [`RecordDirectory`] holds one JSON file per record, named
//! `{id}-{fragment}.json`. Lookups by id scan the directory for the first file
//! name (in sorted order) that starts with `{id}-`, so renamed files keep
//! resolving as long as the id prefix survives. Every lookup and listing reads
//! the directory again; there is no index.

use super::codec;
use crate::models::Record;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// A record file found on disk.
#[derive(Debug, Clone)]
pub struct RecordFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name, `{id}-{fragment}.json`.
    pub file_name: String,
}

impl RecordFile {
    /// Last-modified time of the file.
    pub fn modified(&self) -> Result<SystemTime> {
        fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map_err(|e| Error::operation("read_file_metadata", e))
    }
}

/// A directory of record files of one kind.
#[derive(Debug, Clone)]
pub struct RecordDirectory {
    /// Directory holding the record files.
    path: PathBuf,
    /// Record kind used in errors and logs (`session`, `knowledge`).
    kind: &'static str,
}

impl RecordDirectory {
    /// Creates a handle for `path`. Nothing is touched on disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: &'static str) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the record kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Creates the directory (and parents) if missing.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.path).map_err(|e| Error::OperationFailed {
            operation: "create_record_dir".to_string(),
            cause: format!("{}: {e}", self.path.display()),
        })
    }

    /// Lists record files, sorted by file name.
    pub fn files(&self) -> Result<Vec<RecordFile>> {
        let entries = fs::read_dir(&self.path).map_err(|e| Error::OperationFailed {
            operation: "read_record_dir".to_string(),
            cause: format!("{}: {e}", self.path.display()),
        })?;

        let mut files: Vec<RecordFile> = entries
            .flatten()
            .filter_map(|entry| {
                let file_name = entry.file_name().to_str()?.to_string();
                is_record_file_name(&file_name).then(|| RecordFile {
                    path: entry.path(),
                    file_name,
                })
            })
            .collect();

        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(files)
    }

    /// Finds the file holding the record with `id`.
    pub fn resolve(&self, id: &str) -> Result<Option<RecordFile>> {
        let prefix = codec::record_prefix(id);
        Ok(self
            .files()?
            .into_iter()
            .find(|file| file.file_name.starts_with(&prefix)))
    }

    /// Reads and parses one record file.
    pub fn read(&self, file: &RecordFile) -> Result<Record> {
        let text = fs::read_to_string(&file.path).map_err(|e| Error::OperationFailed {
            operation: "read_record_file".to_string(),
            cause: format!("{}: {e}", file.path.display()),
        })?;
        codec::deserialize(&text)
    }

    /// Resolves `id` and reads its record.
    ///
    /// Missing, unreadable and malformed records all come back as `None`; the
    /// cause is logged.
    pub fn find(&self, id: &str) -> Option<(RecordFile, Record)> {
        let file = match self.resolve(id) {
            Ok(Some(file)) => file,
            Ok(None) => return None,
            Err(e) => {
                warn!(kind = self.kind, record_id = id, error = %e, "Failed to resolve record");
                return None;
            },
        };

        match self.read(&file) {
            Ok(record) => Some((file, record)),
            Err(e) => {
                warn!(
                    kind = self.kind,
                    record_id = id,
                    file = %file.file_name,
                    error = %e,
                    "Failed to read record"
                );
                None
            },
        }
    }

    /// Reads every record in the directory.
    ///
    /// Unreadable files are skipped and logged; an unreadable directory yields
    /// an empty list.
    pub fn load_all(&self) -> Vec<Record> {
        let files = match self.files() {
            Ok(files) => files,
            Err(e) => {
                warn!(kind = self.kind, error = %e, "Failed to list records");
                return Vec::new();
            },
        };

        let mut records = Vec::with_capacity(files.len());
        for file in files {
            match self.read(&file) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        kind = self.kind,
                        file = %file.file_name,
                        error = %e,
                        "Skipping unreadable record"
                    );
                    metrics::counter!("casefile_records_skipped_total", "kind" => self.kind)
                        .increment(1);
                },
            }
        }
        records
    }

    /// Writes `record` to a file named after `file_name`, replacing any existing content.
    pub fn write(&self, file_name: &str, record: &Record) -> Result<RecordFile> {
        let path = self.path.join(file_name);
        let json = codec::serialize(record)?;
        fs::write(&path, json).map_err(|e| Error::OperationFailed {
            operation: "write_record_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        debug!(kind = self.kind, file = file_name, "Wrote record");
        Ok(RecordFile {
            path,
            file_name: file_name.to_string(),
        })
    }

    /// Deletes a record file.
    pub fn remove(&self, file: &RecordFile) -> Result<()> {
        fs::remove_file(&file.path).map_err(|e| Error::OperationFailed {
            operation: "delete_record_file".to_string(),
            cause: format!("{}: {e}", file.path.display()),
        })
    }
}

/// Returns `true` for names ending in `.json`.
fn is_record_file_name(name: &str) -> bool {
    name.ends_with(&format!(".{}", codec::RECORD_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::keys;
    use tempfile::TempDir;

    fn dir() -> (TempDir, RecordDirectory) {
        let tmp = TempDir::new().unwrap();
        let records = RecordDirectory::new(tmp.path().join("records"), "session");
        records.ensure().unwrap();
        (tmp, records)
    }

    fn record(id: &str) -> Record {
        Record::new().with(keys::ID, id).with(keys::ERROR_LOG, "boom")
    }

    #[test]
    fn test_write_then_find() {
        let (_tmp, records) = dir();
        records
            .write(&codec::record_file_name("a1-xyz", "boom"), &record("a1-xyz"))
            .unwrap();

        let (file, found) = records.find("a1-xyz").unwrap();
        assert_eq!(file.file_name, "a1-xyz-boom.json");
        assert_eq!(found.get_str(keys::ID), Some("a1-xyz"));
        assert!(records.find("a1").is_some(), "prefix of an id also resolves");
        assert!(records.find("zz").is_none());
    }

    #[test]
    fn test_renamed_file_still_resolves() {
        let (_tmp, records) = dir();
        let file = records
            .write("a1-xyz-boom.json", &record("a1-xyz"))
            .unwrap();
        fs::rename(&file.path, records.path().join("a1-xyz-renamed_by_hand.json")).unwrap();

        let (file, _) = records.find("a1-xyz").unwrap();
        assert_eq!(file.file_name, "a1-xyz-renamed_by_hand.json");
    }

    #[test]
    fn test_load_all_skips_corrupt_and_foreign_files() {
        let (_tmp, records) = dir();
        records.write("a-1-ok.json", &record("a-1")).unwrap();
        fs::write(records.path().join("b-2-bad.json"), "{ nope").unwrap();
        fs::write(records.path().join(".gitkeep"), "").unwrap();
        fs::write(records.path().join("notes.txt"), "hello").unwrap();

        let all = records.load_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get_str(keys::ID), Some("a-1"));
    }

    #[test]
    fn test_find_corrupt_record_is_none() {
        let (_tmp, records) = dir();
        fs::write(records.path().join("c-3-bad.json"), "[]").unwrap();
        assert!(records.find("c-3").is_none());
    }

    #[test]
    fn test_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let records = RecordDirectory::new(tmp.path().join("absent"), "knowledge");
        assert!(records.load_all().is_empty());
        assert!(records.find("x").is_none());
        assert!(records.files().is_err());
    }

    #[test]
    fn test_remove() {
        let (_tmp, records) = dir();
        let file = records.write("d-4-x.json", &record("d-4")).unwrap();
        records.remove(&file).unwrap();
        assert!(records.find("d-4").is_none());
        assert!(records.remove(&file).is_err());
    }
}
