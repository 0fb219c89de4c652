//! Integration tests for the session store and the lifecycle sweep.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use casefile::models::{Record, SessionStatus, keys};
use casefile::storage::codec;
use casefile::{DebugPaths, LifecycleSweeper, SessionStore};
use std::fs::{self, File};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

fn fresh_store() -> (TempDir, SessionStore) {
    let tmp = TempDir::new().expect("temp dir");
    let store = SessionStore::new(&DebugPaths::for_project(tmp.path()));
    store.initialize().expect("initialize");
    (tmp, store)
}

/// Sets a session file's modification time to `age` before `now`.
fn age_session(store: &SessionStore, id: &str, now: SystemTime, age: Duration) {
    let file = store
        .active_records()
        .resolve(id)
        .unwrap()
        .expect("session file");
    File::options()
        .write(true)
        .open(&file.path)
        .unwrap()
        .set_modified(now - age)
        .unwrap();
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_initialize_creates_layout_and_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let store = SessionStore::new(&DebugPaths::for_project(tmp.path()));

    let first = store.initialize().unwrap();
    let second = store.initialize().unwrap();

    assert!(tmp.path().join("logs/debug/sessions").is_dir());
    assert!(tmp.path().join("logs/debug/archived").is_dir());
    assert_eq!(first.checked, 0);
    assert_eq!(second.archived, 0);
}

#[test]
fn test_record_file_is_pretty_camel_case_json() {
    let (tmp, store) = fresh_store();
    let id = store.create("Error: first line\nsecond line").unwrap();

    let path = tmp
        .path()
        .join("logs/debug/sessions")
        .join(format!("{id}-Error__first_line.json"));
    let text = fs::read_to_string(path).unwrap();
    assert!(text.starts_with("{\n  \"id\": "));
    assert!(text.contains("\"errorLog\": \"Error: first line\\nsecond line\""));
    assert!(text.contains("\"status\": \"new\""));
    assert!(text.contains("\"createdAt\": "));
}

#[test]
fn test_long_first_line_is_summarized_in_file_name() {
    let (_tmp, store) = fresh_store();
    let line = "x".repeat(80);
    let id = store.create(&line).unwrap();

    let files = store.active_records().files().unwrap();
    assert_eq!(
        files[0].file_name,
        format!("{id}-{}....json", "x".repeat(47))
    );
}

#[test]
fn test_ids_are_base36_with_suffix() {
    let (_tmp, store) = fresh_store();
    let id = store.create("Error").unwrap();
    let (millis, suffix) = id.as_str().split_once('-').unwrap();
    assert_eq!(suffix.len(), 4);
    assert!(
        id.as_str()
            .chars()
            .all(|c| c == '-' || c.is_ascii_digit() || c.is_ascii_lowercase())
    );
    assert!(millis.len() >= 8);
}

// ============================================================================
// Sweep
// ============================================================================

#[test]
fn test_sweep_boundary_at_48_hours() {
    let (_tmp, store) = fresh_store();
    let now = SystemTime::now();

    let stale = store.create("Error: stale").unwrap();
    let fresh = store.create("Error: fresh").unwrap();
    age_session(&store, stale.as_str(), now, Duration::from_secs(48 * 3600));
    age_session(
        &store,
        fresh.as_str(),
        now,
        Duration::from_secs(47 * 3600 + 59 * 60),
    );

    let result = LifecycleSweeper::new().sweep_at(&store, now).unwrap();
    assert_eq!(result.checked, 2);
    assert_eq!(result.archived, 1);
    assert_eq!(result.failed, 0);

    assert!(store.get(stale.as_str()).is_none());
    assert_eq!(
        store.get_archived(stale.as_str()).unwrap().status(),
        Some(SessionStatus::Archived)
    );
    assert!(store.get(fresh.as_str()).is_some());
}

#[test]
fn test_initialize_sweeps_old_sessions() {
    let (tmp, store) = fresh_store();
    let id = store.create("Error: old").unwrap();
    age_session(
        &store,
        id.as_str(),
        SystemTime::now(),
        Duration::from_secs(72 * 3600),
    );

    let reopened = SessionStore::new(&DebugPaths::for_project(tmp.path()));
    let result = reopened.initialize().unwrap();
    assert_eq!(result.archived, 1);
    assert!(reopened.list_all().is_empty());
    assert_eq!(reopened.list_archived().len(), 1);
}

#[test]
fn test_sweep_counts_unreadable_stale_files_as_failed() {
    let (_tmp, store) = fresh_store();
    let now = SystemTime::now();
    let dir = store.active_records().path().to_path_buf();

    fs::write(dir.join("bad-1-x.json"), "{ not json").unwrap();
    store
        .active_records()
        .write("noid-1-x.json", &Record::new().with(keys::ERROR_LOG, "x"))
        .unwrap();
    for name in ["bad-1-x.json", "noid-1-x.json"] {
        File::options()
            .write(true)
            .open(dir.join(name))
            .unwrap()
            .set_modified(now - Duration::from_secs(50 * 3600))
            .unwrap();
    }

    let result = LifecycleSweeper::new().sweep_at(&store, now).unwrap();
    assert_eq!(result.checked, 2);
    assert_eq!(result.archived, 0);
    assert_eq!(result.failed, 2);
    assert!(result.summary().contains("2 failed"));
}

#[test]
fn test_sweep_ignores_files_from_the_future() {
    let (_tmp, store) = fresh_store();
    let id = store.create("Error: future").unwrap();
    let now = SystemTime::now() - Duration::from_secs(3600);

    let result = LifecycleSweeper::new().sweep_at(&store, now).unwrap();
    assert_eq!(result.archived, 0);
    assert!(store.get(id.as_str()).is_some());
}

// ============================================================================
// Lookup and archive
// ============================================================================

#[test]
fn test_lookup_uses_id_prefix_not_full_name() {
    let (_tmp, store) = fresh_store();
    let id = store.create("Error: original name").unwrap();
    let file = store.active_records().resolve(id.as_str()).unwrap().unwrap();
    fs::rename(
        &file.path,
        store
            .active_records()
            .path()
            .join(codec::record_file_name(id.as_str(), "hand edited")),
    )
    .unwrap();

    assert_eq!(store.get(id.as_str()).unwrap().error_log(), "Error: original name");
    store.archive(id.as_str()).unwrap();
    let archived = store.archived_records().files().unwrap();
    assert_eq!(archived[0].file_name, format!("{id}-hand_edited.json"));
}

#[test]
fn test_archive_keeps_extra_fields() {
    let (_tmp, store) = fresh_store();
    let id = store.create("Error: extra").unwrap();
    store
        .update(id.as_str(), Record::new().with("customField", 42))
        .unwrap();
    store.archive(id.as_str()).unwrap();

    let archived = store.get_archived(id.as_str()).unwrap();
    assert_eq!(archived.record().get("customField"), Some(&serde_json::json!(42)));
}

#[test]
fn test_list_all_ignores_non_record_files() {
    let (_tmp, store) = fresh_store();
    store.create("Error: one").unwrap();
    fs::write(store.active_records().path().join(".gitkeep"), "").unwrap();
    fs::write(store.active_records().path().join("README.md"), "#").unwrap();
    assert_eq!(store.list_all().len(), 1);
}
