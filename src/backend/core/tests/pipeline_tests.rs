//! End-to-end tests for the scoring pipeline.
//!
//! These run against real files in a temporary working directory.

use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use subscore_core::config::{PathsConfig, ResolvedPaths};
use subscore_core::error::ErrorCode;
use subscore_core::export::Report;
use subscore_core::identity::{IdentityKey, SequentialKeyMinter};
use subscore_core::merge::MergeEngine;
use subscore_core::pipeline::{run_with, RunOptions};
use subscore_core::scoring::FixedClock;
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

const HEADER: &str = "Type,UserId,UserName,Time\n";

const PRIMARY_ROWS: &str = "\
\"comment\",\"A1\",\"Alice\",\"2023-01-01T00:00:00Z\"
\"comment\",\"A1\",\"Alice\",\"2023-02-01T00:00:00.000Z\"
\"subscriber\",\"B1\",\"Bob\",\"2023-03-01T00:00:00Z\"
";

fn workspace(primary_rows: &str, manual_rows: &str) -> (TempDir, ResolvedPaths) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("results.csv"), format!("{HEADER}{primary_rows}")).unwrap();
    fs::write(dir.path().join("manual-sub-list.csv"), format!("{HEADER}{manual_rows}")).unwrap();

    let paths = PathsConfig {
        working_dir: dir.path().to_path_buf(),
        ..PathsConfig::default()
    }
    .resolve();
    (dir, paths)
}

fn frozen_engine() -> MergeEngine<FixedClock, SequentialKeyMinter> {
    let now = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    MergeEngine::with_parts(FixedClock(now), SequentialKeyMinter::default())
}

fn read_report(path: &Path) -> Report {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// Scoring Scenarios
// ============================================================================

#[test]
fn test_primary_log_scenario() {
    let (_dir, paths) = workspace(PRIMARY_ROWS, "");
    let summary = run_with(&paths, frozen_engine(), RunOptions::default()).unwrap();

    let board = &summary.outcome.board;
    let alice = board.get(&IdentityKey::from("A1")).unwrap();
    assert_eq!(alice.strength(), 2);
    assert_eq!(alice.months(), 4.96438);

    let bob = board.get(&IdentityKey::from("B1")).unwrap();
    assert_eq!(bob.strength(), 1);
    assert_eq!(bob.months(), 3.02466);

    let report = read_report(&paths.output);
    assert_eq!(report, summary.report);
    assert_eq!(report.subs[0].name, "Alice");
    assert_eq!(report.subs[1].name, "Bob");
}

#[test]
fn test_manual_entry_merges_into_existing_person() {
    let (_dir, paths) = workspace(
        PRIMARY_ROWS,
        "\"manual\",\"\",\"Alice\",\"2022-01-01T00:00:00Z\"\n",
    );
    let summary = run_with(&paths, frozen_engine(), RunOptions::default()).unwrap();

    let report = read_report(&paths.output);
    assert_eq!(report.subs.len(), 2);
    let alice = &report.subs[0];
    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.strength, 3);
    assert_eq!(alice.months, 16.96438);
    assert_eq!(summary.outcome.manual.matched_by_name, 1);
}

#[test]
fn test_manual_only_person_is_appended() {
    let (_dir, paths) = workspace(
        PRIMARY_ROWS,
        "\"manual\",\"\",\"Carol\",\"2023-05-01T00:00:00Z\"\n",
    );
    run_with(&paths, frozen_engine(), RunOptions::default()).unwrap();

    let report = read_report(&paths.output);
    assert_eq!(report.subs.len(), 3);
    let carol = &report.subs[2];
    assert_eq!(carol.name, "Carol");
    assert_eq!(carol.strength, 1);
}

#[test]
fn test_strength_sums_events_across_logs() {
    let (_dir, paths) = workspace(
        PRIMARY_ROWS,
        "\"manual\",\"\",\"Bob\",\"2023-04-01T00:00:00Z\"\n\
         \"manual\",\"\",\"Dana\",\"2023-04-01T00:00:00Z\"\n\
         \"manual\",\"\",\"Bob\",\"2023-04-02T00:00:00Z\"\n",
    );
    let summary = run_with(&paths, frozen_engine(), RunOptions::default()).unwrap();

    let total: u64 = summary.report.subs.iter().map(|s| s.strength).sum();
    assert_eq!(total, 6);
    assert_eq!(summary.outcome.board.get(&IdentityKey::from("B1")).unwrap().strength(), 3);
}

#[test]
fn test_frozen_run_is_deterministic() {
    let manual = "\"manual\",\"\",\"Alice\",\"2022-01-01T00:00:00Z\"\n\
                  \"manual\",\"\",\"Erin\",\"2022-02-01T00:00:00Z\"\n";
    let (_dir, paths) = workspace(PRIMARY_ROWS, manual);

    run_with(&paths, frozen_engine(), RunOptions::default()).unwrap();
    let first = fs::read_to_string(&paths.output).unwrap();
    run_with(&paths, frozen_engine(), RunOptions::default()).unwrap();
    let second = fs::read_to_string(&paths.output).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_dry_run_writes_nothing() {
    let (_dir, paths) = workspace(PRIMARY_ROWS, "");
    let summary = run_with(&paths, frozen_engine(), RunOptions { dry_run: true }).unwrap();

    assert!(!summary.written);
    assert_eq!(summary.report.subs.len(), 2);
    assert!(!paths.output.exists());
}

// ============================================================================
// Failure Modes
// ============================================================================

#[test]
fn test_malformed_primary_timestamp_produces_no_report() {
    let (_dir, paths) = workspace(
        "\"comment\",\"A1\",\"Alice\",\"not-a-date\"\n",
        "",
    );
    let err = run_with(&paths, frozen_engine(), RunOptions::default()).unwrap_err();

    assert_eq!(err.code(), ErrorCode::MalformedTimestamp);
    assert!(!paths.output.exists());
}

#[test]
fn test_malformed_manual_timestamp_keeps_previous_report() {
    let (_dir, paths) = workspace(
        PRIMARY_ROWS,
        "\"manual\",\"\",\"Alice\",\"01/01/2022\"\n",
    );
    fs::write(&paths.output, "{\"subs\":[]}").unwrap();

    let err = run_with(&paths, frozen_engine(), RunOptions::default()).unwrap_err();

    assert_eq!(err.code(), ErrorCode::MalformedTimestamp);
    assert_eq!(err.details().line, Some(2));
    assert_eq!(fs::read_to_string(&paths.output).unwrap(), "{\"subs\":[]}");
}

#[test]
fn test_short_row_fails_run() {
    let (_dir, paths) = workspace("\"comment\",\"A1\"\n", "");
    let err = run_with(&paths, frozen_engine(), RunOptions::default()).unwrap_err();

    assert_eq!(err.code(), ErrorCode::MalformedRow);
    assert!(!paths.output.exists());
}

#[test]
fn test_missing_manual_log_fails_before_output() {
    let (_dir, paths) = workspace(PRIMARY_ROWS, "");
    fs::remove_file(&paths.manual_log).unwrap();

    let err = run_with(&paths, frozen_engine(), RunOptions::default()).unwrap_err();

    assert_eq!(err.code(), ErrorCode::MissingInputFile);
    assert_eq!(err.details().path.as_deref(), Some(paths.manual_log.as_path()));
    assert!(!paths.output.exists());
}

#[test]
fn test_missing_primary_log_fails_before_output() {
    let (_dir, paths) = workspace(PRIMARY_ROWS, "");
    fs::remove_file(&paths.primary_log).unwrap();

    let err = run_with(&paths, frozen_engine(), RunOptions::default()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingInputFile);
    assert!(!paths.output.exists());
}
