// logsift - tests/e2e_query.rs
//
// End-to-end tests for the load, merge and query pipeline.
//
// These tests read real fixture files from disk, run them through the line
// parser, and query the resulting record sets with no mocks in between.

use chrono::{NaiveDate, NaiveDateTime};
use logsift::core::discovery::{discover_files, DiscoveryConfig};
use logsift::core::export;
use logsift::core::record_set::{self, instance_from_path};
use logsift::core::{Criteria, RecordSet};
use logsift::util::error::{MergeError, ParseError};
use std::fs;
use std::path::PathBuf;

// =============================================================================
// Helpers
// =============================================================================

const NODE1: &str = "calc_run_20200101_node1_main.log";
const NODE2: &str = "calc_run_20200101_node2_main.log";

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load(name: &str) -> RecordSet {
    RecordSet::from_file(&fixture(name)).expect("fixture should load")
}

fn merged() -> RecordSet {
    load(NODE1).merge(&load(NODE2))
}

fn ts(h: u32, m: u32, s: u32, ms: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_milli_opt(h, m, s, ms)
        .unwrap()
}

fn some(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some((*v).to_string())).collect()
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn e2e_from_file_derives_instance_and_groups_continuations() {
    let set = load(NODE1);

    assert_eq!(set.instance(), "node1");
    // Preamble line before the first header is dropped; blank line skipped.
    assert_eq!(set.len(), 7);
    assert_eq!(
        set[1].original,
        "loading portfolio\nportfolio=EQ-1 positions=42"
    );
    assert_eq!(set[3].props.severity, "ERROR");
    assert_eq!(set[3].props.pid, 111);
    assert_eq!(set[3].timestamp(), ts(0, 0, 1, 500));
    assert_eq!(set[4].props.severity, "INFO");
    assert_eq!(set[4].original, "BEGIN batch b2");

    let seqs: Vec<u64> = set.iter().map(|r| r.props.seq).collect();
    assert_eq!(seqs, (0..7).collect::<Vec<u64>>());
}

#[test]
fn e2e_load_summary_counts_line_kinds() {
    let mut set = RecordSet::new("node1");
    let summary = set.load_file(&fixture(NODE1)).unwrap();

    assert_eq!(summary.records_added, 7);
    assert_eq!(summary.continuation_lines, 1);
    assert_eq!(summary.orphan_lines, 1);
    assert_eq!(summary.blank_lines, 1);
    assert_eq!(summary.lines_read, 10);
}

#[test]
fn e2e_second_load_continues_sequence_numbers() {
    let mut set = load(NODE1);
    set.load_file(&fixture(NODE2)).unwrap();

    assert_eq!(set.len(), 10);
    assert_eq!(set[7].props.seq, 7);
    assert_eq!(set[7].original, "worker online");
    // Appending does not re-sort.
    assert!(!set.is_time_ordered());
}

#[test]
fn e2e_rendering_uses_seq_and_iso_timestamp() {
    let set = load(NODE1);
    assert_eq!(
        set[3].to_string(),
        "00003 2020-01-01T00:00:01.500 job failed: code=7"
    );
}

#[test]
fn e2e_missing_file_is_io_error() {
    let err = RecordSet::from_file(&fixture("calc_run_20200101_ghost_main.log")).unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }), "{err:?}");
}

#[test]
fn e2e_file_name_without_instance_token_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, "01 Jan 2020, 00:00:00.100: INFO : [1] : hello\n").unwrap();

    let err = RecordSet::from_file(&path).unwrap_err();
    assert!(matches!(err, ParseError::InvalidFileName { .. }), "{err:?}");

    let set = RecordSet::from_file_with_instance(&path, "manual").unwrap();
    assert_eq!(set.instance(), "manual");
    assert_eq!(set.len(), 1);
}

#[test]
fn e2e_invalid_utf8_is_replaced_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a_b_c_bin_x.log");
    let mut bytes = b"01 Jan 2020, 00:00:00.100: INFO : [1] : payload ".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe]);
    bytes.extend_from_slice(b"\r\n01 Jan 2020, 00:00:00.200: INFO : [1] : next\r\n");
    fs::write(&path, bytes).unwrap();

    let set = RecordSet::from_file(&path).unwrap();
    assert_eq!(set.instance(), "bin");
    assert_eq!(set.len(), 2);
    assert!(set[0].original.starts_with("payload "));
    assert!(set[0].original.contains('\u{FFFD}'));
    assert_eq!(set[1].original, "next");
}

// =============================================================================
// Merge
// =============================================================================

#[test]
fn e2e_merge_interleaves_by_timestamp_with_left_first_on_ties() {
    let set = merged();

    assert_eq!(set.instance(), "node1");
    assert_eq!(set.len(), 10);
    assert!(set.is_time_ordered());

    let messages: Vec<&str> = set
        .iter()
        .map(|r| r.original.lines().next().unwrap_or(""))
        .collect();
    assert_eq!(
        messages,
        vec![
            "start job",
            "worker online",
            "loading portfolio",
            "BEGIN batch b1",
            "job failed: code=7",
            "task failed: code=9",
            "BEGIN batch b2",
            "END batch b2 status=ok",
            "worker idle",
            "retry scheduled",
        ]
    );
}

#[test]
fn e2e_merge_all_follows_argument_order() {
    let forward = record_set::merge_all(vec![load(NODE1), load(NODE2)]).unwrap();
    let reverse = record_set::merge_all(vec![load(NODE2), load(NODE1)]).unwrap();

    assert_eq!(forward.instance(), "node1");
    assert_eq!(reverse.instance(), "node2");
    assert_eq!(forward.len(), reverse.len());
    // Equal timestamps resolve in favour of the first argument.
    assert_eq!(reverse[0].original, "worker online");
    assert_eq!(forward[0].original, "start job");
}

#[test]
fn e2e_try_merge_rejects_unordered_input() {
    let mut unordered = load(NODE1);
    unordered.load_file(&fixture(NODE2)).unwrap();

    let err = unordered.try_merge(&load(NODE2)).unwrap_err();
    let MergeError::Unordered { instance, index } = err;
    assert_eq!(instance, "node1");
    assert_eq!(index, 7);
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn e2e_filter_by_severity_across_merged_files() {
    let errors = merged()
        .filter(&Criteria::new().with("severity", "ERROR"))
        .unwrap();

    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].props.pid, 111);
    assert_eq!(errors[1].props.pid, 222);
    assert_eq!(errors.instance(), "node1");
}

#[test]
fn e2e_count_with_keyword_and_time_range() {
    let set = merged();

    assert_eq!(set.count(&Criteria::new().keyword("failed")).unwrap(), 2);
    assert_eq!(set.count(&Criteria::new()).unwrap(), 10);

    // Bounds are exclusive: 00:00:01.000 and 00:00:03.000 are left out.
    let window = Criteria::new().time_range("2020-01-01 00:00:01,2020-01-01 00:00:03");
    assert_eq!(set.count(&window).unwrap(), 5);

    let combined = window.keyword("failed").with("pid", "222");
    assert_eq!(set.count(&combined).unwrap(), 1);
}

#[test]
fn e2e_filter_rejects_bad_criteria() {
    let set = merged();
    assert!(set.filter(&Criteria::new().with("colour", "red")).is_err());
    assert!(set.filter(&Criteria::new().with("pid", "abc")).is_err());
    assert!(set.filter(&Criteria::new().keyword("(unclosed")).is_err());
}

// =============================================================================
// Extraction
// =============================================================================

#[test]
fn e2e_select_and_select_first() {
    let set = merged();

    let codes = set.select(r"code=(\d+)", false).unwrap();
    assert_eq!(codes, vec![some(&["7"]), some(&["9"])]);

    let first = set.select_first(r"code=(\d+)").unwrap();
    assert_eq!(first, Some(some(&["7"])));

    assert_eq!(set.select_first(r"code=(x+)").unwrap(), None);
}

#[test]
fn e2e_select_multi_line_spans_continuation_lines() {
    let set = merged();
    let pattern = r"code=(\d+).at (\S+)";

    assert!(set.select(pattern, false).unwrap().is_empty());
    assert_eq!(
        set.select(pattern, true).unwrap(),
        vec![some(&["9", "worker.run(worker.py:88)"])]
    );
}

#[test]
fn e2e_select_multi_lines_pairs_begin_and_end_records() {
    let set = merged();
    let rows = set
        .select_multi_lines(&[r"^BEGIN batch (\w+)$", r"^END batch (\w+) status=(\w+)$"])
        .unwrap();

    // b1 is interrupted by an error record, so only b2 completes.
    assert_eq!(rows, vec![some(&["b2", "b2", "ok"])]);
}

// =============================================================================
// Discovery and export
// =============================================================================

#[test]
fn e2e_discovered_fixtures_load_with_their_instances() {
    let (files, warnings) = discover_files(&fixture(""), &DiscoveryConfig::default()).unwrap();
    assert!(warnings.is_empty(), "{warnings:?}");

    let instances: Vec<String> = files
        .iter()
        .map(|f| instance_from_path(f).unwrap())
        .collect();
    assert_eq!(instances, vec!["node1", "node2"]);
}

#[test]
fn e2e_export_filtered_records_as_csv() {
    let errors = merged()
        .filter(&Criteria::new().with("severity", "ERROR"))
        .unwrap();

    let mut out = Vec::new();
    export::export_records_csv(&errors, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();

    assert_eq!(lines.next(), Some("seq,timestamp,severity,pid,original"));
    assert!(lines.next().unwrap().contains("job failed: code=7"));
}
