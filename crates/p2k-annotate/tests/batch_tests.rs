//! Batch driver tests over the Prokka fixtures
//!
//! Covers:
//! - KO assignment output for matched, multi-code, evidence-less and
//!   unmatched genes
//! - Snapshot creation on the first run and reuse afterwards
//! - Per-file failure handling with and without fail-fast

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::Workspace;
use p2k_annotate::{BatchConfig, BatchDriver, LoadMode};
use p2k_common::P2kError;

const AMLFNMKI_EXPECTED: &str = "\
AMLFNMKI_00025\tK03569
AMLFNMKI_00026\tK00602
AMLFNMKI_00026\tK00604
AMLFNMKI_00027
AMLFNMKI_00029
";

fn config(ws: &Workspace) -> BatchConfig {
    BatchConfig::new(ws.input_dir(), ws.output_dir(), ws.table()).with_concurrency(2)
}

#[tokio::test]
async fn test_batch_assigns_ko_codes() {
    let ws = Workspace::new();

    let summary = BatchDriver::new(config(&ws)).run().await.unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.files_found, 2);
    assert_eq!(summary.files_processed, 2);
    assert_eq!(summary.lines_written, 6);
    assert_eq!(summary.totals.genes, 5);
    assert_eq!(summary.totals.matched, 3);
    assert_eq!(summary.totals.without_accession, 1);
    assert_eq!(summary.totals.unmatched, 1);

    assert_eq!(ws.read_output("AMLFNMKI.gbk"), AMLFNMKI_EXPECTED);
    assert_eq!(ws.read_output("BKPQZ.gbk"), "BKPQZ_00001\tK03569\n");
}

#[tokio::test]
async fn test_first_run_writes_snapshot_second_run_uses_it() {
    let ws = Workspace::new();

    let first = BatchDriver::new(config(&ws)).run().await.unwrap();
    assert_eq!(first.load_mode, LoadMode::Cold);
    assert!(ws.snapshot().is_file());

    // A warm run must not need the compressed table at all
    std::fs::remove_file(ws.table()).unwrap();
    let second = BatchDriver::new(config(&ws)).run().await.unwrap();
    assert_eq!(second.load_mode, LoadMode::Warm);
    assert_eq!(ws.read_output("AMLFNMKI.gbk"), AMLFNMKI_EXPECTED);
}

#[tokio::test]
async fn test_rebuild_snapshot_picks_up_new_table() {
    let ws = Workspace::new();
    BatchDriver::new(config(&ws)).run().await.unwrap();

    ws.write_table("P0A8I3\tK09861\n");
    let summary = BatchDriver::new(config(&ws).with_rebuild_snapshot(true))
        .run()
        .await
        .unwrap();

    assert_eq!(summary.load_mode, LoadMode::Cold);
    assert_eq!(
        ws.read_output("AMLFNMKI.gbk"),
        "AMLFNMKI_00025\nAMLFNMKI_00026\nAMLFNMKI_00027\nAMLFNMKI_00029\tK09861\n"
    );
}

#[tokio::test]
async fn test_malformed_file_is_reported_and_others_continue() {
    let ws = Workspace::new();
    ws.add_input(
        "broken.gbk",
        "     CDS             1..90\n                     /locus_tag=AMLFNMKI_99999\n",
    );

    let summary = BatchDriver::new(config(&ws)).run().await.unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.files_found, 3);
    assert_eq!(summary.files_processed, 2);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].input.ends_with("broken.gbk"));
    assert!(summary.failures[0].error.contains("line 2"));
    assert!(!ws.output_dir().join("broken.gbk.ko.out").exists());
    assert_eq!(ws.read_output("AMLFNMKI.gbk"), AMLFNMKI_EXPECTED);
}

#[tokio::test]
async fn test_fail_fast_returns_parse_error() {
    let ws = Workspace::new();
    ws.add_input(
        "broken.gbk",
        "     CDS             1..90\n                     /locus_tag=\"X_1\"\n                     /inference=\"similar to AA sequence:RefSeq:WP_1\"\n",
    );

    let err = BatchDriver::new(config(&ws).with_fail_fast(true).with_concurrency(1))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, P2kError::Parse { line_number: 3, .. }));
}

#[tokio::test]
async fn test_fail_fast_starts_no_further_files() {
    let ws = Workspace::new();
    // Sorts ahead of the fixtures, so it is the first file started
    ws.add_input(
        "0_broken.gbk",
        "     CDS             1..90\n                     /locus_tag=X_1\n",
    );

    let err = BatchDriver::new(config(&ws).with_fail_fast(true).with_concurrency(1))
        .run()
        .await
        .unwrap_err();
    assert!(err.is_parse());

    assert!(!ws.output_dir().join("AMLFNMKI.gbk.ko.out").exists());
    assert!(!ws.output_dir().join("BKPQZ.gbk.ko.out").exists());
}

#[tokio::test]
async fn test_missing_table_is_io_error() {
    let ws = Workspace::new();
    std::fs::remove_file(ws.table()).unwrap();

    let err = BatchDriver::new(config(&ws)).run().await.unwrap_err();
    assert!(matches!(err, P2kError::File { .. }));
}

#[tokio::test]
async fn test_empty_input_dir() {
    let ws = Workspace::new();
    for name in ["AMLFNMKI.gbk", "BKPQZ.gbk"] {
        std::fs::remove_file(ws.input_dir().join(name)).unwrap();
    }

    let summary = BatchDriver::new(config(&ws)).run().await.unwrap();
    assert!(summary.is_success());
    assert_eq!(summary.files_found, 0);
    assert!(ws.output_dir().is_dir());
}

#[tokio::test]
async fn test_zero_concurrency_rejected() {
    let ws = Workspace::new();
    let err = BatchDriver::new(config(&ws).with_concurrency(0))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, P2kError::Config(_)));
}
