//! End-to-end tests for the prokka2kegg binary
//!
//! These tests validate:
//! - Argument handling
//! - Output files for a directory of Prokka annotations
//! - Exit status when a file fails
//! - The JSON run summary

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use assert_cmd::Command;
use common::Workspace;
use predicates::prelude::*;

fn prokka2kegg(ws: &Workspace) -> Command {
    let mut cmd = Command::cargo_bin("prokka2kegg").unwrap();
    for var in ["RUST_LOG", "P2K_LOG_LEVEL", "P2K_LOG_OUTPUT", "P2K_LOG_FORMAT", "P2K_LOG_DIR", "P2K_LOG_FILTER"] {
        cmd.env_remove(var);
    }
    cmd.arg("-i")
        .arg(ws.input_dir())
        .arg("-o")
        .arg(ws.output_dir())
        .arg("-d")
        .arg(ws.table());
    cmd
}

#[test]
fn test_help_lists_flags() {
    let mut cmd = Command::cargo_bin("prokka2kegg").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--data"))
        .stdout(predicate::str::contains("--fail-fast"));
}

#[test]
fn test_missing_required_args() {
    let mut cmd = Command::cargo_bin("prokka2kegg").unwrap();
    cmd.env_remove("P2K_INPUT")
        .env_remove("P2K_OUTPUT")
        .env_remove("P2K_DATA")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn test_run_writes_ko_files_and_snapshot() {
    let ws = Workspace::new();

    prokka2kegg(&ws).assert().success();

    assert_eq!(
        ws.read_output("AMLFNMKI.gbk"),
        "AMLFNMKI_00025\tK03569\nAMLFNMKI_00026\tK00602\nAMLFNMKI_00026\tK00604\nAMLFNMKI_00027\nAMLFNMKI_00029\n"
    );
    assert_eq!(ws.read_output("BKPQZ.gbk"), "BKPQZ_00001\tK03569\n");
    assert!(ws.snapshot().is_file());
}

#[test]
fn test_report_unmatched_logs_accessions() {
    let ws = Workspace::new();

    prokka2kegg(&ws)
        .arg("--report-unmatched")
        .assert()
        .success()
        .stderr(predicate::str::contains("P0A8I3"));
}

#[test]
fn test_verbose_enables_debug_logging() {
    let ws = Workspace::new();

    prokka2kegg(&ws)
        .arg("--verbose")
        .assert()
        .success()
        .stderr(predicate::str::contains("Annotation file read"));
}

#[test]
fn test_failed_file_sets_exit_code() {
    let ws = Workspace::new();
    ws.add_input(
        "broken.gbk",
        "     CDS             1..90\n                     /locus_tag=\"\"\n",
    );

    prokka2kegg(&ws)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed:"))
        .stderr(predicate::str::contains("broken.gbk"));

    // The good files are still written
    assert_eq!(ws.read_output("BKPQZ.gbk"), "BKPQZ_00001\tK03569\n");
}

#[test]
fn test_missing_table_fails() {
    let ws = Workspace::new();
    std::fs::remove_file(ws.table()).unwrap();

    prokka2kegg(&ws)
        .assert()
        .failure()
        .stderr(predicate::str::contains("idmapping_KO.tab.gz"));
}

#[test]
fn test_summary_json() {
    let ws = Workspace::new();
    let summary_path = ws.root.path().join("summary.json");

    prokka2kegg(&ws)
        .arg("--summary")
        .arg(&summary_path)
        .assert()
        .success();

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(summary["files_found"], 2);
    assert_eq!(summary["files_processed"], 2);
    assert_eq!(summary["load_mode"], "cold");
    assert_eq!(summary["totals"]["matched"], 3);
    assert_eq!(summary["totals"]["unmatched"], 1);
    assert!(summary["failures"].as_array().unwrap().is_empty());
}
