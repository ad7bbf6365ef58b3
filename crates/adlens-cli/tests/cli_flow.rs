//! cli_flow.rs
//!
//! Black-box tests over the `adlens` binary. Only the offline subcommands
//! (`validate`, `show`, `export`) are exercised: they run against fixture
//! files on disk and their `--json` output is parsed back.
//!
//! Cargo builds the binary for integration tests; no network is touched.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_adlens")
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .output()
        .expect("failed to run adlens")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "exit failure: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn envelope_text() -> String {
    serde_json::json!({
        "metadata": {"seller": "A", "reportPeriod": "2024-01"},
        "data": [{
            "type": "data_array",
            "title": "商品 × 廣告類型成效總覽",
            "data": [{
                "gno": 1, "g_name": "X", "ad_type": "展示型",
                "CVR": 10, "ROAS": 4, "GMV": 200
            }]
        }]
    })
    .to_string()
}

fn write_fixture(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn validate_reports_envelope_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "report.json", &envelope_text());

    let out = run(&["--json", "validate", path.to_str().unwrap()]);
    let doc = stdout_json(&out);
    assert_eq!(doc["ok"], true);
    assert_eq!(doc["blocks"], 1);
    assert_eq!(doc["seller"], "A");
    assert_eq!(doc["report_period"], "2024-01");
}

#[test]
fn validate_surfaces_parse_error_and_still_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "broken.json", "{oops");

    let out = run(&["--json", "validate", path.to_str().unwrap()]);
    let doc = stdout_json(&out);
    assert_eq!(doc["ok"], false);
    assert!(doc["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON format:"));
}

#[test]
fn validate_skips_non_json_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "report.txt", "{}");

    let out = run(&["--json", "validate", path.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("ignoring non-JSON file"));
}

#[test]
fn show_reduces_report_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "report.json", &envelope_text());

    let out = run(&["--json", "show", path.to_str().unwrap()]);
    let doc = stdout_json(&out);
    assert_eq!(doc["metadata"]["seller"], "A");
    assert_eq!(doc["view"]["view"], "report");
    assert_eq!(doc["view"]["performance_rows"].as_array().unwrap().len(), 1);
    assert_eq!(doc["view"]["performance_title"], "商品 × 廣告類型成效總覽");
}

#[test]
fn export_writes_document_under_out_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "report.json", &envelope_text());
    let out_dir = dir.path().join("exports");

    let out = run(&[
        "--json",
        "export",
        path.to_str().unwrap(),
        "--out",
        out_dir.to_str().unwrap(),
    ]);
    let doc = stdout_json(&out);
    assert_eq!(doc["kind"], "json");

    let written = fs::read_to_string(out_dir.join("dashboard-data-A-2024-01.json")).unwrap();
    let parsed: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed["metadata"]["seller"], "A");
    assert!(parsed["data"].is_array());
}

#[test]
fn export_flags_win_over_document_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "report.json", &envelope_text());
    let out_dir = dir.path().join("exports");

    let out = run(&[
        "--json",
        "export",
        path.to_str().unwrap(),
        "--out",
        out_dir.to_str().unwrap(),
        "--seller",
        "B",
        "--period",
        "2025-08",
    ]);
    let doc = stdout_json(&out);
    assert_eq!(doc["kind"], "json");

    let written = fs::read_to_string(out_dir.join("dashboard-data-B-2025-08.json")).unwrap();
    let parsed: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed["metadata"]["seller"], "B");
    assert_eq!(parsed["metadata"]["reportPeriod"], "2025-08");
}
