//! CLI integration tests
//!
//! Runs the `paramsync` binary with assert_cmd. Documents are copied into a
//! temp dir first so the fixtures are never rewritten.

// The binary is not instrumented during coverage runs
#![cfg(not(coverage))]
#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn test_data_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("test-data");
    path.push(filename);
    path
}

fn copy_fixture(dir: &Path, filename: &str) -> PathBuf {
    let target = dir.join(filename);
    fs::copy(test_data_path(filename), &target).unwrap();
    target
}

fn paramsync() -> Command {
    let mut cmd = Command::cargo_bin("paramsync").unwrap();
    cmd.env_remove("PARAMSYNC_CONFIG")
        .env_remove("PARAMSYNC_SHEET")
        .env_remove("RUST_LOG");
    cmd
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    paramsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("paramsync"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    paramsync()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("paramsync"));
}

#[test]
fn test_apply_help() {
    paramsync()
        .args(["apply", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--literal"));
}

// ═══════════════════════════════════════════════════════════════════════════
// EXTRACT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_extract_prints_parameters() {
    paramsync()
        .arg("extract")
        .arg(test_data_path("part.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("5 parameter(s)"))
        .stdout(predicate::str::contains("width"))
        .stdout(predicate::str::contains("200 mm"))
        .stdout(predicate::str::contains("clearance"));
}

#[test]
fn test_extract_writes_parameter_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("params.json");

    paramsync()
        .arg("extract")
        .arg(test_data_path("part.yaml"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 5 parameter(s)"));

    let params = paramsync::parser::parse_parameters(&output).unwrap();
    assert_eq!(
        params.names(),
        vec!["width", "height", "tilt", "count", "clearance"]
    );
    assert_eq!(params.get("tilt").unwrap().group.as_deref(), Some("Panel"));
}

#[test]
fn test_extract_unknown_sheet_fails() {
    paramsync()
        .args(["--sheet", "Params", "extract"])
        .arg(test_data_path("part.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No sheet 'Params'"));
}

#[test]
fn test_extract_sheet_from_env() {
    paramsync()
        .env("PARAMSYNC_SHEET", "Params")
        .arg("extract")
        .arg(test_data_path("part.yaml"))
        .assert()
        .failure();
}

#[test]
fn test_extract_missing_document() {
    paramsync()
        .arg("extract")
        .arg(test_data_path("nope.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Couldn't find file"));
}

// ═══════════════════════════════════════════════════════════════════════════
// APPLY
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_apply_dry_run_reports_differences() {
    let dir = TempDir::new().unwrap();
    let document = copy_fixture(dir.path(), "part.yaml");
    let before = fs::read_to_string(&document).unwrap();

    paramsync()
        .arg("apply")
        .arg(&document)
        .arg(test_data_path("params.yaml"))
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN"))
        .stdout(predicate::str::contains("Parameter will be deleted: name = 'height'"))
        .stdout(predicate::str::contains("Parameter will change: name = 'width'"));

    assert_eq!(fs::read_to_string(&document).unwrap(), before);
}

#[test]
fn test_apply_save_as() {
    let dir = TempDir::new().unwrap();
    let document = copy_fixture(dir.path(), "part.yaml");
    let before = fs::read_to_string(&document).unwrap();
    let output = dir.path().join("part-v2.yaml");

    paramsync()
        .arg("apply")
        .arg(&document)
        .arg(test_data_path("params.yaml"))
        .arg("--save-as")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 4 parameter(s), rebuilt 2 variable set(s)"));

    assert_eq!(fs::read_to_string(&document).unwrap(), before);
    let saved = fs::read_to_string(&output).unwrap();
    assert!(saved.contains("Spreadsheet.depth"));
}

#[test]
fn test_apply_in_place_with_literal_values() {
    let dir = TempDir::new().unwrap();
    let document = copy_fixture(dir.path(), "part.yaml");

    paramsync()
        .arg("apply")
        .arg(&document)
        .arg(test_data_path("params.json"))
        .arg("--literal")
        .assert()
        .success();

    let saved = fs::read_to_string(&document).unwrap();
    assert!(!saved.contains("expression:"));
    assert!(saved.contains("hole"));
}

#[test]
fn test_apply_config_file() {
    let dir = TempDir::new().unwrap();
    let document = copy_fixture(dir.path(), "part.yaml");
    let config = dir.path().join("paramsync.yaml");
    fs::write(&config, "default_group: Misc\n").unwrap();

    paramsync()
        .arg("--config")
        .arg(&config)
        .arg("apply")
        .arg(&document)
        .arg(test_data_path("params.json"))
        .assert()
        .success();

    let saved = fs::read_to_string(&document).unwrap();
    assert!(saved.contains("label: Misc"));
}

#[test]
fn test_apply_invalid_parameter_file() {
    let dir = TempDir::new().unwrap();
    let document = copy_fixture(dir.path(), "part.yaml");
    let params = dir.path().join("bad.yaml");
    fs::write(&params, "Name: [a, b]\nValue: [1]\n").unwrap();

    paramsync()
        .arg("apply")
        .arg(&document)
        .arg(&params)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation"));
}

// ═══════════════════════════════════════════════════════════════════════════
// LAYOUT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_layout_command() {
    paramsync()
        .arg("layout")
        .arg(test_data_path("part.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Sheet: Spreadsheet"))
        .stdout(predicate::str::contains("4 parameter row(s)"));
}

#[test]
fn test_layout_missing_header() {
    paramsync()
        .arg("layout")
        .arg(test_data_path("no_description.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Structural"));
}
