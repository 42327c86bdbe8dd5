//! CLI argument validation tests.
//!
//! Tests command-line argument parsing, validation, and error handling.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

mod common;

use predicates::prelude::*;

// === Missing/Invalid Path Tests ===

#[test]
fn test_missing_path_shows_error() {
    let home = tempfile::tempdir().unwrap();
    common::command(home.path()).assert().code(2).stderr(
        predicate::str::contains("No paths specified")
            .or(predicate::str::contains("required"))
            .or(predicate::str::contains("PATHS")),
    );
}

#[test]
fn test_nonexistent_path_is_an_error() {
    let home = tempfile::tempdir().unwrap();
    common::command(home.path())
        .arg("/nonexistent/path/to/front.jpg")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"))
        .stderr(predicate::str::contains("No supported images"));
}

#[test]
fn test_empty_directory_is_an_error() {
    let home = tempfile::tempdir().unwrap();
    let empty = home.path().join("empty");
    std::fs::create_dir(&empty).unwrap();

    common::command(home.path())
        .arg(&empty)
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_unknown_flag_rejected() {
    let home = tempfile::tempdir().unwrap();
    common::command(home.path())
        .arg("--format")
        .arg("xml")
        .arg("front.jpg")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--format"));
}

// === Help and Version ===

#[test]
fn test_help_lists_flags() {
    let home = tempfile::tempdir().unwrap();
    common::command(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--location"))
        .stdout(predicate::str::contains("--rule-based"))
        .stdout(predicate::str::contains("--no-vision"))
        .stdout(predicate::str::contains("models"));
}

#[test]
fn test_version() {
    let home = tempfile::tempdir().unwrap();
    common::command(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("damage-assess"));
}

// === Models Subcommand ===

#[test]
fn test_models_path_uses_data_dir() {
    let home = tempfile::tempdir().unwrap();
    let expected = home.path().join("data").join("damage-assess").join("severity");

    common::command(home.path())
        .args(["models", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.to_string_lossy().into_owned()));
}

#[test]
fn test_models_list_empty_dir() {
    let home = tempfile::tempdir().unwrap();
    common::command(home.path())
        .args(["models", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Layout: none"))
        .stdout(predicate::str::contains("incomplete"));
}

#[test]
fn test_models_list_shows_fingerprints() {
    let home = tempfile::tempdir().unwrap();
    let artifacts = common::write_artifacts(home.path());

    common::command(home.path())
        .args(["models", "--models-dir"])
        .arg(&artifacts)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Layout: voting"))
        .stdout(predicate::str::contains("✓ voting_model.json sha256:"))
        .stdout(predicate::str::contains("✗ model.json"))
        .stdout(predicate::str::contains("Severity model ready"));
}

#[test]
fn test_assess_subcommand_matches_default() {
    let home = tempfile::tempdir().unwrap();
    let incident = common::write_incident(home.path());

    common::command(home.path())
        .args(["assess", "--rule-based", "--no-vision"])
        .arg(&incident)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"analysis_method\":\"error\""));
}
