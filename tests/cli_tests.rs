//! Integration tests for the ghwf CLI
//!
//! These tests run the actual binary against workflow files in a temp dir.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get the binary to test
fn ghwf_cmd() -> Command {
    let mut cmd = Command::cargo_bin("ghwf").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

const VALID: &str = r#"
name: CI
on: [push, pull_request]
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - run: cargo test
"#;

const CONFLICTING: &str = r#"on: push
permissions: write-all
permissions:
  issues: read
jobs: {}
"#;

#[test]
fn test_help_flag() {
    ghwf_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("dump"));
}

#[test]
fn test_dump_help() {
    ghwf_cmd()
        .args(["dump", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--format"));
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_valid_file() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "ci.yml", VALID);

    ghwf_cmd()
        .current_dir(temp_dir.path())
        .args(["check", "ci.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 workflow(s) valid"));
}

#[test]
fn test_check_reports_position_and_code() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "perms.yaml", CONFLICTING);

    ghwf_cmd()
        .current_dir(temp_dir.path())
        .args(["check", "perms.yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("perms.yaml:3:1"))
        .stderr(predicate::str::contains("GHWF-002"))
        .stderr(predicate::str::contains("Fix:"));
}

#[test]
fn test_check_reports_every_error() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "broken.yml",
        r#"on: pushh
jobs:
  build:
    steps:
      - name: nothing
"#,
    );

    ghwf_cmd()
        .current_dir(temp_dir.path())
        .args(["check", "broken.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GHWF-001"))
        .stderr(predicate::str::contains("GHWF-003"))
        .stderr(predicate::str::contains("3 error(s) in 1 of 1 workflow(s)"));
}

#[test]
fn test_check_defaults_to_workflow_dir() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".github/workflows/ci.yml", VALID);
    write(temp_dir.path(), ".github/workflows/release.yaml", VALID);
    write(temp_dir.path(), ".github/workflows/README.md", "not a workflow");

    ghwf_cmd()
        .current_dir(temp_dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 workflow(s) valid"));
}

#[test]
fn test_check_glob_pattern() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "flows/a.yml", VALID);
    write(temp_dir.path(), "flows/b.yml", CONFLICTING);

    ghwf_cmd()
        .current_dir(temp_dir.path())
        .args(["check", "flows/*.yml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("a.yml"))
        .stderr(predicate::str::contains("b.yml:3:1"));
}

#[test]
fn test_check_without_files_fails() {
    let temp_dir = TempDir::new().unwrap();

    ghwf_cmd()
        .current_dir(temp_dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_check_uses_project_config() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "custom.yml",
        "on: my_hook\njobs: {}\nx-extension: 1\n",
    );

    ghwf_cmd()
        .current_dir(temp_dir.path())
        .args(["check", "custom.yml"])
        .assert()
        .failure();

    write(
        temp_dir.path(),
        ".ghwf.yaml",
        "extra_webhook_events: [my_hook]\nallow_unknown_keys: true\n",
    );

    ghwf_cmd()
        .current_dir(temp_dir.path())
        .args(["check", "custom.yml"])
        .assert()
        .success();
}

#[test]
fn test_invalid_config_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "ci.yml", VALID);
    write(temp_dir.path(), "bad.yaml", "fail_fats: true\n");

    ghwf_cmd()
        .current_dir(temp_dir.path())
        .args(["check", "ci.yml", "--config", "bad.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

// ============================================================================
// dump
// ============================================================================

#[test]
fn test_dump_json() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "ci.yml", VALID);

    let output = ghwf_cmd()
        .current_dir(temp_dir.path())
        .args(["dump", "ci.yml"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["name"]["value"], "CI");
    assert_eq!(json["on"][1]["hook"]["value"], "pull_request");
    assert_eq!(json["jobs"]["build"]["runs_on"]["kind"], "github_hosted");
    let steps = json["jobs"]["build"]["steps"].as_array().unwrap();
    assert_eq!(steps[1]["exec"]["kind"], "run");
    assert_eq!(steps[1]["exec"]["run"]["pos"]["line"], 9);
}

#[test]
fn test_dump_yaml() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "ci.yml", VALID);

    ghwf_cmd()
        .current_dir(temp_dir.path())
        .args(["dump", "ci.yml", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("actions/checkout@v4"));
}

#[test]
fn test_dump_invalid_workflow() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "perms.yml", CONFLICTING);

    ghwf_cmd()
        .current_dir(temp_dir.path())
        .args(["dump", "perms.yml"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("GHWF-002"));
}
