//! Basic CLI surface tests

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("depot")
        .expect("binary builds")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("lock"));
}

#[test]
fn test_version_command() {
    Command::cargo_bin("depot")
        .expect("binary builds")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("depot"));
}

#[test]
fn test_completions_bash() {
    Command::cargo_bin("depot")
        .expect("binary builds")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("depot"));
}

#[test]
fn test_unknown_command_fails() {
    Command::cargo_bin("depot")
        .expect("binary builds")
        .arg("frobnicate")
        .assert()
        .failure();
}

#[test]
fn test_install_rejects_invalid_range() {
    let temp = tempfile::TempDir::new().expect("temp dir");
    common::depot(temp.path())
        .args(["install", "base-lib@not-a-range", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid version range"));
}
