// Integration tests for the scout CLI.
//
// These tests use assert_cmd to invoke the binary and verify
// exit codes and stdout/stderr output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn scout() -> Command {
    Command::cargo_bin("scout").expect("binary should exist")
}

#[test]
fn cli_version_flag() {
    scout()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("scout"));
}

#[test]
fn cli_help_flag() {
    scout()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("student initiatives"));
}

#[test]
fn score_requires_snapshot() {
    scout()
        .arg("score")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn rank_requires_lens() {
    scout()
        .arg("rank")
        .arg("snapshot.json")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("--lens"));
}

#[test]
fn negative_top_is_a_caller_error() {
    scout()
        .arg("rank")
        .arg("snapshot.json")
        .args(["--lens", "conviction", "--top", "-1"])
        .assert()
        .code(3);
}

#[test]
fn check_config_with_defaults_succeeds() {
    let dir = TempDir::new().expect("temp dir should be created");
    scout()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("check-config")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("conviction, outreach_now, venture_upside"));
}

#[test]
fn check_config_rejects_bad_weights_with_exit_2() {
    let dir = TempDir::new().expect("temp dir should be created");
    fs::write(
        dir.path().join("scout.toml"),
        "[dimensions.team_dd.components]\nnamed_operators = 0.5\ntechnical_leads = 0.2\n",
    )
    .expect("config should write");

    scout()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("check-config")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("dimensions.team_dd.components must sum to 1.0"));
}

#[test]
fn missing_snapshot_exits_3() {
    let dir = TempDir::new().expect("temp dir should be created");
    scout()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("score")
        .arg("missing.json")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("path does not exist"));
}
