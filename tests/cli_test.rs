/// Binary-level tests for argument handling. None of these reach the network.
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

fn archiver() -> Command {
    Command::new(env!("CARGO_BIN_EXE_slack-dm-archiver"))
}

#[test]
fn test_cli_help_flag() {
    archiver()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ID of the direct message chat"))
        .stdout(predicate::str::contains("--files-overwrite"));
}

#[test]
fn test_cli_missing_positionals() {
    archiver()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("<TOKEN>"));
}

#[test]
fn test_cli_invalid_date_format_lists_options() {
    archiver()
        .args(["xoxp-token", "D123", "-df", "xyz"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("ISO8601, UK"));
}

#[test]
fn test_cli_invalid_date_format_long_flag() {
    archiver()
        .args(["xoxp-token", "D123", "--date-format", "US"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Available options are: ISO8601, UK"));
}

#[test]
fn test_cli_invalid_start_date_fails_before_network() {
    let dir = tempfile::tempdir().unwrap();
    archiver()
        .current_dir(dir.path())
        .args(["xoxp-token", "D123", "-df", "uk", "-ds", "2024-01-31"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: invalid date '2024-01-31'"));
}

#[test]
fn test_cli_broken_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("settings.toml"), "[api\n").unwrap();

    archiver()
        .current_dir(dir.path())
        .args(["xoxp-token", "D123"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("TOML parse error"));
}
