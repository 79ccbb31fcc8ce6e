//! Integration tests for the parapat CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn parapat(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("parapat").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("PARAPAT_THREADS")
        .env_remove("RUST_LOG");
    cmd
}

/// Test CLI binary exists and responds to --help
#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    parapat(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("parallel patterns"));
}

/// Test CLI responds to --version
#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    parapat(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("parapat"));
}

/// Test invalid subcommand shows error
#[test]
fn test_invalid_subcommand() {
    let dir = TempDir::new().unwrap();
    parapat(&dir)
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// Sorting gives the same answer on every back end and degree
#[test]
fn test_sort_on_every_backend() {
    let dir = TempDir::new().unwrap();
    for backend in ["sequential", "native", "task-group"] {
        for threads in ["0", "1", "2", "4", "8"] {
            parapat(&dir)
                .args(["--quiet", "--backend", backend, "--threads", threads])
                .args(["sort", "8", "3", "5", "1", "9", "2", "7", "4"])
                .assert()
                .success()
                .stdout("1 2 3 4 5 7 8 9\n");
        }
    }
}

#[test]
fn test_sort_accepts_negative_numbers() {
    let dir = TempDir::new().unwrap();
    parapat(&dir)
        .args(["-q", "sort", "3", "-7", "0"])
        .assert()
        .success()
        .stdout("-7 0 3\n");
}

#[test]
fn test_sum_matches_closed_form() {
    let dir = TempDir::new().unwrap();
    parapat(&dir)
        .args(["sum", "100000", "--grain", "100", "--fanout", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5000050000"))
        .stdout(predicate::str::contains("matches"));
}

#[test]
fn test_sum_rejects_small_fanout() {
    let dir = TempDir::new().unwrap();
    parapat(&dir)
        .args(["sum", "10", "--fanout", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fanout"));
}

#[test]
fn test_map_preserves_order() {
    let dir = TempDir::new().unwrap();
    parapat(&dir)
        .args(["-q", "--threads", "3", "map", "1", "2", "3", "4", "5", "6", "7"])
        .assert()
        .success()
        .stdout("1 4 9 16 25 36 49\n");
}

#[test]
fn test_map_unordered_keeps_values() {
    let dir = TempDir::new().unwrap();
    let output = parapat(&dir)
        .args(["-q", "--threads", "4", "map", "--unordered", "1", "2", "3", "4"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let mut values: Vec<i64> = String::from_utf8(output.stdout)
        .unwrap()
        .split_whitespace()
        .map(|v| v.parse().unwrap())
        .collect();
    values.sort();
    assert_eq!(values, vec![1, 4, 9, 16]);
}

/// Test configuration functionality
#[test]
fn test_config_show_uses_project_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("parapat.toml"),
        "[execution]\nbackend = \"task_group\"\nqueue_size = 7\n",
    )
    .unwrap();

    parapat(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("queue_size = 7"))
        .stdout(predicate::str::contains("task_group"));
}

#[test]
fn test_custom_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("custom.json");
    fs::write(&config_path, r#"{ "execution": { "backend": "sequential" } }"#).unwrap();

    parapat(&dir)
        .arg("--config")
        .arg(&config_path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sequential"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("parapat.toml"), "[execution]\nqueue_size = 0\n").unwrap();

    parapat(&dir)
        .args(["sort", "2", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("queue_size"));
}

#[test]
fn test_env_overrides_config() {
    let dir = TempDir::new().unwrap();
    parapat(&dir)
        .env("PARAPAT_EXECUTION__BACKEND", "task_group")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("task_group"));
}
