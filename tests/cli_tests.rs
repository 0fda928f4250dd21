//! Tests for the `pwquality` binary
//!
//! Every test points `--config` at a scratch file so nothing under
//! /etc is read or written.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn scratch(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pwquality.conf");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

fn pwquality() -> Command {
    let mut cmd = Command::cargo_bin("pwquality").unwrap();
    cmd.env_remove("PWQUALITY_CONF").env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_apply_updates_file() {
    let (_dir, path) = scratch("minlen = 9\ndcredit = 0\n");

    pwquality()
        .arg("--config")
        .arg(&path)
        .args(["apply", "--minlen", "12", "--dcredit", "-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 2 setting(s)"))
        .stdout(predicate::str::contains("minlen = 12"));

    assert_eq!(fs::read_to_string(&path).unwrap(), "minlen = 12\ndcredit = -1\n");
}

#[test]
fn test_apply_json_output() {
    let (_dir, path) = scratch("minlen = 9\n");

    let output = pwquality()
        .arg("--config")
        .arg(&path)
        .args(["--json", "apply", "--dictcheck", "true", "--enforce-for-root", "true"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "changed": true,
            "changes": {"dictcheck": "1", "enforcing_for_root": "1"}
        })
    );
}

#[test]
fn test_apply_unchanged() {
    let (_dir, path) = scratch("minlen = 12\n");

    pwquality()
        .arg("--config")
        .arg(&path)
        .args(["--json", "apply", "--minlen", "12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"changed\": false"));
}

#[test]
fn test_apply_with_backup() {
    let (dir, path) = scratch("minlen = 9\n");

    pwquality()
        .arg("--config")
        .arg(&path)
        .args(["apply", "--minlen", "14", "--backup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup saved to"));

    let backups: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p != &path)
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "minlen = 9\n");
}

#[test]
fn test_dry_run_does_not_write() {
    let (dir, path) = scratch("minlen = 9\n");

    pwquality()
        .arg("--config")
        .arg(&path)
        .args(["--dry-run", "apply", "--minlen", "14", "--backup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would update 1 setting(s)"));

    assert_eq!(fs::read_to_string(&path).unwrap(), "minlen = 9\n");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_params_file_overlaid_by_flags() {
    let (dir, path) = scratch("minlen = 9\n");
    let params = dir.path().join("params.json");
    fs::write(&params, r#"{"minlen": 10, "badwords": ["foo", "bar"]}"#).unwrap();

    pwquality()
        .arg("--config")
        .arg(&path)
        .args(["apply", "--minlen", "15", "--params-file"])
        .arg(&params)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "minlen = 15\nbadwords = foo,bar\n"
    );
}

#[test]
fn test_bad_params_file() {
    let (dir, path) = scratch("minlen = 9\n");
    let params = dir.path().join("params.json");
    fs::write(&params, r#"{"minlength": 10}"#).unwrap();

    pwquality()
        .arg("--config")
        .arg(&path)
        .args(["apply", "--params-file"])
        .arg(&params)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse parameters JSON"));
}

#[test]
fn test_apply_without_parameters_fails() {
    let (_dir, path) = scratch("minlen = 9\n");

    pwquality()
        .arg("--config")
        .arg(&path)
        .arg("apply")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No parameters given"));
}

#[test]
fn test_missing_config_reports_kind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pwquality.conf");

    let output = pwquality()
        .arg("--config")
        .arg(&path)
        .args(["--json", "apply", "--minlen", "12"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["failed"], true);
    assert_eq!(json["kind"], "ConfigFileMissing");
    assert!(!path.exists());
}

#[test]
fn test_multiline_value_reports_kind() {
    let (dir, path) = scratch("minlen = 9\n");
    let params = dir.path().join("params.json");
    fs::write(&params, r#"{"dictpath": "/x\nminlen = 1"}"#).unwrap();

    let output = pwquality()
        .arg("--config")
        .arg(&path)
        .args(["--json", "apply", "--params-file"])
        .arg(&params)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["kind"], "InvalidValue");
    assert_eq!(fs::read_to_string(&path).unwrap(), "minlen = 9\n");
}

#[test]
fn test_show_reports_stat_error_as_read_failure() {
    let (_dir, path) = scratch("minlen = 9\n");

    let output = pwquality()
        .arg("--config")
        .arg(path.join("pwquality.conf"))
        .args(["--json", "show"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["kind"], "ReadFailure");
}

#[test]
fn test_config_from_env() {
    let (_dir, path) = scratch("minlen = 9\n# note\n");

    pwquality()
        .env("PWQUALITY_CONF", &path)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("minlen = 9\n# note\n"));
}

#[test]
fn test_show_json() {
    let (_dir, path) = scratch("minlen = 9\n# c\nucredit=0\n");

    let output = pwquality()
        .arg("--config")
        .arg(&path)
        .args(["show", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json, serde_json::json!({"minlen": "9", "ucredit": "0"}));
}

#[test]
fn test_params_lists_remapped_key() {
    pwquality()
        .arg("params")
        .assert()
        .success()
        .stdout(predicate::str::contains("enforce_for_root"))
        .stdout(predicate::str::contains("written as enforcing_for_root"));
}
