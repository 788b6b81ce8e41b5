//! Tests that drive the compiled `wafguard` binary.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

const VALID_SUITE: &str = r"apiVersion: waf-test/v1
kind: WafTest
metadata:
  name: cli-smoke
spec:
  target:
    baseUrl: http://127.0.0.1:1
  tests:
    - name: unreachable target
      request:
        method: GET
        path: /
      expected:
        status: [200]
";

fn wafguard(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wafguard"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch wafguard")
}

fn write(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
}

#[test]
fn test_validate_accepts_valid_directory() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.yaml"), VALID_SUITE);
    write(&dir.path().join("b.yml"), VALID_SUITE);

    let output = wafguard(&["validate", dir.path().to_str().unwrap()]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stderr).contains("All test files are valid"));
}

#[test]
fn test_validate_rejects_schema_violations() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    write(&path, &VALID_SUITE.replace("kind: WafTest", "kind: Other"));

    let output = wafguard(&["validate", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("kind must be 'WafTest'"));
}

#[test]
fn test_run_exits_non_zero_when_tests_fail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("suite.yaml");
    write(&path, VALID_SUITE);

    let output = wafguard(&["run", path.to_str().unwrap(), "-F", "json"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"suite_name\": \"All Tests\""));
    assert!(stdout.contains("\"failed_tests\": 1"));
}

#[test]
fn test_run_with_missing_path_fails() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");

    let output = wafguard(&["run", missing.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_unknown_format_is_usage_error() {
    let output = wafguard(&["run", "suite.yaml", "-F", "xml"]);
    assert!(!output.status.success());
}
