//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    run_cli_with_input(data_dir, args, "")
}

fn run_cli_with_input(data_dir: &Path, args: &[&str], input: &str) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_timebox"))
        .args(args)
        .env("TIMEBOX_DATA_DIR", data_dir)
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    let output = child.wait_with_output().expect("Failed to wait for CLI");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

#[test]
fn test_activity_list_has_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["activity", "list", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Reading"));
}

#[test]
fn test_activity_add_and_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["activity", "add", "Music"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Activity created: Music"));

    let (code, _, stderr) = run_cli(dir.path(), &["activity", "add", "Music"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_activity_remove_missing_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["activity", "remove", "9999"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("activity not found"));
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["config", "set", "timer.work_minutes", "45"]);
    assert_eq!(code, 0);
    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "timer.work_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "45");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "timer.work_minutes", "0"]);
    assert_ne!(code, 0);
}

#[test]
fn test_session_list_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["session", "list", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(0));
}

#[test]
fn test_run_reports_status_and_mode_switch() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli_with_input(
        dir.path(),
        &["run", "--activity", "Study"],
        "status\nmode short\nquit\n",
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("\"type\":\"StateSnapshot\""));
    assert!(stdout.contains("\"remaining_secs\":1500"));
    assert!(stdout.contains("\"type\":\"ModeSwitched\""));
    assert!(stdout.contains("\"remaining_secs\":300"));
}

#[test]
fn test_run_rejects_zero_tick_interval() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[host]\ntick_interval_ms = 0\n").unwrap();
    let (code, _, stderr) = run_cli_with_input(dir.path(), &["run"], "quit\n");
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("host.tick_interval_ms"));
}

#[test]
fn test_dev_env_uses_separate_data_dir() {
    let home = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_timebox"))
        .args(["activity", "list"])
        .env_remove("TIMEBOX_DATA_DIR")
        .env("HOME", home.path())
        .env("TIMEBOX_ENV", "dev")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run CLI");
    assert!(output.status.success());

    let config_dir = home.path().join(".config");
    assert!(config_dir.join("timebox-dev").join("timebox.db").exists());
    assert!(!config_dir.join("timebox").exists());
}
