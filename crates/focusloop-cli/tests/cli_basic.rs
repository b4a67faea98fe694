//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_focusloop"))
        .args(args)
        .env("FOCUSLOOP_DATA_DIR", data_dir)
        .env_remove("FOCUSLOOP_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a timer command and parse the printed snapshot.
fn timer(data_dir: &Path, action: &str) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(data_dir, &["timer", action]);
    assert_eq!(code, 0, "timer {action} failed: {stderr}");
    serde_json::from_str(&stdout).expect("snapshot should be JSON")
}

#[test]
fn test_fresh_status_is_idle_work() {
    let dir = tempfile::tempdir().unwrap();
    let snap = timer(dir.path(), "status");
    assert_eq!(snap["type"], "StateSnapshot");
    assert_eq!(snap["status"], "idle");
    assert_eq!(snap["session_type"], "work");
    assert_eq!(snap["seconds_left"], 1500);
    assert_eq!(snap["display"]["clock"], "25:00");
    assert_eq!(snap["completed_work_sessions"], 0);
}

#[test]
fn test_start_pause_resume_reset() {
    let dir = tempfile::tempdir().unwrap();

    let started = timer(dir.path(), "start");
    assert_eq!(started["status"], "running");
    let deadline = started["end_at_ms"].as_u64().expect("deadline while running");

    let again = timer(dir.path(), "start");
    assert_eq!(again["end_at_ms"].as_u64(), Some(deadline));

    let paused = timer(dir.path(), "pause");
    assert_eq!(paused["status"], "paused");
    assert!(paused["end_at_ms"].is_null());
    let left = paused["seconds_left"].as_u64().unwrap();
    assert!(left <= 1500 && left >= 1490);

    let resumed = timer(dir.path(), "resume");
    assert_eq!(resumed["status"], "running");
    assert_eq!(resumed["seconds_left"].as_u64(), Some(left));

    let reset = timer(dir.path(), "reset");
    assert_eq!(reset["status"], "idle");
    assert_eq!(reset["seconds_left"], 1500);
    assert!(reset["end_at_ms"].is_null());
}

#[test]
fn test_config_set_retargets_idle_timer() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "set", "work_duration", "60"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "work_duration"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "60");

    let snap = timer(dir.path(), "status");
    assert_eq!(snap["seconds_left"], 60);
    assert_eq!(snap["display"]["clock"], "01:00");
}

#[test]
fn test_config_set_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();

    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "sessions_before_long_break", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("sessions_before_long_break"), "stderr: {stderr}");

    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "work_duration", "soon"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "stderr: {stderr}");

    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "sessions_before_long_break"]);
    assert_eq!(stdout.trim(), "4");
}

#[test]
fn test_config_get_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "volume"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("volume"));
}

#[test]
fn test_config_list_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "label", "writing"]);

    let (stdout, _, code) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0);
    let listed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(listed["label"], "writing");
    assert_eq!(listed["long_break_duration"], 900);

    let (_, _, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "label"]);
    assert_eq!(stdout.trim(), "work");
}

#[test]
fn test_corrupt_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[[[ nonsense").unwrap();
    let snap = timer(dir.path(), "status");
    assert_eq!(snap["seconds_left"], 1500);
}

#[test]
fn test_config_reset_repairs_corrupt_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[[[ nonsense").unwrap();

    let (stdout, stderr, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("reset"));

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "work_duration", "90"]);
    assert_eq!(code, 0);
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(!content.contains("nonsense"));
    assert!(content.contains("work_duration = 90"));
}

#[cfg(unix)]
#[test]
fn test_watch_exits_cleanly_on_interrupt() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_focusloop"))
        .args(["timer", "watch"])
        .env("FOCUSLOOP_DATA_DIR", dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn watch");
    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b"s\n").unwrap();
    stdin.flush().unwrap();
    std::thread::sleep(std::time::Duration::from_millis(1000));

    let killed = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("Failed to send SIGINT");
    assert!(killed.success());

    let output = child.wait_with_output().unwrap();
    drop(stdin);
    assert!(output.status.success(), "watch was killed instead of quitting");

    let snap = timer(dir.path(), "status");
    assert_eq!(snap["status"], "running");
}

#[test]
fn test_watch_accepts_commands_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_focusloop"))
        .args(["timer", "watch"])
        .env("FOCUSLOOP_DATA_DIR", dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn watch");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"s\nq\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("25:00"));

    let snap = timer(dir.path(), "status");
    assert_eq!(snap["status"], "running");
}
