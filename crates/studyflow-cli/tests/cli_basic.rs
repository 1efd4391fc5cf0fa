//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. The dev
//! data directory is used so a developer's real data is never touched.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "studyflow-cli", "--quiet", "--"])
        .args(args)
        .env("STUDYFLOW_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_plan_generate() {
    let (stdout, _, code) = run_cli(&[
        "plan",
        "generate",
        "Reading response",
        "--course",
        "LIT 240",
        "--due",
        "2099-06-01",
        "--hours",
        "4",
    ]);
    assert_eq!(code, 0, "plan generate failed");
    assert!(stdout.contains("sessions"));
}

#[test]
fn test_plan_generate_json() {
    let (stdout, _, code) = run_cli(&[
        "plan",
        "generate",
        "Reading response",
        "--course",
        "LIT 240",
        "--due",
        "2099-06-01",
        "--hours",
        "4",
        "--json",
    ]);
    assert_eq!(code, 0, "plan generate --json failed");
    assert!(stdout.contains("\"total_sessions\""));
}

#[test]
fn test_plan_rejects_past_due_date() {
    let (_, stderr, code) = run_cli(&[
        "plan",
        "generate",
        "Late essay",
        "--course",
        "LIT 240",
        "--due",
        "2001-01-01",
        "--hours",
        "4",
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_plan_tips() {
    let (stdout, _, code) = run_cli(&[
        "plan",
        "tips",
        "Hard problem set",
        "--course",
        "MATH 301",
        "--due",
        "2099-06-01",
        "--hours",
        "6",
        "--difficulty",
        "5",
    ]);
    assert_eq!(code, 0, "plan tips failed");
    assert!(stdout.contains("-"));
}

#[test]
fn test_account_list() {
    let (_, _, code) = run_cli(&["account", "list"]);
    assert_eq!(code, 0, "account list failed");
}

#[test]
fn test_config_show() {
    let (stdout, _, code) = run_cli(&["config", "show"]);
    assert_eq!(code, 0, "config show failed");
    assert!(stdout.contains("max_daily_hours"));
}
