//! End-to-end tests for the `crew` binary, using `sh -c` as the agent.
//!
//! `crew --agent sh --agent-arg -c --agent-arg SCRIPT` runs
//! `sh -c SCRIPT -C <project> -`, so inside SCRIPT `$1` is the project dir.
#![cfg(unix)]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

/// Appends one line to `$1/calls` per invocation.
const RECORD_CALL: &str = r#"echo CALLED >> "$1/calls""#;

fn crew(project: &Path, script: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_crew"));
    cmd.env_remove("CREW_TASKS")
        .env_remove("CREW_ROLES")
        .env_remove("CREW_MAX_ATTEMPTS")
        .env("RUST_LOG", "warn")
        .arg("--project")
        .arg(project)
        .args(["--agent", "sh", "--agent-arg", "-c", "--agent-arg", script]);
    cmd
}

fn call_count(project: &Path) -> usize {
    std::fs::read_to_string(project.join("calls"))
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

#[test]
fn test_missing_task_file_exits_2_without_invoking_agent() {
    let dir = tempfile::tempdir().unwrap();

    crew(dir.path(), RECORD_CALL)
        .arg("--tasks")
        .arg(dir.path().join("absent-tasks.txt"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read task file"));

    assert_eq!(call_count(dir.path()), 0);
    assert!(!dir.path().join("calls").exists());
}

#[test]
fn test_missing_project_dir_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-project");

    crew(&missing, RECORD_CALL).assert().code(2);
    assert_eq!(call_count(dir.path()), 0);
}

#[test]
fn test_exhausted_role_exits_1_after_k_calls() {
    let dir = tempfile::tempdir().unwrap();

    let assert = crew(dir.path(), RECORD_CALL)
        .args(["--max-attempts", "2"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("== Project Manager (attempt 1/2) =="))
        .stdout(predicate::str::contains("== Project Manager (attempt 2/2) =="))
        .stdout(predicate::str::contains(
            "Missing required files: REQUIREMENTS.md, TEST.md, AGENT_TASKS.md",
        ))
        .stdout(predicate::str::contains("Designer").not());

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(
        stdout
            .matches("Project Manager failed to produce required files after 2 attempts.")
            .count(),
        1
    );
    assert_eq!(call_count(dir.path()), 2);
}

#[test]
fn test_agent_output_echoed_to_matching_streams() {
    let dir = tempfile::tempdir().unwrap();

    crew(dir.path(), "echo AGENTOUT; echo AGENTERR >&2; exit 3")
        .args(["--max-attempts", "1"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("AGENTOUT"))
        .stdout(predicate::str::contains("AGENTERR").not())
        .stderr(predicate::str::contains("AGENTERR"))
        .stderr(predicate::str::contains("AGENTOUT").not());
}

#[test]
fn test_full_run_succeeds_and_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.json");
    let script = r#"echo CALLED >> "$1/calls"
cd "$1" && mkdir -p design frontend backend tests &&
touch REQUIREMENTS.md TEST.md AGENT_TASKS.md design/design_spec.md \
      frontend/index.html backend/server.js tests/TEST_PLAN.md"#;

    crew(dir.path(), script)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("== Tester (attempt 1/3) =="))
        .stdout(predicate::str::contains("Multi-agent run complete."));

    assert_eq!(call_count(dir.path()), 5);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["outcome"]["status"], "success");
    assert_eq!(json["invocations"], 5);
}
