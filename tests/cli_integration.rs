//! Integration tests for the CLI
//!
//! Tests the default invocation plus the apply, check and show commands

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const SERVER: &str = "\
const express = require('express');
const app = express();

app.post('/api/bookings', async (req, res) => {
  res.json({ ok: true });
});

app.delete('/api/routes/:id', async (req, res) => {
  res.sendStatus(204);
});

app.get('/api/health', (req, res) => res.send('ok'));
";

fn route_patcher(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_route-patcher"))
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env("CLICOLOR", "0")
        .args(args)
        .output()
        .unwrap()
}

/// Workspace with an index.js and a small plan that removes the health route
fn setup_test_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.js"), SERVER).unwrap();
    fs::write(
        dir.path().join("plan.toml"),
        r#"[meta]
name = "test-plan"
target = "index.js"
restart_hint = "node index.js"

[[ranges]]
start = 11
end = 12
label = "health route"

[[rules]]
label = "POST /api/bookings"
pattern = '''app\.post\('/api/bookings',\s*async'''
replacement = "app.post('/api/bookings', authMiddleware, async"
"#,
    )
    .unwrap();
    dir
}

#[test]
fn test_apply_help() {
    let dir = TempDir::new().unwrap();
    let output = route_patcher(dir.path(), &["apply", "--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--dry-run"));
    assert!(stdout.contains("--backup"));
}

#[test]
fn test_default_invocation_uses_builtin_plan() {
    let workspace = setup_test_workspace();
    let output = route_patcher(workspace.path(), &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Original file: 12 lines"));
    assert!(stdout.contains("Added auth to: POST /api/bookings"));
    assert!(stdout.contains("Added auth to: DELETE /api/routes/:id"));
    assert!(stdout.contains("Please restart the server: npm run dev"));

    let patched = fs::read_to_string(workspace.path().join("index.js")).unwrap();
    assert!(patched.contains("app.post('/api/bookings', authMiddleware, async"));
    assert!(patched.contains("app.delete('/api/routes/:id', authMiddleware, async"));
}

#[test]
fn test_apply_with_plan_and_backup() {
    let workspace = setup_test_workspace();
    let output = route_patcher(workspace.path(), &["apply", "--plan", "plan.toml", "--backup"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Removing lines 12-12 (1 lines)"));
    assert!(stdout.contains("After removing duplicates: 11 lines"));
    assert!(stdout.contains("Please restart the server: node index.js"));

    let patched = fs::read_to_string(workspace.path().join("index.js")).unwrap();
    assert!(!patched.contains("/api/health"));
    assert!(patched.contains("app.post('/api/bookings', authMiddleware, async"));
    assert!(patched.contains("app.delete('/api/routes/:id', async"));

    let backup = fs::read_to_string(workspace.path().join("index.js.bak")).unwrap();
    assert_eq!(backup, SERVER);
}

#[test]
fn test_dry_run_leaves_file() {
    let workspace = setup_test_workspace();
    let output = route_patcher(
        workspace.path(),
        &["apply", "--plan", "plan.toml", "--dry-run", "--diff"],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DRY RUN"));
    assert!(stdout.contains("+app.post('/api/bookings', authMiddleware, async"));
    assert_eq!(
        fs::read_to_string(workspace.path().join("index.js")).unwrap(),
        SERVER
    );
}

#[test]
fn test_missing_target_fails() {
    let dir = TempDir::new().unwrap();
    let output = route_patcher(dir.path(), &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("index.js"));
}

#[test]
fn test_invalid_plan_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.js"), SERVER).unwrap();
    fs::write(
        dir.path().join("bad.toml"),
        "[[ranges]]\nstart = 0\nend = 5\n\n[[ranges]]\nstart = 3\nend = 8\n",
    )
    .unwrap();

    let output = route_patcher(dir.path(), &["apply", "--plan", "bad.toml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("overlap"));
    assert_eq!(
        fs::read_to_string(dir.path().join("index.js")).unwrap(),
        SERVER
    );
}

#[test]
fn test_check_reports_pending_then_clean() {
    let workspace = setup_test_workspace();

    let pending = route_patcher(workspace.path(), &["check", "--plan", "plan.toml"]);
    assert_eq!(pending.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&pending.stdout);
    assert!(stdout.contains("POST /api/bookings: would apply (1 occurrence)"));
    assert!(stdout.contains("xxh3"));

    let applied = route_patcher(workspace.path(), &["apply", "--plan", "plan.toml"]);
    assert!(applied.status.success());

    let clean = route_patcher(workspace.path(), &["check", "--plan", "plan.toml"]);
    assert!(clean.status.success());
    let stdout = String::from_utf8_lossy(&clean.stdout);
    assert!(stdout.contains("POST /api/bookings: no match"));
}

#[test]
fn test_show_builtin_plan() {
    let dir = TempDir::new().unwrap();
    let output = route_patcher(dir.path(), &["show"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("api-fixes"));
    assert!(stdout.contains("Ranges (3)"));
    assert!(stdout.contains("Rules (18)"));
    assert!(stdout.contains("[1393, 1459) analytics ROI duplicate"));
}
