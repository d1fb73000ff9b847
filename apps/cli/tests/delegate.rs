#![cfg(unix)]

use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

/// Fake `flow` that records its argv, one argument per line.
fn fake_flow(body: &str) -> Result<(TempDir, PathBuf, PathBuf), Box<dyn Error>> {
    let dir = tempdir()?;
    let script = dir.path().join("flow");
    let record = dir.path().join("argv.txt");
    fs::write(
        &script,
        format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\n{body}\n",
            record.display()
        ),
    )?;
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
    Ok((dir, script, record))
}

fn cli(flow: &Path) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("neogrove")?;
    cmd.env("NEOGROVE_FLOW_BIN", flow);
    Ok(cmd)
}

fn recorded(record: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    Ok(fs::read_to_string(record)?
        .lines()
        .map(str::to_string)
        .collect())
}

#[test]
fn chat_runs_flow_on_file() -> Result<(), Box<dyn Error>> {
    let (_dir, flow, record) = fake_flow("exit 0")?;
    cli(&flow)?.args(["chat", "notes/today.md"]).assert().success();
    assert_eq!(recorded(&record)?, ["run", "notes/today.md"]);
    Ok(())
}

#[test]
fn plan_list_passes_flags_through() -> Result<(), Box<dyn Error>> {
    let (_dir, flow, record) = fake_flow("echo listed")?;
    cli(&flow)?
        .args(["plan", "list", "--json", "--all"])
        .assert()
        .success()
        .stdout("listed\n");
    assert_eq!(recorded(&record)?, ["plan", "list", "--json", "--all"]);
    Ok(())
}

#[test]
fn plan_status_forwards_only_flags() -> Result<(), Box<dyn Error>> {
    let (_dir, flow, record) = fake_flow("exit 0")?;
    cli(&flow)?
        .args(["plan", "status", "my-plan", "--json", "stray"])
        .assert()
        .success();
    assert_eq!(recorded(&record)?, ["plan", "status", "my-plan", "--json"]);
    Ok(())
}

#[test]
fn models_list_maps_to_flow_models() -> Result<(), Box<dyn Error>> {
    let (_dir, flow, record) = fake_flow("exit 0")?;
    cli(&flow)?.args(["models", "list", "--json"]).assert().success();
    assert_eq!(recorded(&record)?, ["models", "--json"]);
    Ok(())
}

#[test]
fn failing_flow_exits_with_error() -> Result<(), Box<dyn Error>> {
    let (_dir, flow, _record) = fake_flow("exit 4")?;
    cli(&flow)?
        .args(["plan", "run", "my-plan"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("flow command failed (exit code 4)"));
    Ok(())
}

#[test]
fn missing_flow_reports_install_hint() -> Result<(), Box<dyn Error>> {
    let empty = tempdir()?;
    Command::cargo_bin("neogrove")?
        .env_remove("NEOGROVE_FLOW_BIN")
        .env("PATH", empty.path())
        .args(["chat", "x.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "'flow' command not found in PATH. Please ensure the grove-flow binary is installed and accessible",
        ));
    Ok(())
}
