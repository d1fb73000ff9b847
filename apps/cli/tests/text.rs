use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli() -> Result<Command, Box<dyn Error>> {
    Ok(Command::cargo_bin("neogrove")?)
}

#[test]
fn select_appends_fenced_block() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let note = tmp.path().join("chat.md");
    fs::write(&note, "# Chat")?;

    cli()?
        .args(["text", "select", "--file", note.to_str().unwrap(), "--lang", "go"])
        .write_stdin("fmt.Println(\"Hello\")")
        .assert()
        .success()
        .stderr(predicate::str::contains(format!(
            "Appended selection to {}",
            note.display()
        )));

    assert_eq!(
        fs::read_to_string(&note)?,
        "# Chat\n\n```go\nfmt.Println(\"Hello\")\n```\n"
    );
    Ok(())
}

#[test]
fn select_creates_missing_file() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let note = tmp.path().join("new.md");

    cli()?
        .args(["text", "select", "-f", note.to_str().unwrap()])
        .write_stdin("plain")
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&note)?, "\n\n```\nplain\n```\n");
    Ok(())
}

#[test]
fn ask_prefers_argument_over_stdin() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let note = tmp.path().join("chat.md");

    cli()?
        .args(["text", "ask", "-f", note.to_str().unwrap(), "What does this do?"])
        .write_stdin("ignored")
        .assert()
        .success()
        .stderr(predicate::str::contains("Appended question to"));

    cli()?
        .args(["text", "ask", "--file", note.to_str().unwrap()])
        .write_stdin("And this?")
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&note)?,
        "\n\nWhat does this do?\n\n\nAnd this?\n"
    );
    Ok(())
}

#[test]
fn file_flag_is_required() -> Result<(), Box<dyn Error>> {
    cli()?
        .args(["text", "select"])
        .write_stdin("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--file"));
    Ok(())
}

#[test]
fn version_reports_binary_name() -> Result<(), Box<dyn Error>> {
    cli()?
        .args(["version", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\":\"neogrove\""))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}
