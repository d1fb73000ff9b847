//! Appending editor text to markdown notes.

use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

pub fn select(file: &Path, lang: &str) -> Result<()> {
    let code = read_stdin()?;
    append(file, &code_block(lang, &code))?;
    eprintln!("Appended selection to {}", file.display());
    Ok(())
}

pub fn ask(file: &Path, question: Option<String>) -> Result<()> {
    let question = match question {
        Some(question) => question,
        None => read_stdin()?,
    };
    append(file, &question_block(&question))
        .context("failed to write question to target file")?;
    eprintln!("Appended question to {}", file.display());
    Ok(())
}

fn code_block(lang: &str, code: &str) -> String {
    format!("\n\n```{lang}\n{code}\n```\n")
}

fn question_block(question: &str) -> String {
    format!("\n\n{question}\n")
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read from stdin")?;
    Ok(buffer)
}

fn append(file: &Path, text: &str) -> Result<()> {
    let mut handle = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .with_context(|| format!("failed to open target file {}", file.display()))?;
    handle
        .write_all(text.as_bytes())
        .with_context(|| format!("failed to write to target file {}", file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn code_block_is_fenced_with_language() {
        assert_eq!(code_block("go", "x := 1"), "\n\n```go\nx := 1\n```\n");
        assert_eq!(code_block("", "plain"), "\n\n```\nplain\n```\n");
    }

    #[test]
    fn question_block_is_separated() {
        assert_eq!(question_block("Why?"), "\n\nWhy?\n");
    }

    #[test]
    fn append_creates_and_extends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("note.md");
        append(&path, "one").unwrap();
        append(&path, "two").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "onetwo");
    }
}
