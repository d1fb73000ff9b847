//! Extended git status for a path.
//! （取得指定路徑的延伸 git 狀態。）
//!
//! Output is gathered from `git status --porcelain=v2 --branch` and
//! `git diff --numstat` (worktree and index) and folded into an
//! [`ExtendedStatus`].

mod parse;

use std::path::{Path, PathBuf};
use std::time::Duration;

use neogrove_runexec::{locate_program, RunError, RunExecutor, RunSpec};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use parse::{parse_numstat, parse_porcelain_v2, DiffStat, StatusSummary};

const GIT_PROGRAM: &str = "git";
const GIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised while collecting git status.
/// （收集 git 狀態時可能發生的錯誤。）
#[derive(Debug, Error)]
pub enum GitStatusError {
    #[error("path does not exist: {0}")]
    MissingPath(PathBuf),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("git {command} timed out in {dir}")]
    TimedOut { command: String, dir: PathBuf },
    #[error("git {command} failed in {dir}: {stderr}")]
    Git {
        command: String,
        dir: PathBuf,
        stderr: String,
    },
}

/// Repository state reported to the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedStatus {
    pub branch: String,
    pub is_dirty: bool,
    pub has_upstream: bool,
    pub ahead_count: u32,
    pub behind_count: u32,
    pub modified_count: u32,
    pub staged_count: u32,
    pub untracked_count: u32,
    pub lines_added: u64,
    pub lines_deleted: u64,
}

impl ExtendedStatus {
    /// Combines a parsed status listing with worktree and index diff stats.
    pub fn from_parts(summary: StatusSummary, worktree: DiffStat, index: DiffStat) -> Self {
        Self {
            is_dirty: summary.is_dirty(),
            branch: summary.branch,
            has_upstream: summary.has_upstream,
            ahead_count: summary.ahead,
            behind_count: summary.behind,
            modified_count: summary.modified,
            staged_count: summary.staged,
            untracked_count: summary.untracked,
            lines_added: worktree.added + index.added,
            lines_deleted: worktree.deleted + index.deleted,
        }
    }
}

/// Collects the extended status of the repository containing `path`.
/// A file path is resolved against its parent directory.
pub fn collect(path: impl AsRef<Path>) -> Result<ExtendedStatus, GitStatusError> {
    let path = path.as_ref();
    let dir = if path.is_dir() {
        path.to_path_buf()
    } else if path.exists() {
        path.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        return Err(GitStatusError::MissingPath(path.to_path_buf()));
    };

    let git = locate_program(GIT_PROGRAM, None)?;
    let status = run_git(&git, &dir, &["status", "--porcelain=v2", "--branch"])?;
    let summary = parse_porcelain_v2(&status);
    let worktree = parse_numstat(&run_git(&git, &dir, &["diff", "--numstat"])?);
    let index = parse_numstat(&run_git(&git, &dir, &["diff", "--numstat", "--cached"])?);

    let status = ExtendedStatus::from_parts(summary, worktree, index);
    debug!(dir = %dir.display(), branch = %status.branch, dirty = status.is_dirty, "collected git status");
    Ok(status)
}

fn run_git(git: &Path, dir: &Path, args: &[&str]) -> Result<String, GitStatusError> {
    let spec = RunSpec::new(git)
        .with_args(args.iter().copied())
        .with_working_dir(dir)
        .with_env("GIT_OPTIONAL_LOCKS", "0")
        .with_timeout(GIT_TIMEOUT);
    let result = RunExecutor::capture(&spec)?;
    let command = args.join(" ");
    if result.timed_out {
        return Err(GitStatusError::TimedOut {
            command,
            dir: dir.to_path_buf(),
        });
    }
    if !result.success() {
        return Err(GitStatusError::Git {
            command,
            dir: dir.to_path_buf(),
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        });
    }
    Ok(result.stdout_text())
}
