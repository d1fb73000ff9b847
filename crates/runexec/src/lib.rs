//! External command execution for neogrove.
//! （neogrove 的外部指令執行模組。）
//!
//! Two modes are offered: [`RunExecutor::delegate`] hands the terminal to the
//! child (stdin/stdout/stderr inherited) for `flow` sub-commands, while
//! [`RunExecutor::capture`] collects output for tools whose results are parsed,
//! such as `git`.
//! 提供兩種模式：`delegate` 直接繼承終端機的標準輸入輸出，用於轉交 `flow`
//! 子指令；`capture` 擷取輸出供後續解析（例如 `git`）。

use std::collections::BTreeMap;
use std::env;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

/// Environment variable that overrides the `flow` executable location.
/// （覆寫 `flow` 執行檔位置的環境變數。）
pub const FLOW_BIN_ENV: &str = "NEOGROVE_FLOW_BIN";
/// Name of the external tool commands are delegated to.
pub const FLOW_PROGRAM: &str = "flow";

/// Errors that may surface while locating or executing a command.
/// （尋找或執行指令時可能發生的錯誤。）
#[derive(Debug, Error)]
pub enum RunError {
    #[error("'{program}' command not found in PATH. Please ensure the grove-{program} binary is installed and accessible")]
    NotFound { program: String },
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read process output: {0}")]
    Output(io::Error),
    #[error("failed to poll process status: {0}")]
    Poll(io::Error),
    #[error("failed to terminate process: {0}")]
    Kill(io::Error),
    #[error("{program} command failed{}", exit_suffix(.code))]
    Failed { program: String, code: Option<i32> },
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" (exit code {code})"),
        None => " (terminated by signal)".to_string(),
    }
}

/// Command specification.
/// （指令設定資料結構。）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

impl RunSpec {
    /// Creates a new command pointing at the given program.
    /// （以指定的程式建立指令設定。）
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: BTreeMap::new(),
            timeout: None,
        }
    }

    /// Adds multiple arguments at once.
    /// （一次加入多個參數。）
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Registers an environment variable override.
    /// （設定環境變數覆寫值。）
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Sets the working directory.
    /// （設定指令執行的工作目錄。）
    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }

    /// Kills a captured command that runs longer than `timeout`.
    /// （設定擷取模式下的逾時限制。）
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Short program name used in diagnostics.
    pub fn display_name(&self) -> String {
        self.program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        for (key, value) in &self.env {
            command.env(key, value);
        }
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }
}

/// Result information produced by a captured run.
/// （擷取模式執行完成後的結果資訊。）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunResult {
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub duration_ms: u128,
    pub timed_out: bool,
}

impl RunResult {
    /// Indicates whether the command exited successfully (code `0`).
    /// （判斷指令是否以 0 代表成功結束。）
    pub fn success(&self) -> bool {
        !self.timed_out && matches!(self.exit_code, Some(0))
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Executes commands according to a [`RunSpec`].
/// （依照設定執行指令的主要元件。）
pub struct RunExecutor;

impl RunExecutor {
    /// Runs the command with inherited stdio and waits for it.
    /// A non-zero exit becomes [`RunError::Failed`].
    /// （繼承標準輸入輸出執行指令；非零結束碼視為失敗。）
    pub fn delegate(spec: &RunSpec) -> Result<(), RunError> {
        let program = spec.display_name();
        debug!(program = %spec.program.display(), args = ?spec.args, "delegating command");
        let status = spec
            .command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| RunError::Spawn {
                program: program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(RunError::Failed {
                program,
                code: status.code(),
            })
        }
    }

    /// Runs the command and captures stdout/stderr.
    /// （執行指令並擷取輸出。）
    pub fn capture(spec: &RunSpec) -> Result<RunResult, RunError> {
        let mut command = spec.command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let start = Instant::now();
        let mut child = command.spawn().map_err(|source| RunError::Spawn {
            program: spec.display_name(),
            source,
        })?;

        // Pipes are drained concurrently with polling.
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let mut timed_out = false;
        let status = match spec.timeout {
            Some(timeout) => loop {
                if let Some(status) = child.try_wait().map_err(RunError::Poll)? {
                    break status;
                }
                if start.elapsed() >= timeout {
                    child.kill().map_err(RunError::Kill)?;
                    timed_out = true;
                    break child.wait().map_err(RunError::Poll)?;
                }
                thread::sleep(Duration::from_millis(10));
            },
            None => child.wait().map_err(RunError::Poll)?,
        };

        Ok(RunResult {
            exit_code: status.code(),
            stdout: join_reader(stdout)?,
            stderr: join_reader(stderr)?,
            duration_ms: start.elapsed().as_millis(),
            timed_out,
        })
    }
}

fn spawn_reader<R>(mut source: R) -> thread::JoinHandle<io::Result<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = Vec::new();
        source.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn join_reader(
    handle: Option<thread::JoinHandle<io::Result<Vec<u8>>>>,
) -> Result<Vec<u8>, RunError> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| RunError::Output(io::Error::other("output reader panicked")))?
            .map_err(RunError::Output),
        None => Ok(Vec::new()),
    }
}

/// Locates `program`, preferring the path stored in `override_env` when set.
/// （尋找執行檔；若設定了覆寫環境變數則優先使用。）
pub fn locate_program(program: &str, override_env: Option<&str>) -> Result<PathBuf, RunError> {
    if let Some(value) = override_env
        .and_then(env::var_os)
        .filter(|value| !value.is_empty())
    {
        let path = PathBuf::from(value);
        debug!(program, path = %path.display(), "using program override");
        return Ok(path);
    }
    which::which(program).map_err(|_| RunError::NotFound {
        program: program.to_string(),
    })
}

/// Builds a [`RunSpec`] that runs `flow` with `args`.
/// （建立執行 `flow` 的指令設定。）
pub fn flow_command<I, S>(args: I) -> Result<RunSpec, RunError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let program = locate_program(FLOW_PROGRAM, Some(FLOW_BIN_ENV))?;
    Ok(RunSpec::new(program).with_args(args))
}

/// Runs `flow` with `args`, handing it the terminal.
pub fn run_flow<I, S>(args: I) -> Result<(), RunError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    RunExecutor::delegate(&flow_command(args)?)
}
