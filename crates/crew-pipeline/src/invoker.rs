//! External agent invocation.
//!
//! [`AgentInvoker`] is the seam between the pipeline and the agent process.
//! [`ProcessInvoker`] spawns one process per call, feeds the instruction on
//! stdin and captures stdout/stderr in full.

use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{InvokeError, InvokeResult};

/// Default agent executable.
pub const DEFAULT_AGENT_PROGRAM: &str = "codex";

/// Default flags putting the agent in unattended, full-automation mode.
pub const DEFAULT_AGENT_ARGS: [&str; 3] = ["exec", "--full-auto", "--skip-git-repo-check"];

/// Flag that precedes the working directory on the agent command line.
pub const WORKING_DIR_FLAG: &str = "-C";

/// Trailing argument telling the agent to read its prompt from stdin.
pub const STDIN_MARKER: &str = "-";

/// Captured result of one agent process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOutput {
    /// Exit code (0 = success, -1 when killed by a signal).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl AgentOutput {
    /// Whether the agent exited with status zero.
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs the agent once with an instruction in a working directory.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    /// Invoke the agent and wait for it to finish.
    ///
    /// Returns `Ok` for any exit status. `Err` is reserved for failures to
    /// run the agent at all (missing executable, bad directory, timeout).
    async fn invoke(&self, instruction: &str, working_dir: &Path) -> InvokeResult<AgentOutput>;
}

/// Agent invoker backed by a child process.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    program: String,
    args: Vec<String>,
    timeout_secs: u64,
    echo: bool,
}

impl ProcessInvoker {
    /// Create an invoker for `program` with the given leading arguments.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout_secs: 0,
            echo: true,
        }
    }

    /// The default `codex exec --full-auto --skip-git-repo-check` invoker.
    pub fn codex() -> Self {
        Self::new(
            DEFAULT_AGENT_PROGRAM,
            DEFAULT_AGENT_ARGS.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Kill the agent and fail the attempt after `secs` seconds (0 = never).
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Do not reproduce captured output on this process's stdout/stderr.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Executable name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument vector passed after the program name.
    pub fn command_args(&self, working_dir: &Path) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(WORKING_DIR_FLAG.to_string());
        args.push(working_dir.to_string_lossy().into_owned());
        args.push(STDIN_MARKER.to_string());
        args
    }

    async fn run_to_completion(
        &self,
        instruction: &str,
        working_dir: &Path,
    ) -> InvokeResult<std::process::Output> {
        let mut child = Command::new(&self.program)
            .args(self.command_args(working_dir))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| InvokeError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            InvokeError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "agent stdin was not captured",
            ))
        })?;

        let feed = async move {
            stdin.write_all(instruction.as_bytes()).await?;
            stdin.shutdown().await
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        match fed {
            // The agent may exit without draining stdin.
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!(program = %self.program, "agent closed stdin early");
            }
            Err(e) => return Err(e.into()),
            Ok(()) => {}
        }
        Ok(output?)
    }
}

impl Default for ProcessInvoker {
    fn default() -> Self {
        Self::codex()
    }
}

#[async_trait]
impl AgentInvoker for ProcessInvoker {
    async fn invoke(&self, instruction: &str, working_dir: &Path) -> InvokeResult<AgentOutput> {
        if !working_dir.is_dir() {
            return Err(InvokeError::InvalidWorkingDir(working_dir.to_path_buf()));
        }

        let start = Instant::now();
        let output = if self.timeout_secs > 0 {
            tokio::time::timeout(
                Duration::from_secs(self.timeout_secs),
                self.run_to_completion(instruction, working_dir),
            )
            .await
            .map_err(|_| InvokeError::TimedOut(self.timeout_secs))??
        } else {
            self.run_to_completion(instruction, working_dir).await?
        };

        let result = AgentOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        };

        if self.echo {
            let echoed = echo_output(
                &result,
                &mut std::io::stdout().lock(),
                &mut std::io::stderr().lock(),
            );
            if let Err(e) = echoed {
                debug!(error = %e, "failed to echo agent output");
            }
        }
        Ok(result)
    }
}

/// Reproduce captured agent output: stdout to `out`, stderr to `err`.
/// Empty streams write nothing.
pub fn echo_output(
    output: &AgentOutput,
    out: &mut impl Write,
    err: &mut impl Write,
) -> std::io::Result<()> {
    if !output.stdout.is_empty() {
        writeln!(out, "{}", output.stdout)?;
        out.flush()?;
    }
    if !output.stderr.is_empty() {
        writeln!(err, "{}", output.stderr)?;
        err.flush()?;
    }
    Ok(())
}
