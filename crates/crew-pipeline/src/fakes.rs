//! In-memory agent fake (testing only)
//!
//! `ScriptedInvoker` satisfies the [`AgentInvoker`] contract without spawning
//! processes: a script decides each call's exit code and which files the
//! "agent" writes into the working directory.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{InvokeError, InvokeResult};
use crate::invoker::{AgentInvoker, AgentOutput};

/// What the fake agent does for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeStep {
    /// Write `create` (relative paths, parents created) then exit.
    Exit { exit_code: i32, create: Vec<String> },
    /// Behave as if the executable could not be launched.
    LaunchError,
}

impl FakeStep {
    /// Exit 0 after creating `create`.
    pub fn ok(create: &[&str]) -> Self {
        FakeStep::Exit {
            exit_code: 0,
            create: create.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Exit with `exit_code` without creating anything.
    pub fn fail(exit_code: i32) -> Self {
        FakeStep::Exit {
            exit_code,
            create: Vec::new(),
        }
    }
}

/// A recorded call to the fake agent.
#[derive(Debug, Clone)]
pub struct FakeCall {
    /// 0-based position among all calls.
    pub index: usize,
    /// 1-based count of calls so far with this exact instruction.
    pub attempt: usize,
    pub instruction: String,
    pub working_dir: PathBuf,
}

type Script = Box<dyn Fn(&FakeCall) -> FakeStep + Send + Sync>;

/// Scripted, call-recording [`AgentInvoker`].
pub struct ScriptedInvoker {
    script: Script,
    calls: Mutex<Vec<FakeCall>>,
}

impl ScriptedInvoker {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&FakeCall) -> FakeStep + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of calls whose instruction contains `marker`.
    pub fn calls_containing(&self, marker: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.instruction.contains(marker))
            .count()
    }

    fn record(&self, instruction: &str, working_dir: &Path) -> FakeCall {
        let mut calls = self.calls.lock().unwrap();
        let attempt = calls
            .iter()
            .filter(|c| c.instruction == instruction)
            .count()
            + 1;
        let call = FakeCall {
            index: calls.len(),
            attempt,
            instruction: instruction.to_string(),
            working_dir: working_dir.to_path_buf(),
        };
        calls.push(call.clone());
        call
    }
}

#[async_trait]
impl AgentInvoker for ScriptedInvoker {
    async fn invoke(&self, instruction: &str, working_dir: &Path) -> InvokeResult<AgentOutput> {
        let call = self.record(instruction, working_dir);

        match (self.script)(&call) {
            FakeStep::Exit { exit_code, create } => {
                for rel in &create {
                    let path = working_dir.join(rel);
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, b"")?;
                }
                Ok(AgentOutput {
                    exit_code,
                    stdout: format!("scripted call {}", call.index),
                    stderr: String::new(),
                    duration_ms: 0,
                })
            }
            FakeStep::LaunchError => Err(InvokeError::Launch {
                program: "scripted-agent".to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "scripted launch failure",
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_invoker_creates_files_and_counts_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = ScriptedInvoker::new(|call| {
            if call.attempt == 1 {
                FakeStep::fail(1)
            } else {
                FakeStep::ok(&["nested/out.md"])
            }
        });

        let first = invoker.invoke("same", dir.path()).await.unwrap();
        let second = invoker.invoke("same", dir.path()).await.unwrap();
        let other = invoker.invoke("other", dir.path()).await.unwrap();

        assert_eq!(first.exit_code, 1);
        assert_eq!(second.exit_code, 0);
        assert_eq!(other.exit_code, 1);
        assert!(dir.path().join("nested/out.md").exists());

        let calls = invoker.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].attempt, 2);
        assert_eq!(calls[2].attempt, 1);
        assert_eq!(invoker.calls_containing("same"), 2);
    }

    #[tokio::test]
    async fn test_scripted_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = ScriptedInvoker::new(|_| FakeStep::LaunchError);
        assert!(matches!(
            invoker.invoke("x", dir.path()).await,
            Err(InvokeError::Launch { .. })
        ));
        assert_eq!(invoker.call_count(), 1);
    }
}
