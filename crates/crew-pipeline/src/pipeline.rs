//! Sequential role pipeline with bounded per-role retry.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, Instrument};
use uuid::Uuid;

use crew_core::artifacts::missing_artifacts;
use crew_core::obs;
use crew_core::{CrewError, Role};

use crate::invoker::AgentInvoker;
use crate::state::{
    Attempt, AttemptOutcome, PipelineResult, RoleReport, RoleState, RunOutcome,
};

/// Default per-role attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Ordered roles driven one at a time against a shared project directory.
///
/// A role is satisfied when an invocation exits with status zero and every
/// required artifact exists afterwards. A role that uses up its budget halts
/// the run; no later role is invoked.
#[derive(Debug, Clone)]
pub struct RolePipeline {
    roles: Vec<Role>,
    project_dir: PathBuf,
    max_attempts: u32,
    progress: bool,
}

impl RolePipeline {
    /// Validate configuration and build a pipeline.
    ///
    /// Fails when `max_attempts` is zero, `roles` is empty, or
    /// `project_dir` is not an existing directory.
    pub fn new(
        roles: Vec<Role>,
        project_dir: impl Into<PathBuf>,
        max_attempts: u32,
    ) -> crew_core::Result<Self> {
        let project_dir = project_dir.into();

        if max_attempts == 0 {
            return Err(CrewError::ZeroAttempts);
        }
        if roles.is_empty() {
            return Err(CrewError::InvalidCatalog(
                "pipeline has no roles".to_string(),
            ));
        }
        match std::fs::metadata(&project_dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(CrewError::InvalidProjectDir {
                    path: project_dir,
                    reason: "not a directory".to_string(),
                })
            }
            Err(e) => {
                return Err(CrewError::InvalidProjectDir {
                    path: project_dir,
                    reason: e.to_string(),
                })
            }
        }

        Ok(Self {
            roles,
            project_dir,
            max_attempts,
            progress: true,
        })
    }

    /// Print per-attempt progress lines on stdout (on by default).
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run every role in order.
    ///
    /// Never fails: agent errors are recorded as failed attempts, and the
    /// run ends either in [`RunOutcome::Success`] or halted at the first
    /// exhausted role.
    pub async fn run(&self, invoker: &dyn AgentInvoker) -> PipelineResult {
        let run_id = Uuid::new_v4().to_string();
        let span = obs::run_span(&run_id);
        self.run_with_id(run_id, invoker).instrument(span).await
    }

    async fn run_with_id(&self, run_id: String, invoker: &dyn AgentInvoker) -> PipelineResult {
        let start = Instant::now();
        obs::emit_run_started(&run_id, self.roles.len(), self.max_attempts);

        let mut reports = Vec::with_capacity(self.roles.len());
        let mut outcome = RunOutcome::Success;

        for role in &self.roles {
            let report = self.run_role(invoker, role).await;

            if report.state == RoleState::Exhausted {
                obs::emit_role_exhausted(&role.name, self.max_attempts);
                outcome = RunOutcome::Halted {
                    role: role.name.clone(),
                    attempts: report.attempts_used(),
                    missing: report
                        .last_outcome()
                        .map(|o| o.missing().to_vec())
                        .unwrap_or_default(),
                };
                reports.push(report);
                break;
            }

            obs::emit_role_satisfied(&role.name, report.attempts_used());
            reports.push(report);
        }

        let result = PipelineResult {
            run_id,
            outcome,
            roles: reports,
            max_attempts: self.max_attempts,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        obs::emit_run_finished(
            &result.run_id,
            result.duration_ms,
            result.invocation_count(),
            result.success(),
        );
        result
    }

    async fn run_role(&self, invoker: &dyn AgentInvoker, role: &Role) -> RoleReport {
        let mut attempts: Vec<Attempt> = Vec::new();
        let mut state = RoleState::Pending;

        while !state.is_terminal() {
            transition(role, &mut state, RoleState::Attempting);

            let index = attempts.len() as u32 + 1;
            obs::emit_attempt_started(&role.name, index, self.max_attempts);
            self.announce(&attempt_banner(&role.name, index, self.max_attempts));

            let attempt = self.attempt(invoker, role, index).await;
            let next = RoleState::after(&attempt.outcome, index, self.max_attempts);
            attempts.push(attempt);
            transition(role, &mut state, next);
        }

        RoleReport {
            role_id: role.id.clone(),
            role_name: role.name.clone(),
            state,
            attempts,
        }
    }

    async fn attempt(&self, invoker: &dyn AgentInvoker, role: &Role, index: u32) -> Attempt {
        let start = Instant::now();

        let output = match invoker.invoke(&role.instruction, &self.project_dir).await {
            Ok(output) => output,
            Err(e) => {
                obs::emit_attempt_invoke_failed(&role.name, index, &e);
                return Attempt {
                    index,
                    exit_code: None,
                    stdout: String::new(),
                    stderr: String::new(),
                    duration_ms: start.elapsed().as_millis() as u64,
                    outcome: AttemptOutcome::InvokeFailed {
                        error: e.to_string(),
                    },
                };
            }
        };

        let outcome = if !output.succeeded() {
            obs::emit_attempt_nonzero_exit(&role.name, index, output.exit_code);
            AttemptOutcome::NonZeroExit {
                exit_code: output.exit_code,
            }
        } else {
            let missing = missing_artifacts(&self.project_dir, &role.required_artifacts);
            if missing.is_empty() {
                AttemptOutcome::Satisfied
            } else {
                obs::emit_attempt_missing_artifacts(&role.name, index, &missing);
                self.announce(&missing_line(&missing));
                AttemptOutcome::MissingArtifacts { paths: missing }
            }
        };

        Attempt {
            index,
            exit_code: Some(output.exit_code),
            stdout: output.stdout,
            stderr: output.stderr,
            duration_ms: output.duration_ms,
            outcome,
        }
    }

    fn announce(&self, line: &str) {
        if self.progress {
            println!("{}", line);
        }
    }
}

fn attempt_banner(role: &str, attempt: u32, max_attempts: u32) -> String {
    format!("== {} (attempt {}/{}) ==", role, attempt, max_attempts)
}

fn missing_line(missing: &[String]) -> String {
    format!("Missing required files: {}", missing.join(", "))
}

fn transition(role: &Role, state: &mut RoleState, next: RoleState) {
    let from = *state;
    debug!(role = %role.name, from = %from, to = %next, "role state transition");
    *state = next;
}
