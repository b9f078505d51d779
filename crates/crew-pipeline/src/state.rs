//! Per-role state machine and attempt/outcome records.

use serde::{Deserialize, Serialize};

/// Lifecycle of a role inside a run.
///
/// `Pending → Attempting → {Satisfied | Retry | Exhausted}`; `Retry` loops
/// back to `Attempting` while budget remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleState {
    Pending,
    Attempting,
    Satisfied,
    Retry,
    Exhausted,
}

impl RoleState {
    /// State reached after an attempt finished with `outcome`, given that
    /// `used` attempts (including this one) of `budget` have been consumed.
    pub fn after(outcome: &AttemptOutcome, used: u32, budget: u32) -> RoleState {
        if outcome.is_satisfied() {
            RoleState::Satisfied
        } else if used < budget {
            RoleState::Retry
        } else {
            RoleState::Exhausted
        }
    }

    /// Whether no further attempts follow from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoleState::Satisfied | RoleState::Exhausted)
    }
}

impl std::fmt::Display for RoleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RoleState::Pending => "pending",
            RoleState::Attempting => "attempting",
            RoleState::Satisfied => "satisfied",
            RoleState::Retry => "retry",
            RoleState::Exhausted => "exhausted",
        };
        write!(f, "{s}")
    }
}

/// How a single attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Exit status zero and every required artifact present.
    Satisfied,
    /// The agent exited with a nonzero status.
    NonZeroExit { exit_code: i32 },
    /// Exit status zero but some required artifacts were absent.
    MissingArtifacts { paths: Vec<String> },
    /// The agent could not be run (launch failure, bad directory, timeout).
    InvokeFailed { error: String },
}

impl AttemptOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, AttemptOutcome::Satisfied)
    }

    /// Missing paths, empty unless this is `MissingArtifacts`.
    pub fn missing(&self) -> &[String] {
        match self {
            AttemptOutcome::MissingArtifacts { paths } => paths,
            _ => &[],
        }
    }
}

/// One invocation of the agent for a role.
#[derive(Debug, Clone)]
pub struct Attempt {
    /// 1-based attempt index within the role.
    pub index: u32,

    /// Exit code, when the process ran.
    pub exit_code: Option<i32>,

    /// Captured stdout (empty when the process did not run).
    pub stdout: String,

    /// Captured stderr (empty when the process did not run).
    pub stderr: String,

    pub duration_ms: u64,

    pub outcome: AttemptOutcome,
}

/// Everything that happened to one role during a run.
#[derive(Debug, Clone)]
pub struct RoleReport {
    pub role_id: String,
    pub role_name: String,
    pub state: RoleState,
    pub attempts: Vec<Attempt>,
}

impl RoleReport {
    /// Number of agent invocations made for this role.
    pub fn attempts_used(&self) -> u32 {
        self.attempts.len() as u32
    }

    /// Outcome of the final attempt, if any ran.
    pub fn last_outcome(&self) -> Option<&AttemptOutcome> {
        self.attempts.last().map(|a| &a.outcome)
    }
}

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every role reached `Satisfied`.
    Success,
    /// `role` exhausted its budget; later roles never ran.
    Halted {
        role: String,
        attempts: u32,
        /// Artifacts missing on the final attempt (empty if it failed to run
        /// or exited nonzero).
        missing: Vec<String>,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }
}

/// Result of a complete pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Run identifier (UUID v4).
    pub run_id: String,

    pub outcome: RunOutcome,

    /// Reports for roles that were reached, in execution order.
    pub roles: Vec<RoleReport>,

    /// Per-role attempt budget the run used.
    pub max_attempts: u32,

    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Total agent invocations across all roles.
    pub fn invocation_count(&self) -> u32 {
        self.roles.iter().map(|r| r.attempts_used()).sum()
    }

    /// Report for a role by display name.
    pub fn role(&self, name: &str) -> Option<&RoleReport> {
        self.roles.iter().find(|r| r.role_name == name)
    }
}
