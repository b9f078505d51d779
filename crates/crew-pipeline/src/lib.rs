//! Agent Crew Pipeline - role orchestration over an external agent
//!
//! Provides the role pipeline that:
//! - Invokes the agent once per attempt, strictly in role order
//! - Verifies each role's required artifacts after a zero exit status
//! - Retries a role up to its attempt budget, halting the run on exhaustion

pub mod error;
pub mod fakes;
pub mod invoker;
pub mod pipeline;
pub mod report;
pub mod state;

// Re-export key types
pub use error::{InvokeError, InvokeResult};
pub use invoker::{AgentInvoker, AgentOutput, ProcessInvoker};
pub use pipeline::{RolePipeline, DEFAULT_MAX_ATTEMPTS};
pub use report::{write_run_report_json, RunReport};
pub use state::{
    Attempt, AttemptOutcome, PipelineResult, RoleReport, RoleState, RunOutcome,
};
