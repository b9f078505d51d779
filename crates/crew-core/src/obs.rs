//! Structured observability hooks for the role pipeline.
//!
//! - `run_span` tags every record emitted during a run with its `run_id`.
//! - `emit_*` functions log the lifecycle events: run start, attempt start,
//!   attempt failure, role satisfied, role exhausted, run finish.

use tracing::{debug, info, warn};

/// Span tagged with the run_id, meant to wrap the run future.
///
/// ```ignore
/// use tracing::Instrument;
/// pipeline_future.instrument(run_span("run-12345")).await;
/// ```
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("crew.run", run_id = %run_id)
}

/// Emit event: run started.
pub fn emit_run_started(run_id: &str, role_count: usize, max_attempts: u32) {
    info!(
        event = "run.started",
        run_id = %run_id,
        roles = role_count,
        max_attempts = max_attempts,
    );
}

/// Emit event: an attempt is about to invoke the agent.
pub fn emit_attempt_started(role: &str, attempt: u32, max_attempts: u32) {
    debug!(
        event = "attempt.started",
        role = %role,
        attempt = attempt,
        max_attempts = max_attempts,
    );
}

/// Emit event: the agent exited with a nonzero status.
pub fn emit_attempt_nonzero_exit(role: &str, attempt: u32, exit_code: i32) {
    warn!(
        event = "attempt.failed",
        reason = "nonzero_exit",
        role = %role,
        attempt = attempt,
        exit_code = exit_code,
        "{} exited with code {}",
        role,
        exit_code
    );
}

/// Emit event: the agent exited cleanly but left required files missing.
pub fn emit_attempt_missing_artifacts(role: &str, attempt: u32, missing: &[String]) {
    warn!(
        event = "attempt.failed",
        reason = "missing_artifacts",
        role = %role,
        attempt = attempt,
        missing = ?missing,
    );
}

/// Emit event: the agent could not be run at all.
pub fn emit_attempt_invoke_failed(role: &str, attempt: u32, error: &dyn std::fmt::Display) {
    warn!(
        event = "attempt.failed",
        reason = "invoke_failed",
        role = %role,
        attempt = attempt,
        error = %error,
    );
}

/// Emit event: role satisfied.
pub fn emit_role_satisfied(role: &str, attempts: u32) {
    info!(event = "role.satisfied", role = %role, attempts = attempts);
}

/// Emit event: role exhausted its attempt budget.
pub fn emit_role_exhausted(role: &str, max_attempts: u32) {
    warn!(
        event = "role.exhausted",
        role = %role,
        max_attempts = max_attempts,
    );
}

/// Emit event: run finished.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, invocations: u32, success: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        invocations = invocations,
        success = success,
    );
}
