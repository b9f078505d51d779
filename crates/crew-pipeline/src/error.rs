//! Error types for agent invocation.

use std::path::PathBuf;

/// Errors produced while running the external agent.
///
/// A nonzero exit status is not an error; it is reported through
/// [`crate::invoker::AgentOutput`]. The pipeline records each of these
/// as a failed attempt.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("agent executable '{program}' could not be launched: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("working directory {0:?} is not a directory")]
    InvalidWorkingDir(PathBuf),

    #[error("agent timed out after {0} seconds")]
    TimedOut(u64),

    #[error("agent i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for agent invocations.
pub type InvokeResult<T> = std::result::Result<T, InvokeError>;
