//! Configuration-level error taxonomy for Agent Crew.
//!
//! Every variant here is fatal and surfaces before the first role runs.
//! Agent failures are not represented here; they are attempt outcomes.

use std::path::PathBuf;

/// Errors raised while resolving run configuration.
#[derive(Debug, thiserror::Error)]
pub enum CrewError {
    #[error("failed to read task file {path:?}")]
    TaskFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid project directory {path:?}: {reason}")]
    InvalidProjectDir { path: PathBuf, reason: String },

    #[error("max attempts must be at least 1")]
    ZeroAttempts,

    #[error("failed to read role catalog {path:?}")]
    CatalogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid role catalog: {0}")]
    InvalidCatalog(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for crew configuration operations.
pub type Result<T> = std::result::Result<T, CrewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_file_error_names_path() {
        let err = CrewError::TaskFile {
            path: PathBuf::from("/missing/tasks.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to read task file"));
        assert!(msg.contains("/missing/tasks.txt"));
    }

    #[test]
    fn test_file_errors_report_io_cause_once() {
        use std::error::Error as _;

        let err = CrewError::CatalogFile {
            path: PathBuf::from("roles.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "failed to read role catalog \"roles.json\"");
        assert_eq!(err.source().map(|e| e.to_string()).as_deref(), Some("not found"));

        let chained = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(chained.matches("not found").count(), 1);
    }

    #[test]
    fn test_invalid_catalog_error() {
        let err = CrewError::InvalidCatalog("catalog has no roles".to_string());
        assert!(err.to_string().contains("invalid role catalog"));
        assert!(err.to_string().contains("no roles"));
    }

    #[test]
    fn test_zero_attempts_error() {
        assert_eq!(
            CrewError::ZeroAttempts.to_string(),
            "max attempts must be at least 1"
        );
    }
}
