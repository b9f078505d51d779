//! Resolution of the problem statement handed to the first role.

use std::path::Path;

use crate::error::{CrewError, Result};

/// Sample task used when no task file is supplied.
pub const DEFAULT_TASKS: &str = include_str!("../prompts/default_tasks.md");

/// Resolve the task text.
///
/// Returns [`DEFAULT_TASKS`] when `path` is `None`, otherwise the full file
/// content, unmodified. An unreadable file is a configuration error.
pub fn resolve(path: Option<&Path>) -> Result<String> {
    match path {
        None => Ok(DEFAULT_TASKS.to_string()),
        Some(path) => std::fs::read_to_string(path).map_err(|source| CrewError::TaskFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}
