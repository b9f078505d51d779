//! Existence checks for role artifacts.

use std::path::Path;

/// Return the entries of `required` that do not exist under `working_dir`.
///
/// Input order is preserved. An empty result means every artifact is present.
/// Only existence is checked; content, size and permissions are not.
pub fn missing_artifacts(working_dir: &Path, required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|rel| !working_dir.join(rel.as_str()).exists())
        .cloned()
        .collect()
}
