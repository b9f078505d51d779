//! Run report artifact (`--report`).
//!
//! Summarises attempts per role without captured agent output.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{AttemptOutcome, PipelineResult, RoleState, RunOutcome};

/// Version of the run report layout.
pub const REPORT_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptSummary {
    pub index: u32,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleSummary {
    pub id: String,
    pub name: String,
    pub state: RoleState,
    pub attempts: Vec<AttemptSummary>,
}

/// Persisted summary of one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub run_id: String,
    pub project_dir: String,
    /// Digest of the role catalog the run used.
    pub catalog_digest: String,
    pub max_attempts: u32,
    pub success: bool,
    pub outcome: RunOutcome,
    pub invocations: u32,
    pub duration_ms: u64,
    pub roles: Vec<RoleSummary>,
}

impl RunReport {
    pub fn from_result(result: &PipelineResult, project_dir: &Path, catalog_digest: &str) -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            run_id: result.run_id.clone(),
            project_dir: project_dir.to_string_lossy().into_owned(),
            catalog_digest: catalog_digest.to_string(),
            max_attempts: result.max_attempts,
            success: result.success(),
            outcome: result.outcome.clone(),
            invocations: result.invocation_count(),
            duration_ms: result.duration_ms,
            roles: result
                .roles
                .iter()
                .map(|r| RoleSummary {
                    id: r.role_id.clone(),
                    name: r.role_name.clone(),
                    state: r.state,
                    attempts: r
                        .attempts
                        .iter()
                        .map(|a| AttemptSummary {
                            index: a.index,
                            exit_code: a.exit_code,
                            duration_ms: a.duration_ms,
                            outcome: a.outcome.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Write the run report in pretty JSON format.
pub fn write_run_report_json(path: &Path, report: &RunReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report).context("serialize run report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
