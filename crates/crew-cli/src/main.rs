//! Agent Crew CLI
//!
//! The `crew` command drives an external coding agent through an ordered
//! sequence of roles (Project Manager, Designer, Frontend Developer,
//! Backend Developer, Tester), retrying each role until its required files
//! exist or its attempt budget runs out.
//!
//! ## Exit codes
//!
//! - `0`: every role satisfied
//! - `1`: a role exhausted its attempt budget
//! - `2`: configuration error (unreadable task file, bad project directory, ...)

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, Level};

use crew_core::{task_source, RoleCatalog};
use crew_pipeline::invoker::{DEFAULT_AGENT_ARGS, DEFAULT_AGENT_PROGRAM};
use crew_pipeline::{
    write_run_report_json, PipelineResult, ProcessInvoker, RolePipeline, RunOutcome, RunReport,
    DEFAULT_MAX_ATTEMPTS,
};

/// Exit code for a role that exhausted its attempt budget.
const EXIT_ROLE_EXHAUSTED: u8 = 1;

/// Exit code for configuration errors detected before any role runs.
const EXIT_CONFIG_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "crew")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-role agent runner", long_about = None)]
struct Cli {
    /// Target project directory (default: current directory)
    #[arg(long, env = "CREW_PROJECT", default_value = ".")]
    project: PathBuf,

    /// Path to a task list file (plain text); a built-in sample is used if omitted
    #[arg(long, env = "CREW_TASKS")]
    tasks: Option<PathBuf>,

    /// Max attempts per role before failing
    #[arg(long, env = "CREW_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// JSON role catalog replacing the built-in roles
    #[arg(long, env = "CREW_ROLES")]
    roles: Option<PathBuf>,

    /// Agent executable
    #[arg(long, env = "CREW_AGENT", default_value = DEFAULT_AGENT_PROGRAM)]
    agent: String,

    /// Argument passed to the agent before `-C <project> -` (repeatable)
    #[arg(long = "agent-arg", allow_hyphen_values = true)]
    agent_args: Vec<String>,

    /// Kill an agent attempt after this many seconds (0 = no timeout)
    #[arg(long, env = "CREW_TIMEOUT_SECS", default_value_t = 0)]
    timeout_secs: u64,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn agent_args(&self) -> Vec<String> {
        if self.agent_args.is_empty() {
            DEFAULT_AGENT_ARGS.iter().map(|s| s.to_string()).collect()
        } else {
            self.agent_args.clone()
        }
    }
}

/// Configuration resolved before the first role runs.
struct RunSetup {
    pipeline: RolePipeline,
    catalog_digest: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    crew_core::init_tracing(cli.json, level);

    let setup = match prepare(&cli) {
        Ok(setup) => setup,
        Err(e) => {
            error!("configuration error: {:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let invoker =
        ProcessInvoker::new(cli.agent.clone(), cli.agent_args()).with_timeout_secs(cli.timeout_secs);
    let result = setup.pipeline.run(&invoker).await;

    if let Some(path) = &cli.report {
        let report =
            RunReport::from_result(&result, setup.pipeline.project_dir(), &setup.catalog_digest);
        if let Err(e) = write_run_report_json(path, &report) {
            error!("failed to write run report: {:#}", e);
        }
    }

    print_summary(&result);
    ExitCode::from(exit_status(&result.outcome))
}

/// Resolve project directory, task text and role catalog.
fn prepare(cli: &Cli) -> Result<RunSetup> {
    let project_dir = resolve_project_dir(&cli.project)?;
    let tasks = task_source::resolve(cli.tasks.as_deref()).context("Failed to load tasks")?;

    let catalog = match &cli.roles {
        Some(path) => RoleCatalog::load(path).context("Failed to load role catalog")?,
        None => RoleCatalog::standard(),
    };

    let pipeline = RolePipeline::new(catalog.render(&tasks), project_dir, cli.max_attempts)?;
    Ok(RunSetup {
        pipeline,
        catalog_digest: catalog.digest(),
    })
}

fn resolve_project_dir(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path)
        .with_context(|| format!("Invalid project directory {:?}", path))
}

fn exit_status(outcome: &RunOutcome) -> u8 {
    match outcome {
        RunOutcome::Success => 0,
        RunOutcome::Halted { .. } => EXIT_ROLE_EXHAUSTED,
    }
}

fn print_summary(result: &PipelineResult) {
    match &result.outcome {
        RunOutcome::Success => println!("Multi-agent run complete."),
        RunOutcome::Halted { role, attempts, .. } => println!(
            "{} failed to produce required files after {} attempts.",
            role, attempts
        ),
    }
    println!(
        "Run {}: {} invocation(s) in {}ms",
        result.run_id,
        result.invocation_count(),
        result.duration_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["crew"]).unwrap();
        assert_eq!(cli.project, PathBuf::from("."));
        assert!(cli.tasks.is_none());
        assert_eq!(cli.max_attempts, 3);
        assert_eq!(cli.agent, "codex");
        assert_eq!(
            cli.agent_args(),
            vec!["exec", "--full-auto", "--skip-git-repo-check"]
        );
        assert_eq!(cli.timeout_secs, 0);
        assert!(cli.report.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "crew",
            "--project",
            "/tmp/p",
            "--tasks",
            "tasks.txt",
            "--max-attempts",
            "5",
            "--agent",
            "my-agent",
            "--agent-arg",
            "--yolo",
            "--timeout-secs",
            "60",
        ])
        .unwrap();
        assert_eq!(cli.project, PathBuf::from("/tmp/p"));
        assert_eq!(cli.tasks, Some(PathBuf::from("tasks.txt")));
        assert_eq!(cli.max_attempts, 5);
        assert_eq!(cli.agent_args(), vec!["--yolo"]);
        assert_eq!(cli.timeout_secs, 60);
    }

    #[test]
    fn test_exit_codes_distinguish_outcomes() {
        assert_eq!(exit_status(&RunOutcome::Success), 0);
        let halted = RunOutcome::Halted {
            role: "Designer".to_string(),
            attempts: 3,
            missing: vec![],
        };
        assert_eq!(exit_status(&halted), EXIT_ROLE_EXHAUSTED);
        assert_ne!(EXIT_ROLE_EXHAUSTED, EXIT_CONFIG_ERROR);
    }

    #[test]
    fn test_prepare_rejects_missing_task_file() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "crew",
            "--project",
            dir.path().to_str().unwrap(),
            "--tasks",
            dir.path().join("absent.txt").to_str().unwrap(),
        ])
        .unwrap();

        let err = prepare(&cli).err().expect("missing task file must fail");
        assert!(format!("{:#}", err).contains("failed to read task file"));
    }

    #[test]
    fn test_prepare_rejects_missing_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "crew",
            "--project",
            dir.path().join("absent").to_str().unwrap(),
        ])
        .unwrap();

        assert!(prepare(&cli).is_err());
    }

    #[test]
    fn test_prepare_rejects_zero_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "crew",
            "--project",
            dir.path().to_str().unwrap(),
            "--max-attempts",
            "0",
        ])
        .unwrap();

        let err = prepare(&cli).err().expect("zero attempts must fail");
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_prepare_uses_standard_catalog_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let cli =
            Cli::try_parse_from(["crew", "--project", dir.path().to_str().unwrap()]).unwrap();

        let setup = prepare(&cli).unwrap();
        assert_eq!(setup.pipeline.roles().len(), 5);
        assert_eq!(setup.catalog_digest, RoleCatalog::standard().digest());
    }
}
