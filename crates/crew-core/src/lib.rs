//! Agent Crew Core Library
//!
//! Domain pieces shared by the pipeline and the CLI: the role catalog, task
//! resolution, artifact existence checks, configuration errors and tracing.

pub mod artifacts;
pub mod error;
pub mod obs;
pub mod roles;
pub mod task_source;
pub mod telemetry;

pub use artifacts::missing_artifacts;
pub use error::{CrewError, Result};
pub use obs::run_span;
pub use roles::{BuiltinRole, Role, RoleCatalog, RoleSpec, TASKS_PLACEHOLDER};
pub use task_source::DEFAULT_TASKS;
pub use telemetry::init_tracing;

/// Agent Crew version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
