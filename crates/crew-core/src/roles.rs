//! Role vocabulary: `BuiltinRole`, `RoleSpec`, `Role` and `RoleCatalog`.
//!
//! A catalog is an ordered list of role templates. Order encodes the data
//! dependency between roles: each instruction refers to files the previous
//! role is expected to have written. Only artifact existence is enforced.

use std::collections::HashSet;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CrewError, Result};

/// Placeholder replaced with the task text when a template is rendered.
pub const TASKS_PLACEHOLDER: &str = "{tasks}";

/// The five roles of the standard pipeline, in execution order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinRole {
    ProjectManager,
    Designer,
    FrontendDeveloper,
    BackendDeveloper,
    Tester,
}

impl BuiltinRole {
    /// All builtin roles in pipeline order.
    pub const ALL: [BuiltinRole; 5] = [
        BuiltinRole::ProjectManager,
        BuiltinRole::Designer,
        BuiltinRole::FrontendDeveloper,
        BuiltinRole::BackendDeveloper,
        BuiltinRole::Tester,
    ];

    /// Stable identifier used in catalogs and logs.
    pub fn id(&self) -> &'static str {
        match self {
            BuiltinRole::ProjectManager => "project_manager",
            BuiltinRole::Designer => "designer",
            BuiltinRole::FrontendDeveloper => "frontend_developer",
            BuiltinRole::BackendDeveloper => "backend_developer",
            BuiltinRole::Tester => "tester",
        }
    }

    /// Display label.
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinRole::ProjectManager => "Project Manager",
            BuiltinRole::Designer => "Designer",
            BuiltinRole::FrontendDeveloper => "Frontend Developer",
            BuiltinRole::BackendDeveloper => "Backend Developer",
            BuiltinRole::Tester => "Tester",
        }
    }

    /// Instruction template. Only the Project Manager embeds the task text.
    pub fn instruction_template(&self) -> &'static str {
        match self {
            BuiltinRole::ProjectManager => include_str!("../prompts/project_manager.md"),
            BuiltinRole::Designer => include_str!("../prompts/designer.md"),
            BuiltinRole::FrontendDeveloper => include_str!("../prompts/frontend_developer.md"),
            BuiltinRole::BackendDeveloper => include_str!("../prompts/backend_developer.md"),
            BuiltinRole::Tester => include_str!("../prompts/tester.md"),
        }
    }

    /// Relative paths that must exist once the role has run.
    pub fn required_artifacts(&self) -> &'static [&'static str] {
        match self {
            BuiltinRole::ProjectManager => &["REQUIREMENTS.md", "TEST.md", "AGENT_TASKS.md"],
            BuiltinRole::Designer => &["design/design_spec.md"],
            BuiltinRole::FrontendDeveloper => &["frontend/index.html"],
            BuiltinRole::BackendDeveloper => &["backend/server.js"],
            BuiltinRole::Tester => &["tests/TEST_PLAN.md"],
        }
    }
}

/// Serialisable role template, as stored in a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleSpec {
    /// Stable identifier, unique within a catalog.
    pub id: String,

    /// Display label.
    pub name: String,

    /// Instruction template; `{tasks}` is replaced with the task text.
    pub instruction: String,

    /// Relative paths that must exist after a successful invocation.
    #[serde(default)]
    pub required_artifacts: Vec<String>,
}

impl RoleSpec {
    /// Create a role template from a builtin role.
    pub fn from_builtin(role: BuiltinRole) -> Self {
        Self {
            id: role.id().to_string(),
            name: role.name().to_string(),
            instruction: role.instruction_template().to_string(),
            required_artifacts: role
                .required_artifacts()
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    /// Render the template into an immutable [`Role`].
    pub fn render(&self, tasks: &str) -> Role {
        Role {
            id: self.id.clone(),
            name: self.name.clone(),
            instruction: self.instruction.replace(TASKS_PLACEHOLDER, tasks),
            required_artifacts: self.required_artifacts.clone(),
        }
    }
}

/// A rendered pipeline stage: the full instruction sent to the agent plus
/// the artifacts that must exist afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub instruction: String,
    pub required_artifacts: Vec<String>,
}

/// Ordered collection of role templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleCatalog {
    pub roles: Vec<RoleSpec>,
}

impl RoleCatalog {
    /// The five-role catalog used when no catalog file is given.
    pub fn standard() -> Self {
        Self {
            roles: BuiltinRole::ALL
                .iter()
                .map(|r| RoleSpec::from_builtin(*r))
                .collect(),
        }
    }

    /// Parse and validate a catalog from JSON text.
    pub fn from_json(raw: &str) -> Result<Self> {
        let catalog: RoleCatalog = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load and validate a JSON catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| CrewError::CatalogFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Check structural rules: at least one role, unique non-blank ids,
    /// non-blank names, relative artifact paths that stay inside the project.
    pub fn validate(&self) -> Result<()> {
        if self.roles.is_empty() {
            return Err(CrewError::InvalidCatalog("catalog has no roles".to_string()));
        }

        let mut seen = HashSet::new();
        for role in &self.roles {
            if role.id.trim().is_empty() {
                return Err(CrewError::InvalidCatalog("role id must not be blank".to_string()));
            }
            if !seen.insert(role.id.as_str()) {
                return Err(CrewError::InvalidCatalog(format!(
                    "duplicate role id '{}'",
                    role.id
                )));
            }
            if role.name.trim().is_empty() {
                return Err(CrewError::InvalidCatalog(format!(
                    "role '{}' has a blank name",
                    role.id
                )));
            }
            for artifact in &role.required_artifacts {
                validate_artifact_path(&role.id, artifact)?;
            }
        }
        Ok(())
    }

    /// Render every template, in order, with the given task text.
    pub fn render(&self, tasks: &str) -> Vec<Role> {
        self.roles.iter().map(|spec| spec.render(tasks)).collect()
    }

    /// Ordered role ids.
    pub fn ids(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.id.as_str()).collect()
    }

    /// Deterministic, order-sensitive SHA-256 digest of the catalog.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for role in &self.roles {
            hasher.update(role.id.as_bytes());
            hasher.update(b"\0");
            hasher.update(role.instruction.as_bytes());
            hasher.update(b"\0");
            for artifact in &role.required_artifacts {
                hasher.update(artifact.as_bytes());
                hasher.update(b"\0");
            }
            hasher.update(b"\x1e");
        }
        hex::encode(hasher.finalize())
    }
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn validate_artifact_path(role_id: &str, artifact: &str) -> Result<()> {
    if artifact.trim().is_empty() {
        return Err(CrewError::InvalidCatalog(format!(
            "role '{}' lists a blank artifact path",
            role_id
        )));
    }
    let path = Path::new(artifact);
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::RootDir | Component::Prefix(_) | Component::ParentDir
        )
    });
    if path.is_absolute() || escapes {
        return Err(CrewError::InvalidCatalog(format!(
            "role '{}' artifact '{}' must be a relative path inside the project",
            role_id, artifact
        )));
    }
    Ok(())
}
