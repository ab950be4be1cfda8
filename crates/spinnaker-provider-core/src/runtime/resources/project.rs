// crates/spinnaker-provider-core/src/runtime/resources/project.rs
// ============================================================================
// Module: Project Operations
// Description: Project documents and their lifecycle operations.
// Purpose: Upsert, read, and delete projects through remote tasks.
// Dependencies: crate::{core, interfaces, runtime}, tracing
// ============================================================================

//! ## Overview
//! A project groups applications, clusters, and pipelines under a free-form
//! `config` document. Creation and update share the `upsertProject` job; the
//! presence of an identifier turns a create into an update. The remote also
//! accepts the project name wherever an identifier is expected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::info;
use tracing::warn;

use super::ResourceClient;
use super::ResourceError;
use super::job;
use super::required_str;
use crate::core::Clock;
use crate::core::ConfigTree;
use crate::core::DriftError;
use crate::core::PROJECT_CONFIG_CATALOGUE;
use crate::core::TaskRequest;
use crate::core::validate_email;
use crate::interfaces::ResourceKind;
use crate::interfaces::ResourceLocator;
use crate::interfaces::ResourceReader;
use crate::interfaces::TaskGateway;
use crate::runtime::diff::compare;
use crate::runtime::validator::validate;

// ============================================================================
// SECTION: Project Model
// ============================================================================

/// Project as authored.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// Remote identifier; `None` until created.
    pub id: Option<String>,
    /// Project name.
    pub name: String,
    /// Owner email; also the submitting user.
    pub email: String,
    /// Project configuration document.
    pub config: ConfigTree,
}

impl Project {
    /// Creates a project with the default empty configuration.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { id: None, name: name.into(), email: email.into(), config: default_project_config() }
    }

    /// Checks the email and the configuration shape.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Attribute`] or [`ResourceError::Validation`].
    pub fn validate(&self) -> Result<(), ResourceError> {
        validate_email(&self.email)?;
        validate(&self.config, &PROJECT_CONFIG_CATALOGUE)?;
        Ok(())
    }

    /// Renders the remote document.
    #[must_use]
    pub fn to_document(&self) -> ConfigTree {
        let mut entries = vec![
            ("config", self.config.clone()),
            ("name", ConfigTree::from(self.name.as_str())),
            ("email", ConfigTree::from(self.email.as_str())),
        ];
        if let Some(id) = &self.id {
            entries.push(("id", ConfigTree::from(id.as_str())));
        }
        ConfigTree::map(entries)
    }
}

/// Stored project with the drift of its configuration, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectState {
    /// Remote identifier.
    pub id: String,
    /// Stored document.
    pub document: ConfigTree,
    /// First divergence between the desired and stored configuration.
    pub drift: Option<DriftError>,
}

/// Returns the configuration applied when none is authored.
#[must_use]
pub fn default_project_config() -> ConfigTree {
    ConfigTree::map([
        ("applications", ConfigTree::List(Vec::new())),
        ("clusters", ConfigTree::List(Vec::new())),
        ("pipelineConfigs", ConfigTree::List(Vec::new())),
    ])
}

// ============================================================================
// SECTION: Operations
// ============================================================================

impl<G, C> ResourceClient<G, C>
where
    G: TaskGateway + ResourceReader,
    C: Clock,
{
    /// Creates or updates a project and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] for invalid input, task failures, or reads,
    /// and [`ResourceError::UnexpectedDocument`] when the stored project has
    /// no string `id`.
    pub fn upsert_project(&self, project: &Project) -> Result<ProjectState, ResourceError> {
        project.validate()?;
        let verb = if project.id.is_some() { "Update" } else { "Create" };
        let request = TaskRequest::new(
            project.name.as_str(),
            format!("{verb} project {}", project.name),
            job(
                "upsertProject",
                [("project", project.to_document()), ("user", ConfigTree::from(project.email.as_str()))],
            ),
        );
        self.run_task(&request)?;
        info!(project = %project.name, operation = verb, "project saved");
        let lookup = project.id.as_deref().unwrap_or(&project.name);
        let state = self.get_project(lookup)?;
        let drift = match state.document.get("config") {
            Some(stored) => compare(&project.config, stored, "config", "result.config").err(),
            None => Some(DriftError::between("config", "result.config", &project.config, None)),
        };
        if let Some(drift) = &drift {
            warn!(project = %project.name, drift = %drift, "stored project configuration drifted");
        }
        Ok(ProjectState { drift, ..state })
    }

    /// Reads one project by identifier or name.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] when the project does not exist.
    pub fn get_project(&self, id: &str) -> Result<ProjectState, ResourceError> {
        let document = self.fetch_required(&ResourceLocator::Project { id: id.to_string() }, id)?;
        let id = required_str(ResourceKind::Project, &document, "id")?.to_string();
        Ok(ProjectState { id, document, drift: None })
    }

    /// Deletes a project after checking that it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] when the project does not exist,
    /// or the task error.
    pub fn delete_project(&self, id: &str) -> Result<(), ResourceError> {
        self.get_project(id)?;
        let request = TaskRequest::new(
            id,
            format!("Delete project {id}"),
            job("deleteProject", [("project", ConfigTree::map([("id", ConfigTree::from(id))]))]),
        );
        self.run_task(&request)?;
        info!(project = id, "project deleted");
        Ok(())
    }
}
