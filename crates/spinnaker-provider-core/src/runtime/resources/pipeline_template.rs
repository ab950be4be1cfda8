// crates/spinnaker-provider-core/src/runtime/resources/pipeline_template.rs
// ============================================================================
// Module: Pipeline Template Operations
// Description: Versioned pipeline template lifecycle operations.
// Purpose: Create, read, update, and delete templates by id and tag.
// Dependencies: crate::{core, interfaces, runtime}, tracing
// ============================================================================

//! ## Overview
//! Templates are addressed by their `id` plus an optional tag. Every template
//! task runs under the `spinnaker` application. Reads strip the fields the
//! remote manages on its own so the stored document can be compared against
//! the authored one. A changed `id` cannot be applied in place and requires
//! replacement.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::info;
use tracing::warn;

use super::ResourceClient;
use super::ResourceError;
use super::encode_document;
use super::job;
use super::required_str;
use crate::core::Clock;
use crate::core::ConfigTree;
use crate::core::DriftError;
use crate::core::PIPELINE_TEMPLATE_CATALOGUE;
use crate::core::TaskRequest;
use crate::core::validate_template_tag;
use crate::interfaces::ResourceKind;
use crate::interfaces::ResourceLocator;
use crate::interfaces::ResourceReader;
use crate::interfaces::TaskGateway;
use crate::runtime::diff::compare;
use crate::runtime::validator::validate;

// ============================================================================
// SECTION: Template State
// ============================================================================

/// Application every template task is submitted under.
pub const TEMPLATE_TASK_APPLICATION: &str = "spinnaker";

/// Fields the remote sets on stored templates.
pub const MANAGED_FIELDS: &[&str] = &["updateTs", "lastModifiedBy"];

/// Stored template as seen after a write or read.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineTemplateState {
    /// Template identifier.
    pub id: String,
    /// Tag the template was written or read with.
    pub tag: Option<String>,
    /// Authored definition.
    pub definition: ConfigTree,
    /// Stored document without managed fields.
    pub result: ConfigTree,
    /// First divergence between the definition and the stored document.
    pub drift: Option<DriftError>,
}

/// Returns a copy of a stored template without its managed fields.
#[must_use]
pub fn strip_managed_fields(document: &ConfigTree) -> ConfigTree {
    document.without_keys(MANAGED_FIELDS)
}

/// Returns true when moving from `state` to `config` changes the template id.
///
/// # Errors
///
/// Returns [`ResourceError::UnexpectedDocument`] when either side has no
/// string `id`.
pub fn requires_replacement(config: &ConfigTree, state: &ConfigTree) -> Result<bool, ResourceError> {
    let kind = ResourceKind::PipelineTemplate;
    let desired = required_str(kind, config, "id")?;
    let current = required_str(kind, state, "id")?;
    Ok(desired != current)
}

// ============================================================================
// SECTION: Operations
// ============================================================================

impl<G, C> ResourceClient<G, C>
where
    G: TaskGateway + ResourceReader,
    C: Clock,
{
    /// Creates a template and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] for invalid input, task failures, or reads.
    pub fn create_pipeline_template(
        &self,
        definition: &ConfigTree,
        tag: Option<&str>,
    ) -> Result<PipelineTemplateState, ResourceError> {
        let id = check_template(definition, tag)?;
        let mut fields = vec![("pipelineTemplate", encode_document(ResourceKind::PipelineTemplate, definition)?)];
        if let Some(tag) = tag {
            fields.push(("tag", ConfigTree::from(tag)));
        }
        let request = TaskRequest::new(
            TEMPLATE_TASK_APPLICATION,
            format!("Create pipeline template {id}"),
            job("createV2PipelineTemplate", fields),
        );
        self.run_task(&request)?;
        info!(template = %id, tag = tag.unwrap_or_default(), "pipeline template created");
        self.read_back_template(&id, tag, definition)
    }

    /// Replaces the stored template with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] for invalid input, task failures, or reads.
    pub fn update_pipeline_template(
        &self,
        definition: &ConfigTree,
        tag: Option<&str>,
    ) -> Result<PipelineTemplateState, ResourceError> {
        let id = check_template(definition, tag)?;
        let mut fields = vec![
            ("id", ConfigTree::from(id.as_str())),
            ("pipelineTemplate", encode_document(ResourceKind::PipelineTemplate, definition)?),
        ];
        if let Some(tag) = tag {
            fields.push(("tag", ConfigTree::from(tag)));
        }
        let request = TaskRequest::new(
            TEMPLATE_TASK_APPLICATION,
            format!("Update pipeline template {id}"),
            job("updateV2PipelineTemplate", fields),
        );
        self.run_task(&request)?;
        info!(template = %id, tag = tag.unwrap_or_default(), "pipeline template updated");
        self.read_back_template(&id, tag, definition)
    }

    /// Reads a template by id and optional tag, without managed fields.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] when the template does not exist.
    pub fn get_pipeline_template(&self, id: &str, tag: Option<&str>) -> Result<ConfigTree, ResourceError> {
        let locator = ResourceLocator::PipelineTemplate { id: id.to_string(), tag: tag.map(str::to_string) };
        let document = self.fetch_required(&locator, id)?;
        Ok(strip_managed_fields(&document))
    }

    /// Deletes a template by id and optional tag.
    ///
    /// # Errors
    ///
    /// Returns the task error when the deletion does not succeed.
    pub fn delete_pipeline_template(&self, id: &str, tag: Option<&str>) -> Result<(), ResourceError> {
        if let Some(tag) = tag {
            validate_template_tag(tag)?;
        }
        let mut fields = vec![("id", ConfigTree::from(id))];
        if let Some(tag) = tag {
            fields.push(("tag", ConfigTree::from(tag)));
        }
        let request = TaskRequest::new(
            TEMPLATE_TASK_APPLICATION,
            format!("Delete pipeline template {id}"),
            job("deleteV2PipelineTemplate", fields),
        );
        self.run_task(&request)?;
        info!(template = id, tag = tag.unwrap_or_default(), "pipeline template deleted");
        Ok(())
    }

    /// Reads a written template back and records drift.
    fn read_back_template(
        &self,
        id: &str,
        tag: Option<&str>,
        definition: &ConfigTree,
    ) -> Result<PipelineTemplateState, ResourceError> {
        let result = self.get_pipeline_template(id, tag)?;
        let drift = compare(definition, &result, "pipeline_template", "result").err();
        if let Some(drift) = &drift {
            warn!(template = id, drift = %drift, "stored pipeline template drifted from definition");
        }
        Ok(PipelineTemplateState {
            id: id.to_string(),
            tag: tag.map(str::to_string),
            definition: definition.clone(),
            result,
            drift,
        })
    }
}

/// Validates the tag and document, returning the template id.
fn check_template(definition: &ConfigTree, tag: Option<&str>) -> Result<String, ResourceError> {
    if let Some(tag) = tag {
        validate_template_tag(tag)?;
    }
    validate(definition, &PIPELINE_TEMPLATE_CATALOGUE)?;
    Ok(required_str(ResourceKind::PipelineTemplate, definition, "id")?.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
