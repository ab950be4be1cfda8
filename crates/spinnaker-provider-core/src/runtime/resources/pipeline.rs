// crates/spinnaker-provider-core/src/runtime/resources/pipeline.rs
// ============================================================================
// Module: Pipeline Operations
// Description: Pipeline configuration lifecycle operations.
// Purpose: Save, locate, read, and delete pipelines through remote tasks.
// Dependencies: crate::{core, interfaces, runtime}, tracing
// ============================================================================

//! ## Overview
//! Pipelines are free-form documents validated against the standalone and
//! templated variants. A non-empty `template` map marks a templated
//! pipeline: it is validated against the templated variant only, and the
//! submitted `type` follows the variant that matched. The remote addresses pipelines by application and name, while
//! callers track them by generated identifier, so reads and deletes first
//! locate the pipeline by scanning every application.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::debug;
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
use crate::core::PIPELINE_CATALOGUE;
use crate::core::SchemaCatalogue;
use crate::core::SchemaVariant;
use crate::core::TEMPLATED_PIPELINE;
use crate::core::TEMPLATED_PIPELINE_CATALOGUE;
use crate::core::TaskRequest;
use crate::interfaces::ResourceKind;
use crate::interfaces::ResourceLocator;
use crate::interfaces::ResourceReader;
use crate::interfaces::TaskGateway;
use crate::runtime::diff::compare;
use crate::runtime::validator::validate;

// ============================================================================
// SECTION: Pipeline State
// ============================================================================

/// Pipeline type assigned to documents carrying a template reference.
pub const TEMPLATED_PIPELINE_TYPE: &str = "templatedPipeline";

/// Application and name addressing a stored pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineLocation {
    /// Owning application.
    pub application: String,
    /// Pipeline name.
    pub name: String,
}

/// Stored pipeline as seen after a save or read.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    /// Generated pipeline identifier.
    pub id: String,
    /// Desired definition, with values refreshed from the stored document.
    pub definition: ConfigTree,
    /// Stored document.
    pub result: ConfigTree,
    /// First divergence between the desired and stored document.
    pub drift: Option<DriftError>,
}

/// Returns the catalogue a definition is validated against.
#[must_use]
pub fn pipeline_catalogue(definition: &ConfigTree) -> &'static SchemaCatalogue {
    if matches!(definition.get("template"), Some(ConfigTree::Map(template)) if !template.is_empty()) {
        &TEMPLATED_PIPELINE_CATALOGUE
    } else {
        &PIPELINE_CATALOGUE
    }
}

/// Prepares a definition for submission: types templated pipelines after the
/// matched variant and sets the identifier on updates.
#[must_use]
pub fn prepare_pipeline(definition: &ConfigTree, variant: &SchemaVariant, id: Option<&str>) -> ConfigTree {
    let mut prepared = definition.clone();
    if *variant == TEMPLATED_PIPELINE {
        prepared = prepared.with_entry("type", ConfigTree::from(TEMPLATED_PIPELINE_TYPE));
    }
    if let Some(id) = id {
        prepared = prepared.with_entry("id", ConfigTree::from(id));
    }
    prepared
}

/// Refreshes every key of `desired` with the stored value when present.
#[must_use]
pub fn sync_definition(desired: &ConfigTree, stored: &ConfigTree) -> ConfigTree {
    let Some(entries) = desired.as_map() else {
        return desired.clone();
    };
    ConfigTree::Map(
        entries
            .iter()
            .map(|(key, value)| (key.clone(), stored.get(key).unwrap_or(value).clone()))
            .collect(),
    )
}

// ============================================================================
// SECTION: Operations
// ============================================================================

impl<G, C> ResourceClient<G, C>
where
    G: TaskGateway + ResourceReader,
    C: Clock,
{
    /// Creates a pipeline and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] for invalid input, task failures, or reads.
    pub fn create_pipeline(&self, definition: &ConfigTree) -> Result<PipelineState, ResourceError> {
        self.save_pipeline(definition, None)
    }

    /// Updates the pipeline with identifier `id` and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] for invalid input, task failures, or reads.
    pub fn update_pipeline(&self, id: &str, definition: &ConfigTree) -> Result<PipelineState, ResourceError> {
        self.save_pipeline(definition, Some(id))
    }

    /// Reads a pipeline by identifier.
    ///
    /// With a desired definition, its keys are refreshed from the stored
    /// document and drift is recorded; without one, the stored document
    /// becomes the definition.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] when no application holds a
    /// pipeline with this identifier.
    pub fn read_pipeline(&self, id: &str, desired: Option<&ConfigTree>) -> Result<PipelineState, ResourceError> {
        let location = self.locate_pipeline(id)?;
        let result = self.get_pipeline(&location)?;
        let (definition, drift) = match desired {
            Some(desired) => {
                (sync_definition(desired, &result), compare(desired, &result, "definition", "result").err())
            }
            None => (result.clone(), None),
        };
        Ok(PipelineState { id: id.to_string(), definition, result, drift })
    }

    /// Reads a pipeline by application and name.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] when the pipeline does not exist.
    pub fn get_pipeline(&self, location: &PipelineLocation) -> Result<ConfigTree, ResourceError> {
        let locator =
            ResourceLocator::Pipeline { application: location.application.clone(), name: location.name.clone() };
        self.fetch_required(&locator, &location.name)
    }

    /// Finds the application and name of the pipeline with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] when no application holds it and
    /// [`ResourceError::UnexpectedDocument`] for summaries without string
    /// `name` or `id` fields.
    pub fn locate_pipeline(&self, id: &str) -> Result<PipelineLocation, ResourceError> {
        debug!(pipeline = id, "locating pipeline");
        for summary in self.list_applications()? {
            let application = required_str(ResourceKind::Application, &summary, "name")?;
            let pipelines = self.fetch_list(&ResourceLocator::Pipelines { application: application.to_string() })?;
            for pipeline in &pipelines {
                if required_str(ResourceKind::Pipeline, pipeline, "id")? == id {
                    let name = required_str(ResourceKind::Pipeline, pipeline, "name")?;
                    return Ok(PipelineLocation { application: application.to_string(), name: name.to_string() });
                }
            }
        }
        Err(ResourceError::not_found(ResourceKind::Pipeline, id))
    }

    /// Deletes the pipeline with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] when the pipeline cannot be
    /// located, or the task error.
    pub fn delete_pipeline(&self, id: &str) -> Result<(), ResourceError> {
        let location = self.locate_pipeline(id)?;
        let request = TaskRequest::new(
            location.application.as_str(),
            format!("Delete pipeline {}", location.name),
            job(
                "deletePipeline",
                [(
                    "pipeline",
                    ConfigTree::map([
                        ("application", ConfigTree::from(location.application.as_str())),
                        ("name", ConfigTree::from(location.name.as_str())),
                    ]),
                )],
            ),
        );
        self.run_task(&request)?;
        info!(pipeline = id, application = %location.application, name = %location.name, "pipeline deleted");
        Ok(())
    }

    /// Validates, submits, and reads back a pipeline.
    fn save_pipeline(&self, definition: &ConfigTree, id: Option<&str>) -> Result<PipelineState, ResourceError> {
        let variant = validate(definition, pipeline_catalogue(definition))?;
        let prepared = prepare_pipeline(definition, variant, id);
        let kind = ResourceKind::Pipeline;
        let location = PipelineLocation {
            application: required_str(kind, &prepared, "application")?.to_string(),
            name: required_str(kind, &prepared, "name")?.to_string(),
        };
        let verb = if id.is_some() { "Update" } else { "Save" };
        let request = TaskRequest::new(
            location.application.as_str(),
            format!("{verb} pipeline {}", location.name),
            job(
                "savePipeline",
                [
                    ("pipeline", encode_document(kind, &prepared)?),
                    ("application", ConfigTree::from(location.application.as_str())),
                ],
            ),
        );
        self.run_task(&request)?;
        info!(application = %location.application, name = %location.name, variant = variant.name, "pipeline saved");
        let result = self.get_pipeline(&location)?;
        let stored_id = required_str(kind, &result, "id")?.to_string();
        let drift = compare(definition, &result, "definition", "result").err();
        if let Some(drift) = &drift {
            warn!(pipeline = %stored_id, drift = %drift, "stored pipeline drifted from definition");
        }
        Ok(PipelineState { id: stored_id, definition: definition.clone(), result, drift })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;
    use crate::core::schema::STANDALONE_PIPELINE;

    /// Parses a JSON literal into a tree.
    fn tree(text: &str) -> ConfigTree {
        ConfigTree::from_json_str(text).unwrap()
    }

    #[test]
    fn template_block_selects_templated_catalogue() {
        let standalone = tree(r#"{"name":"p","template":{}}"#);
        assert_eq!(pipeline_catalogue(&standalone), &PIPELINE_CATALOGUE);
        let templated = tree(r#"{"name":"p","template":{"reference":"spinnaker://base"}}"#);
        assert_eq!(pipeline_catalogue(&templated), &TEMPLATED_PIPELINE_CATALOGUE);
    }

    #[test]
    fn type_follows_matched_variant() {
        let definition = tree(r#"{"name":"p","template":{"reference":"spinnaker://base"}}"#);
        let standalone = prepare_pipeline(&definition, &STANDALONE_PIPELINE, None);
        assert!(standalone.get("type").is_none());
        let templated = prepare_pipeline(&definition, &TEMPLATED_PIPELINE, Some("pipe-1"));
        assert_eq!(templated.get_str("type"), Some(TEMPLATED_PIPELINE_TYPE));
        assert_eq!(templated.get_str("id"), Some("pipe-1"));
    }
}
