// crates/spinnaker-provider-core/src/runtime/mod.rs
// ============================================================================
// Module: Provider Runtime
// Description: Validation, drift comparison, task tracking, and resources.
// Purpose: Drive resource lifecycles against the gateway interfaces.
// Dependencies: crate::{core, interfaces}, base64, tracing
// ============================================================================

//! ## Overview
//! Runtime modules combine the pure core types with the gateway interfaces.
//! Every resource operation runs through the same validator, tracker, and
//! comparator so that transports never re-implement lifecycle rules.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod diff;
pub mod resources;
pub mod tracker;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use diff::compare;
pub use diff::is_consistent;
pub use resources::ResourceClient;
pub use resources::ResourceError;
pub use resources::application::Application;
pub use resources::pipeline::PipelineLocation;
pub use resources::pipeline::PipelineState;
pub use resources::pipeline_template::PipelineTemplateState;
pub use resources::pipeline_template::requires_replacement;
pub use resources::pipeline_template::strip_managed_fields;
pub use resources::project::Project;
pub use resources::project::ProjectState;
pub use tracker::TaskError;
pub use tracker::TaskTracker;
pub use validator::validate;
pub use validator::validate_variants;
