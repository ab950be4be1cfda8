// crates/spinnaker-provider-core/src/lib.rs
// ============================================================================
// Module: Spinnaker Provider Core Library
// Description: Public API surface for the Spinnaker provider core.
// Purpose: Expose core types, gateway interfaces, and resource operations.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The provider core keeps declarative Spinnaker resources (applications,
//! projects, pipelines, pipeline templates) in step with a remote Gate API.
//! It validates documents against declared schema variants, submits
//! mutations as remote tasks and waits for them, and reports drift between
//! the desired and stored documents. Transports plug in through the
//! [`TaskGateway`] and [`ResourceReader`] interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::GatewayError;
pub use interfaces::ResourceKind;
pub use interfaces::ResourceLocator;
pub use interfaces::ResourceReader;
pub use interfaces::TaskGateway;
pub use runtime::Application;
pub use runtime::PipelineLocation;
pub use runtime::PipelineState;
pub use runtime::PipelineTemplateState;
pub use runtime::Project;
pub use runtime::ProjectState;
pub use runtime::ResourceClient;
pub use runtime::ResourceError;
pub use runtime::TaskError;
pub use runtime::TaskTracker;
