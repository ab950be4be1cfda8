// crates/spinnaker-provider-core/src/core/mod.rs
// ============================================================================
// Module: Provider Core Types
// Description: Document model, schemas, permissions, and task types.
// Purpose: Provide the pure data types shared by runtime and transports.
// Dependencies: indexmap, regex, serde, thiserror
// ============================================================================

//! ## Overview
//! Core types are pure values. Nothing in this module performs I/O; the
//! runtime composes these types with the gateway interfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod attributes;
pub mod permissions;
pub mod schema;
pub mod task;
pub mod time;
pub mod tree;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use attributes::AttributeError;
pub use attributes::CLOUD_PROVIDERS;
pub use attributes::TEMPLATE_TAGS;
pub use attributes::join_cloud_providers;
pub use attributes::split_cloud_providers;
pub use attributes::validate_application_name;
pub use attributes::validate_cloud_provider;
pub use attributes::validate_email;
pub use attributes::validate_template_tag;
pub use permissions::Action;
pub use permissions::ActionIndexed;
pub use permissions::PermissionError;
pub use permissions::RoleIndexed;
pub use schema::APPLICATION_CATALOGUE;
pub use schema::Field;
pub use schema::PIPELINE_CATALOGUE;
pub use schema::PIPELINE_TEMPLATE_CATALOGUE;
pub use schema::PROJECT_CONFIG_CATALOGUE;
pub use schema::SchemaCatalogue;
pub use schema::SchemaNode;
pub use schema::SchemaVariant;
pub use schema::TEMPLATED_PIPELINE;
pub use schema::TEMPLATED_PIPELINE_CATALOGUE;
pub use schema::ValidationError;
pub use task::DEFAULT_MAX_ATTEMPTS;
pub use task::DEFAULT_POLL_INTERVAL;
pub use task::RemoteStatus;
pub use task::TaskId;
pub use task::TaskObservation;
pub use task::TaskPolicy;
pub use task::TaskRef;
pub use task::TaskRequest;
pub use task::TaskState;
pub use task::TaskStatus;
pub use time::CANCEL_CHECK_INTERVAL;
pub use time::CancelToken;
pub use time::Clock;
pub use time::ManualClock;
pub use time::SystemClock;
pub use tree::ConfigTree;
pub use tree::DriftError;
pub use tree::Kind;
