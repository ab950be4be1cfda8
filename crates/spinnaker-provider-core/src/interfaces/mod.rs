// crates/spinnaker-provider-core/src/interfaces/mod.rs
// ============================================================================
// Module: Gateway Interfaces
// Description: Transport-agnostic seams for task submission and reads.
// Purpose: Define the contract surfaces used by the provider runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The runtime talks to the remote service only through these traits. A
//! transport submits tasks, polls them, and fetches stored documents; it does
//! not interpret documents beyond JSON decoding. Implementations must fail
//! closed: an unreadable response is an error, never an empty document.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::core::ConfigTree;
use crate::core::TaskObservation;
use crate::core::TaskRef;
use crate::core::TaskRequest;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Transport errors raised by gateway implementations.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Request could not be sent or the connection failed.
    #[error("gateway transport error: {0}")]
    Transport(String),
    /// Remote answered with a non-success HTTP status.
    #[error("gateway returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Request summary and response excerpt.
        message: String,
    },
    /// Response body could not be decoded.
    #[error("gateway response decode error: {0}")]
    Decode(String),
    /// Submission response carried no usable task reference.
    #[error("malformed task reference: {0}")]
    TaskReference(String),
}

// ============================================================================
// SECTION: Resource Locators
// ============================================================================

/// Kind of remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Application.
    Application,
    /// Project.
    Project,
    /// Pipeline configuration.
    Pipeline,
    /// Pipeline template.
    PipelineTemplate,
}

impl ResourceKind {
    /// Returns the human-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Project => "project",
            Self::Pipeline => "pipeline",
            Self::PipelineTemplate => "pipeline template",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote document addressed by a read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceLocator {
    /// Every application (`GET /applications`).
    Applications,
    /// One application envelope (`GET /applications/{name}`).
    Application {
        /// Application name.
        name: String,
    },
    /// One project (`GET /projects/{id}`).
    Project {
        /// Project identifier or name.
        id: String,
    },
    /// Every pipeline of an application.
    Pipelines {
        /// Owning application.
        application: String,
    },
    /// One pipeline by name.
    Pipeline {
        /// Owning application.
        application: String,
        /// Pipeline name.
        name: String,
    },
    /// One pipeline template version.
    PipelineTemplate {
        /// Template identifier.
        id: String,
        /// Optional version tag.
        tag: Option<String>,
    },
}

impl ResourceLocator {
    /// Returns the resource kind addressed.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Applications | Self::Application { .. } => ResourceKind::Application,
            Self::Project { .. } => ResourceKind::Project,
            Self::Pipelines { .. } | Self::Pipeline { .. } => ResourceKind::Pipeline,
            Self::PipelineTemplate { .. } => ResourceKind::PipelineTemplate,
        }
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applications => f.write_str("applications"),
            Self::Application { name } => write!(f, "application {name}"),
            Self::Project { id } => write!(f, "project {id}"),
            Self::Pipelines { application } => write!(f, "pipelines of {application}"),
            Self::Pipeline { application, name } => write!(f, "pipeline {application}/{name}"),
            Self::PipelineTemplate { id, tag: Some(tag) } => write!(f, "pipeline template {id}:{tag}"),
            Self::PipelineTemplate { id, tag: None } => write!(f, "pipeline template {id}"),
        }
    }
}

// ============================================================================
// SECTION: Gateway Traits
// ============================================================================

/// Submits mutations as remote tasks and polls them.
pub trait TaskGateway {
    /// Submits a task and returns its reference.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the submission is rejected or the
    /// response carries no task reference.
    fn submit(&self, request: &TaskRequest) -> Result<TaskRef, GatewayError>;

    /// Fetches the current status of a task.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the task cannot be read.
    fn poll(&self, task: &TaskRef) -> Result<TaskObservation, GatewayError>;
}

/// Reads stored documents.
pub trait ResourceReader {
    /// Fetches a document; `Ok(None)` when the remote reports it absent.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] for transport, status, or decode failures.
    fn fetch(&self, locator: &ResourceLocator) -> Result<Option<ConfigTree>, GatewayError>;
}

impl<T: TaskGateway + ?Sized> TaskGateway for &T {
    fn submit(&self, request: &TaskRequest) -> Result<TaskRef, GatewayError> {
        (**self).submit(request)
    }

    fn poll(&self, task: &TaskRef) -> Result<TaskObservation, GatewayError> {
        (**self).poll(task)
    }
}

impl<T: ResourceReader + ?Sized> ResourceReader for &T {
    fn fetch(&self, locator: &ResourceLocator) -> Result<Option<ConfigTree>, GatewayError> {
        (**self).fetch(locator)
    }
}
