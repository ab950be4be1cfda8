// crates/spinnaker-provider-core/src/runtime/resources/mod.rs
// ============================================================================
// Module: Resource Operations
// Description: Create, read, update, and delete for the managed resources.
// Purpose: Compose validation, task tracking, and drift checks per resource.
// Dependencies: crate::{core, interfaces, runtime}, base64, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`ResourceClient`] drives one blocking sequence per operation: validate
//! the input, submit the mutation as a task, wait for it, then re-fetch the
//! stored document and decode it or compare it against the desired one.
//! Validation and codec errors are raised before any network call.
//!
//! Drift found after a write is returned alongside the stored document rather
//! than as an error, so the caller decides whether it is fatal.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod application;
pub mod pipeline;
pub mod pipeline_template;
pub mod project;

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use tracing::trace;

use crate::core::AttributeError;
use crate::core::Clock;
use crate::core::ConfigTree;
use crate::core::DriftError;
use crate::core::Kind;
use crate::core::PermissionError;
use crate::core::SystemClock;
use crate::core::TaskRequest;
use crate::core::TaskStatus;
use crate::core::ValidationError;
use crate::interfaces::GatewayError;
use crate::interfaces::ResourceKind;
use crate::interfaces::ResourceLocator;
use crate::interfaces::ResourceReader;
use crate::interfaces::TaskGateway;
use crate::runtime::tracker::TaskError;
use crate::runtime::tracker::TaskTracker;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Resource operation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Validation, attribute, and permission errors occur before any network call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    /// Document failed structural validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Scalar attribute is malformed.
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    /// Permission document is malformed.
    #[error(transparent)]
    Permission(#[from] PermissionError),
    /// Stored document diverges from the desired one.
    #[error(transparent)]
    Drift(#[from] DriftError),
    /// Transport failure outside task tracking.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// Task submission or tracking failed.
    #[error(transparent)]
    Task(#[from] TaskError),
    /// The remote has no such resource.
    #[error("{kind} '{identifier}' not found")]
    NotFound {
        /// Resource kind looked up.
        kind: ResourceKind,
        /// Identifier looked up.
        identifier: String,
    },
    /// The remote returned a document of the wrong shape.
    #[error("unexpected {kind} document: {detail}")]
    UnexpectedDocument {
        /// Resource kind being decoded.
        kind: ResourceKind,
        /// What was wrong.
        detail: String,
    },
    /// A payload could not be encoded for submission.
    #[error("failed to encode {kind} payload: {detail}")]
    Encode {
        /// Resource kind being encoded.
        kind: ResourceKind,
        /// Encoder message.
        detail: String,
    },
}

impl ResourceError {
    /// Builds a not-found error.
    pub(crate) fn not_found(kind: ResourceKind, identifier: impl Into<String>) -> Self {
        Self::NotFound { kind, identifier: identifier.into() }
    }

    /// Builds an unexpected-document error.
    pub(crate) fn unexpected(kind: ResourceKind, detail: impl Into<String>) -> Self {
        Self::UnexpectedDocument { kind, detail: detail.into() }
    }
}

// ============================================================================
// SECTION: Resource Client
// ============================================================================

/// Resource operations over a gateway that submits tasks and reads documents.
pub struct ResourceClient<G, C = SystemClock> {
    /// Task tracker owning the gateway.
    tracker: TaskTracker<G, C>,
}

impl<G, C> ResourceClient<G, C>
where
    G: TaskGateway + ResourceReader,
    C: Clock,
{
    /// Creates a client from a configured tracker.
    #[must_use]
    pub const fn new(tracker: TaskTracker<G, C>) -> Self {
        Self { tracker }
    }

    /// Returns the task tracker.
    #[must_use]
    pub const fn tracker(&self) -> &TaskTracker<G, C> {
        &self.tracker
    }

    /// Submits a task and waits for it to succeed.
    fn run_task(&self, request: &TaskRequest) -> Result<TaskStatus, ResourceError> {
        Ok(self.tracker.submit_and_await(request)?)
    }

    /// Fetches a document, mapping absence to [`ResourceError::NotFound`].
    fn fetch_required(
        &self,
        locator: &ResourceLocator,
        identifier: &str,
    ) -> Result<ConfigTree, ResourceError> {
        let document = self
            .tracker
            .gateway()
            .fetch(locator)?
            .ok_or_else(|| ResourceError::not_found(locator.kind(), identifier))?;
        trace!(resource = %locator, payload = %document, "retrieved resource document");
        Ok(document)
    }

    /// Fetches a list document; absence yields an empty list.
    fn fetch_list(&self, locator: &ResourceLocator) -> Result<Vec<ConfigTree>, ResourceError> {
        match self.tracker.gateway().fetch(locator)? {
            None => Ok(Vec::new()),
            Some(ConfigTree::List(items)) => Ok(items),
            Some(other) => Err(ResourceError::unexpected(
                locator.kind(),
                format!("expected a list for {locator}, found {}", other.kind()),
            )),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a job node from its type and extra fields.
fn job<I>(job_type: &str, fields: I) -> ConfigTree
where
    I: IntoIterator<Item = (&'static str, ConfigTree)>,
{
    ConfigTree::map(std::iter::once(("type", ConfigTree::from(job_type))).chain(fields))
}

/// Encodes a document as base64 JSON, as task payloads expect.
fn encode_document(kind: ResourceKind, document: &ConfigTree) -> Result<ConfigTree, ResourceError> {
    let json = document
        .to_json_string()
        .map_err(|err| ResourceError::Encode { kind, detail: err.to_string() })?;
    Ok(ConfigTree::from(STANDARD.encode(json)))
}

/// Returns a required string field of a remote document.
fn required_str<'a>(
    kind: ResourceKind,
    document: &'a ConfigTree,
    key: &str,
) -> Result<&'a str, ResourceError> {
    document.get_str(key).ok_or_else(|| {
        ResourceError::unexpected(
            kind,
            format!("field '{key}' should be a string, found {}", Kind::of(document.get(key))),
        )
    })
}
