// crates/spinnaker-provider-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Scripted in-memory gateway for tracker and resource tests.
// Purpose: Exercise task lifecycles without a remote service.
// Dependencies: spinnaker-provider-core
// ============================================================================

//! ## Overview
//! [`FakeGate`] records every submitted task, answers polls from a script of
//! observations, and serves documents from an in-memory table. Once the
//! script runs out, polls report `RUNNING`.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::PoisonError;

use spinnaker_provider_core::CancelToken;
use spinnaker_provider_core::ConfigTree;
use spinnaker_provider_core::GatewayError;
use spinnaker_provider_core::RemoteStatus;
use spinnaker_provider_core::ResourceLocator;
use spinnaker_provider_core::ResourceReader;
use spinnaker_provider_core::TaskGateway;
use spinnaker_provider_core::TaskObservation;
use spinnaker_provider_core::TaskRef;
use spinnaker_provider_core::TaskRequest;

// ============================================================================
// SECTION: Fake Gateway
// ============================================================================

/// In-memory gateway with scripted poll results.
#[derive(Default)]
pub struct FakeGate {
    /// Submitted requests, in order.
    submitted: Mutex<Vec<TaskRequest>>,
    /// Poll results still to be served.
    script: Mutex<VecDeque<Result<TaskObservation, GatewayError>>>,
    /// Number of polls served.
    polls: Mutex<u32>,
    /// Stored documents by locator.
    documents: Mutex<HashMap<ResourceLocator, ConfigTree>>,
    /// Error returned by every submission when set.
    submit_error: Mutex<Option<GatewayError>>,
    /// Token cancelled while serving the given poll number.
    cancel_on_poll: Mutex<Option<(u32, CancelToken)>>,
}

impl FakeGate {
    /// Creates a gateway whose tasks succeed on the first poll.
    pub fn succeeding() -> Self {
        let gate = Self::default();
        gate.script_statuses(&["SUCCEEDED"]);
        gate
    }

    /// Appends poll results built from status labels.
    pub fn script_statuses(&self, labels: &[&str]) {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        script.extend(labels.iter().map(|label| Ok(TaskObservation::new(RemoteStatus::parse(label)))));
    }

    /// Appends a raw poll result.
    pub fn script(&self, result: Result<TaskObservation, GatewayError>) {
        self.script.lock().unwrap_or_else(PoisonError::into_inner).push_back(result);
    }

    /// Makes every submission fail with `error`.
    pub fn fail_submissions(&self, error: GatewayError) {
        *self.submit_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Cancels `token` while serving poll number `poll` (1-based).
    pub fn cancel_on_poll(&self, poll: u32, token: CancelToken) {
        *self.cancel_on_poll.lock().unwrap_or_else(PoisonError::into_inner) = Some((poll, token));
    }

    /// Stores a document under `locator`.
    pub fn put(&self, locator: ResourceLocator, document: ConfigTree) {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner).insert(locator, document);
    }

    /// Stores a document parsed from JSON under `locator`.
    pub fn put_json(&self, locator: ResourceLocator, json: &str) {
        self.put(locator, tree(json));
    }

    /// Returns every submitted request.
    pub fn submitted(&self) -> Vec<TaskRequest> {
        self.submitted.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the number of polls served.
    pub fn polls(&self) -> u32 {
        *self.polls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskGateway for FakeGate {
    fn submit(&self, request: &TaskRequest) -> Result<TaskRef, GatewayError> {
        if let Some(error) = self.submit_error.lock().unwrap_or_else(PoisonError::into_inner).clone() {
            return Err(error);
        }
        let mut submitted = self.submitted.lock().unwrap_or_else(PoisonError::into_inner);
        submitted.push(request.clone());
        let reference = format!("/tasks/task-{}", submitted.len());
        TaskRef::parse(&reference).ok_or(GatewayError::TaskReference(reference))
    }

    fn poll(&self, _task: &TaskRef) -> Result<TaskObservation, GatewayError> {
        let served = {
            let mut polls = self.polls.lock().unwrap_or_else(PoisonError::into_inner);
            *polls += 1;
            *polls
        };
        if let Some((poll, token)) = &*self.cancel_on_poll.lock().unwrap_or_else(PoisonError::into_inner)
            && *poll == served
        {
            token.cancel();
        }
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok(TaskObservation::new(RemoteStatus::Running)))
    }
}

impl ResourceReader for FakeGate {
    fn fetch(&self, locator: &ResourceLocator) -> Result<Option<ConfigTree>, GatewayError> {
        Ok(self.documents.lock().unwrap_or_else(PoisonError::into_inner).get(locator).cloned())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a JSON literal into a tree.
pub fn tree(json: &str) -> ConfigTree {
    ConfigTree::from_json_str(json).unwrap_or_else(|err| panic!("invalid fixture json: {err}"))
}
