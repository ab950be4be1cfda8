// crates/spinnaker-provider-core/src/core/task.rs
// ============================================================================
// Module: Remote Tasks
// Description: Task references, remote statuses, and the task state machine.
// Purpose: Model the lifecycle of one asynchronous mutation.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every mutation is submitted to the remote service as a task: a job list
//! plus an application and a human-readable description. The service answers
//! with a task reference and the caller polls it until it reaches a terminal
//! state.
//!
//! [`TaskStatus`] is the caller-owned state machine for one such task.
//! Transitions are driven only by poll observations and the attempt budget,
//! and terminal states are final.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::core::tree::ConfigTree;

// ============================================================================
// SECTION: Task References
// ============================================================================

/// Remote task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new task identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Reference returned by a task submission (`/tasks/<id>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskRef {
    /// Reference as returned by the service.
    reference: String,
    /// Task identifier: last path segment of the reference.
    id: TaskId,
}

impl TaskRef {
    /// Parses a task reference; the identifier is its last path segment.
    ///
    /// Returns `None` when the reference has no non-empty last segment.
    #[must_use]
    pub fn parse(reference: &str) -> Option<Self> {
        let id = reference.rsplit('/').next().filter(|segment| !segment.is_empty())?;
        Some(Self { reference: reference.to_string(), id: TaskId::new(id) })
    }

    /// Extracts the reference from a submission response (`{"ref": ...}`).
    #[must_use]
    pub fn from_response(response: &ConfigTree) -> Option<Self> {
        response.get_str("ref").and_then(Self::parse)
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the raw reference.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}

// ============================================================================
// SECTION: Task Requests
// ============================================================================

/// Mutation submitted as a remote task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRequest {
    /// Jobs executed by the task, in order.
    pub job: Vec<ConfigTree>,
    /// Application the task is attributed to.
    pub application: String,
    /// Human-readable description.
    pub description: String,
}

impl TaskRequest {
    /// Creates a single-job task request.
    #[must_use]
    pub fn new(application: impl Into<String>, description: impl Into<String>, job: ConfigTree) -> Self {
        Self { job: vec![job], application: application.into(), description: description.into() }
    }

    /// Renders the submission payload.
    #[must_use]
    pub fn to_tree(&self) -> ConfigTree {
        ConfigTree::map([
            ("job", ConfigTree::List(self.job.clone())),
            ("application", ConfigTree::from(self.application.as_str())),
            ("description", ConfigTree::from(self.description.as_str())),
        ])
    }
}

// ============================================================================
// SECTION: Task States
// ============================================================================

/// Caller-visible task state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Not yet accepted for execution.
    Pending,
    /// Accepted and executing.
    Running,
    /// Completed successfully.
    Succeeded,
    /// Completed unsuccessfully.
    Failed,
    /// Attempt budget or deadline exhausted before completion.
    TimedOut,
}

impl TaskState {
    /// Returns true for Succeeded, Failed, and `TimedOut`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::TimedOut)
    }

    /// Returns the stable lowercase label for the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution status reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemoteStatus {
    /// `NOT_STARTED`.
    NotStarted,
    /// `BUFFERED`.
    Buffered,
    /// `RUNNING`.
    Running,
    /// `PAUSED`.
    Paused,
    /// `SUSPENDED`.
    Suspended,
    /// `REDIRECT`.
    Redirect,
    /// `SUCCEEDED`.
    Succeeded,
    /// `TERMINAL`.
    Terminal,
    /// `FAILED_CONTINUE`.
    FailedContinue,
    /// `CANCELED`.
    Canceled,
    /// `STOPPED`.
    Stopped,
    /// `SKIPPED`.
    Skipped,
    /// Any other label; treated as still running.
    Unknown(String),
}

impl RemoteStatus {
    /// Parses a remote status label.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label {
            "NOT_STARTED" => Self::NotStarted,
            "BUFFERED" => Self::Buffered,
            "RUNNING" => Self::Running,
            "PAUSED" => Self::Paused,
            "SUSPENDED" => Self::Suspended,
            "REDIRECT" => Self::Redirect,
            "SUCCEEDED" => Self::Succeeded,
            "TERMINAL" => Self::Terminal,
            "FAILED_CONTINUE" => Self::FailedContinue,
            "CANCELED" => Self::Canceled,
            "STOPPED" => Self::Stopped,
            "SKIPPED" => Self::Skipped,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns the remote label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::Buffered => "BUFFERED",
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
            Self::Suspended => "SUSPENDED",
            Self::Redirect => "REDIRECT",
            Self::Succeeded => "SUCCEEDED",
            Self::Terminal => "TERMINAL",
            Self::FailedContinue => "FAILED_CONTINUE",
            Self::Canceled => "CANCELED",
            Self::Stopped => "STOPPED",
            Self::Skipped => "SKIPPED",
            Self::Unknown(label) => label,
        }
    }

    /// Maps the remote status onto the caller-visible state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        match self {
            Self::NotStarted | Self::Buffered => TaskState::Pending,
            Self::Running | Self::Paused | Self::Suspended | Self::Redirect | Self::Unknown(_) => {
                TaskState::Running
            }
            Self::Succeeded => TaskState::Succeeded,
            Self::Terminal | Self::FailedContinue | Self::Canceled | Self::Stopped | Self::Skipped => {
                TaskState::Failed
            }
        }
    }
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Observations
// ============================================================================

/// One poll result for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskObservation {
    /// Reported status.
    pub status: RemoteStatus,
    /// First exception message attached to the execution, if any.
    pub exception: Option<String>,
}

impl TaskObservation {
    /// Creates an observation without an exception message.
    #[must_use]
    pub const fn new(status: RemoteStatus) -> Self {
        Self { status, exception: None }
    }

    /// Reads an observation from a task document.
    ///
    /// Returns `None` when the document carries no `status` string.
    #[must_use]
    pub fn from_tree(task: &ConfigTree) -> Option<Self> {
        let status = RemoteStatus::parse(task.get_str("status")?);
        Some(Self { status, exception: first_exception(task) })
    }

    /// Returns the failure reason: the exception message or the status label.
    #[must_use]
    pub fn failure_reason(&self) -> String {
        self.exception.clone().unwrap_or_else(|| self.status.as_str().to_string())
    }
}

/// Finds the first exception message under `execution.stages[].context`.
fn first_exception(task: &ConfigTree) -> Option<String> {
    let stages = task.get("execution")?.get("stages")?.as_list()?;
    stages.iter().find_map(|stage| {
        let details = stage.get("context")?.get("exception")?.get("details")?;
        let from_errors = details
            .get("errors")
            .and_then(ConfigTree::as_list)
            .and_then(|errors| errors.iter().find_map(ConfigTree::as_str))
            .filter(|message| !message.is_empty());
        from_errors.or_else(|| details.get_str("error").filter(|message| !message.is_empty())).map(str::to_string)
    })
}

// ============================================================================
// SECTION: Task State Machine
// ============================================================================

/// Lifecycle of one submitted task.
///
/// # Invariants
/// - Once terminal, the state and reason never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    /// Task being tracked.
    task_ref: TaskRef,
    /// Current state.
    state: TaskState,
    /// Failure reason once Failed.
    reason: Option<String>,
    /// Poll observations applied so far.
    polls: u32,
}

impl TaskStatus {
    /// Starts tracking a freshly submitted task.
    #[must_use]
    pub const fn submitted(task_ref: TaskRef) -> Self {
        Self { task_ref, state: TaskState::Running, reason: None, polls: 0 }
    }

    /// Applies a poll observation. Ignored once terminal.
    pub fn observe(&mut self, observation: &TaskObservation) {
        if self.state.is_terminal() {
            return;
        }
        self.polls = self.polls.saturating_add(1);
        self.state = observation.status.state();
        if self.state == TaskState::Failed {
            self.reason = Some(observation.failure_reason());
        }
    }

    /// Marks the budget as exhausted. Ignored once terminal.
    pub const fn time_out(&mut self) {
        if !self.state.is_terminal() {
            self.state = TaskState::TimedOut;
        }
    }

    /// Returns the task reference.
    #[must_use]
    pub const fn task_ref(&self) -> &TaskRef {
        &self.task_ref
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the failure reason, if Failed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns the number of observations applied.
    #[must_use]
    pub const fn polls(&self) -> u32 {
        self.polls
    }
}

// ============================================================================
// SECTION: Polling Policy
// ============================================================================

/// Default number of polls before a task times out.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polling budget for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPolicy {
    /// Maximum number of polls.
    pub max_attempts: u32,
    /// Fixed delay between polls.
    pub poll_interval: Duration,
    /// Optional bound on total wait time, measured from submission.
    pub deadline: Option<Duration>,
}

impl Default for TaskPolicy {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, poll_interval: DEFAULT_POLL_INTERVAL, deadline: None }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
