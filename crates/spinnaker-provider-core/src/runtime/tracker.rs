// crates/spinnaker-provider-core/src/runtime/tracker.rs
// ============================================================================
// Module: Task Lifecycle Tracker
// Description: Submits a mutation as a remote task and polls it to completion.
// Purpose: Turn asynchronous remote mutations into one blocking call.
// Dependencies: crate::{core, interfaces}, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`TaskTracker::submit_and_await`] submits a task once and then polls it at
//! a fixed interval. The first poll happens right after submission and no
//! sleep follows the last poll. Polling stops on the first terminal
//! observation, when the attempt budget or deadline is exhausted, or when the
//! cancel token fires. Neither the submission nor a failed poll is retried.
//!
//! Cancellation and the deadline are checked before every poll and after
//! every sleep, so a wait never outlives its budget by more than one poll.
//! Sleeps end early once the cancel token fires.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::core::CancelToken;
use crate::core::Clock;
use crate::core::SystemClock;
use crate::core::TaskId;
use crate::core::TaskPolicy;
use crate::core::TaskRef;
use crate::core::TaskRequest;
use crate::core::TaskState;
use crate::core::TaskStatus;
use crate::interfaces::GatewayError;
use crate::interfaces::TaskGateway;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Task lifecycle errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - [`TaskError::TaskTimeout`] and [`TaskError::TaskFailed`] are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Submission was rejected; nothing was polled.
    #[error("task submission failed: {0}")]
    Submit(#[source] GatewayError),
    /// A poll failed at the transport layer.
    #[error("polling task {task_id} failed: {source}")]
    Poll {
        /// Task being polled.
        task_id: TaskId,
        /// Transport failure.
        #[source]
        source: GatewayError,
    },
    /// The remote reported a failed terminal state.
    #[error("task {task_id} failed: {reason}")]
    TaskFailed {
        /// Failed task.
        task_id: TaskId,
        /// Exception message or terminal status label.
        reason: String,
    },
    /// The attempt budget or deadline ran out before a terminal state.
    #[error("task {task_id} did not complete after {attempts} polls")]
    TaskTimeout {
        /// Unfinished task.
        task_id: TaskId,
        /// Polls performed.
        attempts: u32,
    },
    /// The wait was cancelled by the host.
    #[error("waiting for task {task_id} was cancelled after {attempts} polls")]
    Cancelled {
        /// Task left running remotely.
        task_id: TaskId,
        /// Polls performed.
        attempts: u32,
    },
}

// ============================================================================
// SECTION: Tracker
// ============================================================================

/// Blocking submit-and-poll driver over a [`TaskGateway`].
pub struct TaskTracker<G, C = SystemClock> {
    /// Transport used for submission and polling.
    gateway: G,
    /// Time source for sleeps and deadlines.
    clock: C,
    /// Attempt budget, interval, and deadline.
    policy: TaskPolicy,
    /// Host cancellation signal.
    cancel: CancelToken,
}

impl<G: TaskGateway> TaskTracker<G, SystemClock> {
    /// Creates a tracker using the system clock.
    #[must_use]
    pub fn new(gateway: G, policy: TaskPolicy) -> Self {
        Self { gateway, clock: SystemClock::new(), policy, cancel: CancelToken::new() }
    }
}

impl<G: TaskGateway, C: Clock> TaskTracker<G, C> {
    /// Replaces the time source.
    #[must_use]
    pub fn with_clock<N: Clock>(self, clock: N) -> TaskTracker<G, N> {
        TaskTracker { gateway: self.gateway, clock, policy: self.policy, cancel: self.cancel }
    }

    /// Replaces the cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the polling policy.
    #[must_use]
    pub const fn policy(&self) -> &TaskPolicy {
        &self.policy
    }

    /// Returns the underlying gateway.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Submits `request` and waits for the task to reach a terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Submit`] without polling when submission fails,
    /// and otherwise the error of [`TaskTracker::await_task`].
    pub fn submit_and_await(&self, request: &TaskRequest) -> Result<TaskStatus, TaskError> {
        trace!(
            application = %request.application,
            description = %request.description,
            payload = %request.to_tree(),
            "submitting task"
        );
        let task_ref = self.gateway.submit(request).map_err(TaskError::Submit)?;
        debug!(task = %task_ref.id(), description = %request.description, "task submitted");
        self.await_task(task_ref)
    }

    /// Polls an already submitted task until it reaches a terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TaskFailed`], [`TaskError::TaskTimeout`],
    /// [`TaskError::Cancelled`], or [`TaskError::Poll`].
    pub fn await_task(&self, task_ref: TaskRef) -> Result<TaskStatus, TaskError> {
        let started = self.clock.now();
        let mut status = TaskStatus::submitted(task_ref);
        let max_attempts = self.policy.max_attempts;
        for attempt in 1..=max_attempts {
            self.check_interrupts(&mut status, started)?;
            let observation = self.gateway.poll(status.task_ref()).map_err(|source| TaskError::Poll {
                task_id: status.task_ref().id().clone(),
                source,
            })?;
            status.observe(&observation);
            debug!(
                task = %status.task_ref().id(),
                attempt,
                remote_status = %observation.status,
                state = %status.state(),
                "task polled"
            );
            match status.state() {
                TaskState::Succeeded => return Ok(status),
                TaskState::Failed => {
                    let reason = status.reason().unwrap_or(observation.status.as_str()).to_string();
                    warn!(task = %status.task_ref().id(), reason = %reason, "task failed");
                    return Err(TaskError::TaskFailed { task_id: status.task_ref().id().clone(), reason });
                }
                _ => {}
            }
            if attempt < max_attempts {
                self.clock.sleep(self.next_sleep(started), &self.cancel);
                self.check_interrupts(&mut status, started)?;
            }
        }
        Err(self.timed_out(&mut status))
    }

    /// Returns the next sleep, capped at the time left before the deadline.
    fn next_sleep(&self, started: Duration) -> Duration {
        let interval = self.policy.poll_interval;
        self.policy.deadline.map_or(interval, |deadline| {
            let elapsed = self.clock.now().saturating_sub(started);
            interval.min(deadline.saturating_sub(elapsed))
        })
    }

    /// Stops the wait when cancelled or past the deadline.
    fn check_interrupts(&self, status: &mut TaskStatus, started: Duration) -> Result<(), TaskError> {
        if self.cancel.is_cancelled() {
            debug!(task = %status.task_ref().id(), polls = status.polls(), "task wait cancelled");
            return Err(TaskError::Cancelled {
                task_id: status.task_ref().id().clone(),
                attempts: status.polls(),
            });
        }
        if let Some(deadline) = self.policy.deadline
            && self.clock.now().saturating_sub(started) >= deadline
        {
            return Err(self.timed_out(status));
        }
        Ok(())
    }

    /// Moves the task to `TimedOut` and builds the timeout error.
    fn timed_out(&self, status: &mut TaskStatus) -> TaskError {
        status.time_out();
        warn!(
            task = %status.task_ref().id(),
            polls = status.polls(),
            max_attempts = self.policy.max_attempts,
            "task did not complete in time"
        );
        TaskError::TaskTimeout { task_id: status.task_ref().id().clone(), attempts: status.polls() }
    }
}
