// crates/spinnaker-provider-core/src/core/time.rs
// ============================================================================
// Module: Clocks and Cancellation
// Description: Injectable monotonic clocks and cooperative cancellation.
// Purpose: Keep task polling deterministic under test.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Polling never reads ambient time directly. Callers inject a [`Clock`]:
//! [`SystemClock`] for production and [`ManualClock`] for tests, where every
//! sleep advances virtual time instantly and is recorded. A [`CancelToken`]
//! lets the host stop a wait between polls; sleeps return early once it is
//! set. [`SystemClock`] notices cancellation within [`CANCEL_CHECK_INTERVAL`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Longest stretch [`SystemClock`] sleeps without checking for cancellation.
pub const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Monotonic time source with blocking, cancellable sleep.
pub trait Clock: Send + Sync {
    /// Returns the time elapsed since the clock origin.
    fn now(&self) -> Duration;

    /// Blocks for `duration`, returning early once `cancel` is set.
    fn sleep(&self, duration: Duration, cancel: &CancelToken);
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    /// Instant the clock was created.
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration, cancel: &CancelToken) {
        let started = Instant::now();
        while !cancel.is_cancelled() {
            let left = duration.saturating_sub(started.elapsed());
            if left.is_zero() {
                break;
            }
            std::thread::sleep(left.min(CANCEL_CHECK_INTERVAL));
        }
    }
}

/// Virtual clock: sleeping advances time immediately.
///
/// A sleep requested after cancellation is skipped and not recorded.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    /// Shared clock state.
    state: Arc<Mutex<ManualState>>,
}

/// Mutable state of a [`ManualClock`].
#[derive(Debug, Default)]
struct ManualState {
    /// Current virtual time.
    now: Duration,
    /// Every sleep requested, in order.
    sleeps: Vec<Duration>,
}

impl ManualClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves virtual time forward without recording a sleep.
    pub fn advance(&self, duration: Duration) {
        self.with_state(|state| state.now += duration);
    }

    /// Returns every sleep requested so far.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.with_state(|state| state.sleeps.clone())
    }

    /// Runs `f` against the locked state, recovering from poisoning.
    fn with_state<T>(&self, f: impl FnOnce(&mut ManualState) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.with_state(|state| state.now)
    }

    fn sleep(&self, duration: Duration, cancel: &CancelToken) {
        if cancel.is_cancelled() {
            return;
        }
        self.with_state(|state| {
            state.now += duration;
            state.sleeps.push(duration);
        });
    }
}

// ============================================================================
// SECTION: Cancellation
// ============================================================================

/// Cooperative cancellation flag shared between the host and a wait loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    /// Set once cancellation is requested.
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_records_sleeps() {
        let clock = ManualClock::new();
        let cancel = CancelToken::new();
        clock.sleep(Duration::from_millis(5), &cancel);
        clock.advance(Duration::from_millis(10));
        clock.sleep(Duration::from_millis(5), &cancel);
        assert_eq!(clock.now(), Duration::from_millis(20));
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(5); 2]);
    }

    #[test]
    fn manual_clock_skips_sleeps_after_cancel() {
        let clock = ManualClock::new();
        let cancel = CancelToken::new();
        cancel.cancel();
        clock.sleep(Duration::from_secs(1), &cancel);
        assert_eq!(clock.now(), Duration::ZERO);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn system_clock_wakes_on_cancel() {
        let clock = SystemClock::new();
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            trigger.cancel();
        });
        let started = Instant::now();
        clock.sleep(Duration::from_secs(30), &cancel);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(canceller.join().is_ok());
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let observer = token.clone();
        token.cancel();
        assert!(observer.is_cancelled());
    }
}
