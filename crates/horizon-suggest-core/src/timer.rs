//! Debounce timing for Horizon Suggest.
//!
//! Provides a single-shot, restartable deadline holder that is independent of
//! any event loop. The host owns the clock: it calls
//! [`DebounceTimer::fire_if_due`] from its own tick (frame callback, timer
//! wheel, test harness) and uses [`DebounceTimer::deadline`] to know when the
//! next wake-up is needed.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// A restartable single-shot timer.
///
/// The timer holds at most one pending deadline. [`restart`](Self::restart)
/// replaces any pending deadline rather than stacking a second one, which is
/// exactly the debounce behavior: rapid restarts keep pushing a single fire
/// into the future.
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use horizon_suggest_core::DebounceTimer;
///
/// let timer = DebounceTimer::new(Duration::from_millis(200));
/// let t0 = Instant::now();
/// timer.restart(t0);
/// assert!(timer.is_pending());
/// assert!(!timer.fire_if_due(t0)); // Not due yet
/// assert!(timer.fire_if_due(t0 + Duration::from_millis(200)));
/// assert!(!timer.is_pending()); // Fired, deadline consumed
/// ```
pub struct DebounceTimer {
    /// Delay between a restart and the fire.
    interval: Mutex<Duration>,
    /// The pending fire time, if any.
    deadline: Mutex<Option<Instant>>,
}

impl DebounceTimer {
    /// Create a timer with the given debounce interval and no pending fire.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: Mutex::new(interval),
            deadline: Mutex::new(None),
        }
    }

    /// Change the debounce interval.
    ///
    /// Does not reschedule a pending fire; the new interval applies from the
    /// next `restart`.
    pub fn set_interval(&self, interval: Duration) {
        *self.interval.lock() = interval;
    }

    /// The configured debounce interval.
    pub fn interval(&self) -> Duration {
        *self.interval.lock()
    }

    /// Schedule (or reschedule) the fire at `now + interval`.
    ///
    /// Any previously pending fire is replaced.
    pub fn restart(&self, now: Instant) {
        let deadline = now + self.interval();
        tracing::trace!(target: "horizon_suggest_core::timer", ?deadline, "debounce restarted");
        *self.deadline.lock() = Some(deadline);
    }

    /// Drop any pending fire.
    pub fn cancel(&self) {
        if self.deadline.lock().take().is_some() {
            tracing::trace!(target: "horizon_suggest_core::timer", "debounce cancelled");
        }
    }

    /// Whether a fire is pending.
    pub fn is_pending(&self) -> bool {
        self.deadline.lock().is_some()
    }

    /// The pending fire time, if any.
    pub fn deadline(&self) -> Option<Instant> {
        *self.deadline.lock()
    }

    /// Consume the deadline if it has been reached.
    ///
    /// Returns `true` exactly once per scheduled fire: when `now` is at or
    /// past the deadline. Subsequent calls return `false` until the next
    /// `restart`.
    pub fn fire_if_due(&self, now: Instant) -> bool {
        let mut deadline = self.deadline.lock();
        match *deadline {
            Some(at) if now >= at => {
                *deadline = None;
                tracing::trace!(target: "horizon_suggest_core::timer", "debounce fired");
                true
            }
            _ => false,
        }
    }
}
