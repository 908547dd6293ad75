//! Trailing-edge debouncing for high-frequency control input.
//!
//! Slider drags emit a burst of values; only the last one in a quiet
//! window should trigger a replay. The debouncer is driven entirely by
//! caller-supplied [`Instant`]s, so hosts with their own clock (and tests)
//! decide when time passes.

use std::time::{Duration, Instant};

/// Quiet window applied to adjustment slider input.
pub const SLIDER_DEBOUNCE: Duration = Duration::from_millis(100);

/// Trailing-edge debouncer.
///
/// Every [`trigger`](Debouncer::trigger) resets the deadline to `now +
/// delay`; [`fire`](Debouncer::fire) reports true once the deadline passes
/// and then disarms. Only the final trigger of a burst survives.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet window.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record an input event at `now`, pushing the deadline back.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Poll at `now`. Returns true exactly once per burst, after the quiet
    /// window has elapsed since the last trigger.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Whether a trigger is waiting for its quiet window.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drop any pending trigger without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SLIDER_DEBOUNCE)
    }
}
