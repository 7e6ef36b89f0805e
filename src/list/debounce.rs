//! Trailing-edge debouncer.
//!
//! Every push restarts the quiet period; the latest value becomes ready once
//! no push has happened for `delay`. Time is passed in by the caller so the
//! event loop owns the clock.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// When the pending value becomes ready, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value if its quiet period has elapsed.
    pub fn poll_ready(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if *at <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Take the pending value regardless of the deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}
