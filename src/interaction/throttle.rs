use std::time::Duration;

/// Roughly one frame at 60 Hz.
pub const MOVE_THROTTLE: Duration = Duration::from_millis(16);

/// Rate limiter with a leading fire and a trailing pending value.
///
/// Time is passed in explicitly as a monotonic offset from whatever epoch
/// the host uses. A value offered too soon after the last fire is parked
/// (replacing any older parked value) until [`Throttle::poll`] sees the
/// interval has elapsed, or until [`Throttle::cancel`] drops it.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last_fired: Option<Duration>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
            pending: None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns `value` if it may fire at `now`, otherwise parks it.
    pub fn offer(&mut self, value: T, now: Duration) -> Option<T> {
        if self.ready(now) {
            self.last_fired = Some(now);
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Fires the parked value once the interval has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        if self.pending.is_some() && self.ready(now) {
            self.last_fired = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    /// Drops any parked value and forgets the last fire time.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.last_fired = None;
    }

    fn ready(&self, now: Duration) -> bool {
        match self.last_fired {
            None => true,
            Some(fired) => now.saturating_sub(fired) >= self.interval,
        }
    }
}

impl<T> Default for Throttle<T> {
    fn default() -> Self {
        Self::new(MOVE_THROTTLE)
    }
}
