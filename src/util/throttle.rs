//! Rate limiting for high-frequency notifications.

use web_time::{Duration, Instant};

/// Leading-edge rate limiter: the first call passes, then calls are dropped
/// until the interval has elapsed since the last one that passed.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    /// Throttle with the given minimum interval between passing calls.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Throttle with a millisecond interval.
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Returns `true` if a call at the current instant should pass.
    pub fn ready(&mut self) -> bool {
        self.ready_at(Instant::now())
    }

    /// Returns `true` if a call at `now` should pass, recording it if so.
    pub fn ready_at(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => {
                false
            }
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Forget the last passing call so the next one passes immediately.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_passes() {
        let mut throttle = Throttle::from_millis(100);
        assert!(throttle.ready_at(Instant::now()));
    }

    #[test]
    fn drops_calls_within_interval() {
        let mut throttle = Throttle::from_millis(100);
        let t0 = Instant::now();
        assert!(throttle.ready_at(t0));
        assert!(!throttle.ready_at(t0 + Duration::from_millis(10)));
        assert!(!throttle.ready_at(t0 + Duration::from_millis(99)));
        assert!(throttle.ready_at(t0 + Duration::from_millis(100)));
        // Window restarts from the last passing call
        assert!(!throttle.ready_at(t0 + Duration::from_millis(150)));
        assert!(throttle.ready_at(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn reset_lets_next_call_through() {
        let mut throttle = Throttle::from_millis(100);
        let t0 = Instant::now();
        assert!(throttle.ready_at(t0));
        throttle.reset();
        assert!(throttle.ready_at(t0 + Duration::from_millis(1)));
    }
}
