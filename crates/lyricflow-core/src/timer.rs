//! Single-owner cancellable deadline.
//!
//! Re-arming replaces the pending deadline instead of stacking a second one,
//! so a burst of input events keeps pushing the same timer back.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct CancellableTimer {
    deadline: Option<Instant>,
}

impl CancellableTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start the timer so it fires `after` from `now`
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True exactly once when the deadline has passed; disarms the timer
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once() {
        let start = Instant::now();
        let mut timer = CancellableTimer::new();
        timer.arm(start, Duration::from_millis(100));

        assert!(!timer.fire_if_due(start + Duration::from_millis(99)));
        assert!(timer.fire_if_due(start + Duration::from_millis(100)));
        assert!(!timer.fire_if_due(start + Duration::from_millis(200)));
    }

    #[test]
    fn test_rearm_replaces_deadline() {
        let start = Instant::now();
        let mut timer = CancellableTimer::new();
        timer.arm(start, Duration::from_millis(100));
        timer.arm(start + Duration::from_millis(80), Duration::from_millis(100));

        assert!(!timer.fire_if_due(start + Duration::from_millis(150)));
        assert!(timer.fire_if_due(start + Duration::from_millis(180)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut timer = CancellableTimer::new();
        timer.arm(start, Duration::ZERO);
        timer.cancel();
        assert!(!timer.fire_if_due(start + Duration::from_secs(1)));
    }
}
