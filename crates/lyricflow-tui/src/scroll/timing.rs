//! Atomic Layer: progress and interpolation helpers

use std::time::{Duration, Instant};

/// Linear progress of an animation that starts at `start`, clamped to [0, 1].
///
/// Before `start` (a delayed line that has not begun moving) progress is 0.
#[inline]
pub fn progress_at(start: Instant, now: Instant, duration: Duration) -> f64 {
    if now < start {
        return 0.0;
    }
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.duration_since(start).as_secs_f64();
    (elapsed / duration.as_secs_f64()).clamp(0.0, 1.0)
}

#[inline]
pub fn lerp(from: f32, to: f32, t: f64) -> f32 {
    from + (to - from) * t as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_before_during_after() {
        let start = Instant::now();
        let d = Duration::from_millis(100);
        assert_eq!(progress_at(start + d, start, d), 0.0);
        assert!((progress_at(start, start + Duration::from_millis(25), d) - 0.25).abs() < 1e-9);
        assert_eq!(progress_at(start, start + d * 3, d), 1.0);
        assert_eq!(progress_at(start, start, Duration::ZERO), 1.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(-10.0, 10.0, 0.5), 0.0);
        assert_eq!(lerp(4.0, 8.0, 1.0), 8.0);
    }
}
