//! Molecular Layer: staggered scroll animator
//!
//! Every line travels from its current offset to the shared target offset
//! over the same duration, but starts after its own transition delay. Lines
//! further below the scroll target therefore trail behind, producing the
//! wave-like follow motion.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use lyricflow_core::LineId;

use super::config::{ScrollConfig, ScrollConfigExt};
use super::easing::{EasingType, EasingTypeExt};
use super::timing::{lerp, progress_at};

#[derive(Debug, Clone)]
struct ActiveWave {
    start: Instant,
    /// Per-line starting offsets captured when a wave interrupts another one
    from: HashMap<LineId, f32>,
    base_from: f32,
    duration: Duration,
    easing: EasingType,
}

#[derive(Debug, Clone)]
pub struct StaggeredAnimator {
    config: ScrollConfig,
    delays: HashMap<LineId, u32>,
    wave: Option<ActiveWave>,
    /// Offset every line ends up at
    target: f32,
}

impl Default for StaggeredAnimator {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}

impl StaggeredAnimator {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            delays: HashMap::new(),
            wave: None,
            target: 0.0,
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.wave.is_some()
    }

    pub fn set_delay(&mut self, line: LineId, delay_ms: u32) {
        if delay_ms == 0 {
            self.delays.remove(&line);
        } else {
            self.delays.insert(line, delay_ms);
        }
    }

    pub fn delay(&self, line: LineId) -> u32 {
        self.delays.get(&line).copied().unwrap_or(0)
    }

    /// Forget delays and stop any animation at the current target
    pub fn reset(&mut self) {
        self.delays.clear();
        self.wave = None;
        self.target = 0.0;
    }

    /// Move to `offset`; `lines` are the lines currently laid out
    pub fn scroll_to(&mut self, offset: f32, instant: bool, now: Instant, lines: &[LineId]) {
        if instant || !self.config.is_smooth() {
            self.wave = None;
            self.target = offset;
            return;
        }
        if self.wave.is_none() && (offset - self.target).abs() < f32::EPSILON {
            return;
        }

        let from = if self.wave.is_some() {
            lines.iter().map(|&id| (id, self.offset_at(id, now))).collect()
        } else {
            HashMap::new()
        };
        self.wave = Some(ActiveWave {
            start: now,
            from,
            base_from: self.target,
            duration: self.config.animation_duration(),
            easing: self.config.easing,
        });
        self.target = offset;
    }

    /// Offset of `line` at `now`
    pub fn offset_at(&self, line: LineId, now: Instant) -> f32 {
        let Some(wave) = &self.wave else {
            return self.target;
        };
        let from = wave.from.get(&line).copied().unwrap_or(wave.base_from);
        let start = wave.start + Duration::from_millis(self.delay(line) as u64);
        let t = wave.easing.apply(progress_at(start, now, wave.duration));
        lerp(from, self.target, t)
    }

    /// Drop the wave once the most delayed line has arrived; true while animating
    pub fn update(&mut self, now: Instant) -> bool {
        if let Some(wave) = &self.wave {
            let max_delay = self.delays.values().copied().max().unwrap_or(0);
            let end = wave.start + Duration::from_millis(max_delay as u64) + wave.duration;
            if now >= end {
                self.wave = None;
            }
        }
        self.wave.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(duration_ms: u64) -> StaggeredAnimator {
        StaggeredAnimator::new(ScrollConfig {
            animation_duration_ms: duration_ms,
            easing: EasingType::Linear,
            ..Default::default()
        })
    }

    #[test]
    fn test_instant_jump() {
        let mut animator = linear(100);
        animator.scroll_to(-40.0, true, Instant::now(), &[]);
        assert!(!animator.is_animating());
        assert_eq!(animator.offset_at(LineId(0), Instant::now()), -40.0);
    }

    #[test]
    fn test_delayed_lines_trail() {
        let mut animator = linear(100);
        let lines = [LineId(0), LineId(1)];
        animator.set_delay(LineId(1), 30);
        let start = Instant::now();
        animator.scroll_to(-100.0, false, start, &lines);

        let at = start + Duration::from_millis(50);
        assert!((animator.offset_at(LineId(0), at) - -50.0).abs() < 0.01);
        assert!((animator.offset_at(LineId(1), at) - -20.0).abs() < 0.01);

        // Still running until the delayed line arrives
        assert!(animator.update(start + Duration::from_millis(110)));
        assert!(!animator.update(start + Duration::from_millis(130)));
        assert_eq!(animator.offset_at(LineId(1), start), -100.0);
    }

    #[test]
    fn test_retarget_starts_from_current_position() {
        let mut animator = linear(100);
        let lines = [LineId(0)];
        let start = Instant::now();
        animator.scroll_to(-100.0, false, start, &lines);

        let mid = start + Duration::from_millis(50);
        animator.scroll_to(-200.0, false, mid, &lines);
        assert!((animator.offset_at(LineId(0), mid) - -50.0).abs() < 0.01);
        let later = mid + Duration::from_millis(50);
        assert!((animator.offset_at(LineId(0), later) - -125.0).abs() < 0.01);
    }

    #[test]
    fn test_disabled_smoothing_jumps() {
        let mut animator = StaggeredAnimator::new(ScrollConfig {
            smooth_enabled: false,
            ..Default::default()
        });
        animator.scroll_to(-10.0, false, Instant::now(), &[]);
        assert!(!animator.is_animating());
        assert_eq!(animator.target(), -10.0);
    }
}
