//! Atomic Layer: scroll configuration helpers

use std::time::Duration;

pub use lyricflow_core::{EasingType, ScrollConfig};

/// Duration accessors for [`ScrollConfig`]
pub trait ScrollConfigExt {
    fn animation_duration(&self) -> Duration;

    /// Frame interval while an animation is running
    fn frame_interval(&self) -> Duration;

    fn is_smooth(&self) -> bool;
}

impl ScrollConfigExt for ScrollConfig {
    #[inline]
    fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    #[inline]
    fn frame_interval(&self) -> Duration {
        match self.animation_fps {
            0 => Duration::from_millis(16),
            fps => Duration::from_millis((1000 / fps as u64).max(1)),
        }
    }

    #[inline]
    fn is_smooth(&self) -> bool {
        self.smooth_enabled && self.animation_duration_ms > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interval() {
        let mut config = ScrollConfig::default();
        assert_eq!(config.frame_interval(), Duration::from_millis(16));
        config.animation_fps = 0;
        assert_eq!(config.frame_interval(), Duration::from_millis(16));
        config.animation_fps = 5000;
        assert_eq!(config.frame_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_smoothness_requires_duration() {
        let mut config = ScrollConfig::default();
        assert!(config.is_smooth());
        config.animation_duration_ms = 0;
        assert!(!config.is_smooth());
    }
}
