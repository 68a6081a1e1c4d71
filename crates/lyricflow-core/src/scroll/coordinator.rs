//! Molecular Layer: scroll coordinator
//!
//! Combines the scroll target chosen by the activation scheduler with layout
//! queries from the render surface and produces:
//! - a content translation (`padding_top - offset_top(target)`)
//! - position classes for a bounded band around the target
//! - per-line transition delays so lines below the target follow in a wave
//!
//! Manual scrolling takes control away from the coordinator until the user
//! has been idle for `user_scroll_idle_ms`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::config::ScrollConfig;
use crate::model::LineId;
use crate::surface::{RenderSurface, SurfaceCommand};
use crate::timer::CancellableTimer;
use crate::visibility::VisibilityIndex;

use super::position::PositionClass;

/// One scroll synchronisation request
#[derive(Debug, Clone, Copy)]
pub struct ScrollSync<'a> {
    pub target: Option<LineId>,
    /// Timed lines in display order
    pub order: &'a [LineId],
    /// Rewrite the offset even if target and offset are unchanged
    pub force: bool,
    /// Clock discontinuity; movement must be instantaneous
    pub seek: bool,
}

/// Timers that fired during [`ScrollCoordinator::poll_timers`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerEvents {
    pub idle_reverted: bool,
    pub resize_settled: bool,
    pub momentum_ended: bool,
}

impl TimerEvents {
    /// Whether the viewport has to be realigned on this tick
    pub fn needs_resync(&self) -> bool {
        self.idle_reverted || self.resize_settled
    }
}

#[derive(Debug, Clone)]
pub struct ScrollCoordinator {
    config: ScrollConfig,
    last_target: Option<LineId>,
    last_offset: Option<f32>,
    /// Offset currently shown, including manual adjustments
    current_offset: f32,
    classes: HashMap<LineId, PositionClass>,
    delays: HashMap<LineId, u32>,
    user_controlling: bool,
    gesture_active: bool,
    momentum_active: bool,
    idle_timer: CancellableTimer,
    resize_timer: CancellableTimer,
    momentum_timer: CancellableTimer,
}

impl ScrollCoordinator {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            config: config.clone(),
            last_target: None,
            last_offset: None,
            current_offset: 0.0,
            classes: HashMap::new(),
            delays: HashMap::new(),
            user_controlling: false,
            gesture_active: false,
            momentum_active: false,
            idle_timer: CancellableTimer::new(),
            resize_timer: CancellableTimer::new(),
            momentum_timer: CancellableTimer::new(),
        }
    }

    /// Drop all state and cancel every timer
    pub fn reset(&mut self) {
        self.last_target = None;
        self.last_offset = None;
        self.current_offset = 0.0;
        self.classes.clear();
        self.delays.clear();
        self.user_controlling = false;
        self.gesture_active = false;
        self.momentum_active = false;
        self.idle_timer.cancel();
        self.resize_timer.cancel();
        self.momentum_timer.cancel();
    }

    #[inline]
    pub fn is_user_controlling(&self) -> bool {
        self.user_controlling
    }

    #[inline]
    pub fn is_gesture_active(&self) -> bool {
        self.gesture_active
    }

    #[inline]
    pub fn is_momentum_active(&self) -> bool {
        self.momentum_active
    }

    pub fn last_target(&self) -> Option<LineId> {
        self.last_target
    }

    pub fn current_offset(&self) -> f32 {
        self.current_offset
    }

    pub fn position_class(&self, line: LineId) -> Option<PositionClass> {
        self.classes.get(&line).copied()
    }

    pub fn delay(&self, line: LineId) -> u32 {
        self.delays.get(&line).copied().unwrap_or(0)
    }

    /// Fire due timers. Must run before activation on every tick.
    pub fn poll_timers(&mut self, now: Instant) -> TimerEvents {
        let mut events = TimerEvents::default();

        if self.momentum_timer.fire_if_due(now) {
            self.momentum_active = false;
            events.momentum_ended = true;
        }
        if self.resize_timer.fire_if_due(now) {
            debug!("Resize settled");
            events.resize_settled = true;
        }
        // Content still coasting keeps control with the user
        if !self.gesture_active && !self.momentum_active && self.idle_timer.fire_if_due(now) {
            self.user_controlling = false;
            debug!("User scroll idle, returning to automatic scrolling");
            events.idle_reverted = true;
        }

        events
    }

    /// Align the viewport with the scroll target.
    ///
    /// Returns true when a new offset was written to the surface.
    pub fn sync(
        &mut self,
        request: ScrollSync<'_>,
        surface: &mut dyn RenderSurface,
        visibility: &dyn VisibilityIndex,
    ) -> bool {
        if self.user_controlling {
            trace!("Automatic scroll suppressed while user controls the viewport");
            return false;
        }
        let Some(target) = request.target else {
            return false;
        };
        if self.last_target == Some(target) && !request.force {
            return false;
        }
        let Some(target_index) = request.order.iter().position(|&id| id == target) else {
            warn!(line = ?target, "Scroll target is not part of the timeline");
            return false;
        };
        let Some(top) = surface.offset_top(target) else {
            warn!(line = ?target, "No layout position for scroll target");
            return false;
        };
        self.last_target = Some(target);

        self.update_position_classes(request.order, target_index, surface);

        let offset = surface.scroll_padding_top() - top;
        let unchanged = self
            .last_offset
            .is_some_and(|last| (last - offset).abs() < f32::EPSILON);
        if unchanged && !request.force {
            return false;
        }

        let instant = request.seek || self.gesture_active;
        self.update_delays(request.order, target_index, instant, surface, visibility);

        surface.apply(SurfaceCommand::ScrollOffset { offset, instant });
        self.last_offset = Some(offset);
        self.current_offset = offset;
        debug!(line = ?target, offset, instant, "Scrolled to line");
        true
    }

    /// Manual scroll by `delta` (positive moves the content up).
    ///
    /// Takes control from the coordinator and restarts the idle timer.
    pub fn on_user_scroll(&mut self, delta: f32, now: Instant, surface: &mut dyn RenderSurface) {
        if !self.user_controlling {
            debug!("User took control of scrolling");
        }
        self.user_controlling = true;
        self.idle_timer
            .arm(now, Duration::from_millis(self.config.user_scroll_idle_ms));
        if !self.gesture_active {
            self.momentum_active = true;
            self.momentum_timer
                .arm(now, Duration::from_millis(self.config.momentum_ms));
        }

        self.zero_delays(surface);
        self.last_offset = None;
        self.current_offset -= delta;
        surface.apply(SurfaceCommand::ScrollOffset {
            offset: self.current_offset,
            instant: true,
        });
    }

    /// A drag or touch started; control stays with the user until it ends
    pub fn begin_gesture(&mut self) {
        self.gesture_active = true;
        self.user_controlling = true;
        self.idle_timer.cancel();
        self.momentum_timer.cancel();
        self.momentum_active = false;
    }

    /// The drag ended; momentum runs out and the idle countdown starts
    pub fn end_gesture(&mut self, now: Instant) {
        if !self.gesture_active {
            return;
        }
        self.gesture_active = false;
        self.momentum_active = true;
        self.momentum_timer
            .arm(now, Duration::from_millis(self.config.momentum_ms));
        self.idle_timer
            .arm(now, Duration::from_millis(self.config.user_scroll_idle_ms));
    }

    /// Layout changed; a resync follows once resizing has settled
    pub fn on_resize(&mut self, now: Instant) {
        self.resize_timer
            .arm(now, Duration::from_millis(self.config.resize_debounce_ms));
    }

    fn update_position_classes(
        &mut self,
        order: &[LineId],
        target_index: usize,
        surface: &mut dyn RenderSurface,
    ) {
        let window = self.config.position_class_window;
        let lo = target_index.saturating_sub(window);
        let hi = (target_index + window).min(order.len().saturating_sub(1));

        let mut next = HashMap::with_capacity(window * 2 + 1);
        for (i, &line) in order.iter().enumerate().take(hi + 1).skip(lo) {
            let distance = i as isize - target_index as isize;
            if let Some(class) = PositionClass::from_distance(distance, window) {
                if self.classes.get(&line) != Some(&class) {
                    surface.apply(SurfaceCommand::PositionClass {
                        line,
                        class: Some(class),
                    });
                }
                next.insert(line, class);
            }
        }

        let mut stale: Vec<LineId> = self
            .classes
            .keys()
            .filter(|line| !next.contains_key(line))
            .copied()
            .collect();
        stale.sort();
        for line in stale {
            surface.apply(SurfaceCommand::PositionClass { line, class: None });
        }

        self.classes = next;
    }

    fn update_delays(
        &mut self,
        order: &[LineId],
        target_index: usize,
        instant: bool,
        surface: &mut dyn RenderSurface,
        visibility: &dyn VisibilityIndex,
    ) {
        let step = self.config.stagger_delay_ms;
        for (i, &line) in order.iter().enumerate() {
            let delay = if instant || i < target_index || !visibility.is_visible(line) {
                0
            } else {
                step.saturating_mul((i - target_index) as u32)
            };
            self.set_delay(line, delay, surface);
        }
    }

    fn zero_delays(&mut self, surface: &mut dyn RenderSurface) {
        let mut lines: Vec<LineId> = self.delays.keys().copied().collect();
        lines.sort();
        for line in lines {
            self.set_delay(line, 0, surface);
        }
    }

    fn set_delay(&mut self, line: LineId, delay_ms: u32, surface: &mut dyn RenderSurface) {
        if self.delay(line) == delay_ms {
            return;
        }
        surface.apply(SurfaceCommand::TransitionDelay { line, delay_ms });
        if delay_ms == 0 {
            self.delays.remove(&line);
        } else {
            self.delays.insert(line, delay_ms);
        }
    }
}
