//! Engine facade wiring correction, derivation, activation and scrolling.
//!
//! The engine owns every piece of mutable sync state. Input handlers
//! (`on_user_scroll`, gestures, resize) mutate it between ticks; each tick
//! polls timers, then evaluates activation and highlighting, then scroll, in
//! that order.

use serde::Serialize;
use tracing::{debug, info};

use crate::activation::ActivationScheduler;
use crate::animation::AnimationParameterDeriver;
use crate::cache::TimelineCache;
use crate::clock::{SystemWallClock, WallClock};
use crate::config::AppConfig;
use crate::metrics::TextMetrics;
use crate::model::{LineId, Timeline};
use crate::scroll::{ScrollCoordinator, ScrollSync};
use crate::surface::{RenderSurface, SurfaceCommand};
use crate::timing::TimingCorrector;
use crate::visibility::VisibilityIndex;

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub seek: bool,
    pub active_lines: Vec<LineId>,
    pub primary_line: Option<LineId>,
    pub scroll_target: Option<LineId>,
    pub scrolled: bool,
}

pub struct LyricsEngine<W: WallClock = SystemWallClock> {
    wall: W,
    metrics: TextMetrics,
    corrector: TimingCorrector,
    deriver: AnimationParameterDeriver,
    scheduler: ActivationScheduler,
    scroll: ScrollCoordinator,
    seek_threshold_ms: i64,
    cache: Option<TimelineCache>,
    last_tick_ms: Option<i64>,
    initial_sync: bool,
}

impl LyricsEngine<SystemWallClock> {
    pub fn with_system_clock(config: &AppConfig, metrics: TextMetrics) -> Self {
        Self::new(config, metrics, SystemWallClock)
    }
}

impl<W: WallClock> LyricsEngine<W> {
    pub fn new(config: &AppConfig, metrics: TextMetrics, wall: W) -> Self {
        Self {
            wall,
            metrics,
            corrector: TimingCorrector::new(&config.timing),
            deriver: AnimationParameterDeriver::new(&config.animation),
            scheduler: ActivationScheduler::new(&config.sync),
            scroll: ScrollCoordinator::new(&config.scroll),
            seek_threshold_ms: config.sync.seek_threshold_ms,
            cache: None,
            last_tick_ms: None,
            initial_sync: false,
        }
    }

    /// Replace the whole timeline; every cache and per-line state is rebuilt
    pub fn render(&mut self, timeline: Timeline, surface: &mut dyn RenderSurface) {
        self.metrics.invalidate();
        self.scheduler.reset();
        self.scroll.reset();
        surface.apply(SurfaceCommand::Reset);

        let mut lines = timeline.lines;
        let corrected = self.corrector.correct(&mut lines);
        let mut armed = 0;
        for line in lines.iter_mut().filter(|l| l.kind.is_timed()) {
            armed += self.deriver.derive(line, &mut self.metrics);
        }

        for syllable in lines.iter().flat_map(|l| l.syllables.iter()) {
            if !syllable.char_wipes.is_empty() {
                surface.apply(SurfaceCommand::CharWipes {
                    syllable: syllable.id,
                    wipes: syllable.char_wipes.clone(),
                });
            }
        }

        let cache = TimelineCache::new(lines);
        info!(
            lines = cache.len(),
            syllables = cache.syllable_count(),
            corrected,
            pre_highlights = armed,
            "Rendered timeline"
        );
        self.cache = Some(cache);
        self.last_tick_ms = None;
        self.initial_sync = true;
    }

    /// Advance to media time `clock_ms`
    pub fn tick(
        &mut self,
        clock_ms: i64,
        force_resync: bool,
        surface: &mut dyn RenderSurface,
        visibility: &dyn VisibilityIndex,
    ) -> TickReport {
        let Some(cache) = self.cache.as_ref() else {
            return TickReport::default();
        };

        let seek = match self.last_tick_ms {
            Some(last) => {
                let delta = clock_ms - last;
                let jumped = delta < 0 || delta > self.seek_threshold_ms;
                if jumped {
                    debug!(from = last, to = clock_ms, delta_ms = delta, "Seek detected");
                }
                jumped
            }
            None => false,
        };
        self.last_tick_ms = Some(clock_ms);

        let timers = self.scroll.poll_timers(self.wall.now());
        let outcome = self.scheduler.tick(cache, clock_ms, visibility, surface);

        // Returning from manual scrolling lands on the line being sung
        let target = if timers.idle_reverted {
            outcome
                .primary_line
                .or(self.scheduler.state().last_primary_line)
                .or(outcome.scroll_target)
        } else {
            outcome.scroll_target
        };

        let initial = std::mem::take(&mut self.initial_sync);
        let scrolled = self.scroll.sync(
            ScrollSync {
                target,
                order: cache.timed_ids(),
                force: force_resync || seek || initial || timers.needs_resync(),
                seek: seek || initial,
            },
            surface,
            visibility,
        );

        TickReport {
            seek,
            active_lines: self.scheduler.state().active_lines.clone(),
            primary_line: outcome.primary_line,
            scroll_target: outcome.scroll_target,
            scrolled,
        }
    }

    pub fn on_user_scroll(&mut self, delta: f32, surface: &mut dyn RenderSurface) {
        if self.cache.is_none() {
            return;
        }
        self.scroll.on_user_scroll(delta, self.wall.now(), surface);
    }

    pub fn begin_gesture(&mut self) {
        self.scroll.begin_gesture();
    }

    pub fn end_gesture(&mut self) {
        self.scroll.end_gesture(self.wall.now());
    }

    pub fn on_resize(&mut self) {
        self.metrics.invalidate();
        self.scroll.on_resize(self.wall.now());
    }

    /// Stop syncing; ticks are no-ops until the next render
    pub fn teardown(&mut self) {
        self.cache = None;
        self.scheduler.reset();
        self.scroll.reset();
        self.last_tick_ms = None;
        self.initial_sync = false;
        debug!("Engine torn down");
    }

    pub fn is_rendered(&self) -> bool {
        self.cache.is_some()
    }

    pub fn cache(&self) -> Option<&TimelineCache> {
        self.cache.as_ref()
    }

    pub fn scheduler(&self) -> &ActivationScheduler {
        &self.scheduler
    }

    pub fn scroll(&self) -> &ScrollCoordinator {
        &self.scroll
    }

    pub fn metrics_mut(&mut self) -> &mut TextMetrics {
        &mut self.metrics
    }
}
