//! Per-tick activation decisions.
//!
//! Every tick answers three questions for the current clock time: which lines
//! glow, which line the viewport should follow, and where every visible
//! syllable stands in its `pending -> highlighting -> finished` life cycle.
//! Highlighting and scrolling use different look-aheads: the scroll target is
//! committed earlier so the scroll animation has time to run, while line
//! activation stays tight to the nominal timestamps.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::cache::TimelineCache;
use crate::config::SyncConfig;
use crate::model::{Line, LineId, SyllableId};
use crate::surface::{RenderSurface, SurfaceCommand};
use crate::visibility::VisibilityIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyllableState {
    #[default]
    Pending,
    Highlighting,
    Finished,
}

#[derive(Debug, Clone, Copy, Default)]
struct SyllableRuntime {
    highlighting: bool,
    finished: bool,
    pre_highlighted: bool,
}

impl SyllableRuntime {
    fn state(&self) -> SyllableState {
        if self.finished {
            SyllableState::Finished
        } else if self.highlighting {
            SyllableState::Highlighting
        } else {
            SyllableState::Pending
        }
    }
}

/// Derived per-tick state; never persisted
#[derive(Debug, Clone, Default)]
pub struct ActivationState {
    /// Active lines, most recent start first
    pub active_lines: Vec<LineId>,
    pub highlighted_syllables: HashSet<SyllableId>,
    pub visible_lines: HashSet<LineId>,
    pub primary_line: Option<LineId>,
    /// Last non-empty primary line, kept across instrumental breaks
    pub last_primary_line: Option<LineId>,
    /// Line whose activation started most recently
    pub focused_line: Option<LineId>,
    pub scroll_target: Option<LineId>,
}

/// Result of one scheduler tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivationOutcome {
    pub active_changed: bool,
    pub primary_line: Option<LineId>,
    pub scroll_target: Option<LineId>,
}

struct PreHighlightArm {
    target: SyllableId,
    delay_ms: i64,
    duration_ms: i64,
}

#[derive(Debug, Clone)]
pub struct ActivationScheduler {
    config: SyncConfig,
    runtime: HashMap<SyllableId, SyllableRuntime>,
    activated_at: HashMap<LineId, i64>,
    state: ActivationState,
}

impl ActivationScheduler {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            config: config.clone(),
            runtime: HashMap::new(),
            activated_at: HashMap::new(),
            state: ActivationState::default(),
        }
    }

    /// Forget everything; used on every render pass and teardown
    pub fn reset(&mut self) {
        self.runtime.clear();
        self.activated_at.clear();
        self.state = ActivationState::default();
    }

    pub fn state(&self) -> &ActivationState {
        &self.state
    }

    pub fn syllable_state(&self, id: SyllableId) -> SyllableState {
        self.runtime.get(&id).map(|r| r.state()).unwrap_or_default()
    }

    pub fn is_pre_highlighted(&self, id: SyllableId) -> bool {
        self.runtime.get(&id).is_some_and(|r| r.pre_highlighted)
    }

    /// Lines that should glow at `t`, most recent start first.
    ///
    /// Only visible timed lines are considered and the scan stops after
    /// `max_active_lines` matches.
    pub fn active_lines_at(
        &self,
        cache: &TimelineCache,
        t: i64,
        visibility: &dyn VisibilityIndex,
    ) -> Vec<LineId> {
        let look_ahead = self.config.highlight_look_ahead_ms;
        let limit = self.config.max_active_lines;
        if limit == 0 {
            return Vec::new();
        }

        let mut found: Vec<(usize, &Line)> = Vec::with_capacity(limit);
        for (pos, line) in cache.timed_lines().enumerate() {
            if !visibility.is_visible(line.id) {
                continue;
            }
            if line.start_ms - look_ahead <= t && t < line.end_ms - look_ahead {
                found.push((pos, line));
                if found.len() == limit {
                    break;
                }
            }
        }

        found.sort_by(|(pa, a), (pb, b)| b.start_ms.cmp(&a.start_ms).then(pb.cmp(pa)));
        found.into_iter().map(|(_, line)| line.id).collect()
    }

    /// Line the viewport should follow at `t`.
    ///
    /// Prefers the earliest line containing `t + look-ahead`, then the most
    /// recent line that started before `t - look-ahead`, then the first line.
    pub fn scroll_target_at(&self, cache: &TimelineCache, t: i64) -> Option<LineId> {
        let look_ahead = self.config.scroll_look_ahead_ms;
        let ahead = t + look_ahead;
        let behind = t - look_ahead;

        if let Some(line) = cache.timed_lines().find(|l| l.contains(ahead)) {
            return Some(line.id);
        }
        if let Some(line) = cache.timed_lines().filter(|l| l.start_ms <= behind).last() {
            return Some(line.id);
        }
        cache.timed_lines().next().map(|l| l.id)
    }

    /// Evaluate activation, highlighting and scroll target for time `t`
    pub fn tick(
        &mut self,
        cache: &TimelineCache,
        t: i64,
        visibility: &dyn VisibilityIndex,
        surface: &mut dyn RenderSurface,
    ) -> ActivationOutcome {
        self.state.visible_lines = cache
            .timed_lines()
            .filter(|l| visibility.is_visible(l.id))
            .map(|l| l.id)
            .collect();

        let active_changed = self.update_active_lines(cache, t, visibility, surface);
        self.update_syllables(cache, t, surface);

        self.state.scroll_target = self.scroll_target_at(cache, t);

        ActivationOutcome {
            active_changed,
            primary_line: self.state.primary_line,
            scroll_target: self.state.scroll_target,
        }
    }

    fn update_active_lines(
        &mut self,
        cache: &TimelineCache,
        t: i64,
        visibility: &dyn VisibilityIndex,
        surface: &mut dyn RenderSurface,
    ) -> bool {
        let active = self.active_lines_at(cache, t, visibility);
        let mut changed = false;

        for &old in &self.state.active_lines {
            if !active.contains(&old) {
                self.activated_at.remove(&old);
                surface.apply(SurfaceCommand::LineActive {
                    line: old,
                    active: false,
                });
                changed = true;
            }
        }
        for &new in &active {
            if !self.state.active_lines.contains(&new) {
                self.activated_at.insert(new, t);
                surface.apply(SurfaceCommand::LineActive {
                    line: new,
                    active: true,
                });
                changed = true;
            }
        }

        self.state.primary_line = active.first().copied();
        if self.state.primary_line.is_some() {
            self.state.last_primary_line = self.state.primary_line;
        }

        let focused = active
            .iter()
            .copied()
            .max_by_key(|id| {
                let start = cache.line(*id).map_or(i64::MIN, |l| l.start_ms);
                (self.activated_at.get(id).copied().unwrap_or(i64::MIN), start)
            });
        if focused != self.state.focused_line {
            self.state.focused_line = focused;
            surface.apply(SurfaceCommand::FocusedLine { line: focused });
        }

        if changed {
            trace!(t, active = ?active, "Active lines changed");
        }
        self.state.active_lines = active;
        changed
    }

    fn update_syllables(&mut self, cache: &TimelineCache, t: i64, surface: &mut dyn RenderSurface) {
        let mut arms: Vec<PreHighlightArm> = Vec::new();
        let mut clears: Vec<SyllableId> = Vec::new();

        for line in cache.timed_lines() {
            if !self.state.visible_lines.contains(&line.id) {
                continue;
            }
            for syllable in &line.syllables {
                let rt = self.runtime.entry(syllable.id).or_default();
                let before = rt.state();

                if t < syllable.start_ms {
                    if rt.highlighting || rt.finished {
                        // Rewind
                        rt.highlighting = false;
                        rt.finished = false;
                        clears.push(syllable.id);
                        if let Some(next) = syllable.next_syllable_in_word {
                            clears.push(next);
                        }
                    }
                } else if t < syllable.end_ms() {
                    if rt.finished {
                        rt.finished = false;
                        rt.highlighting = false;
                    }
                    if !rt.highlighting {
                        rt.highlighting = true;
                        clears.push(syllable.id);
                        if let (Some(next), Some(delay), Some(duration)) = (
                            syllable.next_syllable_in_word,
                            syllable.pre_highlight_delay_ms,
                            syllable.pre_highlight_duration_ms,
                        ) {
                            // Late ticks eat into the delay first, then the preview itself
                            let late = t - syllable.start_ms;
                            arms.push(PreHighlightArm {
                                target: next,
                                delay_ms: (delay - late).max(0),
                                duration_ms: (duration - (late - delay).max(0)).max(0),
                            });
                        }
                    }
                } else if !rt.finished {
                    // Also reached directly by seeking past the syllable
                    rt.finished = true;
                    rt.highlighting = false;
                    clears.push(syllable.id);
                }

                let after = rt.state();
                if after == SyllableState::Highlighting {
                    self.state.highlighted_syllables.insert(syllable.id);
                } else {
                    self.state.highlighted_syllables.remove(&syllable.id);
                }
                if after != before {
                    surface.apply(SurfaceCommand::SyllableState {
                        syllable: syllable.id,
                        state: after,
                    });
                }
            }
        }

        for id in clears {
            if let Some(rt) = self.runtime.get_mut(&id) {
                if rt.pre_highlighted {
                    rt.pre_highlighted = false;
                    surface.apply(SurfaceCommand::ClearPreHighlight { syllable: id });
                }
            }
        }

        // Arms are applied after all rewinds so a rewound successor keeps its preview
        for arm in arms {
            let rt = self.runtime.entry(arm.target).or_default();
            if rt.state() != SyllableState::Pending {
                continue;
            }
            rt.pre_highlighted = true;
            surface.apply(SurfaceCommand::ArmPreHighlight {
                syllable: arm.target,
                delay_ms: arm.delay_ms,
                duration_ms: arm.duration_ms,
            });
        }
    }
}
