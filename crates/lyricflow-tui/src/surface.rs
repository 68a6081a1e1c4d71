//! Terminal implementation of the engine's render surface.
//!
//! Keeps the latest style state written by the engine (active lines,
//! syllable states, armed pre-highlights, position classes) and turns scroll
//! offsets into per-line row offsets through the staggered animator. The
//! lyrics widget reads this state every frame.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use lyricflow_core::clock::{SystemWallClock, WallClock};
use lyricflow_core::{
    CharWipe, Line, LineExtent, LineId, PositionClass, RenderSurface, ScrollConfig, SurfaceCommand,
    SyllableId, SyllableState,
};
use tracing::trace;

use crate::layout::{layout_lines, LineLayout};
use crate::scroll::timing::progress_at;
use crate::scroll::StaggeredAnimator;

/// Pre-highlight armed on a syllable
#[derive(Debug, Clone, Copy, PartialEq)]
struct ArmedPreHighlight {
    armed_at: Instant,
    delay: Duration,
    duration: Duration,
}

pub struct TerminalSurface<W: WallClock = SystemWallClock> {
    wall: W,
    width: u16,
    padding_rows: u16,
    layouts: Vec<LineLayout>,
    index: HashMap<LineId, usize>,
    order: Vec<LineId>,
    active: HashSet<LineId>,
    focused: Option<LineId>,
    syllables: HashMap<SyllableId, SyllableState>,
    pre_highlights: HashMap<SyllableId, ArmedPreHighlight>,
    classes: HashMap<LineId, PositionClass>,
    wipes: HashMap<SyllableId, Vec<CharWipe>>,
    animator: StaggeredAnimator,
}

impl TerminalSurface<SystemWallClock> {
    pub fn system(config: &ScrollConfig, padding_rows: u16) -> Self {
        Self::new(SystemWallClock, config, padding_rows)
    }
}

impl<W: WallClock> TerminalSurface<W> {
    pub fn new(wall: W, config: &ScrollConfig, padding_rows: u16) -> Self {
        Self {
            wall,
            width: 0,
            padding_rows,
            layouts: Vec::new(),
            index: HashMap::new(),
            order: Vec::new(),
            active: HashSet::new(),
            focused: None,
            syllables: HashMap::new(),
            pre_highlights: HashMap::new(),
            classes: HashMap::new(),
            wipes: HashMap::new(),
            animator: StaggeredAnimator::new(config.clone()),
        }
    }

    /// Recompute row positions for `lines` at `width` columns
    pub fn layout(&mut self, lines: &[Line], width: u16) {
        self.width = width;
        self.layouts = layout_lines(lines, width);
        self.index = self
            .layouts
            .iter()
            .enumerate()
            .map(|(i, l)| (l.id, i))
            .collect();
        self.order = self.layouts.iter().map(|l| l.id).collect();
        trace!(lines = self.layouts.len(), width, "Laid out lyrics");
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn line_layouts(&self) -> &[LineLayout] {
        &self.layouts
    }

    pub fn content_height(&self) -> u16 {
        self.layouts
            .last()
            .map_or(0, |l| l.top.saturating_add(l.height()))
    }

    /// Row extents for the visibility index
    pub fn extents(&self) -> Vec<LineExtent> {
        self.layouts
            .iter()
            .map(|l| LineExtent {
                line: l.id,
                top: l.top as f32,
                height: l.height() as f32,
            })
            .collect()
    }

    /// Current (possibly mid-animation) offset of a line in rows
    pub fn line_offset(&self, line: LineId, now: Instant) -> f32 {
        self.animator.offset_at(line, now)
    }

    /// Offset every line converges to
    pub fn target_offset(&self) -> f32 {
        self.animator.target()
    }

    /// Advance animations; true while anything is still moving
    pub fn update_animation(&mut self, now: Instant) -> bool {
        self.animator.update(now)
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn is_active(&self, line: LineId) -> bool {
        self.active.contains(&line)
    }

    pub fn focused_line(&self) -> Option<LineId> {
        self.focused
    }

    pub fn syllable_state(&self, id: SyllableId) -> SyllableState {
        self.syllables.get(&id).copied().unwrap_or_default()
    }

    pub fn position_class(&self, line: LineId) -> Option<PositionClass> {
        self.classes.get(&line).copied()
    }

    pub fn char_wipes(&self, id: SyllableId) -> &[CharWipe] {
        self.wipes.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Progress of an armed pre-highlight, `None` when none is armed.
    ///
    /// Zero until the arming delay has elapsed.
    pub fn pre_highlight_progress(&self, id: SyllableId, now: Instant) -> Option<f64> {
        self.pre_highlights
            .get(&id)
            .map(|p| progress_at(p.armed_at + p.delay, now, p.duration))
    }

    pub fn now(&self) -> Instant {
        self.wall.now()
    }
}

impl<W: WallClock> RenderSurface for TerminalSurface<W> {
    fn apply(&mut self, command: SurfaceCommand) {
        match command {
            SurfaceCommand::Reset => {
                self.active.clear();
                self.focused = None;
                self.syllables.clear();
                self.pre_highlights.clear();
                self.classes.clear();
                self.wipes.clear();
                self.animator.reset();
            }
            SurfaceCommand::LineActive { line, active } => {
                if active {
                    self.active.insert(line);
                } else {
                    self.active.remove(&line);
                }
            }
            SurfaceCommand::SyllableState { syllable, state } => {
                self.syllables.insert(syllable, state);
            }
            SurfaceCommand::ArmPreHighlight {
                syllable,
                delay_ms,
                duration_ms,
            } => {
                self.pre_highlights.insert(
                    syllable,
                    ArmedPreHighlight {
                        armed_at: self.wall.now(),
                        delay: Duration::from_millis(delay_ms.max(0) as u64),
                        duration: Duration::from_millis(duration_ms.max(0) as u64),
                    },
                );
            }
            SurfaceCommand::ClearPreHighlight { syllable } => {
                self.pre_highlights.remove(&syllable);
            }
            SurfaceCommand::PositionClass { line, class } => match class {
                Some(class) => {
                    self.classes.insert(line, class);
                }
                None => {
                    self.classes.remove(&line);
                }
            },
            SurfaceCommand::TransitionDelay { line, delay_ms } => {
                self.animator.set_delay(line, delay_ms);
            }
            SurfaceCommand::ScrollOffset { offset, instant } => {
                let now = self.wall.now();
                self.animator.scroll_to(offset, instant, now, &self.order);
            }
            SurfaceCommand::FocusedLine { line } => {
                self.focused = line;
            }
            SurfaceCommand::CharWipes { syllable, wipes } => {
                self.wipes.insert(syllable, wipes);
            }
        }
    }

    fn offset_top(&self, line: LineId) -> Option<f32> {
        self.index.get(&line).map(|&i| self.layouts[i].top as f32)
    }

    fn scroll_padding_top(&self) -> f32 {
        self.padding_rows as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyricflow_core::{LineKind, ManualWallClock, Syllable};

    fn lines() -> Vec<Line> {
        (0..4)
            .map(|i| {
                Line::new(LineId(i), LineKind::Lyric, 0, 1000, "la la")
                    .with_syllables(vec![Syllable::new(SyllableId(i), 0, 1000, "la la")])
            })
            .collect()
    }

    fn surface() -> (TerminalSurface<ManualWallClock>, ManualWallClock) {
        let wall = ManualWallClock::new();
        let mut surface = TerminalSurface::new(wall.clone(), &ScrollConfig::default(), 3);
        surface.layout(&lines(), 20);
        (surface, wall)
    }

    #[test]
    fn test_layout_queries() {
        let (surface, _) = surface();
        assert_eq!(surface.offset_top(LineId(2)), Some(4.0));
        assert_eq!(surface.scroll_padding_top(), 3.0);
        assert_eq!(surface.content_height(), 7);
        assert_eq!(surface.extents()[3].top, 6.0);
    }

    #[test]
    fn test_commands_update_state() {
        let (mut surface, _) = surface();
        surface.apply(SurfaceCommand::LineActive {
            line: LineId(1),
            active: true,
        });
        surface.apply(SurfaceCommand::SyllableState {
            syllable: SyllableId(1),
            state: SyllableState::Highlighting,
        });
        surface.apply(SurfaceCommand::PositionClass {
            line: LineId(1),
            class: Some(PositionClass::Current),
        });
        assert!(surface.is_active(LineId(1)));
        assert_eq!(surface.syllable_state(SyllableId(1)), SyllableState::Highlighting);
        assert_eq!(surface.position_class(LineId(1)), Some(PositionClass::Current));

        surface.apply(SurfaceCommand::Reset);
        assert!(!surface.is_active(LineId(1)));
        assert_eq!(surface.syllable_state(SyllableId(1)), SyllableState::Pending);
    }

    #[test]
    fn test_pre_highlight_progress_follows_wall_clock() {
        let (mut surface, wall) = surface();
        surface.apply(SurfaceCommand::ArmPreHighlight {
            syllable: SyllableId(2),
            delay_ms: 100,
            duration_ms: 200,
        });

        assert_eq!(surface.pre_highlight_progress(SyllableId(2), wall.now()), Some(0.0));
        wall.advance_ms(200);
        let p = surface.pre_highlight_progress(SyllableId(2), wall.now()).unwrap();
        assert!((p - 0.5).abs() < 1e-9);

        surface.apply(SurfaceCommand::ClearPreHighlight {
            syllable: SyllableId(2),
        });
        assert_eq!(surface.pre_highlight_progress(SyllableId(2), wall.now()), None);
    }

    #[test]
    fn test_scroll_offsets_animate_with_delays() {
        let (mut surface, wall) = surface();
        surface.apply(SurfaceCommand::TransitionDelay {
            line: LineId(3),
            delay_ms: 60,
        });
        surface.apply(SurfaceCommand::ScrollOffset {
            offset: -4.0,
            instant: false,
        });
        assert!(surface.is_animating());
        wall.advance_ms(30);
        let now = wall.now();
        assert!(surface.line_offset(LineId(0), now) < 0.0);
        assert_eq!(surface.line_offset(LineId(3), now), 0.0);

        surface.apply(SurfaceCommand::ScrollOffset {
            offset: -8.0,
            instant: true,
        });
        assert!(!surface.is_animating());
        assert_eq!(surface.line_offset(LineId(3), wall.now()), -8.0);
    }
}
