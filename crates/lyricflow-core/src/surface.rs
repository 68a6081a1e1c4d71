//! Boundary between the engine and whatever draws the lyrics.

use std::collections::HashMap;

use serde::Serialize;

use crate::activation::SyllableState;
use crate::model::{CharWipe, LineId, SyllableId};
use crate::scroll::PositionClass;

/// A single style or animation write issued by the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceCommand {
    /// Drop all per-line state; a new render pass follows
    Reset,
    LineActive {
        line: LineId,
        active: bool,
    },
    SyllableState {
        syllable: SyllableId,
        state: SyllableState,
    },
    /// Start the preview sweep of a syllable after `delay_ms`
    ArmPreHighlight {
        syllable: SyllableId,
        delay_ms: i64,
        duration_ms: i64,
    },
    ClearPreHighlight {
        syllable: SyllableId,
    },
    PositionClass {
        line: LineId,
        class: Option<PositionClass>,
    },
    TransitionDelay {
        line: LineId,
        delay_ms: u32,
    },
    /// Content translation; `instant` skips any animation
    ScrollOffset {
        offset: f32,
        instant: bool,
    },
    FocusedLine {
        line: Option<LineId>,
    },
    CharWipes {
        syllable: SyllableId,
        wipes: Vec<CharWipe>,
    },
}

/// Accepts style/animation writes and answers position queries for scroll math
pub trait RenderSurface {
    fn apply(&mut self, command: SurfaceCommand);

    /// Distance from the content top to the top of `line`
    fn offset_top(&self, line: LineId) -> Option<f32>;

    /// Space kept between the viewport top and the scroll target
    fn scroll_padding_top(&self) -> f32 {
        0.0
    }
}

/// Surface with a fixed line height that records every command
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<SurfaceCommand>,
    positions: HashMap<LineId, usize>,
    line_height: f32,
    padding_top: f32,
}

impl RecordingSurface {
    pub fn new(line_height: f32, padding_top: f32) -> Self {
        Self {
            commands: Vec::new(),
            positions: HashMap::new(),
            line_height,
            padding_top,
        }
    }

    /// Lay the given lines out top to bottom
    pub fn with_layout<I>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = LineId>,
    {
        self.set_layout(lines);
        self
    }

    pub fn set_layout<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = LineId>,
    {
        self.positions = lines.into_iter().enumerate().map(|(i, id)| (id, i)).collect();
    }

    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Take recorded commands, leaving the log empty
    pub fn drain(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Most recent scroll offset write, if any
    pub fn last_offset(&self) -> Option<(f32, bool)> {
        self.commands.iter().rev().find_map(|c| match c {
            SurfaceCommand::ScrollOffset { offset, instant } => Some((*offset, *instant)),
            _ => None,
        })
    }

    /// Transition delays written since the last drain
    pub fn delays(&self) -> Vec<(LineId, u32)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                SurfaceCommand::TransitionDelay { line, delay_ms } => Some((*line, *delay_ms)),
                _ => None,
            })
            .collect()
    }
}

impl RenderSurface for RecordingSurface {
    fn apply(&mut self, command: SurfaceCommand) {
        self.commands.push(command);
    }

    fn offset_top(&self, line: LineId) -> Option<f32> {
        self.positions
            .get(&line)
            .map(|&i| i as f32 * self.line_height)
    }

    fn scroll_padding_top(&self) -> f32 {
        self.padding_top
    }
}
