//! Which lines are inside (or close to) the viewport.

use std::collections::HashSet;

use crate::model::LineId;

/// Reports whether a line is currently within the visible window
pub trait VisibilityIndex {
    fn is_visible(&self, line: LineId) -> bool;
}

/// Treats every line as visible (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct AllVisible;

impl VisibilityIndex for AllVisible {
    fn is_visible(&self, _line: LineId) -> bool {
        true
    }
}

/// Vertical extent of a rendered line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineExtent {
    pub line: LineId,
    pub top: f32,
    pub height: f32,
}

/// Visibility computed from line extents and a scrolled viewport.
///
/// The margin widens the window on both sides so lines slightly outside the
/// viewport still count as visible.
#[derive(Debug, Clone, Default)]
pub struct ViewportIndex {
    visible: HashSet<LineId>,
    margin: f32,
}

impl ViewportIndex {
    pub fn new(margin: f32) -> Self {
        Self {
            visible: HashSet::new(),
            margin: margin.max(0.0),
        }
    }

    /// Recompute the visible set.
    ///
    /// `scroll_offset` is the translation applied to the content (negative
    /// when scrolled down), matching the offsets produced by the scroll
    /// coordinator.
    pub fn update<I>(&mut self, extents: I, scroll_offset: f32, viewport_height: f32)
    where
        I: IntoIterator<Item = LineExtent>,
    {
        self.visible.clear();
        let window_top = -scroll_offset - self.margin;
        let window_bottom = -scroll_offset + viewport_height + self.margin;
        for extent in extents {
            let bottom = extent.top + extent.height;
            if bottom > window_top && extent.top < window_bottom {
                self.visible.insert(extent.line);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}

impl VisibilityIndex for ViewportIndex {
    fn is_visible(&self, line: LineId) -> bool {
        self.visible.contains(&line)
    }
}

impl VisibilityIndex for HashSet<LineId> {
    fn is_visible(&self, line: LineId) -> bool {
        self.contains(&line)
    }
}
