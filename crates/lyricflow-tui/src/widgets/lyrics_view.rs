use std::time::Instant;

use lyricflow_core::clock::WallClock;
use lyricflow_core::{CharWipe, LineKind, SyllableState};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
    Frame,
};

use crate::app::App;
use crate::layout::{LineLayout, Segment};

/// Scrolling lyrics with per-syllable highlighting
pub struct LyricsViewWidget;

impl LyricsViewWidget {
    pub fn render<W: WallClock + Clone>(frame: &mut Frame, area: Rect, app: &App<W>) {
        Block::default()
            .style(Style::default().bg(app.theme.bg))
            .render(area, frame.buffer_mut());

        let now = app.surface.now();
        let clock_ms = app.position_ms();
        for layout in app.surface.line_layouts() {
            let offset = app.surface.line_offset(layout.id, now).round() as i32;
            let first_row = area.y as i32 + layout.top as i32 + offset;
            if first_row + layout.height() as i32 <= area.y as i32
                || first_row >= area.bottom() as i32
            {
                continue;
            }
            render_line(frame.buffer_mut(), area, first_row, layout, app, clock_ms, now);
        }
    }
}

fn render_line<W: WallClock + Clone>(
    buf: &mut Buffer,
    area: Rect,
    first_row: i32,
    layout: &LineLayout,
    app: &App<W>,
    clock_ms: i64,
    now: Instant,
) {
    let base = line_style(layout, app);
    for (r, row) in layout.rows.iter().enumerate() {
        let y = first_row + r as i32;
        if y < area.y as i32 || y >= area.bottom() as i32 {
            continue;
        }
        let spans: Vec<Span> = row
            .iter()
            .flat_map(|segment| segment_spans(segment, base, app, clock_ms, now))
            .collect();
        let line = Line::from(spans);
        let width = line.width() as u16;
        let x = area.x + area.width.saturating_sub(width) / 2;
        buf.set_line(x, y as u16, &line, area.width);
    }
}

/// Style of a line before any syllable coloring
fn line_style<W: WallClock + Clone>(layout: &LineLayout, app: &App<W>) -> Style {
    let theme = &app.theme;
    let active = app.surface.is_active(layout.id);
    let mut style = match layout.kind {
        LineKind::Gap if active => Style::default().fg(theme.accent),
        LineKind::Gap => Style::default().fg(theme.gap),
        LineKind::Metadata => Style::default()
            .fg(theme.metadata)
            .add_modifier(Modifier::ITALIC),
        _ if active => Style::default().fg(theme.active),
        _ => {
            let near = app
                .surface
                .position_class(layout.id)
                .is_some_and(|c| c.distance().abs() <= 1);
            Style::default().fg(if near { theme.fg } else { theme.dim })
        }
    };
    if app.surface.focused_line() == Some(layout.id) {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}

fn segment_spans<'a, W: WallClock + Clone>(
    segment: &'a Segment,
    base: Style,
    app: &App<W>,
    clock_ms: i64,
    now: Instant,
) -> Vec<Span<'a>> {
    let Some(id) = segment.syllable else {
        return vec![Span::styled(segment.text.as_str(), base)];
    };
    let theme = &app.theme;

    match app.surface.syllable_state(id) {
        SyllableState::Finished => vec![Span::styled(segment.text.as_str(), base.fg(theme.sung))],
        SyllableState::Highlighting => {
            let Some(syllable) = app.engine.cache().and_then(|c| c.syllable(id)) else {
                return vec![Span::styled(segment.text.as_str(), base)];
            };
            let progress = if syllable.duration_ms <= 0 {
                1.0
            } else {
                ((clock_ms - syllable.start_ms) as f64 / syllable.duration_ms as f64).clamp(0.0, 1.0)
            };
            let total = syllable.text.chars().count();
            let lit = lit_char_count(app.surface.char_wipes(id), total, progress);
            split_lit(segment, lit, base.fg(theme.highlight), base)
        }
        SyllableState::Pending => {
            let armed = app
                .surface
                .pre_highlight_progress(id, now)
                .is_some_and(|p| p > 0.0);
            let style = if armed { base.fg(theme.pre_highlight) } else { base };
            vec![Span::styled(segment.text.as_str(), style)]
        }
    }
}

/// Split a segment into its lit prefix and unlit rest
fn split_lit<'a>(segment: &'a Segment, lit_total: usize, lit: Style, unlit: Style) -> Vec<Span<'a>> {
    let len = segment.text.chars().count();
    let lit_here = lit_total.saturating_sub(segment.char_offset).min(len);
    let split = segment
        .text
        .char_indices()
        .nth(lit_here)
        .map_or(segment.text.len(), |(i, _)| i);
    let (head, tail) = segment.text.split_at(split);

    let mut spans = Vec::with_capacity(2);
    if !head.is_empty() {
        spans.push(Span::styled(head, lit));
    }
    if !tail.is_empty() {
        spans.push(Span::styled(tail, unlit));
    }
    spans
}

/// Number of characters lit at `progress` (0..=1) through a syllable.
///
/// With per-character wipes a character counts once half of its wipe has
/// run; otherwise characters light up evenly.
pub fn lit_char_count(wipes: &[CharWipe], char_count: usize, progress: f64) -> usize {
    if wipes.is_empty() {
        return ((progress * char_count as f64).round() as usize).min(char_count);
    }
    // Wipes skip blank characters, so the furthest lit index sets the prefix
    wipes
        .iter()
        .filter(|w| (w.start_fraction + w.duration_fraction / 2.0) as f64 <= progress)
        .map(|w| w.index + 1)
        .max()
        .unwrap_or(0)
        .min(char_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyricflow_core::{AppConfig, Line as LyricLine, LineId, ManualWallClock, Syllable, SyllableId, Timeline};
    use ratatui::{backend::TestBackend, Terminal};

    fn wipe(index: usize, start: f32, duration: f32) -> CharWipe {
        CharWipe {
            index,
            ch: 'a',
            start_fraction: start,
            duration_fraction: duration,
        }
    }

    #[test]
    fn test_lit_char_count_even() {
        assert_eq!(lit_char_count(&[], 4, 0.0), 0);
        assert_eq!(lit_char_count(&[], 4, 0.5), 2);
        assert_eq!(lit_char_count(&[], 4, 1.0), 4);
    }

    #[test]
    fn test_lit_char_count_with_wipes() {
        let wipes = [wipe(0, 0.0, 0.5), wipe(1, 0.25, 0.5), wipe(2, 0.5, 0.5)];
        assert_eq!(lit_char_count(&wipes, 3, 0.2), 0);
        assert_eq!(lit_char_count(&wipes, 3, 0.25), 1);
        assert_eq!(lit_char_count(&wipes, 3, 0.6), 2);
        assert_eq!(lit_char_count(&wipes, 3, 1.0), 3);
    }

    #[test]
    fn test_lit_char_count_covers_blank_characters() {
        // "a b": the space has no wipe of its own
        let wipes = [wipe(0, 0.0, 0.5), wipe(2, 0.5, 0.5)];
        assert_eq!(lit_char_count(&wipes, 3, 0.3), 1);
        assert_eq!(lit_char_count(&wipes, 3, 1.0), 3);

        let segment = Segment {
            syllable: Some(SyllableId(0)),
            text: "a b".to_string(),
            char_offset: 0,
        };
        let spans = split_lit(&segment, lit_char_count(&wipes, 3, 1.0), Style::default(), Style::default());
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "a b");
    }

    #[test]
    fn test_split_lit_respects_char_offset() {
        let segment = Segment {
            syllable: Some(SyllableId(0)),
            text: "lody".to_string(),
            char_offset: 2,
        };
        let spans = split_lit(&segment, 3, Style::default(), Style::default());
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].content, "l");
        assert_eq!(spans[1].content, "ody");

        assert_eq!(split_lit(&segment, 1, Style::default(), Style::default()).len(), 1);
    }

    #[test]
    fn test_renders_centered_lines() {
        let wall = ManualWallClock::new();
        let timeline = Timeline::new(vec![
            LyricLine::new(LineId(0), LineKind::Lyric, 0, 2000, "hello")
                .with_syllables(vec![Syllable::new(SyllableId(0), 0, 2000, "hello")]),
            LyricLine::new(LineId(1), LineKind::Lyric, 2000, 4000, "world")
                .with_syllables(vec![Syllable::new(SyllableId(1), 2000, 2000, "world")]),
        ]);
        let mut app = App::with_wall(AppConfig::default(), timeline, wall);
        app.set_viewport(15, 8);
        app.tick();

        let mut terminal = Terminal::new(TestBackend::new(15, 8)).unwrap();
        terminal
            .draw(|frame| LyricsViewWidget::render(frame, frame.area(), &app))
            .unwrap();

        // Padding of 3 rows puts line 0 on row 3 and line 1 on row 5
        let buffer = terminal.backend().buffer();
        let row = |y: u16| -> String { (0..15).map(|x| buffer[(x, y)].symbol()).collect() };
        assert_eq!(row(3), "     hello     ");
        assert_eq!(row(5), "     world     ");
        assert_eq!(row(0).trim(), "");
    }
}
