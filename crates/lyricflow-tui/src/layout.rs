//! Row layout of lyric lines for a given terminal width.

use lyricflow_core::{Line, LineId, LineKind, SyllableId};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Blank rows between two lyric lines
pub const LINE_SPACING: u16 = 1;

/// Placeholder drawn for instrumental breaks
pub const GAP_MARKER: &str = "♪ ♪ ♪";

/// A run of text on one row, owned by a syllable when it is sung
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub syllable: Option<SyllableId>,
    pub text: String,
    /// Character index of the first char of `text` within its syllable
    pub char_offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    pub id: LineId,
    pub kind: LineKind,
    /// First row of the line in content coordinates
    pub top: u16,
    pub rows: Vec<Vec<Segment>>,
}

impl LineLayout {
    pub fn height(&self) -> u16 {
        self.rows.len() as u16
    }
}

/// Wrap every line to `width` columns and stack them top to bottom
pub fn layout_lines(lines: &[Line], width: u16) -> Vec<LineLayout> {
    let width = width.max(1) as usize;
    let mut top: u16 = 0;
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        let rows = match line.kind {
            LineKind::Gap => vec![vec![Segment {
                syllable: None,
                text: GAP_MARKER.to_string(),
                char_offset: 0,
            }]],
            _ if line.syllables.is_empty() => {
                wrap_pieces(line.text.split_inclusive(' ').map(|w| (None, w)), width)
            }
            _ => wrap_pieces(
                line.syllables.iter().map(|s| (Some(s.id), s.text.as_str())),
                width,
            ),
        };
        let layout = LineLayout {
            id: line.id,
            kind: line.kind,
            top,
            rows,
        };
        top = top.saturating_add(layout.height() + LINE_SPACING);
        out.push(layout);
    }
    out
}

/// Greedy wrap keeping each piece whole unless it is wider than a row
fn wrap_pieces<'a, I>(pieces: I, width: usize) -> Vec<Vec<Segment>>
where
    I: IntoIterator<Item = (Option<SyllableId>, &'a str)>,
{
    let mut rows: Vec<Vec<Segment>> = vec![Vec::new()];
    let mut used = 0usize;

    for (syllable, text) in pieces {
        let piece_width = text.width();
        if used > 0 && used + piece_width > width {
            rows.push(Vec::new());
            used = 0;
        }

        if piece_width <= width - used {
            if let Some(row) = rows.last_mut() {
                row.push(Segment {
                    syllable,
                    text: text.to_string(),
                    char_offset: 0,
                });
            }
            used += piece_width;
            continue;
        }

        // Wider than a full row: break by characters
        let mut chunk = String::new();
        let mut chunk_start = 0;
        for (i, ch) in text.chars().enumerate() {
            let w = ch.width().unwrap_or(0);
            if used + w > width && !chunk.is_empty() {
                if let Some(row) = rows.last_mut() {
                    row.push(Segment {
                        syllable,
                        text: std::mem::take(&mut chunk),
                        char_offset: chunk_start,
                    });
                }
                rows.push(Vec::new());
                used = 0;
                chunk_start = i;
            }
            chunk.push(ch);
            used += w;
        }
        if !chunk.is_empty() {
            if let Some(row) = rows.last_mut() {
                row.push(Segment {
                    syllable,
                    text: chunk,
                    char_offset: chunk_start,
                });
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyricflow_core::Syllable;

    fn sung(id: u32, parts: &[&str]) -> Line {
        let text: String = parts.concat();
        Line::new(LineId(id), LineKind::Lyric, 0, 1000, text).with_syllables(
            parts
                .iter()
                .enumerate()
                .map(|(i, p)| Syllable::new(SyllableId(id * 100 + i as u32), 0, 100, *p))
                .collect(),
        )
    }

    #[test]
    fn test_lines_stack_with_spacing() {
        let lines = vec![
            sung(0, &["one ", "two"]),
            Line::new(LineId(1), LineKind::Gap, 1000, 2000, ""),
            sung(2, &["three"]),
        ];
        let layout = layout_lines(&lines, 40);
        let tops: Vec<u16> = layout.iter().map(|l| l.top).collect();
        assert_eq!(tops, vec![0, 2, 4]);
        assert_eq!(layout[1].rows[0][0].text, GAP_MARKER);
    }

    #[test]
    fn test_wraps_at_syllable_boundaries() {
        let layout = layout_lines(&[sung(0, &["hello ", "wide ", "world"])], 11);
        let rows: Vec<String> = layout[0]
            .rows
            .iter()
            .map(|r| r.iter().map(|s| s.text.as_str()).collect())
            .collect();
        assert_eq!(rows, vec!["hello wide ", "world"]);
        assert_eq!(layout[0].height(), 2);
    }

    #[test]
    fn test_overlong_syllable_is_split() {
        let layout = layout_lines(&[sung(0, &["abcdefgh"])], 3);
        let rows: Vec<(String, usize)> = layout[0]
            .rows
            .iter()
            .map(|r| (r[0].text.clone(), r[0].char_offset))
            .collect();
        assert_eq!(
            rows,
            vec![("abc".into(), 0), ("def".into(), 3), ("gh".into(), 6)]
        );
    }
}
