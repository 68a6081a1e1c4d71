use serde::{Deserialize, Serialize};

/// Stable line identifier, unique within one render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u32);

/// Stable syllable identifier, unique within one render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyllableId(pub u32);

/// What a line represents on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Sung lyrics
    #[default]
    Lyric,
    /// Instrumental break filler
    Gap,
    /// Credits and other untimed notes
    Metadata,
}

impl LineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lyric => "lyric",
            Self::Gap => "gap",
            Self::Metadata => "metadata",
        }
    }

    /// Whether the line takes part in timing correction, activation and scrolling
    pub fn is_timed(&self) -> bool {
        !matches!(self, Self::Metadata)
    }
}

/// Wipe timing of one character, as fractions of its syllable's duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharWipe {
    /// Character index within the syllable text
    pub index: usize,
    pub ch: char,
    pub start_fraction: f32,
    pub duration_fraction: f32,
}

/// Smallest timed unit of text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Syllable {
    pub id: SyllableId,
    pub start_ms: i64,
    pub duration_ms: i64,
    pub text: String,
    /// Total duration of the word this syllable belongs to
    #[serde(default)]
    pub word_duration_ms: Option<i64>,
    /// Following syllable of the same word (non-owning)
    #[serde(default)]
    pub next_syllable_in_word: Option<SyllableId>,
    #[serde(default)]
    pub pre_highlight_duration_ms: Option<i64>,
    #[serde(default)]
    pub pre_highlight_delay_ms: Option<i64>,
    /// Per-character wipe timing, only filled for growable words
    #[serde(default)]
    pub char_wipes: Vec<CharWipe>,
}

impl Syllable {
    pub fn new(id: SyllableId, start_ms: i64, duration_ms: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            start_ms,
            duration_ms: duration_ms.max(0),
            text: text.into(),
            word_duration_ms: None,
            next_syllable_in_word: None,
            pre_highlight_duration_ms: None,
            pre_highlight_delay_ms: None,
            char_wipes: Vec::new(),
        }
    }

    #[inline]
    pub fn end_ms(&self) -> i64 {
        self.start_ms + self.duration_ms
    }

    /// A syllable ending in whitespace closes its word
    pub fn ends_word(&self) -> bool {
        self.text.chars().last().map_or(true, char::is_whitespace)
    }

    pub fn has_pre_highlight(&self) -> bool {
        self.next_syllable_in_word.is_some() && self.pre_highlight_delay_ms.is_some()
    }
}

/// One timed lyric row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    pub kind: LineKind,
    pub start_ms: i64,
    /// Corrected end
    pub end_ms: i64,
    /// End as delivered by the source, before correction
    pub actual_end_ms: i64,
    pub text: String,
    pub syllables: Vec<Syllable>,
}

impl Line {
    pub fn new(id: LineId, kind: LineKind, start_ms: i64, end_ms: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            start_ms,
            end_ms,
            actual_end_ms: end_ms,
            text: text.into(),
            syllables: Vec::new(),
        }
    }

    pub fn with_syllables(mut self, syllables: Vec<Syllable>) -> Self {
        self.syllables = syllables;
        self
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// Half-open containment against the corrected window
    #[inline]
    pub fn contains(&self, t: i64) -> bool {
        self.start_ms <= t && t < self.end_ms
    }
}

/// Full set of lines for one song
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timeline {
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Global shift already applied to every timestamp
    #[serde(default)]
    pub offset_ms: i64,
    pub lines: Vec<Line>,
}

impl Timeline {
    pub fn new(lines: Vec<Line>) -> Self {
        Self {
            title: None,
            artist: None,
            offset_ms: 0,
            lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn timed_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|l| l.kind.is_timed())
    }

    /// End of the last timed line
    pub fn duration_ms(&self) -> i64 {
        self.timed_lines().map(|l| l.end_ms).max().unwrap_or(0)
    }

    pub fn syllable_count(&self) -> usize {
        self.lines.iter().map(|l| l.syllables.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syllable_end_and_word_boundary() {
        let s = Syllable::new(SyllableId(0), 1000, 500, "hel");
        assert_eq!(s.end_ms(), 1500);
        assert!(!s.ends_word());

        let s = Syllable::new(SyllableId(1), 1500, 200, "lo ");
        assert!(s.ends_word());
    }

    #[test]
    fn test_negative_duration_is_clamped() {
        let s = Syllable::new(SyllableId(0), 1000, -20, "x");
        assert_eq!(s.duration_ms, 0);
        assert_eq!(s.end_ms(), 1000);
    }

    #[test]
    fn test_line_contains_is_half_open() {
        let line = Line::new(LineId(0), LineKind::Lyric, 100, 200, "a");
        assert!(line.contains(100));
        assert!(line.contains(199));
        assert!(!line.contains(200));
        assert!(!line.contains(99));
    }

    #[test]
    fn test_timeline_duration_ignores_metadata() {
        let timeline = Timeline::new(vec![
            Line::new(LineId(0), LineKind::Lyric, 0, 3000, "a"),
            Line::new(LineId(1), LineKind::Metadata, 0, 9000, "credits"),
        ]);
        assert_eq!(timeline.duration_ms(), 3000);
    }
}
