//! Loading lyrics files into a [`Timeline`].
//!
//! Parsers produce format-neutral [`RawLyrics`]; [`TimelineBuilder`] turns
//! those into lines with stable ids, resolved end times and explicit gap
//! lines for long instrumental breaks.

pub mod json;
pub mod lrc;

use std::path::Path;

use tracing::{debug, info};

use crate::config::TimingConfig;
use crate::model::{Line, LineId, LineKind, Syllable, SyllableId, Timeline};
use crate::{Error, Result};

pub use json::parse_json;
pub use lrc::LrcParser;

/// Syllable as read from a source file
#[derive(Debug, Clone, PartialEq)]
pub struct RawSyllable {
    pub start_ms: i64,
    /// Unknown for the last syllable of enhanced LRC lines
    pub duration_ms: Option<i64>,
    pub text: String,
}

/// Line as read from a source file
#[derive(Debug, Clone, PartialEq)]
pub struct RawLine {
    pub start_ms: i64,
    /// Unknown for formats that only mark line starts
    pub duration_ms: Option<i64>,
    pub text: String,
    pub kind: LineKind,
    pub syllables: Vec<RawSyllable>,
}

impl RawLine {
    pub fn lyric(start_ms: i64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            duration_ms: None,
            text: text.into(),
            kind: LineKind::Lyric,
            syllables: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLyrics {
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Positive values make lyrics appear earlier
    pub offset_ms: i64,
    pub lines: Vec<RawLine>,
}

/// Supported lyrics file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Lrc,
}

impl SourceFormat {
    /// Format from a file extension; files without one are sniffed later
    pub fn from_path(path: &Path) -> Result<Option<Self>> {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Ok(None);
        };
        match ext.to_ascii_lowercase().as_str() {
            "json" => Ok(Some(Self::Json)),
            "lrc" => Ok(Some(Self::Lrc)),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }

    /// Guess the format from file content
    pub fn sniff(content: &str) -> Self {
        if content.trim_start().starts_with('{') {
            Self::Json
        } else {
            Self::Lrc
        }
    }
}

/// Turns parsed raw lyrics into a timeline
#[derive(Debug, Clone)]
pub struct TimelineBuilder {
    config: TimingConfig,
}

impl TimelineBuilder {
    pub fn new(config: &TimingConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn build(&self, raw: RawLyrics) -> Timeline {
        let offset = raw.offset_ms;
        let mut timed: Vec<RawLine> = Vec::with_capacity(raw.lines.len());
        let mut untimed: Vec<RawLine> = Vec::new();
        for line in raw.lines {
            if line.kind == LineKind::Metadata {
                untimed.push(line);
            } else {
                timed.push(line);
            }
        }
        // Ends are inferred from the following line
        timed.sort_by_key(|l| l.start_ms);

        let starts: Vec<i64> = timed.iter().map(|l| (l.start_ms - offset).max(0)).collect();
        let mut lines: Vec<Line> = Vec::with_capacity(timed.len() + untimed.len());
        let mut next_line = 0u32;
        let mut next_syllable = 0u32;
        let mut prev_end: i64 = 0;

        for (i, raw_line) in timed.into_iter().enumerate() {
            let start = starts[i];
            let end = match raw_line.duration_ms {
                Some(duration) => start + duration.max(0),
                None => starts
                    .get(i + 1)
                    .copied()
                    .unwrap_or(start + self.config.last_line_duration_ms)
                    .max(start),
            };

            if raw_line.kind == LineKind::Lyric && self.needs_gap(prev_end, start) {
                lines.push(Line::new(LineId(next_line), LineKind::Gap, prev_end, start, ""));
                next_line += 1;
            }

            let syllables = if raw_line.kind == LineKind::Gap {
                Vec::new()
            } else if raw_line.syllables.is_empty() {
                let id = SyllableId(next_syllable);
                next_syllable += 1;
                vec![Syllable::new(id, start, end - start, raw_line.text.clone())]
            } else {
                let count = raw_line.syllables.len();
                let mut out = Vec::with_capacity(count);
                for (k, s) in raw_line.syllables.iter().enumerate() {
                    let s_start = (s.start_ms - offset).max(0);
                    let duration = match s.duration_ms {
                        Some(d) => d,
                        None => raw_line
                            .syllables
                            .get(k + 1)
                            .map(|n| (n.start_ms - offset).max(0))
                            .unwrap_or(end)
                            - s_start,
                    };
                    out.push(Syllable::new(SyllableId(next_syllable), s_start, duration, s.text.clone()));
                    next_syllable += 1;
                }
                out
            };

            lines.push(
                Line::new(LineId(next_line), raw_line.kind, start, end, raw_line.text)
                    .with_syllables(syllables),
            );
            next_line += 1;
            prev_end = prev_end.max(end);
        }

        for raw_line in untimed {
            lines.push(Line::new(LineId(next_line), LineKind::Metadata, 0, 0, raw_line.text));
            next_line += 1;
        }

        let timeline = Timeline {
            title: raw.title,
            artist: raw.artist,
            offset_ms: offset,
            lines,
        };
        debug!(
            lines = timeline.lines.len(),
            syllables = timeline.syllable_count(),
            "Built timeline"
        );
        timeline
    }

    fn needs_gap(&self, prev_end: i64, next_start: i64) -> bool {
        self.config.gap_line_min_ms > 0 && next_start - prev_end >= self.config.gap_line_min_ms
    }
}

/// Parse lyrics text in the given format
pub fn parse_str(content: &str, format: SourceFormat, config: &TimingConfig) -> Result<Timeline> {
    let raw = match format {
        SourceFormat::Json => parse_json(content)?,
        SourceFormat::Lrc => LrcParser::new()?.parse(content)?,
    };
    Ok(TimelineBuilder::new(config).build(raw))
}

/// Load a lyrics file, picking the parser from its extension or content
pub fn load_timeline(path: &Path, config: &TimingConfig) -> Result<Timeline> {
    let content = std::fs::read_to_string(path)?;
    parse_source(path, &content, config)
}

/// Parse the already-read content of the lyrics file at `path`
pub fn parse_source(path: &Path, content: &str, config: &TimingConfig) -> Result<Timeline> {
    let format = match SourceFormat::from_path(path)? {
        Some(format) => format,
        None => SourceFormat::sniff(content),
    };
    let timeline = parse_str(content, format, config)?;
    if timeline.timed_lines().next().is_none() {
        return Err(Error::EmptyTimeline);
    }
    info!(
        path = %path.display(),
        format = ?format,
        lines = timeline.lines.len(),
        "Loaded lyrics"
    );
    Ok(timeline)
}
