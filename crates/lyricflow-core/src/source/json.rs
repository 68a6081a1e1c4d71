//! JSON timeline format
//!
//! ```json
//! { "title": "..", "offsetMs": 0,
//!   "lines": [ { "startTimeMs": 1000, "durationMs": 2000, "words": "hello",
//!                "syllables": [ { "startTimeMs": 1000, "durationMs": 800, "text": "hel" } ] } ] }
//! ```

use serde::Deserialize;

use super::{RawLine, RawLyrics, RawSyllable};
use crate::model::LineKind;
use crate::Result;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonLyrics {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    offset_ms: i64,
    #[serde(default)]
    lines: Vec<JsonLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonLine {
    start_time_ms: i64,
    #[serde(default)]
    duration_ms: Option<i64>,
    #[serde(default)]
    words: String,
    #[serde(default)]
    kind: Option<LineKind>,
    #[serde(default)]
    syllables: Vec<JsonSyllable>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonSyllable {
    start_time_ms: i64,
    #[serde(default)]
    duration_ms: Option<i64>,
    text: String,
}

pub fn parse_json(content: &str) -> Result<RawLyrics> {
    let doc: JsonLyrics = serde_json::from_str(content)?;

    let lines = doc
        .lines
        .into_iter()
        .map(|line| {
            let kind = line.kind.unwrap_or(if line.words.trim().is_empty() && line.syllables.is_empty() {
                LineKind::Gap
            } else {
                LineKind::Lyric
            });
            RawLine {
                start_ms: line.start_time_ms,
                duration_ms: line.duration_ms,
                text: line.words,
                kind,
                syllables: line
                    .syllables
                    .into_iter()
                    .map(|s| RawSyllable {
                        start_ms: s.start_time_ms,
                        duration_ms: s.duration_ms,
                        text: s.text,
                    })
                    .collect(),
            }
        })
        .collect();

    Ok(RawLyrics {
        title: doc.title,
        artist: doc.artist,
        offset_ms: doc.offset_ms,
        lines,
    })
}
