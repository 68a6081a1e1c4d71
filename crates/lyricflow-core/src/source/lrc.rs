//! LRC parser with enhanced (per-word) timestamps.

use regex::{Captures, Regex};
use tracing::{debug, trace};

use super::{RawLine, RawLyrics, RawSyllable};
use crate::model::LineKind;
use crate::{Error, Result};

pub struct LrcParser {
    time_tag: Regex,
    word_tag: Regex,
    meta_tag: Regex,
}

impl LrcParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            time_tag: Regex::new(r"^\[(\d{1,3}):(\d{1,2})(?:[.:](\d{1,3}))?\]")?,
            word_tag: Regex::new(r"<(\d{1,3}):(\d{1,2})(?:[.:](\d{1,3}))?>")?,
            meta_tag: Regex::new(r"^\[([A-Za-z]+):(.*)\]$")?,
        })
    }

    pub fn parse(&self, content: &str) -> Result<RawLyrics> {
        let mut lyrics = RawLyrics::default();
        let mut credits: Vec<RawLine> = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let text = raw.trim();
            if text.is_empty() {
                continue;
            }

            if text.starts_with('[') && text[1..].starts_with(|c: char| c.is_ascii_digit()) {
                let mut rest = text;
                let mut times = Vec::new();
                while let Some(caps) = self.time_tag.captures(rest) {
                    times.push(parse_time(&caps, line_no)?);
                    rest = &rest[caps.get(0).map_or(0, |m| m.end())..];
                }
                if times.is_empty() {
                    return Err(Error::parse(line_no, format!("malformed time tag in '{text}'")));
                }
                let body = rest.trim();
                for start in times {
                    lyrics.lines.push(self.parse_body(start, body, line_no)?);
                }
            } else if let Some(caps) = self.meta_tag.captures(text) {
                let key = caps[1].to_ascii_lowercase();
                let value = caps[2].trim().to_string();
                match key.as_str() {
                    "ti" => lyrics.title = Some(value),
                    "ar" => lyrics.artist = Some(value),
                    "offset" => {
                        lyrics.offset_ms = value.parse().map_err(|_| {
                            Error::parse(line_no, format!("invalid offset '{value}'"))
                        })?;
                    }
                    "au" => credits.push(metadata_line(format!("Written by {value}"))),
                    "by" => credits.push(metadata_line(format!("Lyrics by {value}"))),
                    _ => trace!(tag = %key, "Ignoring LRC tag"),
                }
            } else {
                debug!(line = line_no, "Skipping untagged LRC line");
            }
        }

        lyrics.lines.sort_by_key(|l| l.start_ms);
        lyrics.lines.extend(credits);
        Ok(lyrics)
    }

    fn parse_body(&self, start_ms: i64, body: &str, line_no: usize) -> Result<RawLine> {
        let tags: Vec<(usize, usize, i64)> = self
            .word_tag
            .captures_iter(body)
            .map(|caps| {
                let m = caps.get(0).map_or((0, 0), |m| (m.start(), m.end()));
                parse_time(&caps, line_no).map(|t| (m.0, m.1, t))
            })
            .collect::<Result<_>>()?;

        if tags.is_empty() {
            let mut line = RawLine::lyric(start_ms, body);
            if body.is_empty() {
                line.kind = LineKind::Gap;
            }
            return Ok(line);
        }

        let mut syllables: Vec<RawSyllable> = Vec::with_capacity(tags.len());
        let prefix = &body[..tags[0].0];
        if !prefix.trim().is_empty() {
            syllables.push(RawSyllable {
                start_ms,
                duration_ms: None,
                text: prefix.to_string(),
            });
        }

        for (i, &(_, end, time)) in tags.iter().enumerate() {
            let next_start = tags.get(i + 1).map_or(body.len(), |t| t.0);
            let text = &body[end..next_start];
            if text.is_empty() {
                // End marker for the previous word
                if let Some(prev) = syllables.last_mut() {
                    prev.duration_ms = Some((time - prev.start_ms).max(0));
                }
                continue;
            }
            syllables.push(RawSyllable {
                start_ms: time,
                duration_ms: None,
                text: text.to_string(),
            });
        }

        let mut line = RawLine::lyric(start_ms, self.word_tag.replace_all(body, "").trim());
        line.syllables = syllables;
        Ok(line)
    }
}

fn metadata_line(text: String) -> RawLine {
    let mut line = RawLine::lyric(0, text);
    line.kind = LineKind::Metadata;
    line
}

fn parse_time(caps: &Captures<'_>, line_no: usize) -> Result<i64> {
    let number = |i: usize| -> Result<i64> {
        caps[i]
            .parse::<i64>()
            .map_err(|e| Error::parse(line_no, format!("invalid timestamp: {e}")))
    };
    let minutes = number(1)?;
    let seconds = number(2)?;
    if seconds >= 60 {
        return Err(Error::parse(line_no, format!("seconds out of range: {seconds}")));
    }
    let fraction = match caps.get(3) {
        Some(m) => {
            let digits = m.as_str();
            let value = number(3)?;
            value * 10_i64.pow(3 - digits.len() as u32)
        }
        None => 0,
    };
    Ok(minutes * 60_000 + seconds * 1000 + fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<RawLyrics> {
        LrcParser::new().unwrap().parse(content)
    }

    #[test]
    fn test_simple_lines_and_tags() {
        let raw = parse("[ti:Title]\n[ar:Artist]\n[offset:250]\n[00:12.34]first\n[01:02.5]second\n").unwrap();
        assert_eq!(raw.title.as_deref(), Some("Title"));
        assert_eq!(raw.artist.as_deref(), Some("Artist"));
        assert_eq!(raw.offset_ms, 250);
        assert_eq!(raw.lines[0].start_ms, 12_340);
        assert_eq!(raw.lines[1].start_ms, 62_500);
        assert_eq!(raw.lines[1].text, "second");
    }

    #[test]
    fn test_repeated_time_tags_are_sorted() {
        let raw = parse("[00:30.00][00:10.00]chorus\n[00:20.000]verse").unwrap();
        let starts: Vec<i64> = raw.lines.iter().map(|l| l.start_ms).collect();
        assert_eq!(starts, vec![10_000, 20_000, 30_000]);
        assert_eq!(raw.lines[0].text, "chorus");
    }

    #[test]
    fn test_enhanced_word_timestamps() {
        let raw = parse("[00:01.00]<00:01.00>hel<00:01.50>lo <00:02.00>world<00:03.00>").unwrap();
        let line = &raw.lines[0];
        assert_eq!(line.text, "hello world");
        let syllables: Vec<(&str, i64, Option<i64>)> = line
            .syllables
            .iter()
            .map(|s| (s.text.as_str(), s.start_ms, s.duration_ms))
            .collect();
        assert_eq!(
            syllables,
            vec![("hel", 1000, None), ("lo ", 1500, None), ("world", 2000, Some(1000))]
        );
    }

    #[test]
    fn test_empty_line_is_gap_and_credits_trail() {
        let raw = parse("[au:Someone]\n[00:01.00]sing\n[00:04.00]\n[00:09.00]again").unwrap();
        let kinds: Vec<LineKind> = raw.lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![LineKind::Lyric, LineKind::Gap, LineKind::Lyric, LineKind::Metadata]
        );
        assert_eq!(raw.lines[3].text, "Written by Someone");
    }

    #[test]
    fn test_malformed_timestamps() {
        assert!(matches!(
            parse("[00:01.00]ok\n[00:75.00]bad"),
            Err(Error::Parse { line: 2, .. })
        ));
        assert!(matches!(parse("[0x:01]bad"), Err(Error::Parse { line: 1, .. })));
        assert!(matches!(parse("[offset:soon]"), Err(Error::Parse { line: 1, .. })));
    }
}
