use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;

use lyricflow_core::{AnimationParameterDeriver, AppConfig, Line, TextMetrics, Timeline, TimingCorrector};

pub async fn run(config: &AppConfig, path: &Path, json: bool) -> Result<()> {
    let timeline = super::read_timeline(path, &config.timing).await?;
    let title = timeline.title.clone();
    let artist = timeline.artist.clone();
    let lines = prepare(timeline, config);

    if json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
        return Ok(());
    }

    if let Some(title) = title {
        println!("{} - {}", title, artist.as_deref().unwrap_or("(unknown artist)"));
    }
    print!("{}", report(&lines));
    Ok(())
}

/// Apply timing correction and animation derivation the way a render pass does
pub fn prepare(timeline: Timeline, config: &AppConfig) -> Vec<Line> {
    let mut lines = timeline.lines;
    TimingCorrector::new(&config.timing).correct(&mut lines);

    let deriver = AnimationParameterDeriver::new(&config.animation);
    let mut metrics = TextMetrics::cell(&config.font);
    for line in lines.iter_mut().filter(|l| l.kind.is_timed()) {
        deriver.derive(line, &mut metrics);
    }
    lines
}

pub fn report(lines: &[Line]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<8}  {:>9}  {:>9}  {:>9}  TEXT",
        "ID", "KIND", "START", "END(SRC)", "END"
    );

    for line in lines {
        let marker = if line.end_ms != line.actual_end_ms { "*" } else { " " };
        let _ = writeln!(
            out,
            "{:>4}  {:<8}  {:>9}  {:>9}  {:>8}{}  {}",
            line.id.0,
            line.kind.as_str(),
            line.start_ms,
            line.actual_end_ms,
            line.end_ms,
            marker,
            line.text
        );

        for syllable in &line.syllables {
            let pre = match (syllable.pre_highlight_delay_ms, syllable.pre_highlight_duration_ms) {
                (Some(delay), Some(duration)) => format!("  pre {delay}+{duration}ms"),
                _ => String::new(),
            };
            let wipes = if syllable.char_wipes.is_empty() {
                String::new()
            } else {
                format!("  wipes {}", syllable.char_wipes.len())
            };
            let _ = writeln!(
                out,
                "{:>24}  {:>6}ms  {:?}{}{}",
                syllable.start_ms, syllable.duration_ms, syllable.text, pre, wipes
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyricflow_core::{LineId, LineKind, Syllable, SyllableId};

    fn timeline() -> Timeline {
        Timeline::new(vec![
            Line::new(LineId(0), LineKind::Lyric, 0, 1800, "hel lo").with_syllables(vec![
                Syllable::new(SyllableId(0), 0, 1000, "hel"),
                Syllable::new(SyllableId(1), 1000, 800, "lo"),
            ]),
            Line::new(LineId(1), LineKind::Lyric, 2000, 4000, "again")
                .with_syllables(vec![Syllable::new(SyllableId(2), 2000, 2000, "again")]),
        ])
    }

    #[test]
    fn test_prepare_corrects_and_derives() {
        let lines = prepare(timeline(), &AppConfig::default());
        // Short dead time before the next line is absorbed
        assert_eq!(lines[0].actual_end_ms, 1800);
        assert_eq!(lines[0].end_ms, 2000);
        assert_eq!(lines[0].syllables[0].next_syllable_in_word, Some(SyllableId(1)));
        assert!(lines[0].syllables[0].pre_highlight_delay_ms.is_some());
        assert!(lines[0].syllables[1].pre_highlight_delay_ms.is_none());
    }

    #[test]
    fn test_report_marks_corrected_lines() {
        let text = report(&prepare(timeline(), &AppConfig::default()));
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[0].starts_with("  ID"));
        assert!(rows[1].contains("1800") && rows[1].contains("2000*"));
        assert!(rows[2].contains("\"hel\"") && rows[2].contains("pre "));
        assert!(text.contains("\"again\""));
    }
}
