//! Animation parameters derived from measured text geometry.
//!
//! The highlight of a syllable is a gradient that sweeps from just left of the
//! text to just right of it. To keep the sweep continuous across syllables of
//! the same word, the next syllable's highlight is armed while the gradient of
//! the current one is still travelling: the moment the gradient's leading edge
//! reaches the trigger position near the end of the current syllable.

use tracing::debug;

use crate::config::AnimationConfig;
use crate::metrics::{FontKey, TextMetrics};
use crate::model::{CharWipe, Line};
use crate::script::is_growable;

/// Preview window armed on the following syllable of a word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreHighlight {
    pub delay_ms: i64,
    pub duration_ms: i64,
}

#[derive(Debug, Clone)]
pub struct AnimationParameterDeriver {
    config: AnimationConfig,
    font_key: FontKey,
}

impl AnimationParameterDeriver {
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            config: config.clone(),
            font_key: FontKey::syllable(),
        }
    }

    pub fn with_font_key(mut self, font_key: FontKey) -> Self {
        self.font_key = font_key;
        self
    }

    /// Pre-highlight timing for the syllable following `text` in its word
    pub fn pre_highlight_for(
        &self,
        text: &str,
        duration_ms: i64,
        metrics: &mut TextMetrics,
    ) -> PreHighlight {
        let duration_ms = duration_ms.max(0);
        let em = metrics.em_width(&self.font_key);
        let width = metrics.measure(text, &self.font_key);
        let gradient = self.config.gradient_width_em;

        if em <= 0.0 || gradient <= 0.0 {
            // Degenerate geometry: the next syllable starts when this one ends
            return PreHighlight {
                delay_ms: duration_ms,
                duration_ms: 0,
            };
        }

        let width_em = width / em;
        let half = gradient / 2.0;
        let initial_position = -half;
        let final_position = width_em + half;
        let span = final_position - initial_position;

        let trigger_position = if width_em < gradient {
            width_em - half / 2.0
        } else {
            width_em - half
        };

        let trigger_fraction = if span > 0.0 {
            ((trigger_position - initial_position) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let delay_ms = ((trigger_fraction as f64 * duration_ms as f64).round() as i64).max(0);
        PreHighlight {
            delay_ms,
            duration_ms: (duration_ms - delay_ms).max(0),
        }
    }

    /// Per-character wipe fractions proportional to measured glyph widths.
    ///
    /// Zero-width characters keep their index but get no wipe. When nothing is
    /// measurable every visible character receives an equal share.
    pub fn char_wipes(&self, text: &str, metrics: &mut TextMetrics) -> Vec<CharWipe> {
        let widths: Vec<(usize, char, f32)> = text
            .chars()
            .enumerate()
            .map(|(i, ch)| {
                let mut buf = [0u8; 4];
                (i, ch, metrics.measure(ch.encode_utf8(&mut buf), &self.font_key))
            })
            .collect();
        let total: f32 = widths.iter().map(|(_, _, w)| w).sum();

        if total <= 0.0 {
            let visible: Vec<(usize, char)> = widths
                .iter()
                .filter(|(_, ch, _)| !ch.is_whitespace())
                .map(|&(i, ch, _)| (i, ch))
                .collect();
            let share = 1.0 / visible.len().max(1) as f32;
            return visible
                .into_iter()
                .enumerate()
                .map(|(k, (index, ch))| CharWipe {
                    index,
                    ch,
                    start_fraction: k as f32 * share,
                    duration_fraction: share,
                })
                .collect();
        }

        let mut cumulative = 0.0;
        let mut wipes = Vec::with_capacity(widths.len());
        for (index, ch, width) in widths {
            if width <= 0.0 {
                continue;
            }
            wipes.push(CharWipe {
                index,
                ch,
                start_fraction: cumulative / total,
                duration_fraction: width / total,
            });
            cumulative += width;
        }
        wipes
    }

    /// Fill word links, pre-highlight windows and character wipes of a line.
    ///
    /// Returns the number of syllables that arm a pre-highlight.
    pub fn derive(&self, line: &mut Line, metrics: &mut TextMetrics) -> usize {
        let mut armed = 0;
        let mut word_start = 0;
        let count = line.syllables.len();

        for i in 0..count {
            if !(line.syllables[i].ends_word() || i + 1 == count) {
                continue;
            }
            let word = word_start..=i;
            word_start = i + 1;

            let word_duration: i64 = line.syllables[word.clone()].iter().map(|s| s.duration_ms).sum();
            let word_text: String = line.syllables[word.clone()].iter().map(|s| s.text.as_str()).collect();
            let growable = is_growable(&word_text, word_duration, &self.config);

            for k in word.clone() {
                let next_id = if k < *word.end() {
                    Some(line.syllables[k + 1].id)
                } else {
                    None
                };
                let pre = next_id.map(|_| {
                    let s = &line.syllables[k];
                    self.pre_highlight_for(&s.text, s.duration_ms, metrics)
                });
                let wipes = if growable {
                    self.char_wipes(&line.syllables[k].text, metrics)
                } else {
                    Vec::new()
                };

                let syllable = &mut line.syllables[k];
                syllable.word_duration_ms = Some(word_duration);
                syllable.next_syllable_in_word = next_id;
                syllable.pre_highlight_delay_ms = pre.map(|p| p.delay_ms);
                syllable.pre_highlight_duration_ms = pre.map(|p| p.duration_ms);
                syllable.char_wipes = wipes;
                if pre.is_some() {
                    armed += 1;
                }
            }
        }

        debug!(line = ?line.id, syllables = count, pre_highlights = armed, "Derived animation parameters");
        armed
    }
}

/// Derive animation parameters for one line with the given configuration
pub fn derive_animation_parameters(
    line: &mut Line,
    metrics: &mut TextMetrics,
    config: &AnimationConfig,
) -> usize {
    AnimationParameterDeriver::new(config).derive(line, metrics)
}
