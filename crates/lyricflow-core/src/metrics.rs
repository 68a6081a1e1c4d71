//! Text width measurement with per-element font memoization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use unicode_width::UnicodeWidthStr;

use crate::config::FontConfig;
use crate::{Error, Result};

/// Width of one terminal cell relative to the font size
const CELL_ASPECT: f32 = 0.6;

/// Reference glyph for em-relative widths
pub const EM_REFERENCE: &str = "M";

/// Font a piece of text is rendered with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub family: String,
    pub size_px: f32,
    pub weight: u16,
    pub italic: bool,
}

impl FontDescriptor {
    pub fn from_config(config: &FontConfig) -> Self {
        Self {
            family: config.family.clone(),
            size_px: config.size_px,
            weight: config.weight,
            italic: false,
        }
    }
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self::from_config(&FontConfig::default())
    }
}

/// Identifies the element kind whose computed font is looked up
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    pub tag: String,
    pub class: String,
}

impl FontKey {
    pub fn new(tag: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            class: class.into(),
        }
    }

    pub fn syllable() -> Self {
        Self::new("span", "lyrics-syllable")
    }
}

/// Measures rendered text width
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &FontDescriptor) -> Result<f32>;
}

/// Resolves the font an element kind is rendered with
pub trait FontResolver {
    fn resolve(&self, key: &FontKey) -> Result<FontDescriptor>;
}

/// Resolver backed by a base font plus per-key overrides
#[derive(Debug, Clone, Default)]
pub struct StaticFontResolver {
    base: FontDescriptor,
    overrides: HashMap<FontKey, FontDescriptor>,
}

impl StaticFontResolver {
    pub fn new(base: FontDescriptor) -> Self {
        Self {
            base,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, key: FontKey, font: FontDescriptor) -> Self {
        self.overrides.insert(key, font);
        self
    }
}

impl FontResolver for StaticFontResolver {
    fn resolve(&self, key: &FontKey) -> Result<FontDescriptor> {
        Ok(self.overrides.get(key).unwrap_or(&self.base).clone())
    }
}

/// Measurer for fixed-cell surfaces based on display columns
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMeasurer;

impl TextMeasurer for CellMeasurer {
    fn measure(&self, text: &str, font: &FontDescriptor) -> Result<f32> {
        if font.size_px <= 0.0 || !font.size_px.is_finite() {
            return Err(Error::Measure(format!(
                "invalid font size {} for '{}'",
                font.size_px, font.family
            )));
        }
        Ok(text.width() as f32 * font.size_px * CELL_ASPECT)
    }
}

/// Memoizing front for a measurer and a font resolver.
///
/// Fonts are resolved once per [`FontKey`]; failures fall back to the
/// configured default font. All caches are dropped by [`TextMetrics::invalidate`].
pub struct TextMetrics {
    measurer: Box<dyn TextMeasurer>,
    resolver: Box<dyn FontResolver>,
    default_font: FontDescriptor,
    fonts: HashMap<FontKey, FontDescriptor>,
    em_widths: HashMap<FontKey, f32>,
}

impl TextMetrics {
    pub fn new(
        measurer: Box<dyn TextMeasurer>,
        resolver: Box<dyn FontResolver>,
        default_font: FontDescriptor,
    ) -> Self {
        Self {
            measurer,
            resolver,
            default_font,
            fonts: HashMap::new(),
            em_widths: HashMap::new(),
        }
    }

    /// Cell-based metrics for terminals and headless runs
    pub fn cell(config: &FontConfig) -> Self {
        let font = FontDescriptor::from_config(config);
        Self::new(
            Box::new(CellMeasurer),
            Box::new(StaticFontResolver::new(font.clone())),
            font,
        )
    }

    pub fn default_font(&self) -> &FontDescriptor {
        &self.default_font
    }

    /// Resolve (and memoize) the font for an element kind
    pub fn font(&mut self, key: &FontKey) -> FontDescriptor {
        if let Some(font) = self.fonts.get(key) {
            return font.clone();
        }
        let font = match self.resolver.resolve(key) {
            Ok(font) => font,
            Err(e) => {
                warn!(tag = %key.tag, class = %key.class, error = %e, "Font resolution failed, using default font");
                self.default_font.clone()
            }
        };
        self.fonts.insert(key.clone(), font.clone());
        font
    }

    /// Width of `text` rendered with the font of `key`; 0 when unmeasurable
    pub fn measure(&mut self, text: &str, key: &FontKey) -> f32 {
        let font = self.font(key);
        match self.measurer.measure(text, &font) {
            Ok(width) => width.max(0.0),
            Err(e) if font != self.default_font => {
                warn!(error = %e, "Measurement failed, retrying with default font");
                self.fonts.insert(key.clone(), self.default_font.clone());
                self.em_widths.remove(key);
                match self.measurer.measure(text, &self.default_font) {
                    Ok(width) => width.max(0.0),
                    Err(e) => {
                        warn!(error = %e, "Measurement with default font failed");
                        0.0
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Measurement with default font failed");
                0.0
            }
        }
    }

    /// Width of the em reference glyph for `key`
    pub fn em_width(&mut self, key: &FontKey) -> f32 {
        if let Some(&width) = self.em_widths.get(key) {
            return width;
        }
        let width = self.measure(EM_REFERENCE, key);
        self.em_widths.insert(key.clone(), width);
        width
    }

    /// Drop every memoized font and width
    pub fn invalidate(&mut self) {
        self.fonts.clear();
        self.em_widths.clear();
    }

    pub fn cached_fonts(&self) -> usize {
        self.fonts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingResolver {
        calls: Rc<Cell<usize>>,
        fail: bool,
    }

    impl FontResolver for CountingResolver {
        fn resolve(&self, _key: &FontKey) -> Result<FontDescriptor> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(Error::Measure("no computed style".into()))
            } else {
                Ok(FontDescriptor {
                    size_px: 20.0,
                    ..FontDescriptor::default()
                })
            }
        }
    }

    #[test]
    fn test_cell_measurer_uses_display_columns() {
        let font = FontDescriptor::default();
        let narrow = CellMeasurer.measure("ab", &font).unwrap();
        let wide = CellMeasurer.measure("愛", &font).unwrap();
        assert!((narrow - wide).abs() < 0.001);
        assert!((narrow - 2.0 * 16.0 * CELL_ASPECT).abs() < 0.001);
    }

    #[test]
    fn test_fonts_are_memoized_per_key() {
        let calls = Rc::new(Cell::new(0));
        let mut metrics = TextMetrics::new(
            Box::new(CellMeasurer),
            Box::new(CountingResolver {
                calls: calls.clone(),
                fail: false,
            }),
            FontDescriptor::default(),
        );

        metrics.measure("a", &FontKey::syllable());
        metrics.measure("b", &FontKey::syllable());
        metrics.measure("c", &FontKey::new("div", "lyrics-line"));
        assert_eq!(calls.get(), 2);
        assert_eq!(metrics.cached_fonts(), 2);

        metrics.invalidate();
        metrics.measure("a", &FontKey::syllable());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_resolution_failure_falls_back_to_default_font() {
        let mut metrics = TextMetrics::new(
            Box::new(CellMeasurer),
            Box::new(CountingResolver {
                calls: Rc::new(Cell::new(0)),
                fail: true,
            }),
            FontDescriptor::default(),
        );
        let width = metrics.measure("M", &FontKey::syllable());
        assert!((width - 16.0 * CELL_ASPECT).abs() < 0.001);
    }

    #[test]
    fn test_invalid_font_retries_with_default() {
        let broken = FontDescriptor {
            size_px: 0.0,
            ..FontDescriptor::default()
        };
        let mut metrics = TextMetrics::new(
            Box::new(CellMeasurer),
            Box::new(StaticFontResolver::new(broken)),
            FontDescriptor::default(),
        );
        assert!(metrics.em_width(&FontKey::syllable()) > 0.0);
    }

    #[test]
    fn test_unmeasurable_default_yields_zero() {
        let broken = FontDescriptor {
            size_px: -1.0,
            ..FontDescriptor::default()
        };
        let mut metrics = TextMetrics::new(
            Box::new(CellMeasurer),
            Box::new(StaticFontResolver::new(broken.clone())),
            broken,
        );
        assert_eq!(metrics.measure("abc", &FontKey::syllable()), 0.0);
    }
}
