use ratatui::style::Color;
use tracing::warn;

/// Colors used by the lyrics view and the status bar
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    /// Lines far from the current position
    pub dim: Color,

    // Lyric states
    pub active: Color,
    pub highlight: Color,
    pub pre_highlight: Color,
    pub sung: Color,
    pub gap: Color,
    pub metadata: Color,

    // Status bar
    pub status_fg: Color,
    pub status_bg: Color,
    pub accent: Color,
    pub warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::gruvbox_dark()
    }
}

impl Theme {
    pub fn gruvbox_dark() -> Self {
        Self {
            bg: Color::Rgb(0x28, 0x28, 0x28),
            fg: Color::Rgb(0xd4, 0xbe, 0x98),
            dim: Color::Rgb(0x7c, 0x6f, 0x64),
            active: Color::Rgb(0xdd, 0xc7, 0xa1),
            highlight: Color::Rgb(0xd8, 0xa6, 0x57),
            pre_highlight: Color::Rgb(0xe7, 0x8a, 0x4e),
            sung: Color::Rgb(0xa9, 0xb6, 0x65),
            gap: Color::Rgb(0x89, 0xb4, 0x82),
            metadata: Color::Rgb(0x92, 0x83, 0x74),
            status_fg: Color::Rgb(0xd4, 0xbe, 0x98),
            status_bg: Color::Rgb(0x45, 0x40, 0x3d),
            accent: Color::Rgb(0x89, 0xb4, 0x82),
            warning: Color::Rgb(0xe7, 0x8a, 0x4e),
        }
    }

    /// https://www.nordtheme.com/
    pub fn nord() -> Self {
        Self {
            bg: Color::Rgb(0x2e, 0x34, 0x40),
            fg: Color::Rgb(0xd8, 0xde, 0xe9),
            dim: Color::Rgb(0x4c, 0x56, 0x6a),
            active: Color::Rgb(0xec, 0xef, 0xf4),
            highlight: Color::Rgb(0x88, 0xc0, 0xd0),
            pre_highlight: Color::Rgb(0x81, 0xa1, 0xc1),
            sung: Color::Rgb(0xa3, 0xbe, 0x8c),
            gap: Color::Rgb(0x8f, 0xbc, 0xbb),
            metadata: Color::Rgb(0x5e, 0x68, 0x7a),
            status_fg: Color::Rgb(0xec, 0xef, 0xf4),
            status_bg: Color::Rgb(0x43, 0x4c, 0x5e),
            accent: Color::Rgb(0x8f, 0xbc, 0xbb),
            warning: Color::Rgb(0xd0, 0x87, 0x70),
        }
    }

    pub fn dracula() -> Self {
        Self {
            bg: Color::Rgb(0x28, 0x2a, 0x36),
            fg: Color::Rgb(0xf8, 0xf8, 0xf2),
            dim: Color::Rgb(0x62, 0x72, 0xa4),
            active: Color::Rgb(0xf8, 0xf8, 0xf2),
            highlight: Color::Rgb(0xff, 0x79, 0xc6),
            pre_highlight: Color::Rgb(0xbd, 0x93, 0xf9),
            sung: Color::Rgb(0x50, 0xfa, 0x7b),
            gap: Color::Rgb(0x8b, 0xe9, 0xfd),
            metadata: Color::Rgb(0x62, 0x72, 0xa4),
            status_fg: Color::Rgb(0xf8, 0xf8, 0xf2),
            status_bg: Color::Rgb(0x44, 0x47, 0x5a),
            accent: Color::Rgb(0x8b, 0xe9, 0xfd),
            warning: Color::Rgb(0xff, 0xb8, 0x6c),
        }
    }

    /// Theme by config name; unknown names fall back to gruvbox-dark
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "gruvbox" | "gruvbox-dark" => Self::gruvbox_dark(),
            "nord" => Self::nord(),
            "dracula" => Self::dracula(),
            other => {
                warn!(theme = other, "Unknown theme, using gruvbox-dark");
                Self::gruvbox_dark()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(Theme::by_name("Nord"), Theme::nord());
        assert_eq!(Theme::by_name("dracula"), Theme::dracula());
        assert_eq!(Theme::by_name("no-such-theme"), Theme::default());
    }
}
