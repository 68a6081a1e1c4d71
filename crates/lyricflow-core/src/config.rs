use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub font: FontConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log files)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Line timing repair parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Overlaps shorter than this are treated as noise
    #[serde(default = "default_overlap_noise_ms")]
    pub overlap_noise_ms: i64,
    /// Upper bound for extending a line end into the following gap
    #[serde(default = "default_max_gap_fill_ms")]
    pub max_gap_fill_ms: i64,
    /// Minimum silence that receives an explicit gap line (0 = never)
    #[serde(default = "default_gap_line_min_ms")]
    pub gap_line_min_ms: i64,
    /// Duration assigned to the last line of formats without end times
    #[serde(default = "default_last_line_duration_ms")]
    pub last_line_duration_ms: i64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            overlap_noise_ms: default_overlap_noise_ms(),
            max_gap_fill_ms: default_max_gap_fill_ms(),
            gap_line_min_ms: default_gap_line_min_ms(),
            last_line_duration_ms: default_last_line_duration_ms(),
        }
    }
}

/// Activation and seek detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Look-ahead applied before deciding which lines glow
    #[serde(default = "default_highlight_look_ahead_ms")]
    pub highlight_look_ahead_ms: i64,
    /// Look-ahead applied before choosing the scroll target
    #[serde(default = "default_scroll_look_ahead_ms")]
    pub scroll_look_ahead_ms: i64,
    /// Maximum number of simultaneously active lines
    #[serde(default = "default_max_active_lines")]
    pub max_active_lines: usize,
    /// Clock jumps larger than this between ticks are seeks
    #[serde(default = "default_seek_threshold_ms")]
    pub seek_threshold_ms: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            highlight_look_ahead_ms: default_highlight_look_ahead_ms(),
            scroll_look_ahead_ms: default_scroll_look_ahead_ms(),
            max_active_lines: default_max_active_lines(),
            seek_threshold_ms: default_seek_threshold_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Total width of the highlight gradient in em
    #[serde(default = "default_gradient_width_em")]
    pub gradient_width_em: f32,
    /// Minimum word duration for per-character wipes
    #[serde(default = "default_growable_min_duration_ms")]
    pub growable_min_duration_ms: i64,
    /// Maximum visible characters for per-character wipes
    #[serde(default = "default_growable_max_chars")]
    pub growable_max_chars: usize,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            gradient_width_em: default_gradient_width_em(),
            growable_min_duration_ms: default_growable_min_duration_ms(),
            growable_max_chars: default_growable_max_chars(),
        }
    }
}

/// Easing curve used by scroll animations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    None,
    Linear,
    #[default]
    Cubic,
    Quintic,
    EaseOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Per-line transition delay step
    #[serde(default = "default_stagger_delay_ms")]
    pub stagger_delay_ms: u32,
    /// Lines on each side of the target that receive a position class
    #[serde(default = "default_position_class_window")]
    pub position_class_window: usize,
    /// Idle time after manual scrolling before auto-scroll resumes
    #[serde(default = "default_user_scroll_idle_ms")]
    pub user_scroll_idle_ms: u64,
    /// Quiet period after the last resize before a resync
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
    /// Time after a gesture ends during which momentum is assumed
    #[serde(default = "default_momentum_ms")]
    pub momentum_ms: u64,
    /// Animate offset changes instead of jumping
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    #[serde(default = "default_animation_duration_ms")]
    pub animation_duration_ms: u64,
    #[serde(default)]
    pub easing: EasingType,
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            stagger_delay_ms: default_stagger_delay_ms(),
            position_class_window: default_position_class_window(),
            user_scroll_idle_ms: default_user_scroll_idle_ms(),
            resize_debounce_ms: default_resize_debounce_ms(),
            momentum_ms: default_momentum_ms(),
            smooth_enabled: default_true(),
            animation_duration_ms: default_animation_duration_ms(),
            easing: EasingType::default(),
            animation_fps: default_animation_fps(),
        }
    }
}

/// Font used whenever resolution or measurement fails
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    #[serde(default = "default_font_family")]
    pub family: String,
    #[serde(default = "default_font_size")]
    pub size_px: f32,
    #[serde(default = "default_font_weight")]
    pub weight: u16,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: default_font_family(),
            size_px: default_font_size(),
            weight: default_font_weight(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds when nothing animates
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Rows above/below the viewport still considered visible
    #[serde(default = "default_visibility_margin_rows")]
    pub visibility_margin_rows: u16,
    /// Rows between the viewport top and the scroll target
    #[serde(default = "default_scroll_padding_rows")]
    pub scroll_padding_rows: u16,
    /// Theme name
    #[serde(default = "default_theme_name")]
    pub theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            visibility_margin_rows: default_visibility_margin_rows(),
            scroll_padding_rows: default_scroll_padding_rows(),
            theme: default_theme_name(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lyricflow")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_overlap_noise_ms() -> i64 {
    5
}

fn default_max_gap_fill_ms() -> i64 {
    500
}

fn default_gap_line_min_ms() -> i64 {
    5000
}

fn default_last_line_duration_ms() -> i64 {
    5000
}

fn default_highlight_look_ahead_ms() -> i64 {
    190
}

fn default_scroll_look_ahead_ms() -> i64 {
    300
}

fn default_max_active_lines() -> usize {
    3
}

fn default_seek_threshold_ms() -> i64 {
    1000
}

fn default_gradient_width_em() -> f32 {
    0.75
}

fn default_growable_min_duration_ms() -> i64 {
    800
}

fn default_growable_max_chars() -> usize {
    7
}

fn default_stagger_delay_ms() -> u32 {
    30
}

fn default_position_class_window() -> usize {
    4
}

fn default_user_scroll_idle_ms() -> u64 {
    4000
}

fn default_resize_debounce_ms() -> u64 {
    150
}

fn default_momentum_ms() -> u64 {
    250
}

fn default_animation_duration_ms() -> u64 {
    400
}

fn default_animation_fps() -> u32 {
    60
}

fn default_font_family() -> String {
    "sans-serif".to_string()
}

fn default_font_size() -> f32 {
    16.0
}

fn default_font_weight() -> u16 {
    400
}

fn default_tick_rate() -> u64 {
    100
}

fn default_visibility_margin_rows() -> u16 {
    2
}

fn default_scroll_padding_rows() -> u16 {
    3
}

fn default_theme_name() -> String {
    "gruvbox-dark".to_string()
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, defaults if it does not exist
    pub fn load_from(config_path: &std::path::Path) -> crate::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> crate::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/lyricflow/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("lyricflow")
            .join("config.toml")
    }

    /// Get the log file path used by interactive sessions
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("lyricflow.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tuned_constants() {
        let config = AppConfig::default();
        assert_eq!(config.sync.highlight_look_ahead_ms, 190);
        assert_eq!(config.sync.scroll_look_ahead_ms, 300);
        assert_eq!(config.sync.max_active_lines, 3);
        assert_eq!(config.sync.seek_threshold_ms, 1000);
        assert_eq!(config.timing.overlap_noise_ms, 5);
        assert_eq!(config.timing.max_gap_fill_ms, 500);
        assert_eq!(config.scroll.stagger_delay_ms, 30);
        assert_eq!(config.scroll.user_scroll_idle_ms, 4000);
        assert_eq!(config.scroll.easing, EasingType::Cubic);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [sync]
            max_active_lines = 1

            [scroll]
            easing = "ease_out"
            "#,
        )
        .unwrap();
        assert_eq!(config.sync.max_active_lines, 1);
        assert_eq!(config.sync.highlight_look_ahead_ms, 190);
        assert_eq!(config.scroll.easing, EasingType::EaseOut);
        assert_eq!(config.animation.growable_min_duration_ms, 800);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.scroll.stagger_delay_ms = 45;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.scroll.stagger_delay_ms, 45);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.ui.tick_rate_ms, 100);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sync\nbroken").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(crate::Error::Config(_))
        ));
    }
}
