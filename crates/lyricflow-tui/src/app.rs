use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use lyricflow_core::clock::{Clock, PlaybackClock, SystemWallClock, WallClock};
use lyricflow_core::{
    AppConfig, LyricsEngine, TextMetrics, TickReport, Timeline, ViewportIndex,
};
use tracing::{debug, info};

use crate::input::{Action, SCROLL_STEP_ROWS};
use crate::surface::TerminalSurface;
use crate::theme::Theme;

/// Interactive karaoke session: playback clock, engine and terminal surface
pub struct App<W: WallClock + Clone = SystemWallClock> {
    pub config: AppConfig,
    pub theme: Theme,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub engine: LyricsEngine<W>,
    pub clock: PlaybackClock<W>,
    pub surface: TerminalSurface<W>,
    pub visibility: ViewportIndex,
    /// Lyrics area size (columns, rows)
    pub viewport: Option<(u16, u16)>,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub last_report: TickReport,
    force_resync: bool,
    drag_row: Option<u16>,
}

impl App<SystemWallClock> {
    pub fn new(config: AppConfig, timeline: Timeline) -> Self {
        Self::with_wall(config, timeline, SystemWallClock)
    }
}

impl<W: WallClock + Clone> App<W> {
    /// Build the session and render the timeline; playback starts paused
    pub fn with_wall(config: AppConfig, timeline: Timeline, wall: W) -> Self {
        let metrics = TextMetrics::cell(&config.font);
        let mut engine = LyricsEngine::new(&config, metrics, wall.clone());
        let clock = PlaybackClock::new(wall.clone()).with_duration(timeline.duration_ms());
        let mut surface = TerminalSurface::new(wall, &config.scroll, config.ui.scroll_padding_rows);
        let title = timeline.title.clone();
        let artist = timeline.artist.clone();

        engine.render(timeline, &mut surface);
        info!(title = ?title, artist = ?artist, "Session ready");

        Self {
            theme: Theme::by_name(&config.ui.theme),
            visibility: ViewportIndex::new(config.ui.visibility_margin_rows as f32),
            config,
            title,
            artist,
            engine,
            clock,
            surface,
            viewport: None,
            should_quit: false,
            status_message: None,
            last_report: TickReport::default(),
            force_resync: false,
            drag_row: None,
        }
    }

    /// Update the lyrics area size; relayouts when the size changed
    pub fn set_viewport(&mut self, width: u16, height: u16) {
        if self.viewport == Some((width, height)) {
            return;
        }
        let first = self.viewport.is_none();
        self.viewport = Some((width, height));
        if let Some(cache) = self.engine.cache() {
            self.surface.layout(cache.lines(), width);
        }
        if !first {
            self.engine.on_resize();
        }
        debug!(width, height, "Viewport changed");
    }

    /// Current media time
    pub fn position_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// One frame: refresh visibility, run the engine, advance animations
    pub fn tick(&mut self) {
        if let Some((_, height)) = self.viewport {
            self.visibility.update(
                self.surface.extents(),
                self.surface.target_offset(),
                height as f32,
            );
        }
        let now_ms = self.clock.now_ms();
        let force = std::mem::take(&mut self.force_resync);
        self.last_report = self
            .engine
            .tick(now_ms, force, &mut self.surface, &self.visibility);
        let now = self.surface.now();
        self.surface.update_animation(now);
    }

    /// Whether the next frame should come at animation rate
    pub fn needs_fast_frames(&self) -> bool {
        !self.clock.is_paused() || self.surface.is_animating()
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePlay => {
                self.clock.toggle();
                self.status_message = None;
            }
            Action::SeekBy(delta) => self.clock.seek_by(delta),
            Action::ChangeRate(step) => {
                let rate = self.clock.rate() + step;
                self.clock.set_rate(rate);
                self.status_message = Some(format!("Rate {:.2}x", self.clock.rate()));
            }
            Action::ScrollBy(rows) => self.engine.on_user_scroll(rows, &mut self.surface),
            Action::Resync => self.force_resync = true,
            Action::None => {}
        }
    }

    /// Wheel scrolls; left-button drags act as a touch gesture
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollDown => {
                self.engine.on_user_scroll(SCROLL_STEP_ROWS, &mut self.surface)
            }
            MouseEventKind::ScrollUp => {
                self.engine.on_user_scroll(-SCROLL_STEP_ROWS, &mut self.surface)
            }
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_row = Some(mouse.row);
                self.engine.begin_gesture();
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(last) = self.drag_row.replace(mouse.row) {
                    let delta = last as f32 - mouse.row as f32;
                    if delta != 0.0 {
                        self.engine.on_user_scroll(delta, &mut self.surface);
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.drag_row.take().is_some() {
                    self.engine.end_gesture();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use lyricflow_core::{Line, LineId, LineKind, ManualWallClock, Syllable, SyllableId};

    fn timeline() -> Timeline {
        Timeline::new(
            (0..8)
                .map(|i| {
                    let start = i as i64 * 3000;
                    Line::new(LineId(i), LineKind::Lyric, start, start + 3000, "sing along")
                        .with_syllables(vec![
                            Syllable::new(SyllableId(i * 2), start, 1500, "sing "),
                            Syllable::new(SyllableId(i * 2 + 1), start + 1500, 1500, "along"),
                        ])
                })
                .collect(),
        )
    }

    fn app() -> (App<ManualWallClock>, ManualWallClock) {
        let wall = ManualWallClock::new();
        let mut app = App::with_wall(AppConfig::default(), timeline(), wall.clone());
        app.set_viewport(40, 12);
        (app, wall)
    }

    fn mouse(kind: MouseEventKind, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column: 0,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_playback_drives_highlighting() {
        let (mut app, wall) = app();
        app.handle_action(Action::TogglePlay);
        wall.advance_ms(3100);
        app.tick();

        assert_eq!(app.last_report.primary_line, Some(LineId(1)));
        assert!(app.surface.is_active(LineId(1)));
        assert_eq!(app.last_report.scroll_target, Some(LineId(1)));
    }

    #[test]
    fn test_seek_key_jumps_instantly() {
        let (mut app, _) = app();
        app.tick();
        app.handle_action(Action::SeekBy(15_000));
        app.tick();

        assert!(app.last_report.seek);
        assert!(!app.surface.is_animating());
        // Line 5 starts at row 10; padding keeps it 3 rows below the top
        assert_eq!(app.surface.target_offset(), -7.0);
    }

    #[test]
    fn test_manual_scroll_and_drag() {
        let (mut app, _) = app();
        app.tick();
        let start = app.surface.target_offset();

        app.handle_mouse(mouse(MouseEventKind::ScrollDown, 5));
        assert_eq!(app.surface.target_offset(), start - SCROLL_STEP_ROWS);
        assert!(app.engine.scroll().is_user_controlling());

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 10));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 8));
        assert_eq!(app.surface.target_offset(), start - SCROLL_STEP_ROWS - 2.0);
        assert!(app.engine.scroll().is_gesture_active());
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 8));
        assert!(!app.engine.scroll().is_gesture_active());
    }

    #[test]
    fn test_rate_and_quit() {
        let (mut app, _) = app();
        app.handle_action(Action::ChangeRate(0.5));
        assert_eq!(app.clock.rate(), 1.5);
        assert!(app.status_message.is_some());
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }
}
