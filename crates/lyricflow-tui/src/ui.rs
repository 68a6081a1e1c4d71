use lyricflow_core::clock::WallClock;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::app::App;
use crate::widgets::{LyricsViewWidget, StatusBarWidget};

/// Split the screen into the lyrics area and a one-row status bar
pub fn areas(size: Rect) -> (Rect, Rect) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(size);
    (main_layout[0], main_layout[1])
}

pub fn draw<W: WallClock + Clone>(frame: &mut Frame, app: &App<W>) {
    let (lyrics, status) = areas(frame.area());
    LyricsViewWidget::render(frame, lyrics, app);
    StatusBarWidget::render(frame, status, app);
}
