use lyricflow_core::clock::WallClock;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render<W: WallClock + Clone>(frame: &mut Frame, area: Rect, app: &App<W>) {
        let theme = &app.theme;
        let status_text = status_text(app);

        let help_hint = " q:quit space:play ←/→:seek j/k:scroll r:resync ";
        let used = status_text.chars().count() + help_hint.chars().count();
        let padding_len = (area.width as usize).saturating_sub(used);

        let mode_style = if app.engine.scroll().is_user_controlling() {
            Style::default().fg(theme.warning).bg(theme.status_bg)
        } else {
            Style::default().fg(theme.status_fg).bg(theme.status_bg)
        };

        let line = Line::from(vec![
            Span::styled(status_text, mode_style),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.status_bg)),
            Span::styled(
                help_hint,
                Style::default().fg(theme.dim).bg(theme.status_bg),
            ),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}

fn status_text<W: WallClock + Clone>(app: &App<W>) -> String {
    if let Some(msg) = &app.status_message {
        return format!(" {msg}");
    }

    let state = if app.clock.is_paused() { "❚❚" } else { "▶" };
    let total = app.clock.duration_ms().unwrap_or(0);
    let mode = if app.engine.scroll().is_user_controlling() {
        "USER"
    } else {
        "AUTO"
    };
    let song = match (&app.title, &app.artist) {
        (Some(title), Some(artist)) => format!(" | {title} - {artist}"),
        (Some(title), None) => format!(" | {title}"),
        (None, Some(artist)) => format!(" | {artist}"),
        (None, None) => String::new(),
    };

    format!(
        " {} {} / {} | {:.2}x | {}{}",
        state,
        format_time(app.position_ms()),
        format_time(total),
        app.clock.rate(),
        mode,
        song
    )
}

/// `m:ss` for a media position
pub fn format_time(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyricflow_core::{AppConfig, Line, LineId, LineKind, ManualWallClock, Timeline};

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(61_999), "1:01");
        assert_eq!(format_time(-500), "0:00");
    }

    #[test]
    fn test_status_text() {
        let mut timeline = Timeline::new(vec![Line::new(
            LineId(0),
            LineKind::Lyric,
            0,
            95_000,
            "la",
        )]);
        timeline.title = Some("Song".to_string());
        timeline.artist = Some("Band".to_string());
        let app = App::with_wall(AppConfig::default(), timeline, ManualWallClock::new());

        assert_eq!(status_text(&app), " ❚❚ 0:00 / 1:35 | 1.00x | AUTO | Song - Band");
    }
}
