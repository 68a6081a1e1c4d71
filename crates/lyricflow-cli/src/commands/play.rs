use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::info;

use lyricflow_core::AppConfig;
use lyricflow_tui::{
    event::{AppEvent, EventHandler},
    input::handle_key_event,
    scroll::ScrollConfigExt,
    ui, App,
};

pub async fn run(config: Arc<AppConfig>, path: &Path, start_ms: i64, rate: f64) -> Result<()> {
    let timeline = super::read_timeline(path, &config.timing).await?;
    if timeline.timed_lines().next().is_none() {
        return Err(anyhow!("{} contains no timed lines", path.display()));
    }

    let title = match (&timeline.title, &timeline.artist) {
        (Some(title), Some(artist)) => format!("{title} - {artist}"),
        (Some(title), None) => title.clone(),
        _ => "lyricflow".to_string(),
    };

    let mut app = App::new(config.as_ref().clone(), timeline);
    app.clock.set_rate(rate);
    app.clock.seek(start_ms);
    app.clock.play();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle(&title))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!(path = %path.display(), start_ms, rate, "Starting playback");
    let result = main_loop(&mut terminal, &mut app, &config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn main_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &AppConfig,
) -> Result<()> {
    let event_handler = EventHandler::new(config.ui.tick_rate_ms);
    let frame_interval = config.scroll.frame_interval();

    loop {
        let size = terminal.size()?;
        let (lyrics, _) = ui::areas(Rect::new(0, 0, size.width, size.height));
        app.set_viewport(lyrics.width, lyrics.height);
        app.tick();

        terminal.draw(|frame| ui::draw(frame, app))?;

        // Playback and running animations need frame-rate updates
        let event = if app.needs_fast_frames() {
            event_handler.next_within(frame_interval)?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => app.handle_action(handle_key_event(key)),
                AppEvent::Mouse(mouse) => app.handle_mouse(mouse),
                // Picked up by set_viewport on the next frame
                AppEvent::Resize(_, _) => {}
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            info!(position_ms = app.position_ms(), "Playback stopped");
            return Ok(());
        }
    }
}
