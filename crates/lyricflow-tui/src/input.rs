use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Seek step for the arrow keys
pub const SEEK_STEP_MS: i64 = 5_000;

/// Playback rate step for `[` and `]`
pub const RATE_STEP: f64 = 0.25;

/// Rows moved per manual scroll step
pub const SCROLL_STEP_ROWS: f32 = 3.0;

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    TogglePlay,
    SeekBy(i64),
    ChangeRate(f64),
    /// Manual scroll; positive moves the content up
    ScrollBy(f32),
    Resync,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Esc, _) => Action::Quit,

        (KeyCode::Char(' '), _) => Action::TogglePlay,
        (KeyCode::Left, _) => Action::SeekBy(-SEEK_STEP_MS),
        (KeyCode::Right, _) => Action::SeekBy(SEEK_STEP_MS),
        (KeyCode::Char('['), _) => Action::ChangeRate(-RATE_STEP),
        (KeyCode::Char(']'), _) => Action::ChangeRate(RATE_STEP),

        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
            Action::ScrollBy(SCROLL_STEP_ROWS)
        }
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
            Action::ScrollBy(-SCROLL_STEP_ROWS)
        }

        (KeyCode::Char('r'), KeyModifiers::NONE) => Action::Resync,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_bindings() {
        assert_eq!(handle_key_event(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(handle_key_event(key(KeyCode::Char(' '))), Action::TogglePlay);
        assert_eq!(handle_key_event(key(KeyCode::Left)), Action::SeekBy(-5000));
        assert_eq!(handle_key_event(key(KeyCode::Char(']'))), Action::ChangeRate(0.25));
        assert_eq!(handle_key_event(key(KeyCode::Char('j'))), Action::ScrollBy(3.0));
        assert_eq!(handle_key_event(key(KeyCode::Char('r'))), Action::Resync);
        assert_eq!(handle_key_event(key(KeyCode::Char('x'))), Action::None);
    }
}
