use std::{io, time::Duration};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

/// Takes an event, checks if it is a key press event, and returns the [`KeyCode`]
pub(super) fn event_keycode(event: &Event) -> Option<KeyCode> {
    let Event::Key(key) = event else {
        return None;
    };

    if key.kind != KeyEventKind::Press {
        return None;
    }

    Some(key.code)
}

/// Whether a key press asks the viewer to stop
pub(super) fn is_quit(key: KeyCode) -> bool {
    matches!(key, KeyCode::Char('q') | KeyCode::Esc)
}

/// Drain pending terminal events without blocking, reporting whether one asked to quit
pub(super) fn quit_requested() -> io::Result<bool> {
    let mut quit = false;
    while event::poll(Duration::ZERO)? {
        if event_keycode(&event::read()?).is_some_and(is_quit) {
            quit = true;
        }
    }
    Ok(quit)
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;

    #[test]
    fn only_key_presses_count() {
        let press = Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        assert_eq!(event_keycode(&press), Some(KeyCode::Char('q')));

        let release = Event::Key(KeyEvent::new_with_kind(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert_eq!(event_keycode(&release), None, "Releases are ignored");
        assert_eq!(event_keycode(&Event::FocusGained), None);
    }

    #[test]
    fn quit_keys() {
        assert!(is_quit(KeyCode::Char('q')));
        assert!(is_quit(KeyCode::Esc));
        assert!(!is_quit(KeyCode::Char('Q')), "Quitting is lowercase only");
        assert!(!is_quit(KeyCode::Enter));
    }
}
