//! Keyboard input handling.
//!
//! The kiosk normally runs unattended, so the bindings are few: quit, and
//! scrolling for whoever walks up with a keyboard.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Rows moved by PageUp / PageDown.
const PAGE: usize = 5;

/// Process a single key event, updating app state accordingly.
///
/// Only key presses count, so a held key does not also fire on release.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::PageDown | KeyCode::Char(' ') => (0..PAGE).for_each(|_| app.select_next()),
        KeyCode::PageUp => (0..PAGE).for_each(|_| app.select_previous()),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        _ => {}
    }
}
