//! Event handling for the quest TUI.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::App;

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> EventResult {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.scroll_up(3);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            app.scroll_down(3);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Global shortcut, works everywhere
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    // Help overlay swallows keys until dismissed
    if app.show_help {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                app.toggle_help();
                EventResult::NeedsRedraw
            }
            _ => EventResult::Continue,
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => EventResult::Quit,

        KeyCode::Char('?') => {
            app.toggle_help();
            EventResult::NeedsRedraw
        }

        // Choice selection
        KeyCode::Char(c @ '1'..='3') => {
            app.choose(c.to_digit(10).unwrap_or(0) as usize);
            EventResult::NeedsRedraw
        }

        // Play again after a terminal scene
        KeyCode::Char('r') => {
            app.restart();
            EventResult::NeedsRedraw
        }

        // Story scrolling
        KeyCode::Char('j') | KeyCode::Down => {
            app.scroll_down(1);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll_up(1);
            EventResult::NeedsRedraw
        }
        KeyCode::PageDown => {
            app.scroll_down(10);
            EventResult::NeedsRedraw
        }
        KeyCode::PageUp => {
            app.scroll_up(10);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('g') => {
            app.scroll = 0;
            EventResult::NeedsRedraw
        }

        _ => EventResult::Continue,
    }
}
