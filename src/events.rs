use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Keep moving while the overlay is open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Left | KeyCode::Char('h') if app.current_view == View::History => {
                app.move_date(-1)
            }
            KeyCode::Right | KeyCode::Char('l') if app.current_view == View::History => {
                app.move_date(1)
            }
            _ => {}
        }
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),

        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        KeyCode::Char('1') => app.set_view(View::Dashboard),
        KeyCode::Char('2') => app.set_view(View::History),

        // Up/down move services (Dashboard) or weeks (History)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        // Left/right move days in History and switch views elsewhere
        KeyCode::Left | KeyCode::Char('h') => match app.current_view {
            View::History => app.move_date(-1),
            View::Dashboard => app.prev_view(),
        },
        KeyCode::Right | KeyCode::Char('l') => match app.current_view {
            View::History => app.move_date(1),
            View::Dashboard => app.next_view(),
        },
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),

        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        KeyCode::Char('r') => {
            app.request_refresh();
            app.set_status_message("Refreshing...".to_string());
        }

        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('s') if app.current_view == View::Dashboard => app.cycle_sort(),
        KeyCode::Char('S') if app.current_view == View::Dashboard => {
            app.toggle_sort_direction()
        }

        KeyCode::Char('/') if app.current_view == View::Dashboard => app.start_filter(),

        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('e') => {
            let export_path = app.options.export_path.clone();
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.filter_active = false;
        }

        // Keep text but exit input mode
        KeyCode::Esc => {
            app.cancel_filter();
        }

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        KeyCode::Char(c) => {
            app.filter_push(c);
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Service rows start below the table header
            if app.current_view == View::Dashboard && clicked_row > content_start_row {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                if item_row < app.visible_services().len() {
                    app.selected_service_index = item_row;
                }
            }

            // Tab row sits right under the header
            if clicked_row == 1 {
                // " 1:Dashboard " is 13 columns, then the divider
                if mouse.column < 14 {
                    app.set_view(View::Dashboard);
                } else if mouse.column < 26 {
                    app.set_view(View::History);
                }
            }
        }

        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ViewOptions;
    use crate::source::ChannelSource;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> App {
        let (_tx, source) = ChannelSource::create("test");
        let mut app = App::new(Box::new(source), ViewOptions::default());
        app.reload_data();
        app
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn test_arrows_move_day_in_history() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('2')));
        assert_eq!(app.current_view, View::History);

        let today = app.today();
        handle_key_event(&mut app, key(KeyCode::Left));
        assert_eq!(app.cursor_date(), today.pred_opt().unwrap());
        handle_key_event(&mut app, key(KeyCode::Right));
        assert_eq!(app.cursor_date(), today);
        assert_eq!(app.current_view, View::History);
    }

    #[test]
    fn test_filter_input_mode() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        assert!(app.filter_active);

        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert_eq!(app.filter_text, "q");
        assert!(app.running);

        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.filter_active);
        handle_key_event(&mut app, key(KeyCode::Char('c')));
        assert!(app.filter_text.is_empty());
    }

    #[test]
    fn test_enter_and_escape_detail() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(app.show_detail_overlay);
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.show_detail_overlay);
    }
}
