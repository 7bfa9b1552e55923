use crate::application::{App, AppMode, FormField};
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Browsing => Self::handle_browsing_mode(app, key, modifiers),
            AppMode::EntryForm => Self::handle_form_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::ExportCsv => Self::handle_export_mode(app, key),
        }
    }

    /// A left click inside the map panel picks that location for a new
    /// workout. Clicks elsewhere are ignored.
    pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return;
        }
        if matches!(app.mode, AppMode::Help | AppMode::ExportCsv) {
            return;
        }
        if let Some(coords) = app.map_cell_to_coords(mouse.column, mouse.row) {
            app.on_location_picked(coords);
        }
    }

    fn handle_browsing_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('e') => {
                    app.start_csv_export();
                    return;
                }
                KeyCode::Char('r') => {
                    app.reset();
                    return;
                }
                _ => {}
            }
        }

        app.status_message = None;

        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                app.move_selection_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.move_selection_down();
            }
            KeyCode::Enter => {
                app.activate_selected();
            }
            KeyCode::Char('+') => {
                if app.map_zoom < 20 {
                    app.map_zoom += 1;
                }
            }
            KeyCode::Char('-') => {
                if app.map_zoom > 1 {
                    app.map_zoom -= 1;
                }
            }
            KeyCode::Char('e') => {
                app.start_csv_export();
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Char('q') => {
                // Will be handled by main loop
            }
            _ => {}
        }
    }

    fn handle_form_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                app.submit_entry();
            }
            KeyCode::Esc => {
                app.cancel_entry();
            }
            KeyCode::Tab | KeyCode::Down => {
                app.focus_next_field();
            }
            KeyCode::BackTab | KeyCode::Up => {
                app.focus_previous_field();
            }
            KeyCode::Char(' ') if app.focused_field == FormField::Kind => {
                app.toggle_form_kind();
            }
            KeyCode::Left if app.focused_field == FormField::Kind => {
                app.toggle_form_kind();
            }
            KeyCode::Right if app.focused_field == FormField::Kind => {
                app.toggle_form_kind();
            }
            KeyCode::Backspace => {
                let cursor = app.cursor_position;
                let removed = app.focused_input_mut().is_some_and(|input| {
                    if cursor > 0 && cursor <= input.len() {
                        input.remove(cursor - 1);
                        true
                    } else {
                        false
                    }
                });
                if removed {
                    app.cursor_position -= 1;
                }
            }
            KeyCode::Delete => {
                let cursor = app.cursor_position;
                if let Some(input) = app.focused_input_mut() {
                    if cursor < input.len() {
                        input.remove(cursor);
                    }
                }
            }
            KeyCode::Left => {
                if app.cursor_position > 0 {
                    app.cursor_position -= 1;
                }
            }
            KeyCode::Right => {
                let len = app.focused_input().map_or(0, |s| s.len());
                if app.cursor_position < len {
                    app.cursor_position += 1;
                }
            }
            KeyCode::Home => {
                app.cursor_position = 0;
            }
            KeyCode::End => {
                app.cursor_position = app.focused_input().map_or(0, |s| s.len());
            }
            KeyCode::Char(c) if is_numeric_char(c) => {
                let cursor = app.cursor_position;
                let new_cursor = app.focused_input_mut().map(|input| {
                    let cursor = cursor.min(input.len());
                    input.insert(cursor, c);
                    cursor + 1
                });
                if let Some(new_cursor) = new_cursor {
                    app.cursor_position = new_cursor;
                }
            }
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Browsing;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if app.help_scroll > 0 {
                    app.help_scroll -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_export_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                app.finish_csv_export();
            }
            KeyCode::Esc => {
                app.cancel_csv_export();
            }
            KeyCode::Backspace => {
                if app.cursor_position > 0 {
                    app.filename_input.remove(app.cursor_position - 1);
                    app.cursor_position -= 1;
                }
            }
            KeyCode::Delete => {
                if app.cursor_position < app.filename_input.len() {
                    app.filename_input.remove(app.cursor_position);
                }
            }
            KeyCode::Left => {
                if app.cursor_position > 0 {
                    app.cursor_position -= 1;
                }
            }
            KeyCode::Right => {
                if app.cursor_position < app.filename_input.len() {
                    app.cursor_position += 1;
                }
            }
            KeyCode::Home => {
                app.cursor_position = 0;
            }
            KeyCode::End => {
                app.cursor_position = app.filename_input.len();
            }
            KeyCode::Char(c) if c.is_ascii() && !c.is_ascii_control() => {
                app.filename_input.insert(app.cursor_position, c);
                app.cursor_position += 1;
            }
            _ => {}
        }
    }
}

// The form fields hold decimal numbers only
fn is_numeric_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{App, AppMode};
    use crate::domain::{Coordinates, WorkoutKind};
    use crate::infrastructure::MemoryStore;

    fn test_app() -> App {
        App::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_csv_export_key_binding() {
        let mut app = test_app();
        assert!(matches!(app.mode, AppMode::Browsing));

        InputHandler::handle_key_event(&mut app, KeyCode::Char('e'), KeyModifiers::NONE);

        assert!(matches!(app.mode, AppMode::ExportCsv));
        assert_eq!(app.filename_input, "workouts.csv");
    }

    #[test]
    fn test_reset_key_binding() {
        let mut app = test_app();
        app.on_location_picked(Coordinates::new(51.5, -0.1));
        app.distance_input = "5".to_string();
        app.duration_input = "30".to_string();
        app.extra_input = "160".to_string();
        InputHandler::handle_key_event(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.store.len(), 1);

        InputHandler::handle_key_event(&mut app, KeyCode::Char('r'), KeyModifiers::CONTROL);

        assert!(app.store.is_empty());
    }

    #[test]
    fn test_map_click_opens_form() {
        let mut app = test_app();
        app.map_area = Some((10, 2, 60, 20));

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 30,
            row: 10,
            modifiers: KeyModifiers::NONE,
        };
        InputHandler::handle_mouse_event(&mut app, click);

        assert!(matches!(app.mode, AppMode::EntryForm));
        assert!(app.pending_location.is_some());
    }

    #[test]
    fn test_click_outside_map_is_ignored() {
        let mut app = test_app();
        app.map_area = Some((10, 2, 60, 20));

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 2,
            row: 10,
            modifiers: KeyModifiers::NONE,
        };
        InputHandler::handle_mouse_event(&mut app, click);

        assert!(matches!(app.mode, AppMode::Browsing));
        assert!(app.pending_location.is_none());
    }

    #[test]
    fn test_form_typing_and_field_navigation() {
        let mut app = test_app();
        app.on_location_picked(Coordinates::new(51.5, -0.1));

        InputHandler::handle_key_event(&mut app, KeyCode::Char('5'), KeyModifiers::NONE);
        assert_eq!(app.distance_input, "5");

        // Letters are not accepted in numeric fields
        InputHandler::handle_key_event(&mut app, KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(app.distance_input, "5");

        InputHandler::handle_key_event(&mut app, KeyCode::Tab, KeyModifiers::NONE);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('3'), KeyModifiers::NONE);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('0'), KeyModifiers::NONE);
        assert_eq!(app.duration_input, "30");

        InputHandler::handle_key_event(&mut app, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.duration_input, "3");
    }

    #[test]
    fn test_space_toggles_kind_on_kind_field() {
        let mut app = test_app();
        app.on_location_picked(Coordinates::new(51.5, -0.1));

        // Cycle focus back to the kind selector
        InputHandler::handle_key_event(&mut app, KeyCode::BackTab, KeyModifiers::NONE);
        assert_eq!(app.focused_field, FormField::Kind);

        InputHandler::handle_key_event(&mut app, KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(app.form_kind, WorkoutKind::Cycling);
    }

    #[test]
    fn test_escape_cancels_form() {
        let mut app = test_app();
        app.on_location_picked(Coordinates::new(51.5, -0.1));
        app.distance_input = "5".to_string();

        InputHandler::handle_key_event(&mut app, KeyCode::Esc, KeyModifiers::NONE);

        assert!(matches!(app.mode, AppMode::Browsing));
        assert!(app.pending_location.is_none());
        assert!(app.distance_input.is_empty());
    }

    #[test]
    fn test_help_mode_toggle() {
        let mut app = test_app();
        InputHandler::handle_key_event(&mut app, KeyCode::Char('?'), KeyModifiers::NONE);
        assert!(matches!(app.mode, AppMode::Help));
        InputHandler::handle_key_event(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(matches!(app.mode, AppMode::Browsing));
    }
}
