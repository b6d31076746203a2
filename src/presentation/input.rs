use crate::application::{App, AppMode, WizardAction};
use crate::domain::DocumentKind;
use crate::infrastructure::CsvExporter;
use crossterm::event::{KeyCode, KeyModifiers};
use std::path::Path;

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Editing => Self::handle_editing_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::ConfirmDelete => Self::handle_confirm_delete_mode(app, key),
            AppMode::ExportCsv => Self::handle_filename_input_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('n') => {
                    app.click_forward();
                }
                KeyCode::Char('b') => {
                    app.click(WizardAction::Back);
                }
                KeyCode::Char('e') => app.start_csv_export(),
                KeyCode::Char('q') => app.should_quit = true,
                _ => {}
            }
            return;
        }

        app.status_message = None;

        match key {
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.show_help();
                return;
            }
            KeyCode::Esc => {
                if app.alert.is_some() {
                    app.dismiss_alert();
                } else {
                    app.click(WizardAction::Cancel);
                }
                return;
            }
            _ => {}
        }

        if app.flags.read_only {
            if key == KeyCode::Enter {
                app.click(WizardAction::ReturnHome);
            }
        } else if app.is_reviewing() {
            Self::handle_review_keys(app, key);
        } else {
            Self::handle_form_keys(app, key);
        }
    }

    fn handle_review_keys(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => app.select_previous_item(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next_item(),
            KeyCode::Enter | KeyCode::Char('e') => app.edit_selected_item(),
            KeyCode::Delete | KeyCode::Char('d') => app.request_delete_selected(),
            KeyCode::Char('w') => app.start_add(DocumentKind::WeightTicket),
            KeyCode::Char('p') => app.start_add(DocumentKind::ProGear),
            KeyCode::Char('g') if app.options.features.gun_safe => {
                app.start_add(DocumentKind::GunSafe)
            }
            KeyCode::Char('x') => app.start_add(DocumentKind::Expense),
            _ => {}
        }
    }

    fn handle_form_keys(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::BackTab => app.select_previous_field(),
            KeyCode::Down | KeyCode::Tab => app.select_next_field(),
            KeyCode::Enter | KeyCode::Char(' ') => app.activate_selected_field(),
            KeyCode::Char('y') => app.set_selected_flag(true),
            KeyCode::Char('n') => app.set_selected_flag(false),
            KeyCode::Left => app.cycle_choice(false),
            KeyCode::Right => app.cycle_choice(true),
            KeyCode::Backspace => app.remove_last_file(),
            _ => {}
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                app.finish_editing();
            }
            KeyCode::Esc => {
                app.cancel_editing();
            }
            key => edit_line(&mut app.input, &mut app.cursor_position, key),
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
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

    fn handle_confirm_delete_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
            _ => {}
        }
    }

    fn handle_filename_input_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                let filename = app.get_csv_export_filename();
                let path = Path::new(&filename);
                let result = CsvExporter::export_to_path(&app.summary(), &app.review(), path)
                    .map(|()| filename)
                    .map_err(|err| err.to_string());
                app.set_csv_export_result(result);
            }
            KeyCode::Esc => {
                app.cancel_filename_input();
            }
            key => edit_line(&mut app.filename_input, &mut app.cursor_position, key),
        }
    }
}

/// Applies a line-editing key to `buffer`. `cursor` is a byte offset and
/// always stays on a char boundary.
fn edit_line(buffer: &mut String, cursor: &mut usize, key: KeyCode) {
    let before = |buffer: &String, cursor: usize| buffer[..cursor].chars().next_back();
    let after = |buffer: &String, cursor: usize| buffer[cursor..].chars().next();
    match key {
        KeyCode::Backspace => {
            if let Some(c) = before(buffer, *cursor) {
                *cursor -= c.len_utf8();
                buffer.remove(*cursor);
            }
        }
        KeyCode::Delete => {
            if after(buffer, *cursor).is_some() {
                buffer.remove(*cursor);
            }
        }
        KeyCode::Left => {
            if let Some(c) = before(buffer, *cursor) {
                *cursor -= c.len_utf8();
            }
        }
        KeyCode::Right => {
            if let Some(c) = after(buffer, *cursor) {
                *cursor += c.len_utf8();
            }
        }
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = buffer.len(),
        KeyCode::Char(c) => {
            buffer.insert(*cursor, c);
            *cursor += c.len_utf8();
        }
        _ => {}
    }
}
