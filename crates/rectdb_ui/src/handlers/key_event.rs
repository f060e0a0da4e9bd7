use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
    delegate::Editor,
    widgets::modal::{QueryAction, QueryModal},
};

/// Line editing keys shared by every text input.
macro_rules! handle_text_input {
    ($key:expr, $widget:expr) => {{
        match ($key.modifiers, $key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
                $widget.move_cursor_to_start();
                true
            }
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                $widget.move_cursor_to_end();
                true
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                $widget.clear();
                true
            }
            (_, KeyCode::Char(ch)) if !ch.is_control() => {
                $widget.add_char(ch);
                true
            }
            (_, KeyCode::Backspace) => {
                $widget.delete_char();
                true
            }
            (_, KeyCode::Left) => {
                $widget.move_cursor_left();
                true
            }
            (_, KeyCode::Right) => {
                $widget.move_cursor_right();
                true
            }
            (_, KeyCode::Home) => {
                $widget.move_cursor_to_start();
                true
            }
            (_, KeyCode::End) => {
                $widget.move_cursor_to_end();
                true
            }
            _ => false,
        }
    }};
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    Commit,
    Cancel,
}

/// Keys for an open inline cell editor.
pub fn handle_cell_editor_input(key: KeyEvent, editor: &mut Editor) -> EditorAction {
    match key.code {
        KeyCode::Esc => return EditorAction::Cancel,
        KeyCode::Enter | KeyCode::Tab => return EditorAction::Commit,
        _ => {}
    }
    match editor {
        Editor::Text(input) => {
            handle_text_input!(key, input);
        }
        Editor::Combo(combo) => match key.code {
            KeyCode::Down | KeyCode::Char('j') => combo.select_next(),
            KeyCode::Up | KeyCode::Char('k') => combo.select_previous(),
            KeyCode::Home => combo.set_current_index(0),
            KeyCode::End => combo.set_current_index(combo.count().saturating_sub(1)),
            _ => {}
        },
    }
    EditorAction::None
}

/// Keys for the query prompt.
pub fn handle_query_input(key: KeyEvent, modal: &mut QueryModal) -> QueryAction {
    match key.code {
        KeyCode::Esc => QueryAction::Close,
        KeyCode::Enter => {
            let sql = modal.sql().trim().to_string();
            if sql.is_empty() {
                QueryAction::None
            } else {
                QueryAction::Run(sql)
            }
        }
        KeyCode::Down | KeyCode::PageDown => {
            modal.scroll_down();
            QueryAction::None
        }
        KeyCode::Up | KeyCode::PageUp => {
            modal.scroll_up();
            QueryAction::None
        }
        _ => {
            handle_text_input!(key, modal.input);
            QueryAction::None
        }
    }
}
