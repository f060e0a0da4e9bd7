use crossterm::event::KeyCode;

use crate::widgets::grid::GridView;

const PAGE_ROWS: usize = 10;

/// Moves the grid's current cell.
pub struct GridNavigationHandler;

impl GridNavigationHandler {
    /// Apply a navigation key. Returns `false` when `key` is not a
    /// navigation key.
    pub fn navigate(
        view: &mut GridView,
        key: KeyCode,
        row_count: usize,
        column_count: usize,
    ) -> bool {
        match key {
            KeyCode::Char('j') | KeyCode::Down => view.next_row(row_count, column_count),
            KeyCode::Char('k') | KeyCode::Up => view.previous_row(row_count, column_count),
            KeyCode::Char('h' | 'b') | KeyCode::Left | KeyCode::BackTab => {
                view.previous_column(column_count);
            }
            KeyCode::Char('l' | 'w') | KeyCode::Right | KeyCode::Tab => {
                view.next_column(column_count);
            }
            KeyCode::Char('g') | KeyCode::Home => view.first_row(row_count, column_count),
            KeyCode::Char('G') | KeyCode::End => view.last_row(row_count, column_count),
            KeyCode::Char('0') => {
                if let Some(&first) = view.visible_columns(column_count).first() {
                    Self::jump_to_column(view, first, row_count, column_count);
                }
            }
            KeyCode::Char('$') => {
                if let Some(&last) = view.visible_columns(column_count).last() {
                    Self::jump_to_column(view, last, row_count, column_count);
                }
            }
            KeyCode::PageDown => {
                for _ in 0..PAGE_ROWS {
                    view.next_row(row_count, column_count);
                }
            }
            KeyCode::PageUp => {
                for _ in 0..PAGE_ROWS {
                    view.previous_row(row_count, column_count);
                }
            }
            _ => return false,
        }
        true
    }

    fn jump_to_column(view: &mut GridView, col: usize, row_count: usize, column_count: usize) {
        if row_count == 0 {
            return;
        }
        let row = view.current_row().unwrap_or(0);
        view.select_row(row, column_count);
        if let Some(mut index) = view.current_index() {
            index.col = col;
            view.set_current_index(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::CellIndex;

    fn view() -> GridView {
        let mut view = GridView::new();
        view.bind();
        view.set_column_hidden(0, true);
        view
    }

    #[test]
    fn test_row_keys() {
        let mut view = view();
        assert!(GridNavigationHandler::navigate(&mut view, KeyCode::Char('j'), 5, 4));
        assert_eq!(view.current_index(), Some(CellIndex::new(0, 1)));
        GridNavigationHandler::navigate(&mut view, KeyCode::Down, 5, 4);
        assert_eq!(view.current_row(), Some(1));
        GridNavigationHandler::navigate(&mut view, KeyCode::Char('G'), 5, 4);
        assert_eq!(view.current_row(), Some(4));
        GridNavigationHandler::navigate(&mut view, KeyCode::PageUp, 5, 4);
        assert_eq!(view.current_row(), Some(0));
    }

    #[test]
    fn test_column_keys_skip_hidden() {
        let mut view = view();
        view.select_row(2, 4);
        GridNavigationHandler::navigate(&mut view, KeyCode::Char('$'), 5, 4);
        assert_eq!(view.current_index(), Some(CellIndex::new(2, 3)));
        GridNavigationHandler::navigate(&mut view, KeyCode::Char('0'), 5, 4);
        assert_eq!(view.current_index(), Some(CellIndex::new(2, 1)));
        GridNavigationHandler::navigate(&mut view, KeyCode::Left, 5, 4);
        assert_eq!(view.current_index(), Some(CellIndex::new(2, 1)));
    }

    #[test]
    fn test_other_keys_are_not_navigation() {
        let mut view = view();
        assert!(!GridNavigationHandler::navigate(&mut view, KeyCode::Char('x'), 5, 4));
        assert_eq!(view.current_index(), None);
    }

    #[test]
    fn test_empty_grid() {
        let mut view = view();
        GridNavigationHandler::navigate(&mut view, KeyCode::Char('j'), 0, 4);
        GridNavigationHandler::navigate(&mut view, KeyCode::Char('$'), 0, 4);
        assert_eq!(view.current_index(), None);
    }
}
