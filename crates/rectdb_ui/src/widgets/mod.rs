pub mod buttons;
pub mod color_dialog;
pub mod console;
pub mod grid;
pub mod hotkey;
pub mod hotkey_view;
pub mod menu;
pub mod modal;
pub mod style_combo;
pub mod text_input;
pub mod top_bar_view;

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

/// Widest line per column, headers included.
#[must_use]
pub fn column_widths(columns: &[String], rows: &[Vec<String>]) -> Vec<u16> {
    let mut result = columns
        .iter()
        .map(|name| UnicodeWidthStr::width(name.as_str()))
        .collect::<Vec<usize>>();

    for row in rows {
        for (max_width, value) in result.iter_mut().zip(row) {
            for line in value.lines() {
                *max_width = (*max_width).max(UnicodeWidthStr::width(line));
            }
        }
    }

    result
        .into_iter()
        .map(|width| u16::try_from(width).unwrap_or(u16::MAX))
        .collect()
}

/// A `width` x `height` rectangle centered in `area`, clipped to it.
#[must_use]
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_widths() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let rows = vec![
            vec!["1".to_string(), "rectangle".to_string()],
            vec!["1000".to_string(), "a\nbb".to_string()],
        ];
        assert_eq!(column_widths(&columns, &rows), vec![4, 9]);
    }

    #[test]
    fn test_centered_rect_is_clipped() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect(area, 10, 4), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_rect(area, 40, 40), area);
    }
}
