use ratatui::{
    prelude::{Buffer, Rect, Widget},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::hotkey::Hotkey;

/// Hotkeys laid out in columns, filling each column top to bottom.
pub struct HotkeyView<'a> {
    pub hotkeys: &'a [Hotkey<'a>],
}

const COLUMN_WIDTH: u16 = 18;

impl Widget for HotkeyView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let mut y = area.y;
        let mut x = area.x;

        for hotkey in self.hotkeys {
            if y >= area.bottom() {
                x += COLUMN_WIDTH;
                y = area.y;
            }
            if x >= area.right() {
                break;
            }

            let width = COLUMN_WIDTH.min(area.right() - x);
            let line = Line::from(vec![
                Span::styled(format!("<{hotkey}>"), Style::default().fg(Color::Cyan)),
                Span::raw(format!(" {}", hotkey.description)),
            ]);
            Paragraph::new(line).render(Rect::new(x, y, width, 1), buf);

            y += 1;
        }
    }
}
