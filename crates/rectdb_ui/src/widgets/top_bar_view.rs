use ratatui::{
    prelude::{Alignment, Buffer, Constraint, Layout, Rect, Widget},
    style::{Modifier, Style},
    widgets::Paragraph,
};

use super::{hotkey::Hotkey, hotkey_view::HotkeyView};

/// Connection status, hotkeys and the window title.
pub struct TopBarView<'a> {
    pub status: &'a str,
    pub hotkeys: &'a [Hotkey<'a>],
    pub title: &'a str,
}

impl Widget for TopBarView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [status, hotkeys, title] = Layout::horizontal([
            Constraint::Percentage(30),
            Constraint::Percentage(50),
            Constraint::Percentage(20),
        ])
        .spacing(1)
        .areas(area);

        Paragraph::new(self.status).render(status, buf);
        HotkeyView {
            hotkeys: self.hotkeys,
        }
        .render(hotkeys, buf);
        Paragraph::new(self.title.trim_start())
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Right)
            .render(title, buf);
    }
}
