use rectdb_db::PenStyle;
use ratatui::{
    prelude::{Buffer, Rect, Widget},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, StatefulWidget},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboItem {
    pub label: &'static str,
    pub data: i64,
}

/// Drop-down list of labelled integer values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleCombo {
    items: Vec<ComboItem>,
    current: usize,
    editable: bool,
}

impl StyleCombo {
    /// Non-editable combo listing every [`PenStyle`]; item data is the
    /// style's integer value.
    #[must_use]
    pub fn pen_styles() -> Self {
        let items = PenStyle::ALL
            .iter()
            .map(|style| ComboItem {
                label: style.name(),
                data: style.value(),
            })
            .collect();
        Self {
            items,
            current: 0,
            editable: false,
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub const fn is_editable(&self) -> bool {
        self.editable
    }

    #[must_use]
    pub fn item_data(&self, index: usize) -> Option<i64> {
        self.items.get(index).map(|item| item.data)
    }

    #[must_use]
    pub fn item_label(&self, index: usize) -> Option<&'static str> {
        self.items.get(index).map(|item| item.label)
    }

    #[must_use]
    pub fn find_data(&self, data: i64) -> Option<usize> {
        self.items.iter().position(|item| item.data == data)
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    pub fn set_current_index(&mut self, index: usize) {
        if index < self.items.len() {
            self.current = index;
        }
    }

    #[must_use]
    pub fn current_data(&self) -> Option<i64> {
        self.item_data(self.current)
    }

    pub fn select_next(&mut self) {
        if self.current + 1 < self.items.len() {
            self.current += 1;
        }
    }

    pub const fn select_previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }
}

impl Widget for &StyleCombo {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = u16::try_from(self.items.len())
            .unwrap_or(u16::MAX)
            .saturating_add(2);
        let width = self
            .items
            .iter()
            .map(|item| u16::try_from(item.label.len()).unwrap_or(u16::MAX))
            .max()
            .unwrap_or(0)
            .saturating_add(6);
        let popup = Rect::new(
            area.x,
            area.y,
            width.min(area.width),
            height.min(area.height),
        );

        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| ListItem::new(Line::from(item.label)))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .style(Style::default().bg(Color::Black)),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▸ ");

        let mut state = ListState::default().with_selected(Some(self.current));
        Clear.render(popup, buf);
        StatefulWidget::render(list, popup, buf, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pen_styles_items() {
        let combo = StyleCombo::pen_styles();
        assert!(!combo.is_editable());
        assert_eq!(combo.count(), 6);
        assert_eq!(combo.item_data(0), Some(PenStyle::NoPen.value()));
        assert_eq!(combo.item_data(1), Some(PenStyle::SolidLine.value()));
        assert_eq!(combo.item_data(2), Some(PenStyle::DashLine.value()));
        assert_eq!(combo.item_data(3), Some(PenStyle::DotLine.value()));
        assert_eq!(combo.item_data(4), Some(PenStyle::DashDotLine.value()));
        assert_eq!(combo.item_data(5), Some(PenStyle::DashDotDotLine.value()));
        assert_eq!(combo.item_data(6), None);
        assert_eq!(combo.item_label(4), Some("DashDotLine"));
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut combo = StyleCombo::pen_styles();
        combo.select_previous();
        assert_eq!(combo.current_index(), 0);
        combo.set_current_index(5);
        combo.select_next();
        assert_eq!(combo.current_index(), 5);
        combo.set_current_index(42);
        assert_eq!(combo.current_index(), 5);
        assert_eq!(combo.find_data(3), Some(3));
        assert_eq!(combo.find_data(9999), None);
    }
}
