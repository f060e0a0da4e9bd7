use ratatui::{
    prelude::{Buffer, Rect, Widget},
    style::{Color, Style},
    text::{Line, Span},
};

/// A centered row of dialog buttons; `selected` is highlighted.
pub struct Buttons<'a> {
    pub labels: &'a [&'a str],
    pub selected: Option<usize>,
}

impl Widget for Buttons<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![];
        for (i, label) in self.labels.iter().enumerate() {
            let bg = if self.selected == Some(i) {
                Color::Blue
            } else {
                Color::DarkGray
            };
            spans.push(Span::styled(
                format!(" {label} "),
                Style::default().fg(Color::White).bg(bg),
            ));
            spans.push(Span::raw(" "));
        }
        Line::from(spans).centered().render(area, buf);
    }
}
