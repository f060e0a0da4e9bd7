use crossterm::event::{KeyCode, KeyEvent};
use rectdb_db::QueryOutput;
use ratatui::{
    prelude::{Alignment, Buffer, Constraint, Layout, Rect, Widget},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row,
        StatefulWidget, Table, Wrap,
    },
};

use crate::widgets::{
    buttons::Buttons, centered_rect, column_widths, text_input::TextInput,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryAction {
    None,
    Run(String),
    Close,
}

/// What the last statement produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResultView {
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Message(String),
    Error(String),
}

impl From<QueryOutput> for QueryResultView {
    fn from(output: QueryOutput) -> Self {
        match output {
            QueryOutput::Rows { columns, rows } => Self::Rows { columns, rows },
            QueryOutput::Affected(n) => Self::Message(format!("{n} row(s) affected")),
        }
    }
}

/// SQL prompt with the result of the last run underneath.
#[derive(Debug, Clone, Default)]
pub struct QueryModal {
    pub input: TextInput,
    result: Option<QueryResultView>,
    scroll: usize,
}

impl QueryModal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        self.input.text()
    }

    #[must_use]
    pub const fn result(&self) -> Option<&QueryResultView> {
        self.result.as_ref()
    }

    pub fn set_result(&mut self, result: QueryResultView) {
        self.result = Some(result);
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self) {
        if let Some(QueryResultView::Rows { rows, .. }) = &self.result
            && self.scroll + 1 < rows.len()
        {
            self.scroll += 1;
        }
    }

    pub const fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    fn render_result(&self, area: Rect, buf: &mut Buffer) {
        match &self.result {
            None => {
                Paragraph::new("Enter runs the statement, Esc closes")
                    .style(Style::default().fg(Color::DarkGray))
                    .render(area, buf);
            }
            Some(QueryResultView::Message(message)) => {
                Paragraph::new(message.as_str())
                    .style(Style::default().fg(Color::Green))
                    .render(area, buf);
            }
            Some(QueryResultView::Error(message)) => {
                Paragraph::new(message.as_str())
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true })
                    .render(area, buf);
            }
            Some(QueryResultView::Rows { columns, rows }) => {
                let widths = column_widths(columns, rows);
                let header = columns
                    .iter()
                    .map(|name| Cell::from(name.clone()))
                    .collect::<Row>()
                    .style(Style::default().add_modifier(Modifier::BOLD))
                    .height(1);
                let body = rows.iter().skip(self.scroll).map(|row| {
                    row.iter()
                        .map(|value| Cell::from(value.clone()))
                        .collect::<Row>()
                        .height(1)
                });
                let constraints = widths
                    .iter()
                    .map(|&w| Constraint::Length(w))
                    .collect::<Vec<_>>();
                let footer = Row::new([Cell::from(format!("{} row(s)", rows.len()))])
                    .style(Style::default().fg(Color::DarkGray));
                Widget::render(
                    Table::new(body, constraints).header(header).footer(footer),
                    area,
                    buf,
                );
            }
        }
    }
}

impl Widget for &QueryModal {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = (area.width * 4 / 5).max(40);
        let height = (area.height * 7 / 10).max(10);
        let modal_area = centered_rect(area, width, height);

        let block = Block::default()
            .title("Do query")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .style(Style::default().bg(Color::Black));
        Clear.render(modal_area, buf);
        block.render(modal_area, buf);

        let [prompt_area, _, result_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .margin(1)
        .areas(modal_area);

        let (before, after) = self.input.split_at_cursor();
        Paragraph::new(Line::from(vec![
            Span::styled("SQL> ", Style::default().fg(Color::Cyan)),
            Span::raw(before),
            Span::styled("▏", Style::default().fg(Color::Yellow)),
            Span::raw(after),
        ]))
        .render(prompt_area, buf);

        self.render_result(result_area, buf);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerAction {
    None,
    Picked(String),
    Cancel,
}

/// Chooses one of the connection's tables.
#[derive(Debug, Clone, Default)]
pub struct TablePicker {
    tables: Vec<String>,
    selected: usize,
}

impl TablePicker {
    /// `current` is preselected when present.
    #[must_use]
    pub fn new(tables: Vec<String>, current: Option<&str>) -> Self {
        let selected = current
            .and_then(|name| tables.iter().position(|t| t == name))
            .unwrap_or(0);
        Self { tables, selected }
    }

    #[must_use]
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.tables.get(self.selected).map(String::as_str)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => PickerAction::Cancel,
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.tables.len() {
                    self.selected += 1;
                }
                PickerAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                PickerAction::None
            }
            KeyCode::Enter => self
                .selected()
                .map_or(PickerAction::Cancel, |name| PickerAction::Picked(name.to_string())),
            _ => PickerAction::None,
        }
    }
}

impl Widget for &TablePicker {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = u16::try_from(self.tables.len())
            .unwrap_or(u16::MAX)
            .saturating_add(4)
            .min(area.height);
        let modal_area = centered_rect(area, 40, height.max(6));

        let block = Block::default()
            .title("Select table")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .style(Style::default().bg(Color::Black));
        Clear.render(modal_area, buf);
        let inner = block.inner(modal_area);
        block.render(modal_area, buf);

        let [list_area, buttons_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        if self.tables.is_empty() {
            Paragraph::new("No tables")
                .alignment(Alignment::Center)
                .render(list_area, buf);
        } else {
            let items = self
                .tables
                .iter()
                .map(|name| ListItem::new(name.as_str()))
                .collect::<Vec<_>>();
            let list = List::new(items)
                .highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow))
                .highlight_symbol("▸ ");
            let mut state = ListState::default().with_selected(Some(self.selected));
            StatefulWidget::render(list, list_area, buf, &mut state);
        }

        Buttons {
            labels: &["Enter: select", "Esc: cancel"],
            selected: None,
        }
        .render(buttons_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_picker_preselects_current() {
        let picker = TablePicker::new(
            vec!["alpha".into(), "rectangle".into()],
            Some("rectangle"),
        );
        assert_eq!(picker.selected(), Some("rectangle"));
    }

    #[test]
    fn test_picker_navigation_and_pick() {
        let mut picker =
            TablePicker::new(vec!["a".into(), "b".into(), "c".into()], None);
        assert_eq!(picker.handle_key(key(KeyCode::Up)), PickerAction::None);
        assert_eq!(picker.selected(), Some("a"));
        picker.handle_key(key(KeyCode::Down));
        picker.handle_key(key(KeyCode::Down));
        picker.handle_key(key(KeyCode::Down));
        assert_eq!(
            picker.handle_key(key(KeyCode::Enter)),
            PickerAction::Picked("c".into())
        );
        assert_eq!(picker.handle_key(key(KeyCode::Esc)), PickerAction::Cancel);
    }

    #[test]
    fn test_empty_picker_cancels_on_enter() {
        let mut picker = TablePicker::new(Vec::new(), Some("rectangle"));
        assert_eq!(picker.selected(), None);
        assert_eq!(picker.handle_key(key(KeyCode::Enter)), PickerAction::Cancel);
    }

    #[test]
    fn test_result_from_output() {
        assert_eq!(
            QueryResultView::from(QueryOutput::Affected(3)),
            QueryResultView::Message("3 row(s) affected".into())
        );
        let rows = QueryResultView::from(QueryOutput::Rows {
            columns: vec!["n".into()],
            rows: vec![vec!["1".into()], vec!["2".into()]],
        });
        let mut modal = QueryModal::new();
        modal.set_result(rows);
        modal.scroll_down();
        modal.scroll_down();
        assert_eq!(modal.scroll, 1);
        modal.scroll_up();
        modal.scroll_up();
        assert_eq!(modal.scroll, 0);
    }
}
