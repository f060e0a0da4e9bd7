use std::collections::VecDeque;

use ratatui::{
    prelude::*,
    style::Style,
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use tracing::Level;

const DEFAULT_CAPACITY: usize = 500;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleLine {
    pub level: Level,
    pub message: String,
}

/// Scrollback of diagnostics shown under the grid.
#[derive(Clone, Debug)]
pub struct Console {
    lines: VecDeque<ConsoleLine>,
    capacity: usize,
}

impl Default for Console {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Console {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    /// Append a line, dropping the oldest once full.
    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(ConsoleLine {
            level,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::INFO, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Level::WARN, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::ERROR, message);
    }

    #[must_use]
    pub fn last(&self) -> Option<&ConsoleLine> {
        self.lines.back()
    }

    pub fn lines(&self) -> impl Iterator<Item = &ConsoleLine> {
        self.lines.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

fn level_style(level: Level) -> Style {
    match level {
        Level::ERROR => Style::default().fg(Color::Red),
        Level::WARN => Style::default().fg(Color::Yellow),
        Level::INFO => Style::default().fg(Color::White),
        _ => Style::default().fg(Color::DarkGray),
    }
}

impl Widget for &Console {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Console")
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let visible = usize::from(inner.height);
        let skip = self.lines.len().saturating_sub(visible);
        let text = self
            .lines
            .iter()
            .skip(skip)
            .map(|line| {
                Line::from(vec![
                    Span::styled(format!("{:<5} ", line.level.to_string()), level_style(line.level)),
                    Span::raw(line.message.clone()),
                ])
            })
            .collect::<Vec<_>>();

        Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_last() {
        let mut console = Console::new();
        assert!(console.is_empty());
        console.info("connected");
        console.warn("table missing");
        assert_eq!(console.len(), 2);
        let last = console.last().unwrap();
        assert_eq!(last.level, Level::WARN);
        assert_eq!(last.message, "table missing");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut console = Console::with_capacity(2);
        console.info("one");
        console.info("two");
        console.error("three");
        let messages: Vec<&str> = console.lines().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, vec!["two", "three"]);
        console.clear();
        assert!(console.last().is_none());
    }
}
