use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::{Alignment, Buffer, Constraint, Layout, Rect, Widget},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::{
    color::{BASIC_COLORS, Rgb},
    delegate::CellIndex,
    widgets::{buttons::Buttons, centered_rect, text_input::TextInput},
};

const PALETTE_COLUMNS: usize = 4;
const CHANNEL_STEP: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorFocus {
    #[default]
    Palette,
    Red,
    Green,
    Blue,
    Hex,
    Buttons,
}

impl ColorFocus {
    const fn next(self) -> Self {
        match self {
            Self::Palette => Self::Red,
            Self::Red => Self::Green,
            Self::Green => Self::Blue,
            Self::Blue => Self::Hex,
            Self::Hex => Self::Buttons,
            Self::Buttons => Self::Palette,
        }
    }

    const fn previous(self) -> Self {
        match self {
            Self::Palette => Self::Buttons,
            Self::Red => Self::Palette,
            Self::Green => Self::Red,
            Self::Blue => Self::Green,
            Self::Hex => Self::Blue,
            Self::Buttons => Self::Hex,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Pending,
    Accepted(Rgb),
    Cancelled,
}

/// Modal color chooser for one grid cell.
#[derive(Debug, Clone)]
pub struct ColorDialog {
    index: CellIndex,
    color: Rgb,
    palette_pos: usize,
    focus: ColorFocus,
    hex: TextInput,
    selected_button: usize,
}

impl ColorDialog {
    /// Open for `index`. Without a usable initial color the dialog starts on
    /// white.
    #[must_use]
    pub fn open(index: CellIndex, initial: Option<Rgb>) -> Self {
        let color = initial.unwrap_or(Rgb::new(0xff, 0xff, 0xff));
        let palette_pos = BASIC_COLORS.iter().position(|c| *c == color).unwrap_or(0);
        Self {
            index,
            color,
            palette_pos,
            focus: ColorFocus::Palette,
            hex: TextInput::with_text(color.to_hex()),
            selected_button: 0,
        }
    }

    #[must_use]
    pub const fn index(&self) -> CellIndex {
        self.index
    }

    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }

    #[must_use]
    pub const fn focus(&self) -> ColorFocus {
        self.focus
    }

    fn set_color(&mut self, color: Rgb) {
        self.color = color;
        self.hex.set_text(color.to_hex());
    }

    fn move_palette(&mut self, step: usize, forward: bool) {
        let pos = if forward {
            self.palette_pos
                .checked_add(step)
                .filter(|pos| *pos < BASIC_COLORS.len())
        } else {
            self.palette_pos.checked_sub(step)
        };
        if let Some((pos, &color)) = pos.and_then(|pos| Some((pos, BASIC_COLORS.get(pos)?))) {
            self.palette_pos = pos;
            self.set_color(color);
        }
    }

    fn adjust_channel(&mut self, amount: u8, up: bool) {
        let mut color = self.color;
        let channel = match self.focus {
            ColorFocus::Red => &mut color.r,
            ColorFocus::Green => &mut color.g,
            ColorFocus::Blue => &mut color.b,
            ColorFocus::Palette | ColorFocus::Hex | ColorFocus::Buttons => return,
        };
        *channel = if up {
            channel.saturating_add(amount)
        } else {
            channel.saturating_sub(amount)
        };
        self.set_color(color);
    }

    fn hex_changed(&mut self) {
        if let Some(color) = Rgb::parse(self.hex.text()) {
            self.color = color;
        }
    }

    fn accept(&self) -> DialogOutcome {
        DialogOutcome::Accepted(self.color)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DialogOutcome {
        match key.code {
            KeyCode::Esc => return DialogOutcome::Cancelled,
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return DialogOutcome::Pending;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return DialogOutcome::Pending;
            }
            KeyCode::Enter => {
                return match self.focus {
                    ColorFocus::Buttons if self.selected_button == 1 => {
                        DialogOutcome::Cancelled
                    }
                    ColorFocus::Palette
                    | ColorFocus::Red
                    | ColorFocus::Green
                    | ColorFocus::Blue
                    | ColorFocus::Hex
                    | ColorFocus::Buttons => self.accept(),
                };
            }
            _ => {}
        }

        match self.focus {
            ColorFocus::Palette => match key.code {
                KeyCode::Left | KeyCode::Char('h') => self.move_palette(1, false),
                KeyCode::Right | KeyCode::Char('l') => self.move_palette(1, true),
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_palette(PALETTE_COLUMNS, false);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_palette(PALETTE_COLUMNS, true);
                }
                _ => {}
            },
            ColorFocus::Red | ColorFocus::Green | ColorFocus::Blue => match key.code {
                KeyCode::Left | KeyCode::Char('-') => self.adjust_channel(1, false),
                KeyCode::Right | KeyCode::Char('+' | '=') => self.adjust_channel(1, true),
                KeyCode::Down | KeyCode::PageDown => {
                    self.adjust_channel(CHANNEL_STEP, false);
                }
                KeyCode::Up | KeyCode::PageUp => self.adjust_channel(CHANNEL_STEP, true),
                _ => {}
            },
            ColorFocus::Hex => match key.code {
                KeyCode::Char(ch) if !ch.is_control() => {
                    self.hex.add_char(ch);
                    self.hex_changed();
                }
                KeyCode::Backspace => {
                    self.hex.delete_char();
                    self.hex_changed();
                }
                KeyCode::Left => self.hex.move_cursor_left(),
                KeyCode::Right => self.hex.move_cursor_right(),
                KeyCode::Home => self.hex.move_cursor_to_start(),
                KeyCode::End => self.hex.move_cursor_to_end(),
                _ => {}
            },
            ColorFocus::Buttons => {
                if matches!(key.code, KeyCode::Left | KeyCode::Right) {
                    self.selected_button = (self.selected_button + 1) % 2;
                }
            }
        }
        DialogOutcome::Pending
    }

    fn focused_style(&self, focus: ColorFocus) -> Style {
        if self.focus == focus {
            Style::default().fg(Color::Yellow).bg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        }
    }

    fn render_palette(&self, area: Rect, buf: &mut Buffer) {
        let lines = BASIC_COLORS
            .chunks(PALETTE_COLUMNS)
            .enumerate()
            .map(|(row, chunk)| {
                let spans = chunk
                    .iter()
                    .enumerate()
                    .flat_map(|(col, rgb)| {
                        let pos = row * PALETTE_COLUMNS + col;
                        let mark = if pos == self.palette_pos && self.focus == ColorFocus::Palette {
                            " ◆  "
                        } else {
                            "    "
                        };
                        [
                            Span::styled(mark, Style::default().bg((*rgb).into()).fg(rgb.contrast())),
                            Span::raw(" "),
                        ]
                    })
                    .collect::<Vec<_>>();
                Line::from(spans)
            })
            .collect::<Vec<_>>();
        Paragraph::new(lines).render(area, buf);
    }

    fn channel_line(&self, label: &'static str, value: u8, focus: ColorFocus) -> Line<'static> {
        let filled = usize::from(value) * 16 / 255;
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(16 - filled));
        Line::from(vec![
            Span::styled(format!("{label:<6}"), self.focused_style(focus)),
            Span::raw(" "),
            Span::raw(bar),
            Span::raw(format!(" {value:>3}")),
        ])
    }

    fn hex_line(&self) -> Line<'static> {
        let style = self.focused_style(ColorFocus::Hex);
        let mut spans = vec![Span::styled(format!("{:<6}", "Hex"), style), Span::raw(" ")];
        if self.focus == ColorFocus::Hex {
            let (before, after) = self.hex.split_at_cursor();
            spans.push(Span::raw(before.to_string()));
            spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(after.to_string()));
        } else {
            spans.push(Span::raw(self.hex.text().to_string()));
        }
        Line::from(spans)
    }
}

impl Widget for &ColorDialog {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let modal_area = centered_rect(area, 44, 16);

        let block = Block::default()
            .title("Select color")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .style(Style::default().bg(Color::Black));
        Clear.render(modal_area, buf);
        block.render(modal_area, buf);

        let [palette_area, _, channel_area, hex_area, preview_area, button_area] =
            Layout::vertical([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(1),
            ])
            .margin(1)
            .areas(modal_area);

        self.render_palette(palette_area, buf);

        Paragraph::new(vec![
            self.channel_line("Red", self.color.r, ColorFocus::Red),
            self.channel_line("Green", self.color.g, ColorFocus::Green),
            self.channel_line("Blue", self.color.b, ColorFocus::Blue),
        ])
        .render(channel_area, buf);

        Paragraph::new(self.hex_line()).render(hex_area, buf);

        Paragraph::new(Line::from(vec![
            Span::raw("Preview "),
            Span::styled(
                format!(" {} ", self.color.to_hex()),
                Style::default()
                    .bg(self.color.into())
                    .fg(self.color.contrast())
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
        .render(preview_area, buf);

        Buttons {
            labels: &["OK", "Cancel"],
            selected: (self.focus == ColorFocus::Buttons).then_some(self.selected_button),
        }
        .render(button_area, buf);
    }
}
