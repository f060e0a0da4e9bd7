//! Per-column cell customization for the grid.
//!
//! A delegate decides which editor a cell gets, moves values between that
//! editor and the model, reacts to events that need no inline editor, and
//! paints the cell.

use rectdb_db::{
    Result, SqlTableModel, Value,
    rectangle::{PEN_COLOR_COLUMN, PEN_STYLE_COLUMN},
    style_label,
    value::{as_integer, as_text, display_value},
};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use rusqlite::Connection as SqliteConnection;

use crate::{
    color::Rgb,
    widgets::{style_combo::StyleCombo, text_input::TextInput},
};

/// Model coordinates of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellIndex {
    pub row: usize,
    pub col: usize,
}

impl CellIndex {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Inline editor created for a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Editor {
    Text(TextInput),
    Combo(StyleCombo),
}

/// Input a delegate may handle without opening an inline editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// Enter on the current cell; a left double-click in pointer terms.
    Activate,
    /// A single press, such as Space.
    Press,
    /// Activation with the secondary action (Shift+Enter).
    SecondaryActivate,
}

/// What the delegate wants done after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Not handled; the view falls back to its default editing.
    Ignored,
    /// Open the color dialog for the cell, seeded with `initial`.
    ChooseColor { index: CellIndex, initial: Option<Rgb> },
}

impl EventOutcome {
    #[must_use]
    pub const fn is_handled(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Hook customizing editing and painting of grid cells.
pub trait ItemDelegate: std::fmt::Debug + Send + Sync {
    fn create_editor(&self, _index: CellIndex) -> Editor {
        Editor::Text(TextInput::new())
    }

    fn set_editor_data(&self, editor: &mut Editor, value: &Value) {
        if let Editor::Text(input) = editor {
            input.set_text(as_text(value).unwrap_or_default());
        }
    }

    /// Write the editor's value into the model.
    ///
    /// # Errors
    ///
    /// Returns the model's error when the write fails.
    fn set_model_data(
        &self,
        editor: &Editor,
        model: &mut SqlTableModel,
        conn: &SqliteConnection,
        index: CellIndex,
    ) -> Result<()> {
        match editor {
            Editor::Text(input) => {
                model.set_data(conn, index.row, index.col, text_to_value(input.text()))
            }
            Editor::Combo(combo) => match combo.current_data() {
                Some(data) => model.set_data(conn, index.row, index.col, Value::Integer(data)),
                None => Ok(()),
            },
        }
    }

    fn editor_event(
        &self,
        _event: EditorEvent,
        _index: CellIndex,
        _value: &Value,
    ) -> EventOutcome {
        EventOutcome::Ignored
    }

    fn paint(&self, _index: CellIndex, value: &Value) -> Line<'static> {
        Line::from(display_value(value))
    }
}

/// Text in, integer out when it parses as one; empty text is NULL.
#[must_use]
pub fn text_to_value(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    trimmed
        .parse::<i64>()
        .map_or_else(|_| Value::Text(text.to_string()), Value::Integer)
}

/// Plain text editing and painting.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextDelegate;

impl ItemDelegate for TextDelegate {}

/// Delegate for the `rectangle` table: a style drop-down on the pen style
/// column and a color dialog on the pen color column.
#[derive(Debug, Default, Clone, Copy)]
pub struct RectangleDelegate;

impl RectangleDelegate {
    pub const PEN_COLOR_COLUMN: usize = PEN_COLOR_COLUMN;
    pub const PEN_STYLE_COLUMN: usize = PEN_STYLE_COLUMN;

    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ItemDelegate for RectangleDelegate {
    fn create_editor(&self, index: CellIndex) -> Editor {
        if index.col == Self::PEN_STYLE_COLUMN {
            Editor::Combo(StyleCombo::pen_styles())
        } else {
            Editor::Text(TextInput::new())
        }
    }

    fn set_editor_data(&self, editor: &mut Editor, value: &Value) {
        match editor {
            Editor::Combo(combo) => {
                let position = as_integer(value)
                    .and_then(|style| combo.find_data(style))
                    .unwrap_or(0);
                combo.set_current_index(position);
            }
            Editor::Text(input) => input.set_text(as_text(value).unwrap_or_default()),
        }
    }

    fn editor_event(
        &self,
        event: EditorEvent,
        index: CellIndex,
        value: &Value,
    ) -> EventOutcome {
        if index.col != Self::PEN_COLOR_COLUMN || event != EditorEvent::Activate {
            return EventOutcome::Ignored;
        }
        let initial = as_text(value).and_then(|text| Rgb::parse(&text));
        EventOutcome::ChooseColor { index, initial }
    }

    fn paint(&self, index: CellIndex, value: &Value) -> Line<'static> {
        match index.col {
            Self::PEN_STYLE_COLUMN => {
                let label = as_integer(value).map_or_else(|| display_value(value), style_label);
                Line::from(vec![
                    Span::styled(
                        format!(" {label} "),
                        Style::default().fg(Color::White).bg(Color::DarkGray),
                    ),
                    Span::styled("▾", Style::default().fg(Color::Black).bg(Color::Gray)),
                ])
            }
            Self::PEN_COLOR_COLUMN => {
                let text = as_text(value).unwrap_or_default();
                match Rgb::parse(&text) {
                    Some(rgb) => Line::from(vec![
                        Span::styled("  ", Style::default().bg(rgb.into())),
                        Span::raw(format!(" {}", rgb.to_hex())),
                    ]),
                    None => Line::from(display_value(value)),
                }
            }
            _ => Line::from(display_value(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use rectdb_db::{EditStrategy, PenStyle, rectangle};

    use super::*;

    fn model() -> (SqliteConnection, SqlTableModel) {
        let conn = SqliteConnection::open_in_memory().unwrap();
        rectangle::create_table(&conn, rectangle::TABLE).unwrap();
        rectangle::insert_samples(&conn, rectangle::TABLE).unwrap();
        let mut model = SqlTableModel::new();
        model.set_table(&conn, rectangle::TABLE).unwrap();
        model.set_edit_strategy(EditStrategy::OnFieldChange);
        model.select(&conn).unwrap();
        (conn, model)
    }

    const STYLE: CellIndex = CellIndex::new(0, RectangleDelegate::PEN_STYLE_COLUMN);
    const COLOR: CellIndex = CellIndex::new(0, RectangleDelegate::PEN_COLOR_COLUMN);
    const ID: CellIndex = CellIndex::new(0, 0);

    #[test]
    fn test_create_editor_style_column_is_combo() {
        let delegate = RectangleDelegate::new();
        let Editor::Combo(combo) = delegate.create_editor(STYLE) else {
            panic!("style column should get a combo");
        };
        assert!(!combo.is_editable());
        assert_eq!(combo.count(), 6);
        assert_eq!(combo.item_data(0), Some(PenStyle::NoPen.value()));
        assert_eq!(combo.item_data(5), Some(PenStyle::DashDotDotLine.value()));
    }

    #[test]
    fn test_create_editor_other_column_is_text() {
        let delegate = RectangleDelegate::new();
        assert!(matches!(delegate.create_editor(ID), Editor::Text(_)));
        assert!(matches!(delegate.create_editor(COLOR), Editor::Text(_)));
    }

    #[test]
    fn test_set_editor_data_selects_matching_style() {
        let delegate = RectangleDelegate::new();
        let mut editor = delegate.create_editor(STYLE);
        delegate.set_editor_data(&mut editor, &Value::Integer(PenStyle::DashLine.value()));
        let Editor::Combo(combo) = editor else {
            panic!("expected combo");
        };
        assert_eq!(combo.current_data(), Some(PenStyle::DashLine.value()));
    }

    #[test]
    fn test_set_editor_data_unknown_style_falls_back_to_first() {
        let delegate = RectangleDelegate::new();
        let mut editor = delegate.create_editor(STYLE);
        if let Editor::Combo(combo) = &mut editor {
            combo.set_current_index(3);
        }
        delegate.set_editor_data(&mut editor, &Value::Integer(9999));
        let Editor::Combo(combo) = editor else {
            panic!("expected combo");
        };
        assert_eq!(combo.current_index(), 0);
        assert_eq!(combo.current_data(), Some(PenStyle::NoPen.value()));
    }

    #[test]
    fn test_set_model_data_writes_style_int() {
        let (conn, mut model) = model();
        let delegate = RectangleDelegate::new();
        let mut editor = delegate.create_editor(STYLE);
        if let Editor::Combo(combo) = &mut editor {
            let pos = combo.find_data(PenStyle::DotLine.value()).unwrap();
            combo.set_current_index(pos);
        }

        delegate
            .set_model_data(&editor, &mut model, &conn, STYLE)
            .unwrap();
        assert_eq!(
            model.data(0, RectangleDelegate::PEN_STYLE_COLUMN),
            Some(&Value::Integer(PenStyle::DotLine.value()))
        );
        let stored: i64 = conn
            .query_row("SELECT penstyle FROM rectangle WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, PenStyle::DotLine.value());
    }

    #[test]
    fn test_set_model_data_text_parses_integers() {
        let (conn, mut model) = model();
        let delegate = RectangleDelegate::new();
        let index = CellIndex::new(0, 3);
        let editor = Editor::Text(TextInput::with_text("12"));
        delegate
            .set_model_data(&editor, &mut model, &conn, index)
            .unwrap();
        assert_eq!(model.data(0, 3), Some(&Value::Integer(12)));
    }

    #[test]
    fn test_editor_event_color_column_activate_opens_dialog() {
        let delegate = RectangleDelegate::new();
        let outcome = delegate.editor_event(
            EditorEvent::Activate,
            COLOR,
            &Value::Text("#ff0000".into()),
        );
        assert_eq!(
            outcome,
            EventOutcome::ChooseColor {
                index: COLOR,
                initial: Some(Rgb::new(255, 0, 0)),
            }
        );
        assert!(outcome.is_handled());
    }

    #[test]
    fn test_editor_event_unparseable_color_has_no_initial() {
        let delegate = RectangleDelegate::new();
        let outcome =
            delegate.editor_event(EditorEvent::Activate, COLOR, &Value::Null);
        assert_eq!(
            outcome,
            EventOutcome::ChooseColor {
                index: COLOR,
                initial: None
            }
        );
    }

    #[test]
    fn test_editor_event_wrong_column_is_ignored() {
        let delegate = RectangleDelegate::new();
        let value = Value::Integer(1);
        assert!(!delegate.editor_event(EditorEvent::Activate, STYLE, &value).is_handled());
        assert!(!delegate.editor_event(EditorEvent::Activate, ID, &value).is_handled());
    }

    #[test]
    fn test_editor_event_other_events_are_ignored() {
        let delegate = RectangleDelegate::new();
        let value = Value::Text("#ff0000".into());
        assert!(!delegate.editor_event(EditorEvent::Press, COLOR, &value).is_handled());
        assert!(
            !delegate
                .editor_event(EditorEvent::SecondaryActivate, COLOR, &value)
                .is_handled()
        );
    }

    #[test]
    fn test_paint_style_column_shows_name() {
        let delegate = RectangleDelegate::new();
        let line = delegate.paint(STYLE, &Value::Integer(PenStyle::DashDotLine.value()));
        assert_eq!(line.to_string(), " DashDotLine ▾");

        let unknown = delegate.paint(STYLE, &Value::Integer(77));
        assert_eq!(unknown.to_string(), " Style(77) ▾");
    }

    #[test]
    fn test_paint_color_column_shows_swatch() {
        let delegate = RectangleDelegate::new();
        let line = delegate.paint(COLOR, &Value::Text("#00FF00".into()));
        assert_eq!(line.to_string(), "   #00ff00");
        assert_eq!(line.spans.first().unwrap().style.bg, Some(Color::Rgb(0, 255, 0)));
    }

    #[test]
    fn test_paint_other_column_is_plain() {
        let delegate = RectangleDelegate::new();
        assert_eq!(delegate.paint(ID, &Value::Integer(123)).to_string(), "123");
        assert_eq!(TextDelegate.paint(STYLE, &Value::Integer(1)).to_string(), "1");
    }

    #[test]
    fn test_text_to_value() {
        assert_eq!(text_to_value("42"), Value::Integer(42));
        assert_eq!(text_to_value("#fff"), Value::Text("#fff".into()));
        assert_eq!(text_to_value("  "), Value::Null);
    }
}
