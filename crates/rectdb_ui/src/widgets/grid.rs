use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use rectdb_db::{SqlTableModel, Value};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Cell, HighlightSpacing, Paragraph, Row, StatefulWidget, Table,
        TableState, Widget,
    },
};
use unicode_width::UnicodeWidthStr;

use crate::{
    delegate::{CellIndex, Editor, ItemDelegate, TextDelegate},
    widgets::text_input::TextInput,
};

const MARKER_WIDTH: u16 = 1;
const HIGHLIGHT_WIDTH: u16 = 3;
const COLUMN_SPACING: u16 = 1;

/// View state for the editable grid: selection, scrolling, hidden columns
/// and the delegate installed for each column.
#[derive(Debug, Clone)]
pub struct GridView {
    table: TableState,
    current_col: Option<usize>,
    column_offset: usize,
    hidden: BTreeSet<usize>,
    delegates: HashMap<usize, Arc<dyn ItemDelegate>>,
    fallback: Arc<dyn ItemDelegate>,
    bound: bool,
    current_cell_area: Option<Rect>,
}

impl Default for GridView {
    fn default() -> Self {
        Self {
            table: TableState::default(),
            current_col: None,
            column_offset: 0,
            hidden: BTreeSet::new(),
            delegates: HashMap::new(),
            fallback: Arc::new(TextDelegate),
            bound: false,
            current_cell_area: None,
        }
    }
}

impl GridView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to a model; previous selection and column setup are dropped.
    pub fn bind(&mut self) {
        self.reset();
        self.bound = true;
    }

    pub fn unbind(&mut self) {
        self.reset();
        self.bound = false;
    }

    fn reset(&mut self) {
        self.table = TableState::default();
        self.current_col = None;
        self.column_offset = 0;
        self.hidden.clear();
        self.delegates.clear();
        self.current_cell_area = None;
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn set_column_hidden(&mut self, col: usize, hidden: bool) {
        if hidden {
            self.hidden.insert(col);
            if self.current_col == Some(col) {
                self.current_col = None;
            }
        } else {
            self.hidden.remove(&col);
        }
    }

    #[must_use]
    pub fn is_column_hidden(&self, col: usize) -> bool {
        self.hidden.contains(&col)
    }

    pub fn set_item_delegate_for_column(
        &mut self,
        col: usize,
        delegate: Arc<dyn ItemDelegate>,
    ) {
        self.delegates.insert(col, delegate);
    }

    #[must_use]
    pub fn has_delegate_for_column(&self, col: usize) -> bool {
        self.delegates.contains_key(&col)
    }

    /// The column's delegate, or plain text handling.
    #[must_use]
    pub fn delegate_for_column(&self, col: usize) -> &dyn ItemDelegate {
        self.delegates
            .get(&col)
            .map_or(self.fallback.as_ref(), AsRef::as_ref)
    }

    #[must_use]
    pub fn visible_columns(&self, column_count: usize) -> Vec<usize> {
        (0..column_count)
            .filter(|col| !self.hidden.contains(col))
            .collect()
    }

    #[must_use]
    pub fn current_index(&self) -> Option<CellIndex> {
        let row = self.table.selected()?;
        let col = self.current_col?;
        Some(CellIndex::new(row, col))
    }

    #[must_use]
    pub fn current_row(&self) -> Option<usize> {
        self.table.selected()
    }

    pub fn set_current_index(&mut self, index: CellIndex) {
        self.table.select(Some(index.row));
        self.current_col = Some(index.col);
    }

    /// Select `row`, keeping the current column or taking the first visible.
    pub fn select_row(&mut self, row: usize, column_count: usize) {
        self.table.select(Some(row));
        if self.current_col.is_none() {
            self.current_col = self.visible_columns(column_count).first().copied();
        }
    }

    pub fn clear_selection(&mut self) {
        self.table.select(None);
        self.current_col = None;
    }

    /// Keep the selection inside the model after rows disappear.
    pub fn clamp_to(&mut self, row_count: usize, column_count: usize) {
        if row_count == 0 {
            self.clear_selection();
            return;
        }
        if self.table.selected().is_some_and(|row| row >= row_count) {
            self.table.select(Some(row_count - 1));
        }
        if self.table.selected().is_none() {
            self.select_row(0, column_count);
        }
    }

    pub fn next_row(&mut self, row_count: usize, column_count: usize) {
        if row_count == 0 {
            return;
        }
        let row = self
            .table
            .selected()
            .map_or(0, |row| (row + 1).min(row_count - 1));
        self.select_row(row, column_count);
    }

    pub fn previous_row(&mut self, row_count: usize, column_count: usize) {
        if row_count == 0 {
            return;
        }
        let row = self.table.selected().map_or(0, |row| row.saturating_sub(1));
        self.select_row(row, column_count);
    }

    pub fn first_row(&mut self, row_count: usize, column_count: usize) {
        if row_count > 0 {
            self.select_row(0, column_count);
        }
    }

    pub fn last_row(&mut self, row_count: usize, column_count: usize) {
        if row_count > 0 {
            self.select_row(row_count - 1, column_count);
        }
    }

    pub fn next_column(&mut self, column_count: usize) {
        self.step_column(column_count, true);
    }

    pub fn previous_column(&mut self, column_count: usize) {
        self.step_column(column_count, false);
    }

    fn step_column(&mut self, column_count: usize, forward: bool) {
        let visible = self.visible_columns(column_count);
        if visible.is_empty() {
            return;
        }
        let position = self
            .current_col
            .and_then(|col| visible.iter().position(|&c| c == col));
        let next = match (position, forward) {
            (None, _) => 0,
            (Some(pos), true) => (pos + 1).min(visible.len() - 1),
            (Some(pos), false) => pos.saturating_sub(1),
        };
        if let Some(&col) = visible.get(next) {
            self.current_col = Some(col);
        }
    }

    /// Screen area of the current cell from the last render.
    #[must_use]
    pub const fn current_cell_area(&self) -> Option<Rect> {
        self.current_cell_area
    }
}

/// Renders a [`SqlTableModel`] through a [`GridView`].
pub struct Grid<'a> {
    model: &'a SqlTableModel,
    editor: Option<&'a Editor>,
    block: Option<Block<'a>>,
}

impl<'a> Grid<'a> {
    #[must_use]
    pub const fn new(model: &'a SqlTableModel) -> Self {
        Self {
            model,
            editor: None,
            block: None,
        }
    }

    /// Show an open inline editor in the current cell.
    #[must_use]
    pub fn editor(mut self, editor: Option<&'a Editor>) -> Self {
        self.editor = editor;
        self
    }

    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn cell_line(
        &self,
        view: &GridView,
        index: CellIndex,
        value: Option<&Value>,
    ) -> Line<'static> {
        let is_current = view.current_index() == Some(index);
        if let (true, Some(Editor::Text(input))) = (is_current, self.editor) {
            return editing_line(input);
        }
        value.map_or_else(Line::default, |value| {
            view.delegate_for_column(index.col).paint(index, value)
        })
    }

    fn column_widths(&self, view: &GridView, visible: &[usize]) -> Vec<u16> {
        visible
            .iter()
            .map(|&col| {
                let header = self.model.header_data(col).unwrap_or_default();
                let mut width = UnicodeWidthStr::width(header);
                for row in 0..self.model.row_count() {
                    let index = CellIndex::new(row, col);
                    let line = self.cell_line(view, index, self.model.data(row, col));
                    width = width.max(line.width());
                }
                u16::try_from(width).unwrap_or(u16::MAX)
            })
            .collect()
    }
}

fn editing_line(input: &TextInput) -> Line<'static> {
    let (before, after) = input.split_at_cursor();
    Line::from(vec![
        Span::raw(before.to_string()),
        Span::styled("▏", Style::default().fg(Color::Yellow)),
        Span::raw(after.to_string()),
    ])
    .style(Style::default().bg(Color::Blue).fg(Color::White))
}

/// Which of `widths` fit in `area_width` starting at an offset that keeps
/// `selected` on screen. Returns positions into `widths`, the effective
/// offset, and the selected column's position among the visible ones.
fn visible_range(
    widths: &[u16],
    column_offset: usize,
    selected: Option<usize>,
    area_width: u16,
) -> (Vec<usize>, usize, Option<usize>) {
    if widths.is_empty() {
        return (Vec::new(), 0, None);
    }
    let fits_from = |offset: usize| {
        let mut used = 0u16;
        let mut positions = Vec::new();
        for (pos, &len) in widths.iter().enumerate().skip(offset) {
            let col_width = len.saturating_add(COLUMN_SPACING);
            if used.saturating_add(col_width) > area_width && !positions.is_empty() {
                break;
            }
            used = used.saturating_add(col_width);
            positions.push(pos);
        }
        positions
    };

    let mut offset = column_offset.min(widths.len() - 1);
    if let Some(selected) = selected {
        if selected < offset {
            offset = selected;
        } else if !fits_from(offset).contains(&selected) {
            offset = selected;
        }
    }
    let positions = fits_from(offset);
    let relative = selected.and_then(|sel| positions.iter().position(|&p| p == sel));
    (positions, offset, relative)
}

fn grid_styles() -> (Style, Style, Style, Text<'static>, HighlightSpacing) {
    let selected_row_style = Style::default()
        .add_modifier(Modifier::BOLD)
        .fg(Color::Black)
        .bg(Color::Yellow);
    let selected_col_style = Style::default().fg(Color::Cyan);
    let selected_cell_style = Style::default()
        .add_modifier(Modifier::REVERSED)
        .fg(Color::Magenta);
    let bar: &'static str = " █ ";
    let highlight_symbol = Text::from(bar);
    (
        selected_row_style,
        selected_col_style,
        selected_cell_style,
        highlight_symbol,
        HighlightSpacing::Always,
    )
}

fn row_marker(model: &SqlTableModel, row: usize) -> Span<'static> {
    if model.is_marked_deleted(row) {
        Span::styled("!", Style::default().fg(Color::Red))
    } else if model.is_dirty(row) {
        Span::styled("*", Style::default().fg(Color::Yellow))
    } else {
        Span::raw(" ")
    }
}

impl StatefulWidget for Grid<'_> {
    type State = GridView;

    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer, state: &mut Self::State) {
        let inner = self.block.as_ref().map_or(area, |block| block.inner(area));
        if let Some(block) = &self.block {
            block.clone().render(area, buf);
        }
        state.current_cell_area = None;

        let visible = state.visible_columns(self.model.column_count());
        if visible.is_empty() {
            Paragraph::new("No columns").render(inner, buf);
            return;
        }

        let widths = self.column_widths(state, &visible);
        let selected_pos = state
            .current_col
            .and_then(|col| visible.iter().position(|&c| c == col));
        let available = inner
            .width
            .saturating_sub(HIGHLIGHT_WIDTH + MARKER_WIDTH + COLUMN_SPACING);
        let (positions, offset, relative) =
            visible_range(&widths, state.column_offset, selected_pos, available);
        state.column_offset = offset;
        // (model column, width) of each column on screen
        let shown: Vec<(usize, u16)> = positions
            .iter()
            .filter_map(|&pos| Some((*visible.get(pos)?, *widths.get(pos)?)))
            .collect();

        let (row_style, col_style, cell_style, highlight_symbol, highlight_spacing) =
            grid_styles();

        let header = std::iter::once(Cell::from(" "))
            .chain(shown.iter().map(|&(col, _)| {
                let label = self.model.header_data(col).unwrap_or_default();
                Cell::from(label.to_string())
            }))
            .collect::<Row>()
            .style(Style::default().add_modifier(Modifier::BOLD))
            .height(1);

        let rows = (0..self.model.row_count()).map(|row| {
            std::iter::once(Cell::from(row_marker(self.model, row)))
                .chain(shown.iter().map(|&(col, _)| {
                    let index = CellIndex::new(row, col);
                    Cell::from(self.cell_line(state, index, self.model.data(row, col)))
                }))
                .collect::<Row>()
                .height(1)
        });

        let constraints = std::iter::once(Constraint::Length(MARKER_WIDTH))
            .chain(shown.iter().map(|&(_, width)| Constraint::Length(width)))
            .collect::<Vec<_>>();

        let table = Table::new(rows, constraints)
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .row_highlight_style(row_style)
            .column_highlight_style(col_style)
            .cell_highlight_style(cell_style)
            .highlight_symbol(highlight_symbol)
            .highlight_spacing(highlight_spacing);

        state.table.select_column(relative.map(|rel| rel + 1));
        StatefulWidget::render(table, inner, buf, &mut state.table);

        let current = relative.and_then(|rel| Some((rel, shown.get(rel)?.1)));
        if let (Some(row), Some((rel, width))) = (state.table.selected(), current) {
            let x_offset = HIGHLIGHT_WIDTH
                + MARKER_WIDTH
                + COLUMN_SPACING
                + shown
                    .iter()
                    .take(rel)
                    .map(|&(_, col_width)| col_width + COLUMN_SPACING)
                    .sum::<u16>();
            let screen_row = row.saturating_sub(state.table.offset());
            let y = inner.y + 1 + u16::try_from(screen_row).unwrap_or(u16::MAX);
            if y < inner.bottom() && inner.x + x_offset < inner.right() {
                let x = inner.x + x_offset;
                state.current_cell_area =
                    Some(Rect::new(x, y, width.min(inner.right() - x), 1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rectdb_db::{EditStrategy, rectangle};
    use ratatui::{Terminal, backend::TestBackend};
    use rusqlite::Connection;

    use super::*;
    use crate::delegate::RectangleDelegate;

    fn model() -> (Connection, SqlTableModel) {
        let conn = Connection::open_in_memory().unwrap();
        rectangle::create_table(&conn, rectangle::TABLE).unwrap();
        rectangle::insert_samples(&conn, rectangle::TABLE).unwrap();
        let mut model = SqlTableModel::new();
        model.set_table(&conn, rectangle::TABLE).unwrap();
        model.set_edit_strategy(EditStrategy::OnManualSubmit);
        model.select(&conn).unwrap();
        for (col, header) in rectangle::HEADERS.iter().enumerate() {
            model.set_header_data(col, *header);
        }
        (conn, model)
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_current_index_is_none_until_selected() {
        let mut view = GridView::new();
        assert_eq!(view.current_index(), None);
        view.bind();
        assert_eq!(view.current_index(), None);
        view.select_row(0, 8);
        assert_eq!(view.current_index(), Some(CellIndex::new(0, 0)));
        view.clear_selection();
        assert_eq!(view.current_index(), None);
    }

    #[test]
    fn test_hidden_column_is_skipped() {
        let mut view = GridView::new();
        view.bind();
        view.set_column_hidden(0, true);
        assert!(view.is_column_hidden(0));
        assert_eq!(view.visible_columns(3), vec![1, 2]);

        view.select_row(0, 3);
        assert_eq!(view.current_index(), Some(CellIndex::new(0, 1)));
        view.previous_column(3);
        assert_eq!(view.current_index(), Some(CellIndex::new(0, 1)));
        view.next_column(3);
        view.next_column(3);
        assert_eq!(view.current_index(), Some(CellIndex::new(0, 2)));
    }

    #[test]
    fn test_row_navigation_is_clamped() {
        let mut view = GridView::new();
        view.bind();
        view.previous_row(3, 2);
        assert_eq!(view.current_row(), Some(0));
        view.last_row(3, 2);
        view.next_row(3, 2);
        assert_eq!(view.current_row(), Some(2));
        view.clamp_to(1, 2);
        assert_eq!(view.current_row(), Some(0));
        view.clamp_to(0, 2);
        assert_eq!(view.current_index(), None);
    }

    #[test]
    fn test_delegate_lookup_falls_back_to_text() {
        let mut view = GridView::new();
        view.set_item_delegate_for_column(2, Arc::new(RectangleDelegate::new()));
        assert!(view.has_delegate_for_column(2));
        assert!(!view.has_delegate_for_column(1));

        let index = CellIndex::new(0, 2);
        let value = Value::Integer(3);
        assert_eq!(
            view.delegate_for_column(2).paint(index, &value).to_string(),
            " DotLine ▾"
        );
        assert_eq!(view.delegate_for_column(1).paint(index, &value).to_string(), "3");

        view.unbind();
        assert!(!view.has_delegate_for_column(2));
        assert!(!view.is_bound());
    }

    #[test]
    fn test_visible_range_scrolls_to_selected() {
        let widths = [5, 5, 5, 5];
        let (positions, offset, relative) = visible_range(&widths, 0, Some(0), 12);
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(offset, 0);
        assert_eq!(relative, Some(0));

        let (positions, offset, relative) = visible_range(&widths, 0, Some(3), 12);
        assert_eq!(positions, vec![3]);
        assert_eq!(offset, 3);
        assert_eq!(relative, Some(0));

        let (positions, offset, _) = visible_range(&widths, 3, Some(1), 12);
        assert_eq!(offset, 1);
        assert_eq!(positions, vec![1, 2]);
    }

    #[test]
    fn test_render_shows_headers_and_delegated_cells() {
        let (_conn, model) = model();
        let mut view = GridView::new();
        view.bind();
        view.set_column_hidden(0, true);
        let delegate: Arc<dyn ItemDelegate> = Arc::new(RectangleDelegate::new());
        view.set_item_delegate_for_column(1, Arc::clone(&delegate));
        view.set_item_delegate_for_column(2, delegate);
        view.select_row(0, model.column_count());

        let mut terminal = Terminal::new(TestBackend::new(120, 14)).unwrap();
        terminal
            .draw(|frame| {
                frame.render_stateful_widget(Grid::new(&model), frame.area(), &mut view);
            })
            .unwrap();
        let text = buffer_text(&terminal);

        assert!(text.contains("Color"));
        assert!(text.contains("Style"));
        assert!(text.contains("Height"));
        assert!(!text.contains("ID"));
        assert!(text.contains("#ff0000"));
        assert!(text.contains("SolidLine"));
        let cell = view.current_cell_area().unwrap();
        assert_eq!(
            (cell.x, cell.y),
            (HIGHLIGHT_WIDTH + MARKER_WIDTH + COLUMN_SPACING, 1)
        );
    }

    #[test]
    fn test_render_marks_dirty_rows() {
        let (conn, mut model) = model();
        model.set_data(&conn, 1, 3, Value::Integer(9)).unwrap();
        let mut view = GridView::new();
        view.bind();

        let mut terminal = Terminal::new(TestBackend::new(120, 14)).unwrap();
        terminal
            .draw(|frame| {
                frame.render_stateful_widget(Grid::new(&model), frame.area(), &mut view);
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        // header on row 0, second data row on screen row 2
        assert_eq!(buffer[(HIGHLIGHT_WIDTH, 2)].symbol(), "*");
        assert_eq!(buffer[(HIGHLIGHT_WIDTH, 1)].symbol(), " ");
    }
}
