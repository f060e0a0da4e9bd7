use ratatui::{
    Frame,
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use rectdb_db::SqlTableModel;
use rectdb_ui::{
    Editor, Grid,
    widgets::{
        hotkey::{GRID_HOTKEYS, Hotkey, IDLE_HOTKEYS},
        top_bar_view::TopBarView,
    },
};

use crate::{
    app::{APP_NAME, App, TOPBAR_HEIGHT},
    app_state::Overlay,
};

const CONSOLE_HEIGHT: u16 = 8;

impl App {
    /// Renders the user interface.
    pub fn render(&mut self, frame: &mut Frame) {
        let [top_area, menu_area, main_area, console_area] = Layout::vertical([
            Constraint::Length(TOPBAR_HEIGHT),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(CONSOLE_HEIGHT),
        ])
        .areas(frame.area());

        let status = self.workbench.status();
        let hotkeys: &[Hotkey] = if self.workbench.model().is_some() {
            &GRID_HOTKEYS
        } else {
            &IDLE_HOTKEYS
        };
        frame.render_widget(
            TopBarView {
                status: &status,
                hotkeys,
                title: APP_NAME,
            },
            top_area,
        );

        self.render_grid(frame, main_area);
        frame.render_widget(&self.workbench.console, console_area);
        self.render_overlay(frame);

        // Last, so open dropdowns cover everything else
        self.menu.render(menu_area, frame.buffer_mut());
    }

    fn grid_title(&self) -> String {
        self.workbench
            .model()
            .and_then(SqlTableModel::table_name)
            .map_or_else(|| " No table ".to_string(), |table| format!(" {table} "))
    }

    fn render_grid(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::new()
            .borders(Borders::ALL)
            .title(self.grid_title())
            .title_alignment(Alignment::Center);

        let editor = self.overlay.editor();
        if let Some((model, view)) = self.workbench.view_parts() {
            let grid = Grid::new(model).editor(editor).block(block);
            frame.render_stateful_widget(grid, area, view);
            return;
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(
                "No table model. Open the menu with F10, create a connection and init the table model.",
            )
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true }),
            inner,
        );
    }

    fn render_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        match &self.overlay {
            Overlay::None => {}
            Overlay::Editor { editor, .. } => {
                // Text editors are drawn inside the grid cell
                if let Editor::Combo(combo) = editor
                    && let Some(cell) = self.workbench.grid.current_cell_area()
                {
                    let top = cell.y.saturating_add(1);
                    let dropdown = Rect::new(
                        cell.x,
                        top,
                        area.width.saturating_sub(cell.x),
                        area.height.saturating_sub(top),
                    );
                    frame.render_widget(combo, dropdown);
                }
            }
            Overlay::ColorDialog(dialog) => frame.render_widget(dialog, area),
            Overlay::Query(modal) => frame.render_widget(modal, area),
            Overlay::TablePicker(picker) => frame.render_widget(picker, area),
        }
    }
}
