use color_eyre::Result;
use ratatui::DefaultTerminal;
use rectdb_db::SqlTableModel;
use rectdb_ui::{MenuAction, MenuBar, QueryModal, TablePicker};
use tracing::info;

use crate::{app_state::Overlay, config::Config, errors, workbench::Workbench};

pub const APP_NAME: &str = "rectdb";

/// Height of the top bar in rows.
pub const TOPBAR_HEIGHT: u16 = 3;

/// The main application which holds the state and logic of the application.
pub struct App {
    /// Is the application running?
    running: bool,
    pub workbench: Workbench,
    pub menu: MenuBar,
    pub overlay: Overlay,
}

impl App {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            running: false,
            workbench: Workbench::new(config),
            menu: MenuBar::new(),
            overlay: Overlay::None,
        }
    }

    /// Run the application's main loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        self.running = true;
        info!("{APP_NAME} started");
        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events().await?;
        }
        info!("{APP_NAME} stopped");
        Ok(())
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Run a menu command. Failures go to the log and the console.
    pub fn perform(&mut self, action: MenuAction) {
        info!(action = action.title(), "menu action");
        let result = match action {
            MenuAction::CreateConnection => self.workbench.create_connection(),
            MenuAction::CloseConnection => self.workbench.close_connection(),
            MenuAction::CreateTable => self.workbench.create_table(),
            MenuAction::InsertInto => self.workbench.insert_into().map(|_| ()),
            MenuAction::PrintTable => self.workbench.print_table().map(|_| ()),
            MenuAction::DropTable => self.workbench.drop_table().map(|_| ()),
            MenuAction::InitTableModel => self.workbench.init_table_model(),
            MenuAction::SelectTable => self.open_table_picker(),
            MenuAction::InsertRow => self.workbench.insert_row().map(|_| ()),
            MenuAction::RemoveRow => self.workbench.remove_row(),
            MenuAction::SubmitChanges => self.workbench.submit_changes(),
            MenuAction::RevertChanges => self.workbench.revert_changes(),
            MenuAction::DoQuery => self.open_query(),
        };

        if let Err(err) = result {
            self.workbench.report(action.title(), &err);
        }
    }

    fn open_table_picker(&mut self) -> errors::Result<()> {
        let tables = self.workbench.table_names()?;
        let current = self.workbench.model().and_then(SqlTableModel::table_name);
        let picker = TablePicker::new(tables, current);
        self.overlay = Overlay::TablePicker(picker);
        Ok(())
    }

    fn open_query(&mut self) -> errors::Result<()> {
        self.workbench.ensure_query_ready()?;
        self.overlay = Overlay::Query(QueryModal::new());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rectdb_db::rectangle;
    use tempfile::TempDir;

    use super::*;
    use crate::config::DATABASE_FILE;

    fn app() -> (TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_file: dir.path().join(DATABASE_FILE),
            ..Config::default()
        };
        (dir, App::new(config))
    }

    #[test]
    fn test_guarded_action_is_reported_as_warning() {
        let (_dir, mut app) = app();
        app.perform(MenuAction::CreateTable);
        let line = app.workbench.console.last().unwrap();
        assert_eq!(line.level, tracing::Level::WARN);
        assert!(line.message.starts_with("Create table: "));
    }

    #[test]
    fn test_menu_actions_build_the_table() {
        let (_dir, mut app) = app();
        for action in [
            MenuAction::CreateConnection,
            MenuAction::CreateTable,
            MenuAction::InsertInto,
            MenuAction::InitTableModel,
        ] {
            app.perform(action);
        }
        let model = app.workbench.model().unwrap();
        assert_eq!(model.table_name(), Some(rectangle::TABLE));
        assert_eq!(model.row_count(), 10);
    }

    #[test]
    fn test_select_table_opens_picker() {
        let (_dir, mut app) = app();
        app.perform(MenuAction::SelectTable);
        assert!(app.overlay.is_none());

        app.perform(MenuAction::CreateConnection);
        app.perform(MenuAction::CreateTable);
        app.perform(MenuAction::SelectTable);
        let Overlay::TablePicker(picker) = &app.overlay else {
            panic!("expected the table picker");
        };
        assert_eq!(picker.tables(), &["rectangle".to_string()]);
    }

    #[test]
    fn test_do_query_needs_connection() {
        let (_dir, mut app) = app();
        app.perform(MenuAction::DoQuery);
        assert!(app.overlay.is_none());

        app.perform(MenuAction::CreateConnection);
        app.perform(MenuAction::DoQuery);
        assert!(matches!(app.overlay, Overlay::Query(_)));
    }
}
