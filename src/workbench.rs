use std::sync::Arc;

use crossterm::event::KeyCode;
use rectdb_db::{
    ConnectionRegistry, QueryOutput, SqlTableModel, Value, connection::table_exists,
    rectangle,
};
use rectdb_ui::{
    CellIndex, ColorDialog, Console, Editor, EditorEvent, EventOutcome, GridNavigationHandler,
    GridView, ItemDelegate, RectangleDelegate, Rgb,
};
use rusqlite::Connection as SqliteConnection;
use tracing::{error, info, warn};

use crate::{
    config::Config,
    errors::{AppError, Result},
};

/// What Enter on the current cell opened.
#[derive(Debug, Clone)]
pub enum EditSession {
    Inline { index: CellIndex, editor: Editor },
    Color(ColorDialog),
}

/// The main window's state and command handlers. Every command checks its
/// preconditions first and returns [`AppError::NotReady`] without side
/// effects when one does not hold.
#[derive(Debug)]
pub struct Workbench {
    config: Config,
    registry: ConnectionRegistry,
    model: Option<SqlTableModel>,
    pub grid: GridView,
    pub console: Console,
}

fn open_handle<'a>(
    registry: &'a ConnectionRegistry,
    name: &str,
) -> Result<&'a SqliteConnection> {
    match registry.database(name) {
        Some(conn) if conn.is_open() => Ok(conn.handle()?),
        Some(_) => Err(AppError::not_ready(format!("connection '{name}' is closed"))),
        None => Err(AppError::not_ready(format!(
            "connection '{name}' does not exist"
        ))),
    }
}

fn require_table(conn: &SqliteConnection, table: &str) -> Result<()> {
    if table_exists(conn, table)? {
        Ok(())
    } else {
        Err(AppError::not_ready(format!("table '{table}' does not exist")))
    }
}

fn model_not_ready() -> AppError {
    AppError::not_ready("table model is not initialized")
}

/// Point `model` at `table`, reload it and set up `grid` for it. The
/// rectangle table gets its headers, a hidden id and the custom delegates.
fn bind_model(
    model: &mut SqlTableModel,
    grid: &mut GridView,
    conn: &SqliteConnection,
    table: &str,
    config: &Config,
) -> Result<usize> {
    model.set_table(conn, table)?;
    model.set_edit_strategy(config.edit_strategy);
    let rows = model.select(conn)?;

    grid.bind();
    if table == rectangle::TABLE {
        for (col, header) in rectangle::HEADERS.iter().enumerate() {
            model.set_header_data(col, *header);
        }
        if config.hide_id_column {
            grid.set_column_hidden(rectangle::ID_COLUMN, true);
        }
        let delegate: Arc<dyn ItemDelegate> = Arc::new(RectangleDelegate::new());
        grid.set_item_delegate_for_column(
            RectangleDelegate::PEN_COLOR_COLUMN,
            Arc::clone(&delegate),
        );
        grid.set_item_delegate_for_column(RectangleDelegate::PEN_STYLE_COLUMN, delegate);
    }
    if rows > 0 {
        grid.select_row(0, model.column_count());
    }
    Ok(rows)
}

impl Workbench {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: ConnectionRegistry::new(),
            model: None,
            grid: GridView::new(),
            console: Console::new(),
        }
    }

    /// The model while it is bound to the grid.
    #[must_use]
    pub fn model(&self) -> Option<&SqlTableModel> {
        self.model.as_ref().filter(|_| self.grid.is_bound())
    }

    /// The bound model together with the view state, for drawing.
    pub fn view_parts(&mut self) -> Option<(&SqlTableModel, &mut GridView)> {
        if !self.grid.is_bound() {
            return None;
        }
        self.model.as_ref().map(|model| (model, &mut self.grid))
    }

    /// One-line connection summary for the top bar.
    #[must_use]
    pub fn status(&self) -> String {
        let name = &self.config.connection_name;
        match self.registry.database(name) {
            Some(conn) => format!(
                "{name}: {} ({})",
                if conn.is_open() { "open" } else { "closed" },
                conn.database_name().display()
            ),
            None => "no connection".to_string(),
        }
    }

    fn handle(&self) -> Result<&SqliteConnection> {
        open_handle(&self.registry, &self.config.connection_name)
    }

    fn info(&mut self, message: String) {
        info!("{message}");
        self.console.info(message);
    }

    /// Log a failed command: guard failures as warnings, the rest as errors.
    pub fn report(&mut self, context: &str, err: &AppError) {
        let message = format!("{context}: {err}");
        if err.is_guard() {
            warn!("{message}");
            self.console.warn(message);
        } else {
            error!("{message}");
            self.console.error(message);
        }
    }

    fn release_model(&mut self) {
        if self.model.take().is_some() {
            self.grid.unbind();
            info!("table model released");
        }
    }

    fn model_is_on(&self, table: &str) -> bool {
        self.model().and_then(SqlTableModel::table_name) == Some(table)
    }

    pub fn create_connection(&mut self) -> Result<()> {
        let name = self.config.connection_name.clone();
        let file = self.config.database_file.clone();

        if self.registry.contains(&name) {
            info!(connection = %name, "re-using registered connection");
        } else {
            self.registry.add_database(&name, file.clone());
        }
        let conn = self
            .registry
            .database_mut(&name)
            .ok_or_else(|| AppError::not_ready(format!("connection '{name}' does not exist")))?;
        conn.set_database_name(file);
        conn.open()?;

        let message = format!(
            "connection '{name}' open on {}",
            conn.database_name().display()
        );
        self.info(message);
        Ok(())
    }

    pub fn close_connection(&mut self) -> Result<()> {
        let name = self.config.connection_name.clone();
        if !self.registry.contains(&name) {
            return Err(AppError::not_ready(format!(
                "connection '{name}' does not exist"
            )));
        }

        self.release_model();
        if let Some(conn) = self.registry.database_mut(&name) {
            conn.close();
        }
        self.info(format!("connection '{name}' closed"));
        Ok(())
    }

    pub fn create_table(&mut self) -> Result<()> {
        let table = self.config.table.clone();
        self.handle()?;
        if self.model_is_on(&table) {
            self.release_model();
        }

        let dropped = rectangle::create_table(self.handle()?, &table)?;
        if dropped {
            self.info(format!("table '{table}' dropped and created again"));
        } else {
            self.info(format!("table '{table}' created"));
        }
        Ok(())
    }

    pub fn insert_into(&mut self) -> Result<usize> {
        let table = self.config.table.clone();
        let conn = self.handle()?;
        require_table(conn, &table)?;

        let inserted = rectangle::insert_samples(conn, &table)?;
        if self.model_is_on(&table)
            && let Some(model) = self.model.as_mut()
        {
            let conn = open_handle(&self.registry, &self.config.connection_name)?;
            model.select(conn)?;
            let (rows, cols) = (model.row_count(), model.column_count());
            self.grid.clamp_to(rows, cols);
        }
        self.info(format!("{inserted} rows inserted into '{table}'"));
        Ok(inserted)
    }

    /// Log every row of the table. Returns the number of rows printed.
    pub fn print_table(&mut self) -> Result<usize> {
        let table = self.config.table.clone();
        let conn = self.handle()?;
        require_table(conn, &table)?;

        let lines = rectangle::fetch_lines(conn, &table)?;
        let count = lines.len();
        for line in lines {
            self.info(line);
        }
        self.info(format!("{count} rows in '{table}'"));
        Ok(count)
    }

    /// Returns whether a table was dropped.
    pub fn drop_table(&mut self) -> Result<bool> {
        let table = self.config.table.clone();
        self.handle()?;
        if self.model_is_on(&table) {
            self.release_model();
        }

        let dropped = rectangle::drop_table(self.handle()?, &table)?;
        if dropped {
            self.info(format!("table '{table}' dropped"));
        } else {
            let message = format!("drop table: table '{table}' does not exist, skipped");
            warn!("{message}");
            self.console.warn(message);
        }
        Ok(dropped)
    }

    /// Bind the configured table to the grid. The model is created on the
    /// first call and re-used afterwards.
    pub fn init_table_model(&mut self) -> Result<()> {
        let table = self.config.table.clone();
        let conn = open_handle(&self.registry, &self.config.connection_name)?;
        require_table(conn, &table)?;

        let reused = self.model.is_some();
        let model = self.model.get_or_insert_with(SqlTableModel::new);
        let rows = bind_model(model, &mut self.grid, conn, &table, &self.config)?;
        self.info(format!(
            "table model {} on '{table}' with {rows} rows",
            if reused { "re-initialized" } else { "initialized" }
        ));
        Ok(())
    }

    /// Tables available to [`Workbench::select_table`].
    pub fn table_names(&self) -> Result<Vec<String>> {
        self.handle()?;
        match self.registry.database(&self.config.connection_name) {
            Some(conn) => Ok(conn.tables()?),
            None => Ok(Vec::new()),
        }
    }

    /// Show `table` in the grid. Re-selecting the current table reloads it.
    pub fn select_table(&mut self, table: &str) -> Result<()> {
        let conn = open_handle(&self.registry, &self.config.connection_name)?;
        require_table(conn, table)?;

        if self.model().and_then(SqlTableModel::table_name) == Some(table)
            && let Some(model) = self.model.as_mut()
        {
            let rows = model.select(conn)?;
            let cols = model.column_count();
            self.grid.clamp_to(rows, cols);
            self.info(format!("table '{table}' reloaded, {rows} rows"));
            return Ok(());
        }

        let model = self.model.get_or_insert_with(SqlTableModel::new);
        let rows = bind_model(model, &mut self.grid, conn, table, &self.config)?;
        self.info(format!("showing table '{table}', {rows} rows"));
        Ok(())
    }

    /// Append a row to the model and make it current.
    pub fn insert_row(&mut self) -> Result<usize> {
        let conn = open_handle(&self.registry, &self.config.connection_name)?;
        if !self.grid.is_bound() {
            return Err(model_not_ready());
        }
        let model = self.model.as_mut().ok_or_else(model_not_ready)?;

        let previous = self.grid.current_row();
        let row = model.insert_row(conn)?;
        let first_col = self
            .grid
            .visible_columns(model.column_count())
            .first()
            .copied()
            .unwrap_or(0);
        self.grid.set_current_index(CellIndex::new(row, first_col));
        self.row_changed(previous)?;
        self.info(format!("row {row} inserted"));
        Ok(row)
    }

    /// Remove the current row.
    pub fn remove_row(&mut self) -> Result<()> {
        let conn = open_handle(&self.registry, &self.config.connection_name)?;
        if !self.grid.is_bound() {
            return Err(model_not_ready());
        }
        let model = self.model.as_mut().ok_or_else(model_not_ready)?;
        let row = self
            .grid
            .current_row()
            .ok_or_else(|| AppError::not_ready("no row selected"))?;

        model.remove_row(conn, row)?;
        let (rows, cols) = (model.row_count(), model.column_count());
        self.grid.clamp_to(rows, cols);
        self.info(format!("row {row} removed"));
        Ok(())
    }

    pub fn submit_changes(&mut self) -> Result<()> {
        let conn = open_handle(&self.registry, &self.config.connection_name)?;
        if !self.grid.is_bound() {
            return Err(model_not_ready());
        }
        let model = self.model.as_mut().ok_or_else(model_not_ready)?;

        model.submit_all(conn)?;
        let (rows, cols) = (model.row_count(), model.column_count());
        self.grid.clamp_to(rows, cols);
        self.info("changes submitted".to_string());
        Ok(())
    }

    pub fn revert_changes(&mut self) -> Result<()> {
        if !self.grid.is_bound() {
            return Err(model_not_ready());
        }
        let model = self.model.as_mut().ok_or_else(model_not_ready)?;

        model.revert_all();
        let (rows, cols) = (model.row_count(), model.column_count());
        self.grid.clamp_to(rows, cols);
        self.info("changes reverted".to_string());
        Ok(())
    }

    /// Precondition of "Do query".
    pub fn ensure_query_ready(&self) -> Result<()> {
        self.handle().map(|_| ())
    }

    /// Run ad-hoc SQL, then reload the bound model unless the SQL only
    /// read. A model whose table went away is released.
    pub fn run_query(&mut self, sql: &str) -> Result<QueryOutput> {
        let conn = open_handle(&self.registry, &self.config.connection_name)?;
        let output = rectdb_db::run_query(conn, sql)?;
        match &output {
            QueryOutput::Rows { rows, .. } => {
                self.info(format!("query returned {} rows", rows.len()));
            }
            QueryOutput::Affected(n) => self.info(format!("query affected {n} rows")),
        }

        // Plain SELECTs leave pending edits alone
        let modifies = rectdb_db::query::classify(sql)
            .is_none_or(|kinds| kinds.iter().any(|kind| kind.modifies_data()));
        if modifies
            && self.grid.is_bound()
            && let Some(model) = self.model.as_mut()
        {
            let conn = open_handle(&self.registry, &self.config.connection_name)?;
            match model.select(conn) {
                Ok(rows) => {
                    let cols = model.column_count();
                    self.grid.clamp_to(rows, cols);
                }
                Err(err) => {
                    let message = format!("table model released: {err}");
                    self.release_model();
                    warn!("{message}");
                    self.console.warn(message);
                }
            }
        }
        Ok(output)
    }

    /// Flush the row the cursor left, under the row-change strategy.
    fn row_changed(&mut self, previous: Option<usize>) -> Result<()> {
        let Some(previous) = previous else {
            return Ok(());
        };
        if self.grid.current_row() == Some(previous) {
            return Ok(());
        }
        let Some(model) = self.model.as_mut() else {
            return Ok(());
        };
        if model.edit_strategy() != rectdb_db::EditStrategy::OnRowChange
            || !model.is_dirty(previous)
        {
            return Ok(());
        }

        let conn = open_handle(&self.registry, &self.config.connection_name)?;
        model.submit_row(conn, previous)?;
        tracing::debug!(row = previous, "row submitted on row change");
        Ok(())
    }

    /// Move the grid cursor. Returns `false` for keys that are not
    /// navigation keys.
    pub fn navigate(&mut self, key: KeyCode) -> bool {
        let Some(model) = self.model() else {
            return false;
        };
        let (rows, cols) = (model.row_count(), model.column_count());
        let previous = self.grid.current_row();
        if !GridNavigationHandler::navigate(&mut self.grid, key, rows, cols) {
            return false;
        }
        if let Err(err) = self.row_changed(previous) {
            self.report("submit row", &err);
        }
        true
    }

    /// Offer `event` on the current cell to the column's delegate. A claimed
    /// event opens the color dialog. An unclaimed [`EditorEvent::Activate`]
    /// opens the inline editor; other unclaimed events do nothing.
    pub fn begin_edit(&mut self, event: EditorEvent) -> Result<Option<EditSession>> {
        self.handle()?;
        let model = self.model().ok_or_else(model_not_ready)?;
        let index = self
            .grid
            .current_index()
            .ok_or_else(|| AppError::not_ready("no cell selected"))?;
        let value = model.data(index.row, index.col).cloned().unwrap_or(Value::Null);
        let delegate = self.grid.delegate_for_column(index.col);

        let outcome = delegate.editor_event(event, index, &value);
        if !outcome.is_handled() && event != EditorEvent::Activate {
            tracing::debug!(?event, row = index.row, col = index.col, "cell event ignored");
            return Ok(None);
        }

        let session = match outcome {
            EventOutcome::ChooseColor { index, initial } => {
                EditSession::Color(ColorDialog::open(index, initial))
            }
            EventOutcome::Ignored => {
                let mut editor = delegate.create_editor(index);
                delegate.set_editor_data(&mut editor, &value);
                EditSession::Inline { index, editor }
            }
        };
        Ok(Some(session))
    }

    /// Write an inline editor's value back through the column's delegate.
    pub fn commit_editor(&mut self, index: CellIndex, editor: &Editor) -> Result<()> {
        let conn = open_handle(&self.registry, &self.config.connection_name)?;
        if !self.grid.is_bound() {
            return Err(model_not_ready());
        }
        let model = self.model.as_mut().ok_or_else(model_not_ready)?;
        self.grid
            .delegate_for_column(index.col)
            .set_model_data(editor, model, conn, index)?;
        Ok(())
    }

    /// Store a color accepted in the dialog as `#rrggbb`.
    pub fn apply_color(&mut self, index: CellIndex, color: Rgb) -> Result<()> {
        let conn = open_handle(&self.registry, &self.config.connection_name)?;
        if !self.grid.is_bound() {
            return Err(model_not_ready());
        }
        let model = self.model.as_mut().ok_or_else(model_not_ready)?;
        model.set_data(conn, index.row, index.col, Value::Text(color.to_hex()))?;
        self.info(format!("color {color} set on row {}", index.row));
        Ok(())
    }
}
