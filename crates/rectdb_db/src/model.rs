//! A table exposed as rows and columns, writing edits back with SQL.

use std::collections::{BTreeSet, HashMap};

use rusqlite::{Connection as SqliteConnection, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};

use crate::{DbError, Result, connection::table_exists, value::quote_ident};

/// When edits reach the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditStrategy {
    /// Every `set_data` is written immediately.
    OnFieldChange,
    /// Pending edits of a row are written when the current row changes.
    #[default]
    OnRowChange,
    /// Nothing is written until `submit_all`.
    OnManualSubmit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowState {
    Clean,
    Inserted,
    Updated,
    Deleted,
}

#[derive(Debug, Clone)]
struct ModelRow {
    rowid: Option<i64>,
    values: Vec<Value>,
    original: Vec<Value>,
    dirty: BTreeSet<usize>,
    state: RowState,
}

impl ModelRow {
    fn stored(rowid: i64, values: Vec<Value>) -> Self {
        Self {
            rowid: Some(rowid),
            original: values.clone(),
            values,
            dirty: BTreeSet::new(),
            state: RowState::Clean,
        }
    }

    fn blank(columns: usize) -> Self {
        Self {
            rowid: None,
            values: vec![Value::Null; columns],
            original: vec![Value::Null; columns],
            dirty: BTreeSet::new(),
            state: RowState::Inserted,
        }
    }
}

/// Rows of one table, cached, with pending edits tracked per row.
#[derive(Debug, Clone, Default)]
pub struct SqlTableModel {
    table: Option<String>,
    columns: Vec<String>,
    headers: HashMap<usize, String>,
    rows: Vec<ModelRow>,
    strategy: EditStrategy,
}

impl SqlTableModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the model to a table. Clears rows and headers; call
    /// [`SqlTableModel::select`] to load data.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::TableMissing`] if the table does not exist.
    pub fn set_table(&mut self, conn: &SqliteConnection, table: &str) -> Result<()> {
        if !table_exists(conn, table)? {
            return Err(DbError::TableMissing(table.to_string()));
        }

        let stmt = conn.prepare(&format!("SELECT * FROM {}", quote_ident(table)))?;
        self.columns = stmt
            .column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        self.table = Some(table.to_string());
        self.headers.clear();
        self.rows.clear();
        Ok(())
    }

    #[must_use]
    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub const fn set_edit_strategy(&mut self, strategy: EditStrategy) {
        self.strategy = strategy;
    }

    #[must_use]
    pub const fn edit_strategy(&self) -> EditStrategy {
        self.strategy
    }

    fn require_table(&self) -> Result<&str> {
        self.table.as_deref().ok_or(DbError::NoTable)
    }

    /// Reload every row. Pending edits are discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if no table is bound or the query fails.
    pub fn select(&mut self, conn: &SqliteConnection) -> Result<usize> {
        let table = self.require_table()?;
        let mut stmt =
            conn.prepare(&format!("SELECT rowid, * FROM {}", quote_ident(table)))?;
        let column_count = stmt.column_count().saturating_sub(1);
        let rows = stmt
            .query_map([], |row| {
                let rowid: i64 = row.get(0)?;
                let values = (1..=column_count)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(ModelRow::stored(rowid, values))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::debug!(table, rows = rows.len(), "model selected");
        self.rows = rows;
        Ok(self.rows.len())
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn column_name(&self, col: usize) -> Option<&str> {
        self.columns.get(col).map(String::as_str)
    }

    pub fn set_header_data(&mut self, col: usize, label: impl Into<String>) -> bool {
        if col >= self.columns.len() {
            return false;
        }
        self.headers.insert(col, label.into());
        true
    }

    /// Header label, falling back to the column name.
    #[must_use]
    pub fn header_data(&self, col: usize) -> Option<&str> {
        self.headers
            .get(&col)
            .map(String::as_str)
            .or_else(|| self.column_name(col))
    }

    #[must_use]
    pub fn data(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row)?.values.get(col)
    }

    #[must_use]
    pub fn is_dirty(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .is_some_and(|r| r.state != RowState::Clean)
    }

    #[must_use]
    pub fn is_marked_deleted(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .is_some_and(|r| r.state == RowState::Deleted)
    }

    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        self.rows.iter().any(|r| r.state != RowState::Clean)
    }

    /// Write a value into the cache, and through to the database under
    /// [`EditStrategy::OnFieldChange`].
    ///
    /// # Errors
    ///
    /// Returns an error for an out of range index or a failed write.
    pub fn set_data(
        &mut self,
        conn: &SqliteConnection,
        row: usize,
        col: usize,
        value: Value,
    ) -> Result<()> {
        let entry = self.rows.get_mut(row).ok_or(DbError::RowOutOfRange(row))?;
        let cell = entry
            .values
            .get_mut(col)
            .ok_or(DbError::ColumnOutOfRange(col))?;

        if *cell == value {
            return Ok(());
        }
        *cell = value;
        entry.dirty.insert(col);
        if entry.state == RowState::Clean {
            entry.state = RowState::Updated;
        }

        if self.strategy == EditStrategy::OnFieldChange {
            self.submit_row(conn, row)?;
        }
        Ok(())
    }

    /// Append a blank row and return its index.
    ///
    /// Under [`EditStrategy::OnFieldChange`] the row is written right away.
    ///
    /// # Errors
    ///
    /// Returns an error if no table is bound or the insert fails.
    pub fn insert_row(&mut self, conn: &SqliteConnection) -> Result<usize> {
        self.require_table()?;
        self.rows.push(ModelRow::blank(self.columns.len()));
        let row = self.rows.len() - 1;

        if self.strategy == EditStrategy::OnFieldChange {
            self.submit_row(conn, row)?;
        }
        Ok(row)
    }

    /// Remove a row.
    ///
    /// An unsaved inserted row is dropped from the cache. Otherwise the row
    /// is deleted at once, except under [`EditStrategy::OnManualSubmit`]
    /// where it is marked and deleted by `submit_all`.
    ///
    /// # Errors
    ///
    /// Returns an error for an out of range row or a failed delete.
    pub fn remove_row(&mut self, conn: &SqliteConnection, row: usize) -> Result<()> {
        let entry = self.rows.get_mut(row).ok_or(DbError::RowOutOfRange(row))?;

        if entry.rowid.is_none() {
            self.rows.remove(row);
            return Ok(());
        }

        if self.strategy == EditStrategy::OnManualSubmit {
            entry.state = RowState::Deleted;
            return Ok(());
        }

        entry.state = RowState::Deleted;
        self.submit_row(conn, row)
    }

    /// Write the pending change of one row.
    ///
    /// # Errors
    ///
    /// Returns an error for an out of range row or a failed statement.
    pub fn submit_row(&mut self, conn: &SqliteConnection, row: usize) -> Result<()> {
        let table = self.require_table()?.to_string();
        let entry = self.rows.get(row).ok_or(DbError::RowOutOfRange(row))?;
        let (state, rowid) = (entry.state, entry.rowid);

        match state {
            RowState::Clean => {}
            RowState::Inserted => {
                let rowid = self.insert_into_table(conn, &table, row)?;
                self.reload_row(conn, &table, row, rowid)?;
            }
            RowState::Updated => {
                self.update_table(conn, &table, row)?;
                if let Some(entry) = self.rows.get_mut(row) {
                    entry.original.clone_from(&entry.values);
                    entry.dirty.clear();
                    entry.state = RowState::Clean;
                }
            }
            RowState::Deleted => {
                if let Some(rowid) = rowid {
                    conn.execute(
                        &format!("DELETE FROM {} WHERE rowid = ?1", quote_ident(&table)),
                        [rowid],
                    )?;
                    tracing::debug!(table, rowid, "row deleted");
                }
                self.rows.remove(row);
            }
        }
        Ok(())
    }

    /// Write every pending change, then reload.
    ///
    /// # Errors
    ///
    /// Stops at the first failing statement and returns its error.
    pub fn submit_all(&mut self, conn: &SqliteConnection) -> Result<()> {
        // Back to front so deleted rows do not shift pending indices.
        for row in (0..self.rows.len()).rev() {
            self.submit_row(conn, row)?;
        }
        self.select(conn)?;
        Ok(())
    }

    /// Discard pending edits without touching the database.
    pub fn revert_all(&mut self) {
        self.rows.retain(|r| r.state != RowState::Inserted);
        for entry in &mut self.rows {
            entry.values.clone_from(&entry.original);
            entry.dirty.clear();
            entry.state = RowState::Clean;
        }
    }

    fn insert_into_table(
        &self,
        conn: &SqliteConnection,
        table: &str,
        row: usize,
    ) -> Result<i64> {
        let entry = self.rows.get(row).ok_or(DbError::RowOutOfRange(row))?;
        let (names, values): (Vec<String>, Vec<&Value>) = self
            .columns
            .iter()
            .zip(&entry.values)
            .filter(|(_, v)| **v != Value::Null)
            .map(|(name, v)| (quote_ident(name), v))
            .unzip();

        if names.is_empty() {
            conn.execute(
                &format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table)),
                [],
            )?;
        } else {
            let placeholders = (1..=names.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            conn.execute(
                &format!(
                    "INSERT INTO {} ({}) VALUES ({placeholders})",
                    quote_ident(table),
                    names.join(", ")
                ),
                params_from_iter(values),
            )?;
        }

        let rowid = conn.last_insert_rowid();
        tracing::debug!(table, rowid, "row inserted");
        Ok(rowid)
    }

    fn update_table(&self, conn: &SqliteConnection, table: &str, row: usize) -> Result<()> {
        let entry = self.rows.get(row).ok_or(DbError::RowOutOfRange(row))?;
        let Some(rowid) = entry.rowid else {
            return Ok(());
        };

        let rowid_value = Value::Integer(rowid);
        let mut assignments = Vec::with_capacity(entry.dirty.len());
        let mut values: Vec<&Value> = Vec::with_capacity(entry.dirty.len() + 1);
        for &col in &entry.dirty {
            let name = self.columns.get(col).ok_or(DbError::ColumnOutOfRange(col))?;
            let value = entry.values.get(col).ok_or(DbError::ColumnOutOfRange(col))?;
            values.push(value);
            assignments.push(format!("{} = ?{}", quote_ident(name), values.len()));
        }
        if assignments.is_empty() {
            return Ok(());
        }

        values.push(&rowid_value);
        conn.execute(
            &format!(
                "UPDATE {} SET {} WHERE rowid = ?{}",
                quote_ident(table),
                assignments.join(", "),
                values.len()
            ),
            params_from_iter(values),
        )?;
        tracing::debug!(table, rowid, "row updated");
        Ok(())
    }

    /// Replace a cached row with what the database now holds, picking up
    /// the generated id and column defaults.
    fn reload_row(
        &mut self,
        conn: &SqliteConnection,
        table: &str,
        row: usize,
        rowid: i64,
    ) -> Result<()> {
        let column_count = self.columns.len();
        let values = conn.query_row(
            &format!("SELECT * FROM {} WHERE rowid = ?1", quote_ident(table)),
            [rowid],
            |r| {
                (0..column_count)
                    .map(|i| r.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            },
        )?;
        let entry = self.rows.get_mut(row).ok_or(DbError::RowOutOfRange(row))?;
        *entry = ModelRow::stored(rowid, values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rectangle::{self, TABLE};

    fn seeded() -> SqliteConnection {
        let conn = SqliteConnection::open_in_memory().unwrap();
        rectangle::create_table(&conn, TABLE).unwrap();
        rectangle::insert_samples(&conn, TABLE).unwrap();
        conn
    }

    fn model(conn: &SqliteConnection, strategy: EditStrategy) -> SqlTableModel {
        let mut model = SqlTableModel::new();
        model.set_table(conn, TABLE).unwrap();
        model.set_edit_strategy(strategy);
        model.select(conn).unwrap();
        model
    }

    #[test]
    fn test_set_table_missing() {
        let conn = SqliteConnection::open_in_memory().unwrap();
        let mut model = SqlTableModel::new();
        assert!(matches!(
            model.set_table(&conn, TABLE),
            Err(DbError::TableMissing(_))
        ));
        assert_eq!(model.table_name(), None);
        assert!(matches!(model.select(&conn), Err(DbError::NoTable)));
    }

    #[test]
    fn test_select_loads_rows_and_columns() {
        let conn = seeded();
        let model = model(&conn, EditStrategy::OnRowChange);

        assert_eq!(model.table_name(), Some(TABLE));
        assert_eq!(model.row_count(), 10);
        assert_eq!(model.column_count(), 8);
        assert_eq!(model.column_name(4), Some("left"));
        assert_eq!(model.data(0, 1), Some(&Value::Text("#ff0000".into())));
        assert_eq!(model.data(0, 2), Some(&Value::Integer(1)));
        assert_eq!(model.data(10, 0), None);
    }

    #[test]
    fn test_headers_fall_back_to_column_names() {
        let conn = seeded();
        let mut model = model(&conn, EditStrategy::OnRowChange);

        assert_eq!(model.header_data(1), Some("pencolor"));
        assert!(model.set_header_data(1, "Color"));
        assert_eq!(model.header_data(1), Some("Color"));
        assert!(!model.set_header_data(8, "Nope"));
        assert_eq!(model.header_data(8), None);
    }

    #[test]
    fn test_field_change_writes_immediately() {
        let conn = seeded();
        let mut model = model(&conn, EditStrategy::OnFieldChange);

        model.set_data(&conn, 0, 2, Value::Integer(3)).unwrap();
        assert!(!model.is_dirty(0));

        let stored: i64 = conn
            .query_row("SELECT penstyle FROM rectangle WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, 3);
    }

    #[test]
    fn test_row_change_waits_for_submit_row() {
        let conn = seeded();
        let mut model = model(&conn, EditStrategy::OnRowChange);

        model
            .set_data(&conn, 0, 1, Value::Text("#123456".into()))
            .unwrap();
        assert!(model.is_dirty(0));
        let stored: String = conn
            .query_row("SELECT pencolor FROM rectangle WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, "#ff0000");

        model.submit_row(&conn, 0).unwrap();
        assert!(!model.is_dirty(0));
        let stored: String = conn
            .query_row("SELECT pencolor FROM rectangle WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, "#123456");
    }

    #[test]
    fn test_insert_row_appends_and_submits() {
        let conn = seeded();
        let mut model = model(&conn, EditStrategy::OnRowChange);

        let row = model.insert_row(&conn).unwrap();
        assert_eq!(row, 10);
        assert_eq!(model.row_count(), 11);
        assert_eq!(model.data(row, 0), Some(&Value::Null));
        assert_eq!(rectangle::count_rows(&conn, TABLE).unwrap(), 10);

        model.set_data(&conn, row, 3, Value::Integer(7)).unwrap();
        model.submit_row(&conn, row).unwrap();
        assert_eq!(rectangle::count_rows(&conn, TABLE).unwrap(), 11);
        assert_eq!(model.data(row, 0), Some(&Value::Integer(11)));
        assert_eq!(model.data(row, 3), Some(&Value::Integer(7)));
        assert!(!model.is_dirty(row));
    }

    #[test]
    fn test_insert_row_on_field_change_uses_defaults() {
        let conn = seeded();
        let mut model = model(&conn, EditStrategy::OnFieldChange);

        let row = model.insert_row(&conn).unwrap();
        assert_eq!(rectangle::count_rows(&conn, TABLE).unwrap(), 11);
        assert_eq!(model.data(row, 0), Some(&Value::Integer(11)));
    }

    #[test]
    fn test_remove_row_deletes_immediately() {
        let conn = seeded();
        let mut model = model(&conn, EditStrategy::OnRowChange);

        model.remove_row(&conn, 0).unwrap();
        assert_eq!(model.row_count(), 9);
        assert_eq!(rectangle::count_rows(&conn, TABLE).unwrap(), 9);

        model.select(&conn).unwrap();
        assert_eq!(model.row_count(), 9);
        assert_eq!(model.data(0, 0), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_remove_unsaved_row_only_touches_cache() {
        let conn = seeded();
        let mut model = model(&conn, EditStrategy::OnRowChange);

        let row = model.insert_row(&conn).unwrap();
        model.remove_row(&conn, row).unwrap();
        assert_eq!(model.row_count(), 10);
        assert_eq!(rectangle::count_rows(&conn, TABLE).unwrap(), 10);
    }

    #[test]
    fn test_manual_submit_defers_everything() {
        let conn = seeded();
        let mut model = model(&conn, EditStrategy::OnManualSubmit);

        model.remove_row(&conn, 1).unwrap();
        assert!(model.is_marked_deleted(1));
        model.set_data(&conn, 0, 3, Value::Integer(42)).unwrap();
        let row = model.insert_row(&conn).unwrap();
        model
            .set_data(&conn, row, 1, Value::Text("#abcdef".into()))
            .unwrap();
        assert!(model.has_pending_changes());
        assert_eq!(rectangle::count_rows(&conn, TABLE).unwrap(), 10);

        model.submit_all(&conn).unwrap();
        assert!(!model.has_pending_changes());
        assert_eq!(rectangle::count_rows(&conn, TABLE).unwrap(), 10);
        assert_eq!(model.row_count(), 10);

        let width: i64 = conn
            .query_row("SELECT penwidth FROM rectangle WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(width, 42);
        let gone: i64 = conn
            .query_row("SELECT COUNT(*) FROM rectangle WHERE id = 2", [], |r| r.get(0))
            .unwrap();
        assert_eq!(gone, 0);
    }

    #[test]
    fn test_revert_all() {
        let conn = seeded();
        let mut model = model(&conn, EditStrategy::OnManualSubmit);

        model.set_data(&conn, 0, 3, Value::Integer(42)).unwrap();
        model.remove_row(&conn, 1).unwrap();
        model.insert_row(&conn).unwrap();

        model.revert_all();
        assert!(!model.has_pending_changes());
        assert_eq!(model.row_count(), 10);
        assert_eq!(model.data(0, 3), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_select_discards_pending() {
        let conn = seeded();
        let mut model = model(&conn, EditStrategy::OnRowChange);
        model.insert_row(&conn).unwrap();
        model.select(&conn).unwrap();
        assert_eq!(model.row_count(), 10);
    }

    #[test]
    fn test_out_of_range() {
        let conn = seeded();
        let mut model = model(&conn, EditStrategy::OnRowChange);
        assert!(matches!(
            model.set_data(&conn, 99, 0, Value::Null),
            Err(DbError::RowOutOfRange(99))
        ));
        assert!(matches!(
            model.set_data(&conn, 0, 99, Value::Null),
            Err(DbError::ColumnOutOfRange(99))
        ));
        assert!(matches!(
            model.remove_row(&conn, 99),
            Err(DbError::RowOutOfRange(99))
        ));
    }
}
