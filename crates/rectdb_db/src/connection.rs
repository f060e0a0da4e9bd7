use std::{
    collections::HashMap,
    fmt::Display,
    path::{Path, PathBuf},
};

use rusqlite::{Connection as SqliteConnection, OptionalExtension, params};

use crate::{DbError, Result};

/// A SQLite handle registered under a fixed name.
///
/// Closing keeps the entry around so the next open re-uses it.
#[derive(Debug)]
pub struct NamedConnection {
    name: String,
    database_name: PathBuf,
    handle: Option<SqliteConnection>,
}

impl NamedConnection {
    #[must_use]
    pub fn new(name: impl Into<String>, database_name: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            database_name: database_name.into(),
            handle: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn database_name(&self) -> &Path {
        &self.database_name
    }

    /// Takes effect on the next [`NamedConnection::open`].
    pub fn set_database_name(&mut self, database_name: impl Into<PathBuf>) {
        self.database_name = database_name.into();
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Open the database file, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot open the file.
    pub fn open(&mut self) -> Result<()> {
        if self.handle.is_some() {
            tracing::debug!(connection = %self.name, "already open");
            return Ok(());
        }

        let conn = SqliteConnection::open(&self.database_name)?;
        tracing::info!(
            connection = %self.name,
            file = %self.database_name.display(),
            "connection opened"
        );
        self.handle = Some(conn);
        Ok(())
    }

    /// Close the handle. The connection stays registered.
    pub fn close(&mut self) {
        let Some(conn) = self.handle.take() else {
            return;
        };

        // A failed close hands the connection back; dropping it still
        // releases the file.
        if let Err((_conn, err)) = conn.close() {
            tracing::warn!(connection = %self.name, "close reported: {err}");
        }
        tracing::info!(connection = %self.name, "connection closed");
    }

    /// The open SQLite handle.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotOpen`] when the connection is closed.
    pub fn handle(&self) -> Result<&SqliteConnection> {
        self.handle
            .as_ref()
            .ok_or_else(|| DbError::NotOpen(self.name.clone()))
    }

    /// User tables in the database, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is closed or the catalog query fails.
    pub fn tables(&self) -> Result<Vec<String>> {
        let conn = self.handle()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )?;
        let tables = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(tables)
    }

    /// # Errors
    ///
    /// Returns an error if the connection is closed or the catalog query fails.
    pub fn has_table(&self, table: &str) -> Result<bool> {
        table_exists(self.handle()?, table)
    }
}

impl Display for NamedConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            " Name: {}\n File: {}\n State: {}",
            self.name,
            self.database_name.display(),
            if self.is_open() { "open" } else { "closed" }
        )
    }
}

/// Check the catalog for a table.
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub fn table_exists(conn: &SqliteConnection, table: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Connections keyed by name.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<String, NamedConnection>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.connections.contains_key(name)
    }

    #[must_use]
    pub fn database(&self, name: &str) -> Option<&NamedConnection> {
        self.connections.get(name)
    }

    pub fn database_mut(&mut self, name: &str) -> Option<&mut NamedConnection> {
        self.connections.get_mut(name)
    }

    /// Register a new connection. An existing entry with the same name is
    /// closed and replaced.
    pub fn add_database(
        &mut self,
        name: &str,
        database_name: impl Into<PathBuf>,
    ) -> &mut NamedConnection {
        if let Some(mut old) = self.connections.remove(name) {
            tracing::warn!(
                connection = name,
                "duplicate connection name, old connection removed"
            );
            old.close();
        }
        self.connections
            .entry(name.to_string())
            .or_insert_with(|| NamedConnection::new(name, database_name))
    }

    /// Unregister a connection, closing it.
    pub fn remove_database(&mut self, name: &str) -> Option<NamedConnection> {
        let mut removed = self.connections.remove(name)?;
        removed.close();
        Some(removed)
    }

    #[must_use]
    pub fn connection_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> =
            self.connections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONN: &str = "rectangles_conn";

    #[test]
    fn test_open_and_close_keeps_registration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sqlite");

        let mut registry = ConnectionRegistry::new();
        assert!(!registry.contains(CONN));

        registry.add_database(CONN, &path).open().unwrap();
        assert!(registry.contains(CONN));
        assert!(registry.database(CONN).unwrap().is_open());
        assert_eq!(registry.database(CONN).unwrap().database_name(), path.as_path());

        registry.database_mut(CONN).unwrap().close();
        let conn = registry.database(CONN).unwrap();
        assert!(!conn.is_open());
        assert!(matches!(conn.handle(), Err(DbError::NotOpen(_))));
    }

    #[test]
    fn test_open_twice_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = NamedConnection::new(CONN, dir.path().join("a.sqlite"));
        conn.open().unwrap();
        conn.handle()
            .unwrap()
            .execute_batch("CREATE TABLE t (x INTEGER);")
            .unwrap();
        conn.open().unwrap();
        assert!(conn.has_table("t").unwrap());
    }

    #[test]
    fn test_tables_lists_user_tables() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = NamedConnection::new(CONN, dir.path().join("a.sqlite"));
        conn.open().unwrap();
        conn.handle()
            .unwrap()
            .execute_batch(
                "CREATE TABLE b (id INTEGER PRIMARY KEY AUTOINCREMENT);
                 CREATE TABLE a (x TEXT);",
            )
            .unwrap();

        // sqlite_sequence is created by AUTOINCREMENT and must be hidden
        assert_eq!(conn.tables().unwrap(), vec!["a", "b"]);
        assert!(!conn.has_table("missing").unwrap());
    }

    #[test]
    fn test_add_database_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ConnectionRegistry::new();
        registry
            .add_database(CONN, dir.path().join("one.sqlite"))
            .open()
            .unwrap();

        let replaced = registry.add_database(CONN, dir.path().join("two.sqlite"));
        assert!(!replaced.is_open());
        assert!(replaced.database_name().ends_with("two.sqlite"));
        assert_eq!(registry.connection_names(), vec![CONN]);
    }

    #[test]
    fn test_remove_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ConnectionRegistry::new();
        registry
            .add_database(CONN, dir.path().join("one.sqlite"))
            .open()
            .unwrap();

        let removed = registry.remove_database(CONN).unwrap();
        assert!(!removed.is_open());
        assert!(!registry.contains(CONN));
        assert!(registry.remove_database(CONN).is_none());
    }
}
