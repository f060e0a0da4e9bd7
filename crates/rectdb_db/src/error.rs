use std::fmt;

/// Errors raised by the database layer
#[derive(Debug)]
pub enum DbError {
    /// Error reported by SQLite
    Sqlite(rusqlite::Error),
    /// No connection is registered under the given name
    NotRegistered(String),
    /// The named connection exists but is closed
    NotOpen(String),
    /// The table does not exist in the open database
    TableMissing(String),
    /// The model has no table bound to it
    NoTable,
    /// Row index past the end of the model
    RowOutOfRange(usize),
    /// Column index past the end of the model
    ColumnOutOfRange(usize),
    /// SQL text that contains no statement
    EmptyQuery,
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "SQLite error: {err}"),
            Self::NotRegistered(name) => {
                write!(f, "no connection registered as '{name}'")
            }
            Self::NotOpen(name) => write!(f, "connection '{name}' is not open"),
            Self::TableMissing(table) => {
                write!(f, "table '{table}' does not exist")
            }
            Self::NoTable => write!(f, "model has no table"),
            Self::RowOutOfRange(row) => write!(f, "row {row} is out of range"),
            Self::ColumnOutOfRange(col) => {
                write!(f, "column {col} is out of range")
            }
            Self::EmptyQuery => write!(f, "query is empty"),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::NotRegistered(_)
            | Self::NotOpen(_)
            | Self::TableMissing(_)
            | Self::NoTable
            | Self::RowOutOfRange(_)
            | Self::ColumnOutOfRange(_)
            | Self::EmptyQuery => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(err)
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
