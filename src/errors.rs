use std::fmt;

use rectdb_db::DbError;

/// Application-specific errors
#[derive(Debug)]
pub enum AppError {
    /// A precondition of the command does not hold; nothing was done
    NotReady(String),
    /// Database operation error
    Database(DbError),
    /// Configuration file could not be parsed
    Config(serde_json::Error),
    /// I/O error
    Io(std::io::Error),
}

impl AppError {
    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self::NotReady(reason.into())
    }

    /// Guard failures are diagnostics, everything else is an error.
    #[must_use]
    pub const fn is_guard(&self) -> bool {
        matches!(self, Self::NotReady(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady(reason) => write!(f, "{reason}"),
            Self::Database(err) => write!(f, "Database error: {err}"),
            Self::Config(err) => write!(f, "Config error: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotReady(_) => None,
            Self::Database(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        Self::Database(err)
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(DbError::from(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
