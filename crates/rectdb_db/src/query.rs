use rusqlite::Connection as SqliteConnection;
use sqlparser::{ast::Statement, dialect::SQLiteDialect, parser::Parser};

use crate::{DbError, Result, value::display_value_ref};

/// What running a piece of SQL produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutput {
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Affected(usize),
}

/// Coarse statement kind, used for logging and for deciding whether the
/// grid needs a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Query,
    Insert,
    Update,
    Delete,
    CreateTable,
    Drop,
    Other,
}

impl StatementKind {
    fn of(statement: &Statement) -> Self {
        if matches!(statement, Statement::Query { .. }) {
            Self::Query
        } else if matches!(statement, Statement::Insert { .. }) {
            Self::Insert
        } else if matches!(statement, Statement::Update { .. }) {
            Self::Update
        } else if matches!(statement, Statement::Delete { .. }) {
            Self::Delete
        } else if matches!(statement, Statement::CreateTable { .. }) {
            Self::CreateTable
        } else if matches!(statement, Statement::Drop { .. }) {
            Self::Drop
        } else {
            Self::Other
        }
    }

    #[must_use]
    pub const fn modifies_data(self) -> bool {
        !matches!(self, Self::Query)
    }
}

/// Classify the statements in `sql`.
///
/// `None` when the parser does not understand the text; SQLite may still
/// accept it.
#[must_use]
pub fn classify(sql: &str) -> Option<Vec<StatementKind>> {
    match Parser::parse_sql(&SQLiteDialect {}, sql) {
        Ok(statements) => Some(statements.iter().map(StatementKind::of).collect()),
        Err(err) => {
            tracing::warn!("SQL not understood by parser, passing to SQLite: {err}");
            None
        }
    }
}

fn total_changes(conn: &SqliteConnection) -> Result<i64> {
    Ok(conn.query_row("SELECT total_changes()", [], |row| row.get(0))?)
}

/// Run `sql` as one batch and count the rows it changed.
fn run_batch(conn: &SqliteConnection, sql: &str) -> Result<QueryOutput> {
    let before = total_changes(conn)?;
    conn.execute_batch(sql)?;
    let affected = total_changes(conn)?.saturating_sub(before);
    Ok(QueryOutput::Affected(
        usize::try_from(affected).unwrap_or_default(),
    ))
}

/// Run user-supplied SQL.
///
/// A single statement runs as written and returns its rows when it has
/// result columns. Several statements run as one batch, including text the
/// parser rejects but SQLite sees as more than one statement.
///
/// # Errors
///
/// Returns [`DbError::EmptyQuery`] for blank input, or the SQLite error.
pub fn run_query(conn: &SqliteConnection, sql: &str) -> Result<QueryOutput> {
    let sql = sql.trim();
    if sql.trim_matches(|c: char| c == ';' || c.is_whitespace()).is_empty() {
        return Err(DbError::EmptyQuery);
    }

    let kinds = classify(sql);
    match kinds.as_deref() {
        Some([]) => return Err(DbError::EmptyQuery),
        Some(kinds) if kinds.len() > 1 => {
            tracing::info!(statements = kinds.len(), "running batch");
            return run_batch(conn, sql);
        }
        Some(kinds) => tracing::info!(kind = ?kinds.first(), "running statement"),
        None => {}
    }

    let mut stmt = match conn.prepare(sql) {
        Ok(stmt) => stmt,
        Err(rusqlite::Error::MultipleStatement) if kinds.is_none() => {
            tracing::info!("running unparsed text as a batch");
            return run_batch(conn, sql);
        }
        Err(err) => return Err(err.into()),
    };
    if stmt.column_count() == 0 {
        let affected = stmt.execute([])?;
        return Ok(QueryOutput::Affected(affected));
    }

    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    let column_count = columns.len();
    let rows = stmt
        .query_map([], |row| {
            (0..column_count)
                .map(|i| row.get_ref(i).map(display_value_ref))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(QueryOutput::Rows { columns, rows })
}
