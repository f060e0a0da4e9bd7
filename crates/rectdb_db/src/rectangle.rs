//! Fixed statements against the `rectangle` table.
//!
//! The statements run verbatim; each insert path binds its parameters a
//! different way.

use rusqlite::{Connection as SqliteConnection, named_params, params};

use crate::{DbError, PenStyle, Result, connection::table_exists, value::quote_ident};

pub const TABLE: &str = "rectangle";

pub const ID_COLUMN: usize = 0;
pub const PEN_COLOR_COLUMN: usize = 1;
pub const PEN_STYLE_COLUMN: usize = 2;

/// Column names in table order.
pub const COLUMNS: [&str; 8] = [
    "id", "pencolor", "penstyle", "penwidth", "left", "top", "width", "height",
];

/// Grid headers in table order.
pub const HEADERS: [&str; 8] = [
    "ID", "Color", "Style", "PenWidth", "Left", "Top", "Width", "Height",
];

/// One row of the `rectangle` table without its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rectangle {
    /// `#rrggbb`
    pub pencolor: String,
    pub penstyle: PenStyle,
    pub penwidth: i64,
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl Rectangle {
    fn new(
        pencolor: &str,
        penstyle: PenStyle,
        penwidth: i64,
        (left, top, width, height): (i64, i64, i64, i64),
    ) -> Self {
        Self {
            pencolor: pencolor.to_string(),
            penstyle,
            penwidth,
            left,
            top,
            width,
            height,
        }
    }
}

fn create_sql(table: &str) -> String {
    format!(
        "CREATE TABLE {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pencolor TEXT,
            penstyle INTEGER,
            penwidth INTEGER,
            \"left\" INTEGER,
            \"top\" INTEGER,
            width INTEGER,
            height INTEGER
        );",
        quote_ident(table)
    )
}

fn insert_prefix(table: &str) -> String {
    format!(
        "INSERT INTO {} (pencolor, penstyle, penwidth, \"left\", \"top\", width, height)",
        quote_ident(table)
    )
}

fn require_table(conn: &SqliteConnection, table: &str) -> Result<()> {
    if table_exists(conn, table)? {
        Ok(())
    } else {
        Err(DbError::TableMissing(table.to_string()))
    }
}

/// Create the table, dropping an existing one first.
///
/// Returns whether an old table was dropped.
///
/// # Errors
///
/// Returns an error if either statement fails.
pub fn create_table(conn: &SqliteConnection, table: &str) -> Result<bool> {
    let dropped = drop_table(conn, table)?;
    conn.execute_batch(&create_sql(table))?;
    tracing::info!(table, recreated = dropped, "table created");
    Ok(dropped)
}

/// Drop the table. Returns `false` when it did not exist.
///
/// # Errors
///
/// Returns an error if the catalog lookup or `DROP TABLE` fails.
pub fn drop_table(conn: &SqliteConnection, table: &str) -> Result<bool> {
    if !table_exists(conn, table)? {
        tracing::debug!(table, "drop skipped, table does not exist");
        return Ok(false);
    }
    conn.execute_batch(&format!("DROP TABLE {};", quote_ident(table)))?;
    tracing::info!(table, "table dropped");
    Ok(true)
}

/// Rows written by the named-parameter insert.
fn named_rows() -> [Rectangle; 3] {
    [
        Rectangle::new("#00ff00", PenStyle::DashLine, 2, (20, 20, 120, 60)),
        Rectangle::new("#0000ff", PenStyle::DotLine, 3, (40, 30, 80, 80)),
        Rectangle::new("#ffff00", PenStyle::DashDotLine, 1, (60, 40, 200, 30)),
    ]
}

/// Rows written by the positional `?` insert.
fn positional_rows() -> [Rectangle; 3] {
    [
        Rectangle::new("#ff00ff", PenStyle::DashDotDotLine, 4, (80, 50, 50, 50)),
        Rectangle::new("#00ffff", PenStyle::SolidLine, 5, (100, 60, 150, 90)),
        Rectangle::new("#000000", PenStyle::NoPen, 1, (120, 70, 30, 120)),
    ]
}

/// Rows written by the indexed-bind insert.
fn indexed_rows() -> [Rectangle; 3] {
    [
        Rectangle::new("#808080", PenStyle::DashLine, 2, (140, 80, 70, 40)),
        Rectangle::new("#ffa500", PenStyle::DotLine, 3, (160, 90, 90, 90)),
        Rectangle::new("#800080", PenStyle::SolidLine, 6, (180, 100, 110, 20)),
    ]
}

/// Plain statement with literal values.
fn insert_literal(conn: &SqliteConnection, table: &str) -> Result<usize> {
    let sql = format!(
        "{} VALUES ('#ff0000', 1, 1, 10, 10, 100, 50);",
        insert_prefix(table)
    );
    Ok(conn.execute(&sql, [])?)
}

/// Prepared statement with `:name` placeholders.
fn insert_named(
    conn: &SqliteConnection,
    table: &str,
    rows: &[Rectangle],
) -> Result<usize> {
    let sql = format!(
        "{} VALUES (:pencolor, :penstyle, :penwidth, :left, :top, :width, :height);",
        insert_prefix(table)
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut inserted = 0;
    for r in rows {
        inserted += stmt.execute(named_params! {
            ":pencolor": r.pencolor,
            ":penstyle": r.penstyle,
            ":penwidth": r.penwidth,
            ":left": r.left,
            ":top": r.top,
            ":width": r.width,
            ":height": r.height,
        })?;
    }
    Ok(inserted)
}

/// Prepared statement with anonymous `?` placeholders bound in order.
fn insert_positional(
    conn: &SqliteConnection,
    table: &str,
    rows: &[Rectangle],
) -> Result<usize> {
    let sql = format!("{} VALUES (?, ?, ?, ?, ?, ?, ?);", insert_prefix(table));
    let mut stmt = conn.prepare(&sql)?;
    let mut inserted = 0;
    for r in rows {
        inserted += stmt.execute(params![
            r.pencolor, r.penstyle, r.penwidth, r.left, r.top, r.width, r.height
        ])?;
    }
    Ok(inserted)
}

/// Prepared statement with numbered placeholders, each bound by index.
fn insert_indexed(
    conn: &SqliteConnection,
    table: &str,
    rows: &[Rectangle],
) -> Result<usize> {
    let sql = format!(
        "{} VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        insert_prefix(table)
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut inserted = 0;
    for r in rows {
        stmt.raw_bind_parameter(1, &r.pencolor)?;
        stmt.raw_bind_parameter(2, r.penstyle)?;
        stmt.raw_bind_parameter(3, r.penwidth)?;
        stmt.raw_bind_parameter(4, r.left)?;
        stmt.raw_bind_parameter(5, r.top)?;
        stmt.raw_bind_parameter(6, r.width)?;
        stmt.raw_bind_parameter(7, r.height)?;
        inserted += stmt.raw_execute()?;
    }
    Ok(inserted)
}

/// Insert the ten sample rows.
///
/// # Errors
///
/// Returns [`DbError::TableMissing`] if the table does not exist, or the
/// first failing statement's error.
pub fn insert_samples(conn: &SqliteConnection, table: &str) -> Result<usize> {
    require_table(conn, table)?;

    let literal = insert_literal(conn, table)?;
    tracing::debug!(rows = literal, "inserted with literal values");
    let named = insert_named(conn, table, &named_rows())?;
    tracing::debug!(rows = named, "inserted with named binds");
    let positional = insert_positional(conn, table, &positional_rows())?;
    tracing::debug!(rows = positional, "inserted with positional binds");
    let indexed = insert_indexed(conn, table, &indexed_rows())?;
    tracing::debug!(rows = indexed, "inserted with indexed binds");

    let total = literal + named + positional + indexed;
    tracing::info!(table, rows = total, "sample rows inserted");
    Ok(total)
}

/// `SELECT *` formatted one line per row.
///
/// Columns are looked up by name since `SELECT *` order is not assumed.
///
/// # Errors
///
/// Returns [`DbError::TableMissing`] if the table does not exist, or an
/// error if a rectangle column is missing or the query fails.
pub fn fetch_lines(conn: &SqliteConnection, table: &str) -> Result<Vec<String>> {
    use crate::value::display_value_ref;

    require_table(conn, table)?;

    let mut stmt = conn.prepare(&format!("SELECT * FROM {};", quote_ident(table)))?;
    let indices = COLUMNS
        .iter()
        .map(|name| stmt.column_index(name))
        .collect::<rusqlite::Result<Vec<usize>>>()?;

    let lines = stmt
        .query_map([], |row| {
            let mut parts = Vec::with_capacity(indices.len());
            for (name, &idx) in COLUMNS.iter().zip(&indices) {
                parts.push(format!("{name}={}", display_value_ref(row.get_ref(idx)?)));
            }
            Ok(parts.join(" "))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(lines)
}

/// Row count of the table.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_rows(conn: &SqliteConnection, table: &str) -> Result<i64> {
    let count = conn.query_row(
        &format!("SELECT COUNT(*) FROM {};", quote_ident(table)),
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
