use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};

/// Pen style stored as an integer in the `penstyle` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PenStyle {
    NoPen = 0,
    #[default]
    SolidLine = 1,
    DashLine = 2,
    DotLine = 3,
    DashDotLine = 4,
    DashDotDotLine = 5,
}

impl PenStyle {
    pub const ALL: [Self; 6] = [
        Self::NoPen,
        Self::SolidLine,
        Self::DashLine,
        Self::DotLine,
        Self::DashDotLine,
        Self::DashDotDotLine,
    ];

    #[must_use]
    pub const fn value(self) -> i64 {
        self as i64
    }

    #[must_use]
    pub const fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::NoPen),
            1 => Some(Self::SolidLine),
            2 => Some(Self::DashLine),
            3 => Some(Self::DotLine),
            4 => Some(Self::DashDotLine),
            5 => Some(Self::DashDotDotLine),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoPen => "NoPen",
            Self::SolidLine => "SolidLine",
            Self::DashLine => "DashLine",
            Self::DotLine => "DotLine",
            Self::DashDotLine => "DashDotLine",
            Self::DashDotDotLine => "DashDotDotLine",
        }
    }
}

impl Display for PenStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Display text for a raw style value, `Style(N)` when unknown.
#[must_use]
pub fn style_label(value: i64) -> String {
    PenStyle::from_value(value)
        .map_or_else(|| format!("Style({value})"), |style| style.name().to_string())
}

impl ToSql for PenStyle {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.value()))
    }
}

impl FromSql for PenStyle {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_i64()?;
        Self::from_value(raw).ok_or(FromSqlError::OutOfRange(raw))
    }
}
