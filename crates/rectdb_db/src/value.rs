use rusqlite::types::{Value, ValueRef};

/// Text shown for a SQLite value in grids and logs.
#[must_use]
pub fn display_value(value: &Value) -> String {
    display_value_ref(ValueRef::from(value))
}

#[must_use]
pub fn display_value_ref(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(v) => v.to_string(),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => format!("<{} bytes>", bytes.len()),
    }
}

/// Integer view of a value, accepting numeric text.
#[must_use]
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(v) => Some(*v),
        #[allow(clippy::cast_possible_truncation)]
        Value::Real(v) => Some(*v as i64),
        Value::Text(text) => text.trim().parse().ok(),
        Value::Null | Value::Blob(_) => None,
    }
}

/// Text view of a value. `None` for NULL and blobs.
#[must_use]
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text.clone()),
        Value::Integer(v) => Some(v.to_string()),
        Value::Real(v) => Some(v.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}

/// Double-quote an identifier for interpolation into SQL.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&Value::Null), "NULL");
        assert_eq!(display_value(&Value::Integer(7)), "7");
        assert_eq!(display_value(&Value::Text("#ff0000".into())), "#ff0000");
        assert_eq!(display_value(&Value::Blob(vec![1, 2, 3])), "<3 bytes>");
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(as_integer(&Value::Integer(2)), Some(2));
        assert_eq!(as_integer(&Value::Text(" 12 ".into())), Some(12));
        assert_eq!(as_integer(&Value::Text("abc".into())), None);
        assert_eq!(as_integer(&Value::Null), None);
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("left"), "\"left\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
