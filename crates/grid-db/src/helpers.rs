//! SQL building and value conversion helpers.
//!
//! Table and column names are interpolated into SQL text, so every name goes
//! through [`quote_ident`]; values always travel as bound parameters.

use grid_core::Value;

/// Highest bind parameter index used in a single statement.
///
/// Matches the historical `SQLITE_MAX_VARIABLE_NUMBER` default, which every
/// build accepts.
pub const MAX_BIND_PARAMS: usize = 999;

/// Quote an identifier for safe interpolation (`a"b` -> `"a""b"`).
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Comma-separated quoted column list.
#[must_use]
pub fn column_list<S: AsRef<str>>(columns: &[S]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `(?n, ?n+1, ...)` tuple of `width` numbered placeholders starting at `start`.
#[must_use]
pub fn placeholder_tuple(start: usize, width: usize) -> String {
    let slots: Vec<String> = (start..start + width).map(|i| format!("?{i}")).collect();
    format!("({})", slots.join(", "))
}

/// Convert a cell value into a libSQL bind parameter.
#[must_use]
pub fn to_sql_value(value: &Value) -> libsql::Value {
    match value {
        Value::Null => libsql::Value::Null,
        Value::Integer(i) => libsql::Value::Integer(*i),
        Value::Real(r) => libsql::Value::Real(*r),
        Value::Text(s) => libsql::Value::Text(s.clone()),
        Value::Blob(b) => libsql::Value::Blob(b.clone()),
    }
}

/// Convert a libSQL column value into a cell value.
#[must_use]
pub fn from_sql_value(value: libsql::Value) -> Value {
    match value {
        libsql::Value::Null => Value::Null,
        libsql::Value::Integer(i) => Value::Integer(i),
        libsql::Value::Real(r) => Value::Real(r),
        libsql::Value::Text(s) => Value::Text(s),
        libsql::Value::Blob(b) => Value::Blob(b),
    }
}

/// Read every column of a result row as cell values.
///
/// # Errors
///
/// Returns `DatabaseError` if a column cannot be read.
pub fn row_values(
    row: &libsql::Row,
    width: i32,
) -> Result<Vec<Value>, crate::error::DatabaseError> {
    (0..width)
        .map(|idx| Ok(from_sql_value(row.get_value(idx)?)))
        .collect()
}
