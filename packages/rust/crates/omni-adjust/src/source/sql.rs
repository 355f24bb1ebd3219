//! Relational backend: SQL over SQLite, one read-only connection per request.

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, OpenFlags, Statement, ToSql};
use serde_json::{Map, Value};

use super::{RowSource, SourceQuery};
use crate::error::SourceError;
use crate::row::{Row, RowSet, Scalar};

const PARAMETER_PREFIXES: [char; 3] = [':', '@', '$'];

/// SQL row source; the request's connection descriptor names the database.
///
/// Descriptors are file paths, `file:` URIs, or `sqlite://<path>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlRowSource;

impl SqlRowSource {
    /// Create a SQL row source.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RowSource for SqlRowSource {
    fn backend_name(&self) -> &'static str {
        "sql"
    }

    fn requires_connection(&self) -> bool {
        true
    }

    fn execute(&self, query: &SourceQuery) -> Result<RowSet, SourceError> {
        let descriptor = query
            .connection
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| SourceError::Connection("missing connection descriptor".to_string()))?;
        let conn = open_read_only(descriptor)?;
        log::debug!("sql query on {descriptor}: {}", query.text);
        run_query(&conn, &query.text, &query.parameters)
    }
}

fn open_read_only(descriptor: &str) -> Result<Connection, SourceError> {
    let path = descriptor.strip_prefix("sqlite://").unwrap_or(descriptor);
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Connection::open_with_flags(path, flags)
        .map_err(|err| SourceError::Connection(format!("failed to open {path}: {err}")))
}

/// Run `sql` on an open connection and convert every column of every row.
pub(crate) fn run_query(
    conn: &Connection,
    sql: &str,
    parameters: &Map<String, Value>,
) -> Result<RowSet, SourceError> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let bound = bind_values(&stmt, parameters)?;
    let params: Vec<(&str, &dyn ToSql)> = bound
        .iter()
        .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
        .collect();

    let mut rows = stmt.query(params.as_slice())?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut mapped = Row::new();
        for (index, column) in columns.iter().enumerate() {
            mapped.insert(column.clone(), scalar_from_sql(row.get_ref(index)?));
        }
        out.push(mapped);
    }
    Ok(RowSet::from_rows(out))
}

/// Keep only parameters the statement actually declares.
fn bind_values(
    stmt: &Statement<'_>,
    parameters: &Map<String, Value>,
) -> Result<Vec<(String, SqlValue)>, SourceError> {
    let mut bound = Vec::with_capacity(parameters.len());
    for (name, value) in parameters {
        let key = if name.starts_with(PARAMETER_PREFIXES) {
            name.clone()
        } else {
            format!(":{name}")
        };
        if stmt.parameter_index(&key)?.is_none() {
            log::debug!("sql statement does not use parameter {key}");
            continue;
        }
        bound.push((key, sql_from_json(value)));
    }
    Ok(bound)
}

fn sql_from_json(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None if n.is_u64() => SqlValue::Text(n.to_string()),
            None => n.as_f64().map_or(SqlValue::Null, SqlValue::Real),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        // Lists travel as JSON text, usable through `json_each(:ids)`.
        composite => SqlValue::Text(composite.to_string()),
    }
}

fn scalar_from_sql(value: ValueRef<'_>) -> Scalar {
    match value {
        ValueRef::Integer(i) => Scalar::Int(i),
        ValueRef::Real(f) => Scalar::Float(f),
        ValueRef::Text(bytes) => Scalar::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Null | ValueRef::Blob(_) => Scalar::Null,
    }
}
