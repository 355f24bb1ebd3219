//! Unified row abstraction over graph and relational query results.

use indexmap::IndexMap;

/// A scalar cell value returned by an external query.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// SQL `NULL` / JSON `null`.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// UTF-8 text (composite graph values are carried as their JSON text).
    Text(String),
}

impl Scalar {
    /// Canonical identifier form, or `None` when the value has none.
    ///
    /// Floats use Rust's shortest display form, so `2.0` maps to `"2"`,
    /// not `"2.0"`.
    #[must_use]
    pub fn to_identifier(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(value) => Some(value.to_string()),
            Self::Int(value) => Some(value.to_string()),
            Self::Float(value) if value.is_finite() => Some(value.to_string()),
            Self::Float(_) => None,
            Self::Text(value) => Some(value.clone()),
        }
    }

    /// Numeric form for score factors, or `None` when not a finite number.
    #[must_use]
    pub fn to_factor(&self) -> Option<f64> {
        let value = match self {
            Self::Int(value) => *value as f64,
            Self::Float(value) => *value,
            Self::Text(value) => value.trim().parse::<f64>().ok()?,
            Self::Null | Self::Bool(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<&serde_json::Value> for Scalar {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                // Integers past i64 keep their exact digits.
                None if n.is_u64() => Self::Text(n.to_string()),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            serde_json::Value::String(s) => Self::Text(s.clone()),
            composite => Self::Text(composite.to_string()),
        }
    }
}

/// One result row: column name -> scalar, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: IndexMap<String, Scalar>,
}

impl Row {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs.
    #[must_use]
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Scalar)>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Set a column value (overwrites).
    pub fn insert(&mut self, column: impl Into<String>, value: Scalar) {
        self.values.insert(column.into(), value);
    }

    /// Value of a column, `None` when the column is absent.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.values.get(column)
    }

    /// Whether the row carries `column` (even with a `NULL` value).
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Materialised query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    /// Rows in backend order.
    pub rows: Vec<Row>,
}

impl RowSet {
    /// Empty result set (the fail-open fact source).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap already-built rows.
    #[must_use]
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build from column names and positional values.
    ///
    /// Extra values beyond the column list are dropped.
    #[must_use]
    pub fn from_columns(columns: &[String], data: Vec<Vec<Scalar>>) -> Self {
        let rows = data
            .into_iter()
            .map(|values| Row::from_pairs(columns.iter().cloned().zip(values)))
            .collect();
        Self { rows }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the set has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Row, RowSet, Scalar};
    use serde_json::json;

    #[test]
    fn test_identifier_conversion() {
        assert_eq!(Scalar::Text("abc".into()).to_identifier().as_deref(), Some("abc"));
        assert_eq!(Scalar::Int(42).to_identifier().as_deref(), Some("42"));
        assert_eq!(Scalar::Bool(true).to_identifier().as_deref(), Some("true"));
        assert_eq!(Scalar::Float(1.5).to_identifier().as_deref(), Some("1.5"));
        assert_eq!(Scalar::Float(f64::NAN).to_identifier(), None);
        assert_eq!(Scalar::Null.to_identifier(), None);
    }

    #[test]
    fn test_factor_conversion() {
        assert_eq!(Scalar::Int(3).to_factor(), Some(3.0));
        assert_eq!(Scalar::Float(0.25).to_factor(), Some(0.25));
        assert_eq!(Scalar::Text(" 2.5 ".into()).to_factor(), Some(2.5));
        assert_eq!(Scalar::Text("high".into()).to_factor(), None);
        assert_eq!(Scalar::Text("inf".into()).to_factor(), None);
        assert_eq!(Scalar::Bool(true).to_factor(), None);
        assert_eq!(Scalar::Null.to_factor(), None);
    }

    #[test]
    fn test_scalar_from_json() {
        assert_eq!(Scalar::from(&json!(7)), Scalar::Int(7));
        assert_eq!(Scalar::from(&json!(0.5)), Scalar::Float(0.5));
        assert_eq!(Scalar::from(&json!("x")), Scalar::Text("x".into()));
        assert_eq!(Scalar::from(&json!(null)), Scalar::Null);
        assert_eq!(Scalar::from(&json!([1, 2])), Scalar::Text("[1,2]".into()));
    }

    #[test]
    fn test_unsigned_past_i64_keeps_exact_identifier() {
        let scalar = Scalar::from(&json!(u64::MAX));
        assert_eq!(scalar, Scalar::Text("18446744073709551615".into()));
        assert_eq!(
            scalar.to_identifier().as_deref(),
            Some("18446744073709551615")
        );
    }

    #[test]
    fn test_float_identifier_uses_shortest_form() {
        assert_eq!(Scalar::Float(2.0).to_identifier().as_deref(), Some("2"));
    }

    #[test]
    fn test_row_set_from_columns() {
        let columns = vec!["id".to_string(), "score".to_string()];
        let set = RowSet::from_columns(
            &columns,
            vec![
                vec![Scalar::Int(1), Scalar::Float(2.0)],
                vec![Scalar::Int(2)],
            ],
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.rows[0].get("score"), Some(&Scalar::Float(2.0)));
        assert!(!set.rows[1].contains("score"));
    }

    #[test]
    fn test_row_keeps_null_columns() {
        let mut row = Row::new();
        row.insert("id", Scalar::Null);
        assert!(row.contains("id"));
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id"]);
    }
}
