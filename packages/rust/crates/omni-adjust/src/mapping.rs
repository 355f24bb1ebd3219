//! Row-to-fact extraction shared by every backend.
//!
//! Missing columns reject the request; values that do not convert skip the
//! single row.

use std::collections::{HashMap, HashSet};

use crate::error::{AdjustError, AdjustResult};
use crate::row::{Row, RowSet};

/// Default result column carrying the hit identifier.
pub const DEFAULT_ID_COLUMN: &str = "id";
/// Default result column carrying the rescoring factor.
pub const DEFAULT_SCORE_COLUMN: &str = "score";

fn required<'r>(
    row: &'r Row,
    column: &str,
    backend: &'static str,
) -> AdjustResult<&'r crate::row::Scalar> {
    row.get(column).ok_or_else(|| AdjustError::MissingColumn {
        backend,
        column: column.to_string(),
    })
}

/// Identifier set from the `id_column` of every row.
///
/// # Errors
///
/// [`AdjustError::MissingColumn`] if any row lacks `id_column`.
pub fn collect_identifiers(
    rows: &RowSet,
    id_column: &str,
    backend: &'static str,
) -> AdjustResult<HashSet<String>> {
    let mut identifiers = HashSet::with_capacity(rows.len());
    for row in rows {
        match required(row, id_column, backend)?.to_identifier() {
            Some(id) => {
                identifiers.insert(id);
            }
            None => log::debug!("skipping row with unconvertible {id_column} value"),
        }
    }
    Ok(identifiers)
}

/// Factor map `identifier -> factor` from every row; the last row wins on duplicates.
///
/// # Errors
///
/// [`AdjustError::MissingColumn`] if any row lacks `id_column` or `score_column`.
pub fn collect_factors(
    rows: &RowSet,
    id_column: &str,
    score_column: &str,
    backend: &'static str,
) -> AdjustResult<HashMap<String, f64>> {
    let mut factors = HashMap::with_capacity(rows.len());
    for row in rows {
        let id = required(row, id_column, backend)?.to_identifier();
        let factor = required(row, score_column, backend)?.to_factor();
        match (id, factor) {
            (Some(id), Some(factor)) => {
                factors.insert(id, factor);
            }
            _ => log::debug!("skipping row with unconvertible {id_column}/{score_column} value"),
        }
    }
    Ok(factors)
}

#[cfg(test)]
mod tests {
    use super::{collect_factors, collect_identifiers};
    use crate::error::AdjustError;
    use crate::row::{Row, RowSet, Scalar};

    fn id_rows(values: Vec<Scalar>) -> RowSet {
        RowSet::from_rows(
            values
                .into_iter()
                .map(|v| Row::from_pairs([("id", v)]))
                .collect(),
        )
    }

    #[test]
    fn test_identifiers_are_canonical_strings() {
        let rows = id_rows(vec![Scalar::Int(1), Scalar::Text("2".into()), Scalar::Int(1)]);
        let ids = collect_identifiers(&rows, "id", "static").unwrap_or_default();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("1"));
        assert!(ids.contains("2"));
    }

    #[test]
    fn test_identifiers_skip_null_rows() {
        let rows = id_rows(vec![Scalar::Null, Scalar::Int(5)]);
        let ids = collect_identifiers(&rows, "id", "static").unwrap_or_default();
        assert_eq!(ids.len(), 1);
        assert!(ids.contains("5"));
    }

    #[test]
    fn test_identifiers_missing_column_rejects() {
        let rows = RowSet::from_rows(vec![Row::from_pairs([("uuid", Scalar::Int(1))])]);
        let err = collect_identifiers(&rows, "id", "cypher");
        assert!(matches!(
            err,
            Err(AdjustError::MissingColumn { ref column, backend: "cypher" }) if column == "id"
        ));
    }

    #[test]
    fn test_factors_last_row_wins() {
        let rows = RowSet::from_rows(vec![
            Row::from_pairs([("id", Scalar::Int(1)), ("score", Scalar::Float(2.0))]),
            Row::from_pairs([("id", Scalar::Int(1)), ("score", Scalar::Text("4".into()))]),
            Row::from_pairs([("id", Scalar::Int(2)), ("score", Scalar::Text("n/a".into()))]),
        ]);
        let factors = collect_factors(&rows, "id", "score", "sql").unwrap_or_default();
        assert_eq!(factors.len(), 1);
        assert_eq!(factors.get("1"), Some(&4.0));
    }

    #[test]
    fn test_factors_missing_score_column_rejects() {
        let rows = id_rows(vec![Scalar::Int(1)]);
        assert!(collect_factors(&rows, "id", "score", "sql").is_err());
    }
}
