//! Shared test helpers for omni-adjust.

#![allow(dead_code)]

use std::sync::Mutex;

use omni_adjust::{Hit, Row, RowSet, RowSource, Scalar, SourceError, SourceQuery};

/// Hits from `(id, score)` pairs, in order.
pub fn hits(pairs: &[(&str, f32)]) -> Vec<Hit> {
    pairs
        .iter()
        .map(|(id, score)| Hit::new(*id, *score))
        .collect()
}

/// Rows with a single integer `id` column.
pub fn id_rows(ids: &[i64]) -> RowSet {
    RowSet::from_rows(
        ids.iter()
            .map(|id| Row::from_pairs([("id", Scalar::Int(*id))]))
            .collect(),
    )
}

/// Rows with `id` and `score` columns.
pub fn factor_rows(factors: &[(&str, f64)]) -> RowSet {
    RowSet::from_rows(
        factors
            .iter()
            .map(|(id, factor)| {
                Row::from_pairs([
                    ("id", Scalar::Text((*id).to_string())),
                    ("score", Scalar::Float(*factor)),
                ])
            })
            .collect(),
    )
}

/// Ids of a hit slice, in order.
pub fn ids(hits: &[Hit]) -> Vec<&str> {
    hits.iter().map(|hit| hit.id.as_str()).collect()
}

/// Source whose every call fails with a connection error.
pub struct FailingSource;

impl RowSource for FailingSource {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    fn execute(&self, _query: &SourceQuery) -> Result<RowSet, SourceError> {
        Err(SourceError::Connection("connection refused".to_string()))
    }
}

/// Source returning fixed rows and recording every query it receives.
pub struct RecordingSource {
    rows: RowSet,
    pub queries: Mutex<Vec<SourceQuery>>,
}

impl RecordingSource {
    pub fn new(rows: RowSet) -> Self {
        Self {
            rows,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().map(|q| q.len()).unwrap_or_default()
    }

    pub fn last_query(&self) -> Option<SourceQuery> {
        self.queries.lock().ok().and_then(|q| q.last().cloned())
    }
}

impl RowSource for RecordingSource {
    fn backend_name(&self) -> &'static str {
        "recording"
    }

    fn execute(&self, query: &SourceQuery) -> Result<RowSet, SourceError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        Ok(self.rows.clone())
    }
}
