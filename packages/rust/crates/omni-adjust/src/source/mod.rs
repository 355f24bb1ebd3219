//! External row sources.
//!
//! Every backend returns a [`RowSet`], so fact extraction is written once in
//! [`crate::mapping`] regardless of where the rows came from.

mod cypher;
mod sql;

pub use cypher::{CypherHttpSource, parse_transaction_response};
pub use sql::SqlRowSource;

use serde_json::{Map, Value};

use crate::error::{AdjustError, AdjustResult, SourceError};
use crate::row::RowSet;
use crate::settings::SourceFailurePolicy;

/// One query against an external source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceQuery {
    /// Query text (Cypher or SQL).
    pub text: String,
    /// Named query parameters.
    pub parameters: Map<String, Value>,
    /// Connection descriptor for backends that connect per request.
    pub connection: Option<String>,
}

impl SourceQuery {
    /// Query without parameters or connection descriptor.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Abstraction over a graph or relational query backend.
///
/// Calls block the current thread for the whole round-trip; callers own any
/// timeout or cancellation policy around them.
pub trait RowSource: Send + Sync {
    /// Backend identifier for logs and error messages.
    fn backend_name(&self) -> &'static str;

    /// Whether a request must carry a connection descriptor.
    fn requires_connection(&self) -> bool {
        false
    }

    /// Execute `query` and materialise every returned row.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on connectivity, query or decoding failures.
    fn execute(&self, query: &SourceQuery) -> Result<RowSet, SourceError>;
}

/// Row source answering every query with the same pre-materialised rows.
#[derive(Debug, Clone, Default)]
pub struct StaticRowSource {
    rows: RowSet,
}

impl StaticRowSource {
    /// Create a static source.
    #[must_use]
    pub fn new(rows: RowSet) -> Self {
        Self { rows }
    }
}

impl RowSource for StaticRowSource {
    fn backend_name(&self) -> &'static str {
        "static"
    }

    fn execute(&self, _query: &SourceQuery) -> Result<RowSet, SourceError> {
        Ok(self.rows.clone())
    }
}

/// Execute `query` and resolve a failure according to `policy`.
pub(crate) fn fetch_rows(
    source: &dyn RowSource,
    query: &SourceQuery,
    policy: SourceFailurePolicy,
) -> AdjustResult<RowSet> {
    match source.execute(query) {
        Ok(rows) => {
            log::debug!(
                "{} source returned {} rows",
                source.backend_name(),
                rows.len()
            );
            Ok(rows)
        }
        Err(err) => match policy {
            SourceFailurePolicy::FailOpen => {
                log::warn!(
                    "{} source failed, continuing with an empty fact set: {err}",
                    source.backend_name()
                );
                Ok(RowSet::empty())
            }
            SourceFailurePolicy::Reject => Err(AdjustError::ExternalSource(err)),
        },
    }
}
