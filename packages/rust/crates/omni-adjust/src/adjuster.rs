//! Adjuster contract and name-based construction.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{AdjustError, AdjustResult};
use crate::filter::MembershipFilter;
use crate::hit::{AdjustedHits, Hit};
use crate::request::AdjustRequest;
use crate::rescore::Rescorer;
use crate::settings::AdjusterSettings;
use crate::source::{CypherHttpSource, RowSource, SqlRowSource};

/// A post-search result adjuster.
///
/// Instances hold only immutable configuration; every per-request value
/// travels in the [`AdjustRequest`] returned by [`ResultAdjuster::prepare`].
pub trait ResultAdjuster: Send + Sync {
    /// Adjuster identifier for logs.
    fn name(&self) -> &'static str;

    /// Parse the request source and rewrite it for the underlying search.
    ///
    /// # Errors
    ///
    /// Configuration errors; no external call is made.
    fn prepare(&self, source: &mut Map<String, Value>) -> AdjustResult<AdjustRequest>;

    /// Adjust the hits returned by the underlying search and re-window them.
    ///
    /// # Errors
    ///
    /// Configuration errors from fetched rows, or source failures under the
    /// `reject` policy.
    fn adjust(&self, hits: Vec<Hit>, request: &AdjustRequest) -> AdjustResult<AdjustedHits>;
}

/// Built-in adjuster/backend combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdjusterKind {
    /// Membership filter over a Cypher query.
    CypherFilter,
    /// Membership filter over a SQL query.
    SqlFilter,
    /// Rescorer over a Cypher query.
    CypherBooster,
    /// Rescorer over a SQL query.
    SqlBooster,
}

impl AdjusterKind {
    /// Every built-in kind.
    pub const ALL: [Self; 4] = [
        Self::CypherFilter,
        Self::SqlFilter,
        Self::CypherBooster,
        Self::SqlBooster,
    ];

    /// Registry name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CypherFilter => "cypher-filter",
            Self::SqlFilter => "sql-filter",
            Self::CypherBooster => "cypher-booster",
            Self::SqlBooster => "sql-booster",
        }
    }

    /// Look a kind up by registry name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Build the adjuster with its backend.
    ///
    /// # Errors
    ///
    /// [`AdjustError::ExternalSource`] if the Cypher HTTP client cannot be built.
    pub fn build(self, settings: AdjusterSettings) -> AdjustResult<Box<dyn ResultAdjuster>> {
        let source: Arc<dyn RowSource> = match self {
            Self::CypherFilter | Self::CypherBooster => Arc::new(
                CypherHttpSource::new(&settings.graph).map_err(AdjustError::ExternalSource)?,
            ),
            Self::SqlFilter | Self::SqlBooster => Arc::new(SqlRowSource::new()),
        };
        Ok(match self {
            Self::CypherFilter | Self::SqlFilter => Box::new(MembershipFilter::new(source, settings)),
            Self::CypherBooster | Self::SqlBooster => Box::new(Rescorer::new(source, settings)),
        })
    }
}
