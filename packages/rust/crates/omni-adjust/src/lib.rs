//! omni-adjust - Post-search result adjustment backed by external facts.
//!
//! Consults an external authority (a Cypher graph query or a SQL query) to
//! either filter search hits by identifier membership or rescale their
//! relevance scores, then re-applies the caller's `from`/`size` window over
//! the adjusted set.
//!
//! # Architecture
//!
//! ```text
//! omni-adjust/src/
//! ├── lib.rs         # Module wiring and re-exports
//! ├── adjuster.rs    # ResultAdjuster trait + AdjusterKind registry
//! ├── filter.rs      # Membership-filter adjuster
//! ├── rescore.rs     # Rescoring adjuster
//! ├── rank.rs        # Bounded score-descending insertion list
//! ├── window.rs      # Shared page-window arithmetic
//! ├── mapping.rs     # Row -> fact extraction
//! ├── row.rs         # Scalar / Row / RowSet
//! ├── request.rs     # Request parsing and source rewrite
//! ├── settings.rs    # Host-owned settings (YAML + env)
//! ├── hit.rs         # Hit / AdjustedHits
//! ├── error.rs       # AdjustError / SourceError
//! └── source/        # RowSource trait, Cypher HTTP and SQLite backends
//! ```
//!
//! # Flow
//!
//! `prepare` (parse + rewrite the request source) → underlying search runs →
//! `adjust` (fetch rows once, build facts, apply policy, re-window).
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use omni_adjust::{
//!     AdjusterSettings, Hit, MembershipFilter, ResultAdjuster, Row, RowSet, Scalar,
//!     StaticRowSource,
//! };
//!
//! let rows = RowSet::from_rows(vec![Row::from_pairs([("id", Scalar::Int(2))])]);
//! let filter = MembershipFilter::new(
//!     Arc::new(StaticRowSource::new(rows)),
//!     AdjusterSettings::default(),
//! );
//!
//! let mut source = serde_json::json!({"gas-filter": {"query": "MATCH (n) RETURN n.id AS id"}})
//!     .as_object()
//!     .cloned()
//!     .unwrap_or_default();
//! let request = filter.prepare(&mut source)?;
//!
//! let hits = vec![Hit::new("1", 1.0), Hit::new("2", 2.0), Hit::new("3", 3.0)];
//! let adjusted = filter.adjust(hits, &request)?;
//! assert_eq!(adjusted.total, 2);
//! # Ok::<(), omni_adjust::AdjustError>(())
//! ```

mod adjuster;
mod error;
mod filter;
mod hit;
mod mapping;
mod rank;
mod request;
mod rescore;
mod row;
mod settings;
pub mod source;
mod window;

pub use adjuster::{AdjusterKind, ResultAdjuster};
pub use error::{AdjustError, AdjustResult, SourceError};
pub use filter::{MembershipFilter, keep_hit};
pub use hit::{AdjustedHits, Hit};
pub use mapping::{DEFAULT_ID_COLUMN, DEFAULT_SCORE_COLUMN, collect_factors, collect_identifiers};
pub use rank::BoundedRankList;
pub use request::{
    AdjustRequest, BOOSTER_CLAUSE, DEFAULT_FROM, DEFAULT_SIZE, FILTER_CLAUSE, parse_request,
};
pub use rescore::Rescorer;
pub use row::{Row, RowSet, Scalar};
pub use settings::{AdjusterSettings, GraphSettings, SourceFailurePolicy};
pub use source::{RowSource, SourceQuery, StaticRowSource};
pub use window::{PageWindow, window_length};
