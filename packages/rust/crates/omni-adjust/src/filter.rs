//! Membership-filter adjuster.
//!
//! Fetches an identifier set from the external source and keeps or drops
//! hits by membership, preserving their order and score, then re-windows.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::adjuster::ResultAdjuster;
use crate::error::AdjustResult;
use crate::hit::{AdjustedHits, Hit, track_max, working_set};
use crate::mapping::collect_identifiers;
use crate::request::{AdjustRequest, FILTER_CLAUSE, parse_request};
use crate::settings::AdjusterSettings;
use crate::source::{RowSource, fetch_rows};

/// Keep decision for one identifier.
///
/// Exclude-mode keeps identifiers absent from `remote`; include-mode keeps
/// only identifiers present in it.
#[must_use]
pub fn keep_hit(id: &str, remote: &HashSet<String>, exclude: bool) -> bool {
    remote.contains(id) != exclude
}

/// Adjuster filtering hits by identifier membership in an external result set.
pub struct MembershipFilter {
    source: Arc<dyn RowSource>,
    settings: AdjusterSettings,
}

impl MembershipFilter {
    /// Create a filter over `source`.
    #[must_use]
    pub fn new(source: Arc<dyn RowSource>, settings: AdjusterSettings) -> Self {
        Self { source, settings }
    }

    /// Fetch the remote identifier set for `request`.
    ///
    /// # Errors
    ///
    /// Missing identifier column, or a source failure under the `reject` policy.
    pub fn remote_identifiers(&self, request: &AdjustRequest) -> AdjustResult<HashSet<String>> {
        let rows = fetch_rows(
            self.source.as_ref(),
            &request.query,
            self.settings.on_source_error,
        )?;
        collect_identifiers(&rows, &request.id_column, self.source.backend_name())
    }

    /// Apply the membership policy to already-fetched identifiers.
    #[must_use]
    pub fn apply(
        hits: Vec<Hit>,
        remote: &HashSet<String>,
        request: &AdjustRequest,
    ) -> AdjustedHits {
        let mut kept = Vec::new();
        let mut max_score = None;
        for (id, hit) in working_set(hits) {
            if keep_hit(&id, remote, request.exclude) {
                max_score = track_max(max_score, hit.score);
                kept.push(hit);
            } else {
                log::trace!("dropping hit {id}");
            }
        }

        let total = kept.len();
        let length = request.window.length_for(total);
        log::debug!(
            "membership filter kept {total} hits (exclude={}, remote={}), window length {length}",
            request.exclude,
            remote.len()
        );
        if length == 0 {
            return AdjustedHits::empty(total, max_score);
        }

        let hits = kept
            .into_iter()
            .skip(request.window.from)
            .take(length)
            .collect();
        AdjustedHits {
            hits,
            total,
            max_score,
        }
    }
}

impl ResultAdjuster for MembershipFilter {
    fn name(&self) -> &'static str {
        "membership-filter"
    }

    fn prepare(&self, source: &mut Map<String, Value>) -> AdjustResult<AdjustRequest> {
        let request = parse_request(
            source,
            FILTER_CLAUSE,
            &self.settings,
            self.source.requires_connection(),
        )?;
        request.rewrite_source(source, false);
        Ok(request)
    }

    fn adjust(&self, hits: Vec<Hit>, request: &AdjustRequest) -> AdjustResult<AdjustedHits> {
        let remote = self.remote_identifiers(request)?;
        Ok(Self::apply(hits, &remote, request))
    }
}
