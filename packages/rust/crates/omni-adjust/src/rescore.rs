//! Rescoring adjuster.
//!
//! Multiplies each hit's score by an externally computed factor, ranks the
//! rescored hits into a list bounded to `from + window length`, and drops the
//! first `from` entries.
//!
//! Hits are processed in original rank order (first occurrence of each
//! identifier). A hit is ranked ahead of already-ranked hits with an equal
//! score, so ties resolve in favour of the later-processed hit.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::adjuster::ResultAdjuster;
use crate::error::AdjustResult;
use crate::hit::{AdjustedHits, Hit, track_max, working_set};
use crate::mapping::collect_factors;
use crate::rank::BoundedRankList;
use crate::request::{AdjustRequest, BOOSTER_CLAUSE, parse_request};
use crate::settings::AdjusterSettings;
use crate::source::{RowSource, fetch_rows};

/// Query parameter carrying the candidate identifiers.
const IDS_PARAM: &str = "ids";

/// Adjuster re-ranking hits by `score * factor`.
pub struct Rescorer {
    source: Arc<dyn RowSource>,
    settings: AdjusterSettings,
}

impl Rescorer {
    /// Create a rescorer over `source`.
    #[must_use]
    pub fn new(source: Arc<dyn RowSource>, settings: AdjusterSettings) -> Self {
        Self { source, settings }
    }

    /// Fetch `identifier -> factor` for the given candidates.
    ///
    /// The candidates are passed as the `ids` query parameter unless the
    /// request already sets one.
    ///
    /// # Errors
    ///
    /// Missing identifier/score column, or a source failure under the
    /// `reject` policy.
    pub fn remote_factors(
        &self,
        request: &AdjustRequest,
        ids: &[String],
    ) -> AdjustResult<HashMap<String, f64>> {
        let mut query = request.query.clone();
        query
            .parameters
            .entry(IDS_PARAM)
            .or_insert_with(|| Value::from(ids.to_vec()));
        let rows = fetch_rows(self.source.as_ref(), &query, self.settings.on_source_error)?;
        collect_factors(
            &rows,
            &request.id_column,
            &request.score_column,
            self.source.backend_name(),
        )
    }

    /// Rescore, rank, and window `hits` (duplicates are collapsed first).
    ///
    /// `total` counts every distinct identifier seen, ranked or not.
    #[must_use]
    pub fn apply(
        hits: Vec<Hit>,
        factors: &HashMap<String, f64>,
        request: &AdjustRequest,
    ) -> AdjustedHits {
        let working = working_set(hits);
        let total = working.len();
        let length = request.window.length_for(total);
        let capacity = if length == 0 {
            0
        } else {
            request.window.from + length
        };

        let mut ranked = BoundedRankList::with_capacity(capacity);
        let mut max_score = None;
        for (id, mut hit) in working {
            if let Some(factor) = factors.get(&id) {
                hit.score = rescale(hit.score, *factor);
            }
            max_score = track_max(max_score, hit.score);
            ranked.insert(hit);
        }

        log::debug!(
            "rescorer ranked {} of {total} hits (factors={}), window length {length}",
            ranked.len(),
            factors.len()
        );
        if length == 0 {
            return AdjustedHits::empty(total, max_score);
        }
        AdjustedHits {
            hits: ranked.into_window(request.window.from),
            total,
            max_score,
        }
    }
}

fn rescale(score: f32, factor: f64) -> f32 {
    (f64::from(score) * factor) as f32
}

impl ResultAdjuster for Rescorer {
    fn name(&self) -> &'static str {
        "rescorer"
    }

    fn prepare(&self, source: &mut Map<String, Value>) -> AdjustResult<AdjustRequest> {
        let request = parse_request(
            source,
            BOOSTER_CLAUSE,
            &self.settings,
            self.source.requires_connection(),
        )?;
        request.rewrite_source(source, true);
        Ok(request)
    }

    fn adjust(&self, hits: Vec<Hit>, request: &AdjustRequest) -> AdjustResult<AdjustedHits> {
        let mut seen = HashSet::with_capacity(hits.len());
        let ids: Vec<String> = hits
            .iter()
            .filter(|hit| seen.insert(hit.id.clone()))
            .map(|hit| hit.id.clone())
            .collect();
        let factors = self.remote_factors(request, &ids)?;
        Ok(Self::apply(hits, &factors, request))
    }
}
