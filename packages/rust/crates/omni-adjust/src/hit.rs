//! Search hit types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One entry of a search result page.
///
/// Adjusters may rewrite `score`; `payload` is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Document identifier, unique within a response.
    pub id: String,
    /// Relevance score.
    pub score: f32,
    /// Opaque document payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Hit {
    /// Create a hit with an empty payload.
    #[must_use]
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
            payload: serde_json::Value::Null,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Windowed outcome of an adjustment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjustedHits {
    /// Hits inside the requested `[from, from + size)` window.
    pub hits: Vec<Hit>,
    /// Count of hits surviving adjustment, before windowing.
    pub total: usize,
    /// Highest score among surviving hits (`None` when nothing survived).
    pub max_score: Option<f32>,
}

impl AdjustedHits {
    /// Empty window that still reports the surviving total.
    #[must_use]
    pub fn empty(total: usize, max_score: Option<f32>) -> Self {
        Self {
            hits: Vec::new(),
            total,
            max_score,
        }
    }

    /// Identifiers of the windowed hits, in order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.hits.iter().map(|hit| hit.id.as_str()).collect()
    }
}

/// Fold a score into a running maximum.
pub(crate) fn track_max(current: Option<f32>, score: f32) -> Option<f32> {
    Some(current.map_or(score, |max| max.max(score)))
}

/// Deduplicate hits by identifier.
///
/// A hit keeps the position of its first occurrence and the value of its
/// last one, so iteration follows the original rank order.
pub(crate) fn working_set(hits: Vec<Hit>) -> IndexMap<String, Hit> {
    let mut set = IndexMap::with_capacity(hits.len());
    for hit in hits {
        set.insert(hit.id.clone(), hit);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::{Hit, track_max, working_set};

    #[test]
    fn test_working_set_last_value_first_position() {
        let set = working_set(vec![
            Hit::new("a", 1.0),
            Hit::new("b", 2.0),
            Hit::new("a", 9.0),
        ]);
        let entries: Vec<(&str, f32)> = set.values().map(|h| (h.id.as_str(), h.score)).collect();
        assert_eq!(entries, vec![("a", 9.0), ("b", 2.0)]);
    }

    #[test]
    fn test_track_max() {
        let max = [0.5_f32, 2.0, 1.0]
            .into_iter()
            .fold(None, track_max);
        assert_eq!(max, Some(2.0));
        assert_eq!(track_max(None, -1.0), Some(-1.0));
    }

    #[test]
    fn test_track_max_ignores_nan() {
        assert_eq!(track_max(Some(2.0), f32::NAN), Some(2.0));
        let max = [f32::NAN, 1.0, 0.5].into_iter().fold(None, track_max);
        assert_eq!(max, Some(1.0));
    }
}
