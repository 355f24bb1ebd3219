//! Bounded, score-descending insertion list used by rescoring.

use crate::hit::Hit;

/// Score-descending list holding at most `capacity` hits.
///
/// A new hit is placed before the first entry whose score is not greater
/// than its own, so among equal scores the most recently inserted hit comes
/// first. Inserting past capacity drops the tail.
#[derive(Debug, Clone)]
pub struct BoundedRankList {
    capacity: usize,
    hits: Vec<Hit>,
}

impl BoundedRankList {
    /// Create an empty list bounded to `capacity`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            hits: Vec::with_capacity(capacity.saturating_add(1)),
        }
    }

    /// Maximum number of retained hits.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of retained hits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether no hit is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Retained hits, best first.
    #[must_use]
    pub fn as_slice(&self) -> &[Hit] {
        &self.hits
    }

    /// Insert `hit` at its rank; returns `false` when it ranked past capacity.
    pub fn insert(&mut self, hit: Hit) -> bool {
        let position = self
            .hits
            .iter()
            .position(|ranked| ranked.score <= hit.score)
            .unwrap_or(self.hits.len());
        if position >= self.capacity {
            return false;
        }
        self.hits.insert(position, hit);
        self.hits.truncate(self.capacity);
        debug_assert!(self.hits.len() <= self.capacity);
        true
    }

    /// Drop the first `from` ranked hits and return the rest.
    #[must_use]
    pub fn into_window(self, from: usize) -> Vec<Hit> {
        let mut hits = self.hits;
        if from >= hits.len() {
            return Vec::new();
        }
        hits.drain(..from);
        hits
    }
}
