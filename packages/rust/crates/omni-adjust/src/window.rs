//! Page-window arithmetic shared by every adjuster.

/// Number of hits a `[from, from + size)` window holds over `total` hits.
///
/// `0` when `from >= total`, otherwise `min(size, total - from)`.
#[must_use]
pub fn window_length(total: usize, from: usize, size: usize) -> usize {
    if from.saturating_add(size) < total {
        size
    } else if total > from {
        total - from
    } else {
        0
    }
}

/// Requested page of a single search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Offset of the first hit.
    pub from: usize,
    /// Page size.
    pub size: usize,
}

impl PageWindow {
    /// Create a window.
    #[must_use]
    pub fn new(from: usize, size: usize) -> Self {
        Self { from, size }
    }

    /// Window length over `total` adjusted hits.
    #[must_use]
    pub fn length_for(&self, total: usize) -> usize {
        window_length(total, self.from, self.size)
    }
}
