//! Ordered collection of detected cell coordinates
//!
//! The ledger is owned by a single detection run. Appends are O(1) and never
//! deduplicate: keeping one blob from being recorded twice in a pass is the
//! detector's job (it clears the area it reports).

use super::point::CellPoint;

/// Growable list of detected cells; iteration yields the newest entry first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellLedger {
    cells: Vec<CellPoint>,
}

impl CellLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Record a detected cell
    pub fn push(&mut self, x: usize, y: usize) {
        self.cells.push(CellPoint::new(x, y));
    }

    /// Number of recorded cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate most-recent-first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CellPoint> + ExactSizeIterator {
        self.cells.iter().rev()
    }

    /// True if some recorded cell lies within Chebyshev `radius` of `point`
    pub fn contains_near(&self, point: &CellPoint, radius: usize) -> bool {
        self.cells
            .iter()
            .any(|cell| cell.chebyshev_distance(point) <= radius)
    }

    /// Move every entry of `other` into this ledger, preserving its order
    pub fn append(&mut self, other: &mut CellLedger) {
        self.cells.append(&mut other.cells);
    }

    /// Drop every entry (keeps capacity)
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Entries in insertion order
    pub fn as_slice(&self) -> &[CellPoint] {
        &self.cells
    }
}

impl Extend<CellPoint> for CellLedger {
    fn extend<I: IntoIterator<Item = CellPoint>>(&mut self, iter: I) {
        self.cells.extend(iter);
    }
}

impl<'a> IntoIterator for &'a CellLedger {
    type Item = &'a CellPoint;
    type IntoIter = std::iter::Rev<std::slice::Iter<'a, CellPoint>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter().rev()
    }
}
