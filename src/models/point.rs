/// Pixel coordinate of a detected cell
///
/// This is the scan position that triggered the detection (top-left of the
/// window or the sampled white pixel), not a centroid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellPoint {
    /// X coordinate (column)
    pub x: usize,
    /// Y coordinate (row)
    pub y: usize,
}

impl CellPoint {
    /// Create a new point
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Chessboard distance to another point
    pub fn chebyshev_distance(&self, other: &CellPoint) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Signed coordinates for offset arithmetic, `None` if either exceeds `isize::MAX`
    pub fn as_signed(&self) -> Option<(isize, isize)> {
        Some((isize::try_from(self.x).ok()?, isize::try_from(self.y).ok()?))
    }
}

impl From<(usize, usize)> for CellPoint {
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chebyshev_distance() {
        let a = CellPoint::new(10, 10);
        assert_eq!(a.chebyshev_distance(&CellPoint::new(13, 8)), 3);
        assert_eq!(a.chebyshev_distance(&a), 0);
        assert_eq!(CellPoint::from((2, 7)), CellPoint::new(2, 7));
    }

    #[test]
    fn test_as_signed_rejects_unrepresentable() {
        assert_eq!(CellPoint::new(3, 4).as_signed(), Some((3, 4)));
        assert_eq!(CellPoint::new(usize::MAX, 4).as_signed(), None);
        assert_eq!(CellPoint::new(0, isize::MAX as usize + 1).as_signed(), None);
        assert_eq!(
            CellPoint::new(isize::MAX as usize, 0).as_signed(),
            Some((isize::MAX, 0))
        );
    }
}
