//! Strongly-typed cell coordinates.
//!
//! A reservoir grid is addressed by `(i, j)` column/row pairs; this type
//! prevents mixing up the two axes or passing a raw linear offset where a
//! coordinate pair is expected.

use std::fmt;

/// Cell coordinate in a structured 2D grid.
///
/// `i` runs along x (`0..nx`), `j` along y (`0..ny`). The linear storage
/// order is row-major: `linear = j * nx + i`.
///
/// # Example
///
/// ```
/// use nursim::types::CellIndex;
///
/// let cell = CellIndex::new(3, 4);
/// assert_eq!(cell.to_linear(10), 43);
/// assert_eq!(format!("{}", cell), "(3, 4)");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellIndex {
    /// Column index along x.
    pub i: usize,
    /// Row index along y.
    pub j: usize,
}

impl CellIndex {
    /// Create a new cell coordinate.
    #[inline]
    pub const fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }

    /// Cell at the grid origin (0, 0).
    pub const ORIGIN: Self = Self { i: 0, j: 0 };

    /// Row-major linear offset for a grid with `nx` columns.
    #[inline]
    pub const fn to_linear(self, nx: usize) -> usize {
        self.j * nx + self.i
    }

    /// Inverse of [`to_linear`](Self::to_linear).
    #[inline]
    pub const fn from_linear(index: usize, nx: usize) -> Self {
        Self {
            i: index % nx,
            j: index / nx,
        }
    }

    /// Iterate all cells of an `nx` × `ny` grid in row-major order.
    ///
    /// # Example
    ///
    /// ```
    /// use nursim::types::CellIndex;
    ///
    /// let cells: Vec<_> = CellIndex::iter(3, 2).collect();
    /// assert_eq!(cells.len(), 6);
    /// assert_eq!(cells[0], CellIndex::new(0, 0));
    /// assert_eq!(cells[3], CellIndex::new(0, 1));
    /// ```
    pub fn iter(nx: usize, ny: usize) -> impl Iterator<Item = CellIndex> + ExactSizeIterator {
        (0..nx * ny).map(move |m| CellIndex::from_linear(m, nx))
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

impl From<(usize, usize)> for CellIndex {
    #[inline]
    fn from((i, j): (usize, usize)) -> Self {
        Self { i, j }
    }
}

impl From<CellIndex> for (usize, usize) {
    #[inline]
    fn from(cell: CellIndex) -> (usize, usize) {
        (cell.i, cell.j)
    }
}

// =============================================================================
// Tests
// =============================================================================
