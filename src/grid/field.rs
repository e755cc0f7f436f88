//! Dense per-cell scalar storage.
//!
//! A [`Field2D`] holds one value per grid cell in row-major layout and is the
//! snapshot type handed to callers for pressure and saturation fields.

use crate::types::CellIndex;

/// Per-cell scalar field over an `nx` × `ny` grid.
///
/// Values are stored row-major: `data[j * nx + i]` for cell `(i, j)`, the
/// same layout as [`Grid2D`](crate::grid::Grid2D) cell properties.
#[derive(Clone, Debug, PartialEq)]
pub struct Field2D {
    /// Cell values in row-major layout.
    pub data: Vec<f64>,
    nx: usize,
    ny: usize,
}

impl Field2D {
    /// Create a field with every cell set to `value`.
    pub fn constant(nx: usize, ny: usize, value: f64) -> Self {
        Self {
            data: vec![value; nx * ny],
            nx,
            ny,
        }
    }

    /// Create a field initialized to zero.
    pub fn zeros(nx: usize, ny: usize) -> Self {
        Self::constant(nx, ny, 0.0)
    }

    /// Create a field from raw row-major data.
    pub fn from_data(nx: usize, ny: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(
            data.len(),
            nx * ny,
            "Data size mismatch: expected {}, got {}",
            nx * ny,
            data.len()
        );
        Self { data, nx, ny }
    }

    /// Number of columns (x-direction).
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of rows (y-direction).
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the field has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at a cell.
    #[inline]
    pub fn get(&self, cell: CellIndex) -> f64 {
        self.data[cell.to_linear(self.nx)]
    }

    /// Set the value at a cell.
    #[inline]
    pub fn set(&mut self, cell: CellIndex, value: f64) {
        self.data[cell.to_linear(self.nx)] = value;
    }

    /// Direct slice access in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable slice access in row-major order.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Iterate `(cell, value)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellIndex, f64)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(m, &v)| (CellIndex::from_linear(m, self.nx), v))
    }

    /// Minimum value over all cells.
    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Maximum value over all cells.
    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Arithmetic mean over all cells.
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    /// Maximum absolute value over all cells.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().map(|&x| x.abs()).fold(0.0, f64::max)
    }

    /// Fill all cells with a constant.
    pub fn fill(&mut self, value: f64) {
        for v in &mut self.data {
            *v = value;
        }
    }

    /// Copy values from another field of the same shape.
    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(self.data.len(), other.data.len());
        self.data.copy_from_slice(&other.data);
    }
}

impl std::ops::Index<CellIndex> for Field2D {
    type Output = f64;
    #[inline]
    fn index(&self, cell: CellIndex) -> &f64 {
        &self.data[cell.to_linear(self.nx)]
    }
}

impl std::ops::IndexMut<CellIndex> for Field2D {
    #[inline]
    fn index_mut(&mut self, cell: CellIndex) -> &mut f64 {
        &mut self.data[cell.to_linear(self.nx)]
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_basic() {
        let mut field = Field2D::constant(3, 2, 5.0);
        assert_eq!(field.len(), 6);
        assert_eq!(field.get(CellIndex::new(2, 1)), 5.0);

        field.set(CellIndex::new(1, 0), 7.0);
        assert_eq!(field.data[1], 7.0);
        assert_eq!(field[CellIndex::new(1, 0)], 7.0);
    }

    #[test]
    fn test_field_reductions() {
        let field = Field2D::from_data(2, 2, vec![1.0, -4.0, 3.0, 2.0]);
        assert_eq!(field.min(), -4.0);
        assert_eq!(field.max(), 3.0);
        assert_eq!(field.max_abs(), 4.0);
        assert!((field.mean() - 0.5).abs() < 1e-14);
    }

    #[test]
    fn test_field_iter_order() {
        let field = Field2D::from_data(2, 2, vec![0.0, 1.0, 2.0, 3.0]);
        let pairs: Vec<_> = field.iter().collect();
        assert_eq!(pairs[1], (CellIndex::new(1, 0), 1.0));
        assert_eq!(pairs[2], (CellIndex::new(0, 1), 2.0));
    }

    #[test]
    fn test_field_index_mut() {
        let mut field = Field2D::zeros(2, 2);
        field[CellIndex::new(0, 1)] = 9.0;
        assert_eq!(field.data[2], 9.0);
    }
}
