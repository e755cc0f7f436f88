//! Structured 2D reservoir grid.
//!
//! The grid stores:
//! - Cell counts and uniform cell sizes (`nx`, `ny`, `dx`, `dy`, field units: ft)
//! - A uniform formation thickness (ft)
//! - Per-cell permeability (md) and porosity (fraction)
//!
//! Geometry convention:
//! - Cell `(i, j)` spans `[i*dx, (i+1)*dx] × [j*dy, (j+1)*dy]`
//! - Cell centers sit at `((i + 1/2)*dx, (j + 1/2)*dy)`
//! - Storage is row-major: linear index `j * nx + i`
//!
//! All inputs are validated at construction; a `Grid2D` value is immutable
//! afterwards, so downstream consumers never re-check.

use crate::types::CellIndex;
use thiserror::Error;

/// Errors from grid construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {nx} x {ny}")]
    EmptyDimensions { nx: usize, ny: usize },

    #[error("cell sizes must be positive and finite, got dx = {dx}, dy = {dy}")]
    InvalidSpacing { dx: f64, dy: f64 },

    #[error("thickness must be positive and finite, got {0}")]
    InvalidThickness(f64),

    #[error("permeability must be positive and finite, got {value} md at cell {cell}")]
    InvalidPermeability { cell: CellIndex, value: f64 },

    #[error("porosity must lie in (0, 1], got {value} at cell {cell}")]
    InvalidPorosity { cell: CellIndex, value: f64 },

    #[error("property vector has {got} entries, expected {expected} for a {nx} x {ny} grid")]
    PropertyLength {
        got: usize,
        expected: usize,
        nx: usize,
        ny: usize,
    },
}

/// Structured rectangular grid with per-cell rock properties.
///
/// # Example
///
/// ```
/// use nursim::grid::Grid2D;
/// use nursim::types::CellIndex;
///
/// // 10 x 10 grid of 100 ft cells, 50 ft thick, 100 md, 20% porosity
/// let grid = Grid2D::uniform(10, 10, 100.0, 100.0, 50.0, 100.0, 0.2).unwrap();
///
/// assert_eq!(grid.n_cells(), 100);
/// assert_eq!(grid.cell_center(CellIndex::new(0, 0)), (50.0, 50.0));
/// ```
#[derive(Clone, Debug)]
pub struct Grid2D {
    nx: usize,
    ny: usize,
    /// Cell size along x (ft).
    dx: f64,
    /// Cell size along y (ft).
    dy: f64,
    /// Formation thickness (ft).
    thickness: f64,
    /// Per-cell permeability (md), row-major.
    permeability: Vec<f64>,
    /// Per-cell porosity (fraction), row-major.
    porosity: Vec<f64>,
}

impl Grid2D {
    /// Create a homogeneous grid with scalar permeability and porosity.
    ///
    /// # Arguments
    /// * `nx`, `ny` - number of cells in x and y
    /// * `dx`, `dy` - cell sizes (ft)
    /// * `thickness` - formation thickness (ft)
    /// * `permeability` - isotropic permeability (md), applied to every cell
    /// * `porosity` - porosity (fraction), applied to every cell
    pub fn uniform(
        nx: usize,
        ny: usize,
        dx: f64,
        dy: f64,
        thickness: f64,
        permeability: f64,
        porosity: f64,
    ) -> Result<Self, GridError> {
        Self::heterogeneous(
            nx,
            ny,
            dx,
            dy,
            thickness,
            vec![permeability; nx * ny],
            vec![porosity; nx * ny],
        )
    }

    /// Create a grid with per-cell permeability and porosity vectors.
    ///
    /// Vectors are row-major (`j * nx + i`) and must have exactly `nx * ny`
    /// entries.
    pub fn heterogeneous(
        nx: usize,
        ny: usize,
        dx: f64,
        dy: f64,
        thickness: f64,
        permeability: Vec<f64>,
        porosity: Vec<f64>,
    ) -> Result<Self, GridError> {
        if nx == 0 || ny == 0 {
            return Err(GridError::EmptyDimensions { nx, ny });
        }
        if !(dx.is_finite() && dy.is_finite() && dx > 0.0 && dy > 0.0) {
            return Err(GridError::InvalidSpacing { dx, dy });
        }
        if !(thickness.is_finite() && thickness > 0.0) {
            return Err(GridError::InvalidThickness(thickness));
        }

        let expected = nx * ny;
        for values in [&permeability, &porosity] {
            if values.len() != expected {
                return Err(GridError::PropertyLength {
                    got: values.len(),
                    expected,
                    nx,
                    ny,
                });
            }
        }

        for (m, &k) in permeability.iter().enumerate() {
            if !(k.is_finite() && k > 0.0) {
                return Err(GridError::InvalidPermeability {
                    cell: CellIndex::from_linear(m, nx),
                    value: k,
                });
            }
        }
        for (m, &phi) in porosity.iter().enumerate() {
            if !(phi.is_finite() && phi > 0.0 && phi <= 1.0) {
                return Err(GridError::InvalidPorosity {
                    cell: CellIndex::from_linear(m, nx),
                    value: phi,
                });
            }
        }

        Ok(Self {
            nx,
            ny,
            dx,
            dy,
            thickness,
            permeability,
            porosity,
        })
    }

    /// Number of cells in x.
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of cells in y.
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Cell size along x (ft).
    #[inline]
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Cell size along y (ft).
    #[inline]
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Formation thickness (ft).
    #[inline]
    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// Total number of cells.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.nx * self.ny
    }

    /// True when `cell` lies inside the grid.
    #[inline]
    pub fn contains(&self, cell: CellIndex) -> bool {
        cell.i < self.nx && cell.j < self.ny
    }

    /// Row-major linear index of a cell.
    #[inline]
    pub fn linear(&self, cell: CellIndex) -> usize {
        debug_assert!(self.contains(cell), "cell {} outside grid", cell);
        cell.to_linear(self.nx)
    }

    /// Iterate all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> + ExactSizeIterator {
        CellIndex::iter(self.nx, self.ny)
    }

    /// Permeability at a cell (md).
    #[inline]
    pub fn permeability(&self, cell: CellIndex) -> f64 {
        self.permeability[self.linear(cell)]
    }

    /// Porosity at a cell (fraction).
    #[inline]
    pub fn porosity(&self, cell: CellIndex) -> f64 {
        self.porosity[self.linear(cell)]
    }

    /// Center coordinates of a cell (ft), for plotting well maps.
    #[inline]
    pub fn cell_center(&self, cell: CellIndex) -> (f64, f64) {
        (
            (cell.i as f64 + 0.5) * self.dx,
            (cell.j as f64 + 0.5) * self.dy,
        )
    }

    /// Physical extent of the model, `(nx * dx, ny * dy)` in ft.
    #[inline]
    pub fn extent(&self) -> (f64, f64) {
        (self.nx as f64 * self.dx, self.ny as f64 * self.dy)
    }

    /// Bulk volume of a single cell, `dx * dy * thickness` (ft^3).
    #[inline]
    pub fn cell_volume(&self) -> f64 {
        self.dx * self.dy * self.thickness
    }

    /// Pore volume of a cell, `phi * dx * dy * thickness` (ft^3).
    #[inline]
    pub fn pore_volume(&self, cell: CellIndex) -> f64 {
        self.porosity(cell) * self.cell_volume()
    }

    /// Area of a face normal to x, `dy * thickness` (ft^2).
    #[inline]
    pub fn area_x(&self) -> f64 {
        self.dy * self.thickness
    }

    /// Area of a face normal to y, `dx * thickness` (ft^2).
    #[inline]
    pub fn area_y(&self) -> f64 {
        self.dx * self.thickness
    }
}

// =============================================================================
// Tests
// =============================================================================
