//! Face conductances and upstream-weighted mobilities.
//!
//! The geometric conductance of an interior face is the harmonic mean of
//! `k*A/d` of the two adjacent cells times the field-unit Darcy constant:
//!
//! `G = 1.127e-3 * 2 / (d/(k_a*A) + d/(k_b*A))`   [RB/day/psi per cp]
//!
//! Geometry and permeability never change during a run, so the conductance
//! table is computed once. Phase transmissibilities multiply `G` by a
//! mobility: `1/mu` for single-phase flow, or the upstream cell's
//! `kr_p(Sw)/mu_p` per phase for two-phase flow.

use crate::fluid::TwoPhaseFluid;
use crate::grid::{Field2D, Grid2D};
use crate::types::CellIndex;

/// Darcy constant for field units (md, ft, cp, psi, bbl/day): 1.127e-3.
pub(crate) const DARCY_CONVERSION: f64 = 1.127e-3;

/// Volume conversion, ft^3 per barrel: 5.614583.
pub(crate) const CUBIC_FEET_PER_BARREL: f64 = 5.614583;

/// Precomputed geometric conductance of every interior face.
///
/// Face indexing:
/// - x-face `(i, j)` joins cells `(i, j)` and `(i+1, j)`, `i < nx-1`
/// - y-face `(i, j)` joins cells `(i, j)` and `(i, j+1)`, `j < ny-1`
#[derive(Clone, Debug)]
pub struct Transmissibility {
    nx: usize,
    ny: usize,
    /// x-face conductances, laid out `j * (nx-1) + i`.
    gx: Vec<f64>,
    /// y-face conductances, laid out `j * nx + i`.
    gy: Vec<f64>,
}

impl Transmissibility {
    /// Compute geometric conductances for a grid.
    pub fn geometric(grid: &Grid2D) -> Self {
        let nx = grid.nx();
        let ny = grid.ny();
        let (dx, dy) = (grid.dx(), grid.dy());
        let (ax, ay) = (grid.area_x(), grid.area_y());

        let mut gx = vec![0.0; (nx - 1) * ny];
        for j in 0..ny {
            for i in 0..nx - 1 {
                let ka = grid.permeability(CellIndex::new(i, j));
                let kb = grid.permeability(CellIndex::new(i + 1, j));
                gx[j * (nx - 1) + i] =
                    DARCY_CONVERSION * 2.0 / (dx / (ka * ax) + dx / (kb * ax));
            }
        }

        let mut gy = vec![0.0; nx * (ny - 1)];
        for j in 0..ny - 1 {
            for i in 0..nx {
                let ka = grid.permeability(CellIndex::new(i, j));
                let kb = grid.permeability(CellIndex::new(i, j + 1));
                gy[j * nx + i] = DARCY_CONVERSION * 2.0 / (dy / (ka * ay) + dy / (kb * ay));
            }
        }

        Self { nx, ny, gx, gy }
    }

    /// Conductance of the x-face joining `(i, j)` and `(i+1, j)`.
    #[inline]
    pub fn x_face(&self, i: usize, j: usize) -> f64 {
        debug_assert!(i < self.nx - 1 && j < self.ny);
        self.gx[j * (self.nx - 1) + i]
    }

    /// Conductance of the y-face joining `(i, j)` and `(i, j+1)`.
    #[inline]
    pub fn y_face(&self, i: usize, j: usize) -> f64 {
        debug_assert!(i < self.nx && j < self.ny - 1);
        self.gy[j * self.nx + i]
    }

    /// Half-cell conductance from a cell center to its x-boundary face.
    ///
    /// Used by constant-pressure boundaries: the boundary value acts at
    /// distance `dx/2`, giving `2 * 1.127e-3 * k * A / dx`.
    #[inline]
    pub fn boundary_x(grid: &Grid2D, cell: CellIndex) -> f64 {
        DARCY_CONVERSION * grid.permeability(cell) * grid.area_x() / (grid.dx() / 2.0)
    }

    /// Half-cell conductance from a cell center to its y-boundary face.
    #[inline]
    pub fn boundary_y(grid: &Grid2D, cell: CellIndex) -> f64 {
        DARCY_CONVERSION * grid.permeability(cell) * grid.area_y() / (grid.dy() / 2.0)
    }
}

/// Upstream-weighted phase mobilities per interior face, for one time step.
///
/// The upstream cell is the one with the higher pressure in the supplied
/// (previous-step) field; at an exact tie the two cell mobilities are
/// averaged. Face indexing matches [`Transmissibility`].
#[derive(Clone, Debug)]
pub struct FaceMobility {
    nx: usize,
    ny: usize,
    water_x: Vec<f64>,
    oil_x: Vec<f64>,
    water_y: Vec<f64>,
    oil_y: Vec<f64>,
}

impl FaceMobility {
    /// Evaluate upstream mobilities from the previous step's pressure and
    /// saturation fields.
    pub fn upstream(
        grid: &Grid2D,
        fluid: &TwoPhaseFluid,
        pressure: &Field2D,
        sw: &Field2D,
    ) -> Self {
        let nx = grid.nx();
        let ny = grid.ny();

        let mut water_x = vec![0.0; (nx - 1) * ny];
        let mut oil_x = vec![0.0; (nx - 1) * ny];
        for j in 0..ny {
            for i in 0..nx - 1 {
                let a = CellIndex::new(i, j);
                let b = CellIndex::new(i + 1, j);
                let (lw, lo) = upstream_pair(fluid, pressure, sw, a, b);
                water_x[j * (nx - 1) + i] = lw;
                oil_x[j * (nx - 1) + i] = lo;
            }
        }

        let mut water_y = vec![0.0; nx * (ny - 1)];
        let mut oil_y = vec![0.0; nx * (ny - 1)];
        for j in 0..ny - 1 {
            for i in 0..nx {
                let a = CellIndex::new(i, j);
                let b = CellIndex::new(i, j + 1);
                let (lw, lo) = upstream_pair(fluid, pressure, sw, a, b);
                water_y[j * nx + i] = lw;
                oil_y[j * nx + i] = lo;
            }
        }

        Self {
            nx,
            ny,
            water_x,
            oil_x,
            water_y,
            oil_y,
        }
    }

    /// Water mobility on the x-face joining `(i, j)` and `(i+1, j)` (1/cp).
    #[inline]
    pub fn water_x(&self, i: usize, j: usize) -> f64 {
        debug_assert!(i < self.nx - 1 && j < self.ny);
        self.water_x[j * (self.nx - 1) + i]
    }

    /// Oil mobility on the x-face joining `(i, j)` and `(i+1, j)` (1/cp).
    #[inline]
    pub fn oil_x(&self, i: usize, j: usize) -> f64 {
        debug_assert!(i < self.nx - 1 && j < self.ny);
        self.oil_x[j * (self.nx - 1) + i]
    }

    /// Water mobility on the y-face joining `(i, j)` and `(i, j+1)` (1/cp).
    #[inline]
    pub fn water_y(&self, i: usize, j: usize) -> f64 {
        debug_assert!(i < self.nx && j < self.ny - 1);
        self.water_y[j * self.nx + i]
    }

    /// Oil mobility on the y-face joining `(i, j)` and `(i, j+1)` (1/cp).
    #[inline]
    pub fn oil_y(&self, i: usize, j: usize) -> f64 {
        debug_assert!(i < self.nx && j < self.ny - 1);
        self.oil_y[j * self.nx + i]
    }

    /// Total mobility on an x-face (1/cp).
    #[inline]
    pub fn total_x(&self, i: usize, j: usize) -> f64 {
        self.water_x(i, j) + self.oil_x(i, j)
    }

    /// Total mobility on a y-face (1/cp).
    #[inline]
    pub fn total_y(&self, i: usize, j: usize) -> f64 {
        self.water_y(i, j) + self.oil_y(i, j)
    }
}

/// Phase mobilities `(λ_w, λ_o)` taken from the upstream side of face `a|b`.
fn upstream_pair(
    fluid: &TwoPhaseFluid,
    pressure: &Field2D,
    sw: &Field2D,
    a: CellIndex,
    b: CellIndex,
) -> (f64, f64) {
    let pa = pressure[a];
    let pb = pressure[b];
    if pa > pb {
        (fluid.water_mobility(sw[a]), fluid.oil_mobility(sw[a]))
    } else if pb > pa {
        (fluid.water_mobility(sw[b]), fluid.oil_mobility(sw[b]))
    } else {
        (
            0.5 * (fluid.water_mobility(sw[a]) + fluid.water_mobility(sw[b])),
            0.5 * (fluid.oil_mobility(sw[a]) + fluid.oil_mobility(sw[b])),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
