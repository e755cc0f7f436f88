//! Pressure-equation assembly.
//!
//! Builds the implicit pressure system `A * P = b` on the structured grid.
//! Each cell contributes one row with at most four neighbor couplings, so the
//! matrix is pentadiagonal and stored as five bands plus the right-hand side.
//!
//! Row `m` (cell `(i, j)`, `m = j*nx + i`):
//! - diagonal: accumulation `phi*ct*V / (5.614583 * B * dt)` plus the sum of
//!   face transmissibilities (interior and constant-pressure boundary)
//! - off-diagonals: `-T` per interior face, shared with the neighbor's row,
//!   which keeps the matrix symmetric
//! - rhs: accumulation times the previous pressure, boundary terms, and well
//!   sources `±rate/B`
//!
//! With positive compressibility the diagonal strictly dominates, so the
//! system is symmetric positive definite.

use faer::Mat;

use super::transmissibility::{FaceMobility, Transmissibility, CUBIC_FEET_PER_BARREL};
use crate::boundary::BoundaryCondition;
use crate::fluid::{SinglePhaseFluid, TwoPhaseFluid};
use crate::grid::{Field2D, Grid2D};
use crate::types::CellIndex;
use crate::wells::{Well, WellKind};

/// Banded symmetric pressure system for one time step.
#[derive(Clone, Debug)]
pub struct PressureSystem {
    nx: usize,
    ny: usize,
    /// Diagonal coefficients.
    diag: Vec<f64>,
    /// Coupling to cell `(i+1, j)`; zero on the east edge.
    east: Vec<f64>,
    /// Coupling to cell `(i-1, j)`; zero on the west edge.
    west: Vec<f64>,
    /// Coupling to cell `(i, j+1)`; zero on the north edge.
    north: Vec<f64>,
    /// Coupling to cell `(i, j-1)`; zero on the south edge.
    south: Vec<f64>,
    /// Accumulation coefficients (the dt-dependent diagonal part).
    accum: Vec<f64>,
    /// Pressure-independent sources: wells and boundary terms.
    src: Vec<f64>,
    /// Right-hand side, `accum * p_old + src`.
    rhs: Vec<f64>,
}

impl PressureSystem {
    /// Assemble the single-phase system.
    ///
    /// Face transmissibility is `G/mu`; wells contribute `signed_rate/B` to
    /// the right-hand side.
    pub fn single_phase(
        grid: &Grid2D,
        fluid: &SinglePhaseFluid,
        wells: &[Well],
        boundary: BoundaryCondition,
        trans: &Transmissibility,
        p_old: &Field2D,
        dt: f64,
    ) -> Self {
        let inv_mu = 1.0 / fluid.viscosity();
        let b = fluid.fvf();
        assemble_with(
            grid,
            wells,
            boundary,
            trans,
            dt,
            fluid.total_compressibility(),
            b,
            |_, _| inv_mu,
            |_, _| inv_mu,
            |_| inv_mu,
            |w| w.signed_rate() / b,
            p_old,
        )
    }

    /// Assemble the two-phase pressure system.
    ///
    /// Face transmissibility is `G * (λ_w + λ_o)` with upstream-weighted
    /// mobilities; injectors add `rate/B_w`, producers remove `rate/B_o`.
    /// Boundary faces use the edge cell's own total mobility.
    #[allow(clippy::too_many_arguments)]
    pub fn two_phase(
        grid: &Grid2D,
        fluid: &TwoPhaseFluid,
        wells: &[Well],
        boundary: BoundaryCondition,
        trans: &Transmissibility,
        mobility: &FaceMobility,
        p_old: &Field2D,
        sw_old: &Field2D,
        dt: f64,
    ) -> Self {
        assemble_with(
            grid,
            wells,
            boundary,
            trans,
            dt,
            fluid.total_compressibility(),
            fluid.oil_fvf(),
            |i, j| mobility.total_x(i, j),
            |i, j| mobility.total_y(i, j),
            |cell| fluid.total_mobility(sw_old[cell]),
            |w| match w.kind() {
                WellKind::Injector => w.rate() / fluid.water_fvf(),
                WellKind::Producer => -w.rate() / fluid.oil_fvf(),
            },
            p_old,
        )
    }

    /// Number of unknowns.
    #[inline]
    pub fn n(&self) -> usize {
        self.diag.len()
    }

    /// Grid width the system was assembled for.
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Grid height the system was assembled for.
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Right-hand side vector.
    #[inline]
    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    /// Diagonal coefficients.
    #[inline]
    pub fn diag(&self) -> &[f64] {
        &self.diag
    }

    /// Recompute the right-hand side for a new previous-step pressure,
    /// keeping the matrix.
    ///
    /// Valid whenever the coefficients are unchanged between steps, i.e. for
    /// single-phase runs where transmissibilities are constant.
    pub fn refresh_rhs(&mut self, p_old: &Field2D) {
        let p = p_old.as_slice();
        for m in 0..self.rhs.len() {
            self.rhs[m] = self.accum[m] * p[m] + self.src[m];
        }
    }

    /// One row of `A * x`.
    #[inline]
    fn row_dot(&self, m: usize, x: &[f64]) -> f64 {
        let nx = self.nx;
        let i = m % nx;
        let mut sum = self.diag[m] * x[m];
        if i > 0 {
            sum += self.west[m] * x[m - 1];
        }
        if i + 1 < nx {
            sum += self.east[m] * x[m + 1];
        }
        if m >= nx {
            sum += self.south[m] * x[m - nx];
        }
        if m + nx < x.len() {
            sum += self.north[m] * x[m + nx];
        }
        sum
    }

    /// Matrix-vector product `y = A * x`.
    pub fn mul(&self, x: &[f64], y: &mut [f64]) {
        debug_assert_eq!(x.len(), self.n());
        debug_assert_eq!(y.len(), self.n());
        for (m, ym) in y.iter_mut().enumerate() {
            *ym = self.row_dot(m, x);
        }
    }

    /// Matrix-vector product with rows computed in parallel.
    #[cfg(feature = "parallel")]
    pub fn mul_parallel(&self, x: &[f64], y: &mut [f64]) {
        use rayon::prelude::*;
        debug_assert_eq!(x.len(), self.n());
        debug_assert_eq!(y.len(), self.n());
        y.par_iter_mut()
            .enumerate()
            .for_each(|(m, ym)| *ym = self.row_dot(m, x));
    }

    /// Euclidean norm of the residual `b - A * x`.
    pub fn residual_norm(&self, x: &[f64]) -> f64 {
        let mut sum = 0.0;
        for m in 0..self.n() {
            let r = self.rhs[m] - self.row_dot(m, x);
            sum += r * r;
        }
        sum.sqrt()
    }

    /// Euclidean norm of the right-hand side.
    pub fn rhs_norm(&self) -> f64 {
        self.rhs.iter().map(|&b| b * b).sum::<f64>().sqrt()
    }

    /// Expand the bands into a dense matrix for direct factorization.
    pub fn to_dense(&self) -> Mat<f64> {
        let n = self.n();
        let nx = self.nx;
        let mut a = Mat::zeros(n, n);
        for m in 0..n {
            a[(m, m)] = self.diag[m];
            let i = m % nx;
            if i > 0 {
                a[(m, m - 1)] = self.west[m];
            }
            if i + 1 < nx {
                a[(m, m + 1)] = self.east[m];
            }
            if m >= nx {
                a[(m, m - nx)] = self.south[m];
            }
            if m + nx < n {
                a[(m, m + nx)] = self.north[m];
            }
        }
        a
    }

    /// True when every row's diagonal weakly dominates its off-diagonal sum.
    ///
    /// Holds strictly whenever the accumulation term is positive, which the
    /// validated fluid models guarantee.
    pub fn is_diagonally_dominant(&self) -> bool {
        (0..self.n()).all(|m| {
            let off = self.west[m].abs()
                + self.east[m].abs()
                + self.south[m].abs()
                + self.north[m].abs();
            self.diag[m] > 0.0 && self.diag[m] >= off * (1.0 - 1e-12)
        })
    }
}

/// Shared assembly over the per-mode mobility and source closures.
#[allow(clippy::too_many_arguments)]
fn assemble_with<Fx, Fy, Fc, Fs>(
    grid: &Grid2D,
    wells: &[Well],
    boundary: BoundaryCondition,
    trans: &Transmissibility,
    dt: f64,
    ct: f64,
    fvf: f64,
    face_mob_x: Fx,
    face_mob_y: Fy,
    cell_mob: Fc,
    well_source: Fs,
    p_old: &Field2D,
) -> PressureSystem
where
    Fx: Fn(usize, usize) -> f64,
    Fy: Fn(usize, usize) -> f64,
    Fc: Fn(CellIndex) -> f64,
    Fs: Fn(&Well) -> f64,
{
    let nx = grid.nx();
    let ny = grid.ny();
    let n = nx * ny;

    let mut diag = vec![0.0; n];
    let mut east = vec![0.0; n];
    let mut west = vec![0.0; n];
    let mut north = vec![0.0; n];
    let mut south = vec![0.0; n];
    let mut accum = vec![0.0; n];
    let mut src = vec![0.0; n];

    // Accumulation: phi * ct * V / (5.614583 * B * dt)
    let volume = grid.cell_volume();
    for cell in grid.cells() {
        let m = cell.to_linear(nx);
        accum[m] = grid.porosity(cell) * ct * volume / (CUBIC_FEET_PER_BARREL * fvf * dt);
        diag[m] += accum[m];
    }

    // Interior x-faces
    for j in 0..ny {
        for i in 0..nx - 1 {
            let t = trans.x_face(i, j) * face_mob_x(i, j);
            let ma = j * nx + i;
            let mb = ma + 1;
            diag[ma] += t;
            diag[mb] += t;
            east[ma] = -t;
            west[mb] = -t;
        }
    }

    // Interior y-faces
    for j in 0..ny - 1 {
        for i in 0..nx {
            let t = trans.y_face(i, j) * face_mob_y(i, j);
            let ma = j * nx + i;
            let mb = ma + nx;
            diag[ma] += t;
            diag[mb] += t;
            north[ma] = -t;
            south[mb] = -t;
        }
    }

    // Constant-pressure boundary: one half-cell connection per exposed edge,
    // so corner cells pick up two terms. No-flow adds nothing.
    if let BoundaryCondition::ConstantPressure(pb) = boundary {
        for j in 0..ny {
            for i in [0, nx - 1] {
                let cell = CellIndex::new(i, j);
                let t = Transmissibility::boundary_x(grid, cell) * cell_mob(cell);
                let m = cell.to_linear(nx);
                diag[m] += t;
                src[m] += t * pb;
            }
        }
        for i in 0..nx {
            for j in [0, ny - 1] {
                let cell = CellIndex::new(i, j);
                let t = Transmissibility::boundary_y(grid, cell) * cell_mob(cell);
                let m = cell.to_linear(nx);
                diag[m] += t;
                src[m] += t * pb;
            }
        }
    }

    // Wells: rate-specified sources, right-hand side only
    for well in wells {
        let m = well.cell().to_linear(nx);
        src[m] += well_source(well);
    }

    let p = p_old.as_slice();
    let mut rhs = vec![0.0; n];
    for m in 0..n {
        rhs[m] = accum[m] * p[m] + src[m];
    }

    PressureSystem {
        nx,
        ny,
        diag,
        east,
        west,
        north,
        south,
        accum,
        src,
        rhs,
    }
}

// =============================================================================
// Tests
// =============================================================================
