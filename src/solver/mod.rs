//! Pressure solve.
//!
//! Two paths sit behind [`solve`]:
//!
//! - conjugate gradient on the banded system (larger grids)
//! - dense full-pivot LU via `faer` (small grids)
//!
//! Both honor the same contract: the returned solution's relative residual
//! `||b - A*x|| / ||b||` is at or below the configured tolerance, or the
//! solve fails with the last achieved residual. Method selection is an
//! implementation detail of the step, not part of results.

mod cg;
mod direct;

use crate::assembly::PressureSystem;
use thiserror::Error;

/// Unknown-count threshold below which `Auto` picks the dense LU path.
/// Covers interactive grid sizes up to 20 x 20.
const AUTO_DENSE_LIMIT: usize = 400;

/// Solution method for the pressure system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveMethod {
    /// Dense LU for small systems, conjugate gradient otherwise.
    Auto,
    /// Always conjugate gradient.
    ConjugateGradient,
    /// Always dense LU.
    DirectLu,
}

impl Default for SolveMethod {
    fn default() -> Self {
        SolveMethod::Auto
    }
}

/// Pressure solver configuration.
///
/// # Example
///
/// ```
/// use nursim::solver::{SolveMethod, SolverConfig};
///
/// let config = SolverConfig::new()
///     .with_tolerance(1e-8)
///     .with_max_iterations(2000)
///     .with_method(SolveMethod::ConjugateGradient);
/// assert_eq!(config.tolerance, 1e-8);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    /// Relative residual target (default `1e-6`).
    pub tolerance: f64,
    /// Iteration cap for the iterative path (default 1000).
    pub max_iterations: usize,
    /// Method selection (default [`SolveMethod::Auto`]).
    pub method: SolveMethod,
}

impl SolverConfig {
    /// Default configuration: tolerance `1e-6`, 1000 iterations, `Auto`.
    pub fn new() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 1000,
            method: SolveMethod::Auto,
        }
    }

    /// Set the relative residual target.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the solution method.
    pub fn with_method(mut self, method: SolveMethod) -> Self {
        self.method = method;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Converged pressure solution with solve statistics.
#[derive(Clone, Debug)]
pub struct PressureSolution {
    /// Cell pressures in row-major order (psi).
    pub values: Vec<f64>,
    /// Iterations used (1 means a single direct factorization).
    pub iterations: usize,
    /// Achieved relative residual.
    pub residual: f64,
}

/// Pressure solve failure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error(
        "pressure solve did not converge: relative residual {residual:.3e} \
         after {iterations} iterations (tolerance {tolerance:.1e})"
    )]
    ConvergenceFailure {
        iterations: usize,
        residual: f64,
        tolerance: f64,
    },
}

/// Solve the assembled pressure system.
///
/// `x0` is the starting guess for the iterative path (the previous step's
/// pressure is the natural choice); the direct path ignores it.
pub fn solve(
    system: &PressureSystem,
    x0: &[f64],
    config: &SolverConfig,
) -> Result<PressureSolution, SolverError> {
    match config.method {
        SolveMethod::DirectLu => direct::solve(system, config.tolerance),
        SolveMethod::ConjugateGradient => {
            cg::solve(system, x0, config.tolerance, config.max_iterations)
        }
        SolveMethod::Auto => {
            if system.n() <= AUTO_DENSE_LIMIT {
                direct::solve(system, config.tolerance)
            } else {
                cg::solve(system, x0, config.tolerance, config.max_iterations)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::Transmissibility;
    use crate::boundary::BoundaryCondition;
    use crate::fluid::SinglePhaseFluid;
    use crate::grid::{Field2D, Grid2D};
    use crate::types::CellIndex;
    use crate::wells::{WellKind, WellSet};

    fn system(nx: usize, ny: usize) -> PressureSystem {
        let grid = Grid2D::uniform(nx, ny, 100.0, 100.0, 20.0, 100.0, 0.2).unwrap();
        let fluid = SinglePhaseFluid::new(1.0, 1.2, 1e-5, 3000.0).unwrap();
        let trans = Transmissibility::geometric(&grid);
        let p_old = Field2D::constant(nx, ny, 3000.0);
        let mut wells = WellSet::for_grid(&grid);
        wells
            .add_well(WellKind::Producer, CellIndex::new(nx - 1, ny - 1), 250.0)
            .unwrap();
        PressureSystem::single_phase(
            &grid,
            &fluid,
            wells.wells(),
            BoundaryCondition::NoFlow,
            &trans,
            &p_old,
            10.0,
        )
    }

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert_eq!(config.tolerance, 1e-6);
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.method, SolveMethod::Auto);
    }

    #[test]
    fn test_methods_agree() {
        use approx::assert_relative_eq;

        let sys = system(6, 6);
        let x0 = vec![3000.0; sys.n()];

        let lu = solve(&sys, &x0, &SolverConfig::new().with_method(SolveMethod::DirectLu))
            .unwrap();
        let cg = solve(
            &sys,
            &x0,
            &SolverConfig::new()
                .with_method(SolveMethod::ConjugateGradient)
                .with_tolerance(1e-12),
        )
        .unwrap();

        for m in 0..sys.n() {
            assert_relative_eq!(lu.values[m], cg.values[m], max_relative = 1e-8);
        }
    }

    #[test]
    fn test_auto_meets_tolerance_either_way() {
        // Under and over the dense cutoff
        for (nx, ny) in [(5, 5), (25, 25)] {
            let sys = system(nx, ny);
            let x0 = vec![3000.0; sys.n()];
            let config = SolverConfig::new().with_max_iterations(5000);
            let sol = solve(&sys, &x0, &config).unwrap();
            assert!(
                sol.residual <= config.tolerance,
                "{}x{}: residual {}",
                nx,
                ny,
                sol.residual
            );
        }
    }
}
