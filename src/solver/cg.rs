//! Conjugate gradient for the banded pressure system.
//!
//! The assembled system is symmetric positive definite (symmetric face
//! couplings, strictly dominant diagonal), which is exactly the setting where
//! plain CG is reliable. The iteration works directly on the banded
//! matrix-vector product, so no dense matrix is formed.

use super::{PressureSolution, SolverError};
use crate::assembly::PressureSystem;

/// Banded matrix-vector product, parallel when the feature is enabled.
fn spmv(a: &PressureSystem, x: &[f64], y: &mut [f64]) {
    #[cfg(feature = "parallel")]
    a.mul_parallel(x, y);
    #[cfg(not(feature = "parallel"))]
    a.mul(x, y);
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Solve `A * x = b` by conjugate gradient, starting from `x0`.
///
/// Stops when the relative residual `||b - A*x|| / ||b||` drops to
/// `tolerance`, or fails with the last achieved residual after
/// `max_iterations`.
pub(super) fn solve(
    system: &PressureSystem,
    x0: &[f64],
    tolerance: f64,
    max_iterations: usize,
) -> Result<PressureSolution, SolverError> {
    let n = system.n();
    let b = system.rhs();
    let b_norm = system.rhs_norm();

    // Degenerate but well-defined: zero rhs has the zero solution
    if b_norm == 0.0 {
        return Ok(PressureSolution {
            values: vec![0.0; n],
            iterations: 0,
            residual: 0.0,
        });
    }

    let mut x = x0.to_vec();
    let mut r = vec![0.0; n];
    spmv(system, &x, &mut r);
    for m in 0..n {
        r[m] = b[m] - r[m];
    }

    let mut rs_old = dot(&r, &r);
    let mut residual = rs_old.sqrt() / b_norm;
    if residual <= tolerance {
        return Ok(PressureSolution {
            values: x,
            iterations: 0,
            residual,
        });
    }

    let mut p = r.clone();
    let mut ap = vec![0.0; n];

    for k in 1..=max_iterations {
        spmv(system, &p, &mut ap);
        let pap = dot(&p, &ap);
        if !(pap.is_finite() && pap > 0.0) {
            // Lost positive definiteness numerically; report what we reached
            return Err(SolverError::ConvergenceFailure {
                iterations: k,
                residual,
                tolerance,
            });
        }

        let alpha = rs_old / pap;
        for m in 0..n {
            x[m] += alpha * p[m];
            r[m] -= alpha * ap[m];
        }

        let rs_new = dot(&r, &r);
        residual = rs_new.sqrt() / b_norm;
        if !residual.is_finite() {
            return Err(SolverError::ConvergenceFailure {
                iterations: k,
                residual,
                tolerance,
            });
        }
        if residual <= tolerance {
            return Ok(PressureSolution {
                values: x,
                iterations: k,
                residual,
            });
        }

        let beta = rs_new / rs_old;
        for m in 0..n {
            p[m] = r[m] + beta * p[m];
        }
        rs_old = rs_new;
    }

    Err(SolverError::ConvergenceFailure {
        iterations: max_iterations,
        residual,
        tolerance,
    })
}

// =============================================================================
// Tests
// =============================================================================
