//! # nursim
//!
//! A finite-difference reservoir simulation core for 2D waterflood and
//! depletion studies.
//!
//! This crate provides the building blocks for implicit-pressure,
//! explicit-saturation (IMPES) simulation on structured grids:
//! - Grid representation with per-cell rock properties
//! - Single- and two-phase fluid (PVT) models with relative permeability
//! - Well registry with stable `P_n`/`I_n` identifiers
//! - Harmonic-mean transmissibilities and pentadiagonal pressure assembly
//! - Direct (LU) and conjugate gradient pressure solvers
//! - Explicit upstream-weighted saturation transport
//! - Fixed-step time stepping with material-balance diagnostics
//!
//! All quantities are in oilfield units: ft, md, cp, psi, STB/day, days.

pub mod assembly;
pub mod boundary;
pub mod fluid;
pub mod grid;
pub mod saturation;
pub mod sim;
pub mod solver;
pub mod types;
pub mod wells;

// Re-export main types for convenience
pub use assembly::{FaceMobility, PressureSystem, Transmissibility};
pub use boundary::BoundaryCondition;
pub use fluid::{
    FluidError, FluidModel, RelPerm, RelPermCurve, SinglePhaseFluid, TwoPhaseFluid,
};
pub use grid::{Field2D, Grid2D, GridError};
pub use saturation::ClampedCell;
pub use sim::{
    ConfigError, MaterialBalance, RunState, Simulation, StepError, StepResult, StepWarning,
    Steps,
};
pub use solver::{PressureSolution, SolveMethod, SolverConfig, SolverError};
pub use types::CellIndex;
pub use wells::{Well, WellError, WellId, WellKind, WellSet};
