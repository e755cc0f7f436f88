//! Time stepping driver.
//!
//! [`Simulation`] owns a validated reservoir description and marches fixed
//! steps of length `dt` to `total_time`, solving pressure implicitly each
//! step and, for two-phase runs, advancing saturation explicitly afterwards.
//! The step count is fixed up front as `ceil(total_time / dt)`; the final
//! step is shortened when needed so the run lands exactly on `total_time`.
//!
//! A simulation starts in [`RunState::Running`] and ends [`Completed`]
//! (all steps taken) or [`Failed`] (a pressure solve did not converge). A
//! failed step leaves the previous step's fields in place, reports the
//! failure once, and refuses further stepping.
//!
//! [`Completed`]: RunState::Completed
//! [`Failed`]: RunState::Failed
//!
//! # Example
//!
//! ```
//! use nursim::boundary::BoundaryCondition;
//! use nursim::fluid::SinglePhaseFluid;
//! use nursim::grid::Grid2D;
//! use nursim::sim::Simulation;
//! use nursim::types::CellIndex;
//! use nursim::wells::{WellKind, WellSet};
//!
//! let grid = Grid2D::uniform(5, 5, 100.0, 100.0, 20.0, 100.0, 0.2).unwrap();
//! let fluid = SinglePhaseFluid::new(1.0, 1.2, 1e-5, 3000.0).unwrap();
//! let mut wells = WellSet::for_grid(&grid);
//! wells.add_well(WellKind::Producer, CellIndex::new(4, 4), 200.0).unwrap();
//!
//! let mut sim = Simulation::initialize(
//!     grid, fluid, &wells, BoundaryCondition::NoFlow, 10.0, 50.0,
//! ).unwrap();
//!
//! for step in sim.run_to_completion() {
//!     let result = step.unwrap();
//!     println!("t = {:>5.1} days, p_avg = {:.1} psi", result.time, result.pressure.mean());
//! }
//! assert_eq!(sim.steps_taken(), 5);
//! ```

use std::fmt;

use thiserror::Error;

use super::diagnostics::MaterialBalance;
use crate::assembly::{FaceMobility, PressureSystem, Transmissibility};
use crate::boundary::BoundaryCondition;
use crate::fluid::{FluidModel, SinglePhaseFluid, TwoPhaseFluid};
use crate::grid::{Field2D, Grid2D};
use crate::saturation::{self, ClampedCell};
use crate::solver::{self, SolverConfig, SolverError};
use crate::wells::{Well, WellSet};

/// Lifecycle state of a [`Simulation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Steps remain to be taken.
    Running,
    /// All planned steps were taken and `time == total_time`.
    Completed,
    /// A pressure solve failed; the fields hold the last converged step.
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Errors from simulation setup.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("time step must be positive and finite, got {0} days")]
    InvalidTimeStep(f64),

    #[error("total time must be positive and finite, got {0} days")]
    InvalidTotalTime(f64),

    #[error("well set was built for a {well_nx} x {well_ny} grid, not {nx} x {ny}")]
    WellGridMismatch {
        well_nx: usize,
        well_ny: usize,
        nx: usize,
        ny: usize,
    },

    #[error("boundary pressure must be finite, got {0}")]
    InvalidBoundaryPressure(f64),

    #[error("solver tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),

    #[error("solver iteration cap must be at least 1")]
    ZeroMaxIterations,
}

/// Errors from taking a step.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StepError {
    /// The pressure solve did not converge; the simulation is now
    /// [`RunState::Failed`].
    #[error(
        "pressure solve failed at step {step}: relative residual {residual:.3e} \
         after {iterations} iterations"
    )]
    Convergence {
        step: usize,
        iterations: usize,
        residual: f64,
    },

    /// The simulation already finished; no step was taken.
    #[error("no step taken: simulation is {state}")]
    Finished { state: RunState },
}

/// Non-fatal observations attached to a step's result.
#[derive(Clone, Debug, PartialEq)]
pub enum StepWarning {
    /// Saturations left the mobile range and were clamped back.
    SaturationClamped {
        step: usize,
        cells: Vec<ClampedCell>,
    },
    /// The configured `dt` exceeds the advisory explicit stability bound;
    /// reported once per run, on the first step.
    TimeStepAboveStable { dt: f64, dt_stable: f64 },
}

impl fmt::Display for StepWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SaturationClamped { step, cells } => write!(
                f,
                "step {}: saturation clamped to the mobile range in {} cells",
                step,
                cells.len()
            ),
            Self::TimeStepAboveStable { dt, dt_stable } => write!(
                f,
                "time step {:.3} days exceeds the explicit saturation stability \
                 estimate {:.3} days",
                dt, dt_stable
            ),
        }
    }
}

/// Snapshot produced by one successful step.
#[derive(Clone, Debug)]
pub struct StepResult {
    /// Step number, 1-based.
    pub step: usize,
    /// Simulation time at the end of the step (days).
    pub time: f64,
    /// Step length actually used (days); shorter on a clamped final step.
    pub dt: f64,
    /// Cell pressures after the step (psi).
    pub pressure: Field2D,
    /// Water saturations after the step; `None` for single-phase runs.
    pub saturation: Option<Field2D>,
    /// Non-fatal observations from this step.
    pub warnings: Vec<StepWarning>,
    /// Iterations the pressure solve used.
    pub solver_iterations: usize,
    /// Relative residual the pressure solve achieved.
    pub solver_residual: f64,
}

/// Phase-specific per-run state.
///
/// Single-phase coefficients never change between equal-length steps, so the
/// assembled system is kept and only its right-hand side is refreshed.
/// Two-phase systems depend on the moving saturation field and are
/// reassembled every step.
#[derive(Clone, Debug)]
enum Phase {
    Single {
        fluid: SinglePhaseFluid,
        system: PressureSystem,
    },
    Two {
        fluid: TwoPhaseFluid,
        saturation: Field2D,
    },
}

/// An initialized reservoir simulation.
#[derive(Clone, Debug)]
pub struct Simulation {
    grid: Grid2D,
    wells: Vec<Well>,
    boundary: BoundaryCondition,
    dt: f64,
    total_time: f64,
    n_steps: usize,
    solver: SolverConfig,
    trans: Transmissibility,
    phase: Phase,
    state: RunState,
    steps_taken: usize,
    time: f64,
    pressure: Field2D,
    stability_advised: bool,
}

impl Simulation {
    /// Initialize a simulation with the default solver configuration.
    ///
    /// `dt` and `total_time` are in days; the well set must have been
    /// created for this grid's dimensions. Pressure starts uniform at the
    /// fluid's initial pressure, saturation (two-phase only) at the fluid's
    /// initial water saturation.
    pub fn initialize(
        grid: Grid2D,
        fluid: impl Into<FluidModel>,
        wells: &WellSet,
        boundary: BoundaryCondition,
        dt: f64,
        total_time: f64,
    ) -> Result<Self, ConfigError> {
        Self::initialize_with_config(
            grid,
            fluid,
            wells,
            boundary,
            dt,
            total_time,
            SolverConfig::default(),
        )
    }

    /// Initialize with an explicit solver configuration.
    pub fn initialize_with_config(
        grid: Grid2D,
        fluid: impl Into<FluidModel>,
        wells: &WellSet,
        boundary: BoundaryCondition,
        dt: f64,
        total_time: f64,
        solver: SolverConfig,
    ) -> Result<Self, ConfigError> {
        let fluid = fluid.into();

        if !(dt.is_finite() && dt > 0.0) {
            return Err(ConfigError::InvalidTimeStep(dt));
        }
        if !(total_time.is_finite() && total_time > 0.0) {
            return Err(ConfigError::InvalidTotalTime(total_time));
        }
        if wells.grid_dims() != (grid.nx(), grid.ny()) {
            let (well_nx, well_ny) = wells.grid_dims();
            return Err(ConfigError::WellGridMismatch {
                well_nx,
                well_ny,
                nx: grid.nx(),
                ny: grid.ny(),
            });
        }
        if let BoundaryCondition::ConstantPressure(p) = boundary {
            if !p.is_finite() {
                return Err(ConfigError::InvalidBoundaryPressure(p));
            }
        }
        if !(solver.tolerance.is_finite() && solver.tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(solver.tolerance));
        }
        if solver.max_iterations == 0 {
            return Err(ConfigError::ZeroMaxIterations);
        }

        let pressure = Field2D::constant(grid.nx(), grid.ny(), fluid.initial_pressure());
        let trans = Transmissibility::geometric(&grid);
        let wells = wells.wells().to_vec();

        let phase = match fluid {
            FluidModel::SinglePhase(fluid) => Phase::Single {
                system: PressureSystem::single_phase(
                    &grid, &fluid, &wells, boundary, &trans, &pressure, dt,
                ),
                fluid,
            },
            FluidModel::TwoPhase(fluid) => Phase::Two {
                saturation: Field2D::constant(
                    grid.nx(),
                    grid.ny(),
                    fluid.initial_water_saturation(),
                ),
                fluid,
            },
        };

        Ok(Self {
            n_steps: planned_steps(total_time, dt),
            grid,
            wells,
            boundary,
            dt,
            total_time,
            solver,
            trans,
            phase,
            state: RunState::Running,
            steps_taken: 0,
            time: 0.0,
            pressure,
            stability_advised: false,
        })
    }

    /// Take one step.
    ///
    /// On success the internal fields advance and a snapshot is returned.
    /// A convergence failure moves the simulation to [`RunState::Failed`]
    /// and is reported exactly once; any call after the run has finished
    /// gets [`StepError::Finished`].
    pub fn step(&mut self) -> Result<StepResult, StepError> {
        if self.state != RunState::Running {
            return Err(StepError::Finished { state: self.state });
        }

        let step = self.steps_taken + 1;
        let last = step == self.n_steps;
        // Interior steps use dt verbatim; the final step takes whatever
        // remains so the run ends exactly at total_time
        let dt = if last {
            self.total_time - self.time
        } else {
            self.dt
        };
        let end_time = if last {
            self.total_time
        } else {
            step as f64 * self.dt
        };

        let (solved, mobility) = match &mut self.phase {
            Phase::Single { fluid, system } => {
                let solved = if dt == self.dt {
                    system.refresh_rhs(&self.pressure);
                    solver::solve(system, self.pressure.as_slice(), &self.solver)
                } else {
                    let clamped = PressureSystem::single_phase(
                        &self.grid,
                        fluid,
                        &self.wells,
                        self.boundary,
                        &self.trans,
                        &self.pressure,
                        dt,
                    );
                    solver::solve(&clamped, self.pressure.as_slice(), &self.solver)
                };
                (solved, None)
            }
            Phase::Two { fluid, saturation } => {
                let mobility =
                    FaceMobility::upstream(&self.grid, fluid, &self.pressure, saturation);
                let system = PressureSystem::two_phase(
                    &self.grid,
                    fluid,
                    &self.wells,
                    self.boundary,
                    &self.trans,
                    &mobility,
                    &self.pressure,
                    saturation,
                    dt,
                );
                let solved = solver::solve(&system, self.pressure.as_slice(), &self.solver);
                (solved, Some(mobility))
            }
        };

        let solution = match solved {
            Ok(solution) => solution,
            Err(SolverError::ConvergenceFailure {
                iterations,
                residual,
                ..
            }) => {
                self.state = RunState::Failed;
                return Err(StepError::Convergence {
                    step,
                    iterations,
                    residual,
                });
            }
        };

        let solver_iterations = solution.iterations;
        let solver_residual = solution.residual;
        self.pressure = Field2D::from_data(self.grid.nx(), self.grid.ny(), solution.values);

        let mut warnings = Vec::new();
        if let (Some(mobility), Phase::Two { fluid, saturation }) =
            (&mobility, &mut self.phase)
        {
            if !self.stability_advised {
                self.stability_advised = true;
                let dt_stable = saturation::stable_dt_estimate(
                    &self.grid,
                    fluid,
                    &self.wells,
                    self.boundary,
                    &self.trans,
                    mobility,
                    &self.pressure,
                    saturation,
                );
                if self.dt > dt_stable {
                    warnings.push(StepWarning::TimeStepAboveStable {
                        dt: self.dt,
                        dt_stable,
                    });
                }
            }

            let cells = saturation::advance(
                &self.grid,
                fluid,
                &self.wells,
                self.boundary,
                &self.trans,
                mobility,
                &self.pressure,
                saturation,
                dt,
            );
            if !cells.is_empty() {
                warnings.push(StepWarning::SaturationClamped { step, cells });
            }
        }

        self.steps_taken = step;
        self.time = end_time;
        if last {
            self.state = RunState::Completed;
        }

        Ok(StepResult {
            step,
            time: self.time,
            dt,
            pressure: self.pressure.clone(),
            saturation: self.saturation().cloned(),
            warnings,
            solver_iterations,
            solver_residual,
        })
    }

    /// Lazily run the remaining steps.
    ///
    /// The returned iterator takes one step per `next()` call and stops
    /// after completion or the first failure, so a `for` loop over it
    /// drives the run to its end.
    pub fn run_to_completion(&mut self) -> Steps<'_> {
        Steps { sim: self }
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Simulation time reached so far (days).
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Steps taken so far.
    #[inline]
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Total number of planned steps, `ceil(total_time / dt)`.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Configured step length (days).
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Configured end time (days).
    #[inline]
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// The grid the simulation runs on.
    #[inline]
    pub fn grid(&self) -> &Grid2D {
        &self.grid
    }

    /// Wells captured at initialization, in insertion order.
    #[inline]
    pub fn wells(&self) -> &[Well] {
        &self.wells
    }

    /// Outer boundary condition.
    #[inline]
    pub fn boundary(&self) -> BoundaryCondition {
        self.boundary
    }

    /// The fluid model the simulation was initialized with.
    pub fn fluid(&self) -> FluidModel {
        match &self.phase {
            Phase::Single { fluid, .. } => FluidModel::SinglePhase(*fluid),
            Phase::Two { fluid, .. } => FluidModel::TwoPhase(*fluid),
        }
    }

    /// Current cell pressures (psi).
    #[inline]
    pub fn pressure(&self) -> &Field2D {
        &self.pressure
    }

    /// Current water saturations; `None` for single-phase runs.
    pub fn saturation(&self) -> Option<&Field2D> {
        match &self.phase {
            Phase::Two { saturation, .. } => Some(saturation),
            Phase::Single { .. } => None,
        }
    }

    /// Material balance of the run so far.
    pub fn material_balance(&self) -> MaterialBalance {
        MaterialBalance::compute(
            &self.grid,
            &self.fluid(),
            &self.wells,
            &self.pressure,
            self.time,
        )
    }
}

/// Step count needed to reach `total_time` in steps of `dt`.
///
/// Near-integer ratios are snapped before taking the ceiling so float noise
/// in `total_time / dt` cannot add a spurious extra step.
fn planned_steps(total_time: f64, dt: f64) -> usize {
    let ratio = total_time / dt;
    let rounded = ratio.round();
    let n = if (ratio - rounded).abs() < 1e-9 {
        rounded
    } else {
        ratio.ceil()
    };
    (n as usize).max(1)
}

/// Iterator over a simulation's remaining steps.
///
/// Yields each step's result in turn and ends after completion or the first
/// error; see [`Simulation::run_to_completion`].
#[derive(Debug)]
pub struct Steps<'a> {
    sim: &'a mut Simulation,
}

impl Iterator for Steps<'_> {
    type Item = Result<StepResult, StepError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.sim.state != RunState::Running {
            return None;
        }
        Some(self.sim.step())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.sim.state {
            RunState::Running => (0, Some(self.sim.n_steps - self.sim.steps_taken)),
            _ => (0, Some(0)),
        }
    }
}

impl std::iter::FusedIterator for Steps<'_> {}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluid::{RelPerm, RelPermCurve};
    use crate::solver::SolveMethod;
    use crate::types::CellIndex;
    use crate::wells::WellKind;

    fn grid_3x3() -> Grid2D {
        Grid2D::uniform(3, 3, 100.0, 100.0, 20.0, 100.0, 0.2).unwrap()
    }

    fn single_fluid() -> SinglePhaseFluid {
        SinglePhaseFluid::new(1.0, 1.2, 1e-5, 3000.0).unwrap()
    }

    fn two_fluid() -> TwoPhaseFluid {
        TwoPhaseFluid::new(
            2.0,
            1.0,
            1.1,
            1.0,
            1e-5,
            3000.0,
            RelPerm::new(0.2, 0.2, RelPermCurve::Linear).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_initialize_validation() {
        let wells = WellSet::new(3, 3);
        let bc = BoundaryCondition::NoFlow;

        let err = Simulation::initialize(grid_3x3(), single_fluid(), &wells, bc, 0.0, 95.0)
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidTimeStep(0.0));

        let err =
            Simulation::initialize(grid_3x3(), single_fluid(), &wells, bc, 10.0, f64::NAN)
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTotalTime(_)));

        let wrong = WellSet::new(5, 5);
        let err = Simulation::initialize(grid_3x3(), single_fluid(), &wrong, bc, 10.0, 95.0)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::WellGridMismatch {
                well_nx: 5,
                well_ny: 5,
                nx: 3,
                ny: 3
            }
        );

        let err = Simulation::initialize(
            grid_3x3(),
            single_fluid(),
            &wells,
            BoundaryCondition::ConstantPressure(f64::INFINITY),
            10.0,
            95.0,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBoundaryPressure(_)));

        let err = Simulation::initialize_with_config(
            grid_3x3(),
            single_fluid(),
            &wells,
            bc,
            10.0,
            95.0,
            SolverConfig::new().with_tolerance(0.0),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidTolerance(0.0));

        let err = Simulation::initialize_with_config(
            grid_3x3(),
            single_fluid(),
            &wells,
            bc,
            10.0,
            95.0,
            SolverConfig::new().with_max_iterations(0),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::ZeroMaxIterations);
    }

    #[test]
    fn test_planned_steps() {
        assert_eq!(planned_steps(95.0, 10.0), 10);
        assert_eq!(planned_steps(100.0, 10.0), 10);
        assert_eq!(planned_steps(5.0, 10.0), 1);
        assert_eq!(planned_steps(0.3, 0.1), 3);
        assert_eq!(planned_steps(1.0, 0.1), 10);
    }

    #[test]
    fn test_equilibrium_without_wells() {
        // No wells, no-flow boundary: pressure must hold at the initial value
        let wells = WellSet::new(3, 3);
        let mut sim = Simulation::initialize(
            grid_3x3(),
            single_fluid(),
            &wells,
            BoundaryCondition::NoFlow,
            10.0,
            30.0,
        )
        .unwrap();

        for step in sim.run_to_completion() {
            let result = step.unwrap();
            for (_, p) in result.pressure.iter() {
                assert!(
                    (p - 3000.0).abs() < 1e-6,
                    "pressure drifted to {} at t = {}",
                    p,
                    result.time
                );
            }
        }
        assert_eq!(sim.state(), RunState::Completed);
    }

    #[test]
    fn test_final_step_clamped_to_total_time() {
        let wells = WellSet::new(3, 3);
        let mut sim = Simulation::initialize(
            grid_3x3(),
            single_fluid(),
            &wells,
            BoundaryCondition::NoFlow,
            10.0,
            95.0,
        )
        .unwrap();

        assert_eq!(sim.n_steps(), 10);
        let results: Vec<_> = sim.run_to_completion().map(Result::unwrap).collect();

        assert_eq!(results.len(), 10);
        assert_eq!(results[8].dt, 10.0);
        assert_eq!(results[9].dt, 5.0);
        assert_eq!(results[9].time, 95.0);
        assert_eq!(sim.time(), 95.0);
        assert_eq!(sim.state(), RunState::Completed);

        // Stepping past the end reports Finished, not a panic or a step
        assert_eq!(
            sim.step().unwrap_err(),
            StepError::Finished {
                state: RunState::Completed
            }
        );
    }

    #[test]
    fn test_producer_draws_pressure_down() {
        let grid = grid_3x3();
        let mut wells = WellSet::for_grid(&grid);
        wells
            .add_well(WellKind::Producer, CellIndex::new(2, 2), 400.0)
            .unwrap();

        let mut sim = Simulation::initialize(
            grid,
            single_fluid(),
            &wells,
            BoundaryCondition::NoFlow,
            10.0,
            50.0,
        )
        .unwrap();

        let mut last_avg = 3000.0;
        for step in sim.run_to_completion() {
            let result = step.unwrap();
            let avg = result.pressure.mean();
            assert!(avg < last_avg, "average must fall monotonically");
            last_avg = avg;
            // Drawdown is deepest at the completion
            assert_eq!(
                result.pressure.min(),
                result.pressure[CellIndex::new(2, 2)]
            );
        }
    }

    #[test]
    fn test_convergence_failure_is_terminal() {
        let grid = grid_3x3();
        let mut wells = WellSet::for_grid(&grid);
        wells
            .add_well(WellKind::Producer, CellIndex::new(2, 2), 400.0)
            .unwrap();

        // One CG iteration at an unreachable tolerance cannot converge
        let mut sim = Simulation::initialize_with_config(
            grid,
            single_fluid(),
            &wells,
            BoundaryCondition::NoFlow,
            10.0,
            50.0,
            SolverConfig::new()
                .with_method(SolveMethod::ConjugateGradient)
                .with_max_iterations(1)
                .with_tolerance(1e-30),
        )
        .unwrap();

        let err = sim.step().unwrap_err();
        assert!(
            matches!(err, StepError::Convergence { step: 1, .. }),
            "unexpected error {:?}",
            err
        );
        assert_eq!(sim.state(), RunState::Failed);
        assert_eq!(sim.steps_taken(), 0);
        assert_eq!(sim.time(), 0.0);

        // Snapshot is the last converged state, here the initial condition
        for (_, p) in sim.pressure().iter() {
            assert_eq!(p, 3000.0);
        }

        // The failure was reported once; afterwards only Finished
        assert_eq!(
            sim.step().unwrap_err(),
            StepError::Finished {
                state: RunState::Failed
            }
        );
        assert_eq!(sim.run_to_completion().count(), 0);
    }

    #[test]
    fn test_two_phase_saturation_stays_in_bounds() {
        let grid = Grid2D::uniform(4, 1, 100.0, 100.0, 20.0, 200.0, 0.25).unwrap();
        let mut wells = WellSet::for_grid(&grid);
        wells
            .add_well(WellKind::Injector, CellIndex::new(0, 0), 150.0)
            .unwrap();
        wells
            .add_well(WellKind::Producer, CellIndex::new(3, 0), 150.0)
            .unwrap();

        let mut sim = Simulation::initialize(
            grid,
            two_fluid(),
            &wells,
            BoundaryCondition::NoFlow,
            2.0,
            20.0,
        )
        .unwrap();

        for step in sim.run_to_completion() {
            let result = step.unwrap();
            let sw = result.saturation.expect("two-phase step carries saturation");
            for (cell, s) in sw.iter() {
                assert!(
                    (0.2..=0.8).contains(&s),
                    "saturation {} out of bounds at {}",
                    s,
                    cell
                );
            }
        }
        assert_eq!(sim.state(), RunState::Completed);

        // Water accumulated near the injector
        let sw = sim.saturation().unwrap();
        assert!(sw[CellIndex::new(0, 0)] > 0.2);
    }

    #[test]
    fn test_oversized_dt_warns_once() {
        let grid = Grid2D::uniform(2, 1, 50.0, 50.0, 10.0, 100.0, 0.1).unwrap();
        let mut wells = WellSet::for_grid(&grid);
        wells
            .add_well(WellKind::Injector, CellIndex::new(0, 0), 400.0)
            .unwrap();
        wells
            .add_well(WellKind::Producer, CellIndex::new(1, 0), 400.0)
            .unwrap();

        // Mobile pore volume is ~270 bbl per cell; 400 bbl/day for 5 days
        // turns it over many times
        let mut sim = Simulation::initialize(
            grid,
            two_fluid(),
            &wells,
            BoundaryCondition::NoFlow,
            5.0,
            15.0,
        )
        .unwrap();

        let results: Vec<_> = sim.run_to_completion().map(Result::unwrap).collect();
        let advisories = |r: &StepResult| {
            r.warnings
                .iter()
                .filter(|w| matches!(w, StepWarning::TimeStepAboveStable { .. }))
                .count()
        };
        assert_eq!(advisories(&results[0]), 1);
        assert!(results[1..].iter().all(|r| advisories(r) == 0));

        // The same run also clamps the injector cell
        assert!(results
            .iter()
            .any(|r| r.warnings.iter().any(|w| matches!(w, StepWarning::SaturationClamped { .. }))));
    }

    #[test]
    fn test_total_time_shorter_than_dt() {
        let wells = WellSet::new(3, 3);
        let mut sim = Simulation::initialize(
            grid_3x3(),
            single_fluid(),
            &wells,
            BoundaryCondition::NoFlow,
            10.0,
            4.0,
        )
        .unwrap();

        assert_eq!(sim.n_steps(), 1);
        let result = sim.step().unwrap();
        assert_eq!(result.dt, 4.0);
        assert_eq!(result.time, 4.0);
        assert_eq!(sim.state(), RunState::Completed);
    }
}
