//! Integration tests for single-phase depletion runs.
//!
//! These tests verify:
//! - Equilibrium (no wells, sealed boundary)
//! - Material balance against produced volume
//! - Step scheduling with a clamped final step
//! - Injector/producer pressure gradients
//! - Well registry behavior within a run
//! - Convergence failure handling

use nursim::{
    BoundaryCondition, CellIndex, Grid2D, RunState, Simulation, SinglePhaseFluid,
    SolveMethod, SolverConfig, StepError, WellError, WellKind, WellSet,
};

fn base_grid() -> Grid2D {
    Grid2D::uniform(3, 3, 100.0, 100.0, 20.0, 100.0, 0.2).unwrap()
}

fn base_fluid() -> SinglePhaseFluid {
    SinglePhaseFluid::new(1.0, 1.2, 1e-5, 3000.0).unwrap()
}

/// With no wells and a sealed boundary nothing moves: every step must
/// reproduce the initial pressure.
#[test]
fn test_equilibrium_holds_at_initial_pressure() {
    let wells = WellSet::new(3, 3);
    let mut sim = Simulation::initialize(
        base_grid(),
        base_fluid(),
        &wells,
        BoundaryCondition::NoFlow,
        10.0,
        100.0,
    )
    .unwrap();

    for step in sim.run_to_completion() {
        let result = step.unwrap();
        for (cell, p) in result.pressure.iter() {
            assert!(
                (p - 3000.0).abs() < 1e-6,
                "pressure {} at {} after {} days",
                p,
                cell,
                result.time
            );
        }
    }
    assert_eq!(sim.state(), RunState::Completed);
}

/// A sealed reservoir with a single producer must release exactly the
/// produced volume from storage: `sum phi*ct*V*(p_init - p)/(5.615*B)`
/// equals `q * t / B`.
#[test]
fn test_material_balance_matches_produced_volume() {
    let grid = base_grid();
    let mut wells = WellSet::for_grid(&grid);
    wells
        .add_well(WellKind::Producer, CellIndex::new(2, 2), 500.0)
        .unwrap();

    let mut sim = Simulation::initialize(
        grid,
        base_fluid(),
        &wells,
        BoundaryCondition::NoFlow,
        10.0,
        100.0,
    )
    .unwrap();
    for step in sim.run_to_completion() {
        step.unwrap();
    }

    let balance = sim.material_balance();
    let produced = 500.0 * 100.0 / 1.2;
    assert!(
        (balance.net_withdrawal - produced).abs() < 1e-9,
        "net withdrawal {} != {}",
        balance.net_withdrawal,
        produced
    );
    assert!(
        balance.relative_error < 1e-8,
        "material balance does not close: {}",
        balance.summary_line()
    );
    // Depletion only: pressure fell everywhere
    assert!(balance.max_pressure < 3000.0);
}

/// 95 days at dt = 10 takes exactly 10 steps, the last one clamped to
/// 5 days so the run ends exactly at 95.
#[test]
fn test_step_schedule_with_clamped_final_step() {
    let wells = WellSet::new(3, 3);
    let mut sim = Simulation::initialize(
        base_grid(),
        base_fluid(),
        &wells,
        BoundaryCondition::NoFlow,
        10.0,
        95.0,
    )
    .unwrap();
    assert_eq!(sim.n_steps(), 10);

    let results: Vec<_> = sim.run_to_completion().map(Result::unwrap).collect();
    assert_eq!(results.len(), 10);

    let times: Vec<f64> = results.iter().map(|r| r.time).collect();
    assert_eq!(
        times,
        vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 95.0]
    );
    assert_eq!(results[9].dt, 5.0);
    assert_eq!(sim.time(), 95.0);
    assert_eq!(sim.state(), RunState::Completed);
}

/// Balanced injector/producer pair on a homogeneous 3 x 3 grid: pressure
/// falls monotonically along the diagonal from the injector to the
/// producer, and the average holds at the initial pressure.
#[test]
fn test_injector_producer_diagonal_gradient() {
    let grid = base_grid();
    let mut wells = WellSet::for_grid(&grid);
    wells
        .add_well(WellKind::Injector, CellIndex::new(0, 0), 500.0)
        .unwrap();
    wells
        .add_well(WellKind::Producer, CellIndex::new(2, 2), 500.0)
        .unwrap();

    let mut sim = Simulation::initialize(
        grid,
        base_fluid(),
        &wells,
        BoundaryCondition::NoFlow,
        10.0,
        100.0,
    )
    .unwrap();
    for step in sim.run_to_completion() {
        step.unwrap();
    }

    let p = sim.pressure();
    let diagonal = [
        p[CellIndex::new(0, 0)],
        p[CellIndex::new(1, 1)],
        p[CellIndex::new(2, 2)],
    ];
    assert!(
        diagonal[0] > diagonal[1] && diagonal[1] > diagonal[2],
        "diagonal not monotone: {:?}",
        diagonal
    );
    // Equal rates and a sealed boundary: no net storage change
    assert!(
        (p.mean() - 3000.0).abs() < 1e-6,
        "average pressure drifted to {}",
        p.mean()
    );
    // Symmetry of the five-spot quarter: the two off-diagonal corners match
    let p_ne = p[CellIndex::new(2, 0)];
    let p_sw = p[CellIndex::new(0, 2)];
    assert!(
        (p_ne - p_sw).abs() < 1e-6,
        "symmetry broken: {} vs {}",
        p_ne,
        p_sw
    );
}

/// An open boundary holds the far-field pressure, so production reaches a
/// steady drawdown instead of depleting forever.
#[test]
fn test_constant_pressure_boundary_sustains_production() {
    let grid = Grid2D::uniform(5, 5, 100.0, 100.0, 20.0, 100.0, 0.2).unwrap();
    let mut wells = WellSet::for_grid(&grid);
    wells
        .add_well(WellKind::Producer, CellIndex::new(2, 2), 300.0)
        .unwrap();

    let mut sim = Simulation::initialize(
        grid,
        base_fluid(),
        &wells,
        BoundaryCondition::ConstantPressure(3000.0),
        5.0,
        500.0,
    )
    .unwrap();

    let results: Vec<_> = sim.run_to_completion().map(Result::unwrap).collect();

    // Drawdown everywhere, deepest at the completion
    let last = results.last().unwrap();
    assert!(last.pressure.max() < 3000.0);
    assert_eq!(last.pressure.min(), last.pressure[CellIndex::new(2, 2)]);

    // Steady state: the field stops changing between late steps
    let prev = &results[results.len() - 2].pressure;
    let mut max_change: f64 = 0.0;
    for (cell, p) in last.pressure.iter() {
        max_change = max_change.max((p - prev[cell]).abs());
    }
    assert!(max_change < 1e-6, "still transient: {} psi/step", max_change);
}

/// Well ids reuse the smallest free suffix, duplicate completions are
/// rejected, and the surviving set drives a run.
#[test]
fn test_well_registry_lifecycle() {
    let grid = base_grid();
    let mut wells = WellSet::for_grid(&grid);

    let p1 = wells
        .add_well(WellKind::Producer, CellIndex::new(2, 2), 300.0)
        .unwrap();
    let p2 = wells
        .add_well(WellKind::Producer, CellIndex::new(0, 2), 200.0)
        .unwrap();
    let i1 = wells
        .add_well(WellKind::Injector, CellIndex::new(0, 0), 500.0)
        .unwrap();
    assert_eq!(format!("{}", p1), "P_1");
    assert_eq!(format!("{}", p2), "P_2");
    assert_eq!(format!("{}", i1), "I_1");

    // Second completion in an occupied cell is rejected and changes nothing
    let err = wells
        .add_well(WellKind::Injector, CellIndex::new(2, 2), 100.0)
        .unwrap_err();
    assert_eq!(
        err,
        WellError::DuplicateCell {
            cell: CellIndex::new(2, 2),
            existing: p1
        }
    );
    assert_eq!(wells.len(), 3);

    // Removing P_1 frees its suffix for the next producer
    wells.remove_well(p1).unwrap();
    let reused = wells
        .add_well(WellKind::Producer, CellIndex::new(2, 0), 300.0)
        .unwrap();
    assert_eq!(format!("{}", reused), "P_1");

    let mut sim = Simulation::initialize(
        grid,
        base_fluid(),
        &wells,
        BoundaryCondition::NoFlow,
        10.0,
        30.0,
    )
    .unwrap();
    assert_eq!(sim.wells().len(), 3);
    for step in sim.run_to_completion() {
        step.unwrap();
    }
    assert_eq!(sim.state(), RunState::Completed);
}

/// Starving the iterative solver fails the step; the error carries the
/// step number and achieved residual, and the run refuses to continue.
#[test]
fn test_convergence_failure_carries_step_and_residual() {
    let grid = base_grid();
    let mut wells = WellSet::for_grid(&grid);
    wells
        .add_well(WellKind::Producer, CellIndex::new(2, 2), 400.0)
        .unwrap();

    let mut sim = Simulation::initialize_with_config(
        grid,
        base_fluid(),
        &wells,
        BoundaryCondition::NoFlow,
        10.0,
        50.0,
        SolverConfig::new()
            .with_method(SolveMethod::ConjugateGradient)
            .with_max_iterations(2)
            .with_tolerance(1e-30),
    )
    .unwrap();

    match sim.step().unwrap_err() {
        StepError::Convergence {
            step,
            iterations,
            residual,
        } => {
            assert_eq!(step, 1);
            assert_eq!(iterations, 2);
            assert!(residual.is_finite() && residual > 0.0);
        }
        other => panic!("expected a convergence failure, got {:?}", other),
    }
    assert_eq!(sim.state(), RunState::Failed);

    // Reported once; afterwards stepping is refused
    assert!(matches!(
        sim.step().unwrap_err(),
        StepError::Finished {
            state: RunState::Failed
        }
    ));
}
