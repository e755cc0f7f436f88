//! Single-phase depletion of a sealed reservoir.
//!
//! A 10 x 10 homogeneous grid with one producer at the center:
//! - No-flow outer boundary, so every barrel comes out of storage
//! - Pressure report every 30 days
//! - Closing material balance at the end of the run

use nursim::{
    BoundaryCondition, CellIndex, Grid2D, Simulation, SinglePhaseFluid, WellKind, WellSet,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let grid = Grid2D::uniform(10, 10, 150.0, 150.0, 30.0, 150.0, 0.22)?;
    let fluid = SinglePhaseFluid::new(1.1, 1.25, 8e-6, 3200.0)?;

    let mut wells = WellSet::for_grid(&grid);
    let producer = wells.add_well(WellKind::Producer, CellIndex::new(5, 5), 750.0)?;

    println!("Sealed-Reservoir Depletion");
    println!("==========================");
    println!("Grid: 10 x 10 cells, 150 x 150 x 30 ft each");
    println!("Fluid: 1.1 cp, B = 1.25 RB/STB, ct = 8e-6 1/psi");
    println!("Well:  {} at (5, 5), 750 STB/day", producer);
    println!();

    let mut sim = Simulation::initialize(
        grid,
        fluid,
        &wells,
        BoundaryCondition::NoFlow,
        5.0,
        180.0,
    )?;
    println!("Running {} steps of {} days", sim.n_steps(), sim.dt());
    println!();

    for step in sim.run_to_completion() {
        let result = step?;
        if result.step % 6 == 0 {
            println!(
                "t = {:>5.0} days: p_avg = {:7.1} psi, p_min = {:7.1} psi  ({} solver iterations)",
                result.time,
                result.pressure.mean(),
                result.pressure.min(),
                result.solver_iterations
            );
        }
    }

    println!();
    println!("{}", sim.material_balance().summary_line());
    Ok(())
}
