//! Run-level volume accounting.
//!
//! A slightly compressible reservoir releases stored fluid in proportion to
//! the pressure drop; with no flow across the outer boundary that release
//! must equal what the wells removed. [`MaterialBalance`] computes both
//! sides in stock-tank barrels and their mismatch, which is a direct check
//! on the discretization and the pressure solve.

use crate::assembly::CUBIC_FEET_PER_BARREL;
use crate::fluid::FluidModel;
use crate::grid::{Field2D, Grid2D};
use crate::wells::{Well, WellKind};

/// Material balance snapshot at one point in a run.
#[derive(Clone, Debug)]
pub struct MaterialBalance {
    /// Mean cell pressure (psi).
    pub average_pressure: f64,
    /// Lowest cell pressure (psi).
    pub min_pressure: f64,
    /// Highest cell pressure (psi).
    pub max_pressure: f64,
    /// Fluid released from storage by the pressure change since the initial
    /// state, `sum phi * ct * V * (p_init - p) / (5.614583 * B)` (STB).
    pub storage_release: f64,
    /// Cumulative surface volume the wells withdrew, producers minus
    /// injectors (STB).
    pub net_withdrawal: f64,
    /// Mismatch of the two, relative to the larger magnitude.
    pub relative_error: f64,
}

impl MaterialBalance {
    /// Compute the balance for a pressure field reached after `elapsed`
    /// days of constant well rates.
    pub fn compute(
        grid: &Grid2D,
        fluid: &FluidModel,
        wells: &[Well],
        pressure: &Field2D,
        elapsed: f64,
    ) -> Self {
        let p_init = fluid.initial_pressure();
        let ct = fluid.total_compressibility();
        let fvf = match fluid {
            FluidModel::SinglePhase(f) => f.fvf(),
            FluidModel::TwoPhase(f) => f.oil_fvf(),
        };

        let mut storage_release = 0.0;
        for cell in grid.cells() {
            storage_release += grid.porosity(cell) * ct * grid.cell_volume()
                * (p_init - pressure[cell])
                / (CUBIC_FEET_PER_BARREL * fvf);
        }

        // Net surface withdrawal rate, positive for depletion
        let mut rate = 0.0;
        for well in wells {
            match (fluid, well.kind()) {
                (FluidModel::SinglePhase(f), WellKind::Producer) => {
                    rate += well.rate() / f.fvf();
                }
                (FluidModel::SinglePhase(f), WellKind::Injector) => {
                    rate -= well.rate() / f.fvf();
                }
                (FluidModel::TwoPhase(f), WellKind::Producer) => {
                    rate += well.rate() / f.oil_fvf();
                }
                (FluidModel::TwoPhase(f), WellKind::Injector) => {
                    rate -= well.rate() / f.water_fvf();
                }
            }
        }
        let net_withdrawal = rate * elapsed;

        let scale = storage_release.abs().max(net_withdrawal.abs());
        let relative_error = if scale > 0.0 {
            (storage_release - net_withdrawal).abs() / scale
        } else {
            0.0
        };

        Self {
            average_pressure: pressure.mean(),
            min_pressure: pressure.min(),
            max_pressure: pressure.max(),
            storage_release,
            net_withdrawal,
            relative_error,
        }
    }

    /// One-line report for run logs.
    pub fn summary_line(&self) -> String {
        format!(
            "p_avg = {:.1} psi [{:.1}, {:.1}], storage release = {:.1} STB, \
             net withdrawal = {:.1} STB, balance error = {:.2e}",
            self.average_pressure,
            self.min_pressure,
            self.max_pressure,
            self.storage_release,
            self.net_withdrawal,
            self.relative_error
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryCondition;
    use crate::fluid::SinglePhaseFluid;
    use crate::sim::Simulation;
    use crate::types::CellIndex;
    use crate::wells::{WellKind, WellSet};

    #[test]
    fn test_equilibrium_has_zero_error() {
        let grid = Grid2D::uniform(3, 3, 100.0, 100.0, 20.0, 100.0, 0.2).unwrap();
        let fluid: FluidModel = SinglePhaseFluid::new(1.0, 1.2, 1e-5, 3000.0)
            .unwrap()
            .into();
        let p = Field2D::constant(3, 3, 3000.0);

        let balance = MaterialBalance::compute(&grid, &fluid, &[], &p, 100.0);
        assert_eq!(balance.storage_release, 0.0);
        assert_eq!(balance.net_withdrawal, 0.0);
        assert_eq!(balance.relative_error, 0.0);
        assert_eq!(balance.average_pressure, 3000.0);
    }

    #[test]
    fn test_depletion_balance_closes() {
        // Single producer, sealed boundary: storage release must match the
        // produced volume q * t / B to solver precision
        let grid = Grid2D::uniform(3, 3, 100.0, 100.0, 20.0, 100.0, 0.2).unwrap();
        let fluid = SinglePhaseFluid::new(1.0, 1.2, 1e-5, 3000.0).unwrap();
        let mut wells = WellSet::for_grid(&grid);
        wells
            .add_well(WellKind::Producer, CellIndex::new(1, 1), 500.0)
            .unwrap();

        let mut sim = Simulation::initialize(
            grid,
            fluid,
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
            "withdrawal {}",
            balance.net_withdrawal
        );
        assert!(
            balance.relative_error < 1e-8,
            "balance error {} ({})",
            balance.relative_error,
            balance.summary_line()
        );
    }
}
