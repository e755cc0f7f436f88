//! Explicit water saturation update.
//!
//! After each pressure solve the water saturation advances one step:
//!
//! `Sw[m] += 5.614583 * dt / PV[m] * (sum_faces T_w * (P_n - P_m) + q_w[m])`
//!
//! with `T_w` the face conductance times the upstream water mobility (the
//! same values the pressure system was assembled with), `PV` the cell pore
//! volume in ft^3, and `q_w` the water part of the completion rate in
//! bbl/day. Injectors add their full rate over `B_w`; producers remove
//! `f_w(Sw) * rate / B_o`, evaluated at the completion cell.
//!
//! Updated values are pulled back into the mobile range `[swc, 1 - sor]`;
//! every clamped cell is reported so the caller can surface a warning. The
//! scheme is explicit, so [`stable_dt_estimate`] offers an advisory step
//! bound: the smallest time any cell needs to turn over its mobile pore
//! volume at current flow rates.

use crate::assembly::{FaceMobility, Transmissibility, CUBIC_FEET_PER_BARREL};
use crate::boundary::BoundaryCondition;
use crate::fluid::TwoPhaseFluid;
use crate::grid::{Field2D, Grid2D};
use crate::types::CellIndex;
use crate::wells::{Well, WellKind};

/// A cell whose updated saturation fell outside the mobile range and was
/// pulled back to the nearest endpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClampedCell {
    pub cell: CellIndex,
    /// Raw value produced by the explicit update.
    pub unclamped: f64,
    /// Value actually stored, `swc` or `1 - sor`.
    pub clamped: f64,
}

/// Advance the water saturation field by one explicit step of length `dt`.
///
/// `pressure` is the newly solved field; `mobility` holds the upstream face
/// mobilities the pressure system was assembled with, so the water moved
/// here is consistent with the total flow the solve resolved. Returns the
/// cells that had to be clamped (empty when the step stayed in bounds).
#[allow(clippy::too_many_arguments)]
pub fn advance(
    grid: &Grid2D,
    fluid: &TwoPhaseFluid,
    wells: &[Well],
    boundary: BoundaryCondition,
    trans: &Transmissibility,
    mobility: &FaceMobility,
    pressure: &Field2D,
    sw: &mut Field2D,
    dt: f64,
) -> Vec<ClampedCell> {
    let nx = grid.nx();
    let ny = grid.ny();

    // Net water inflow per cell, bbl/day
    let mut inflow = vec![0.0; nx * ny];

    for j in 0..ny {
        for i in 0..nx - 1 {
            let ma = j * nx + i;
            let mb = ma + 1;
            let tw = trans.x_face(i, j) * mobility.water_x(i, j);
            let flux = tw * (pressure.data[mb] - pressure.data[ma]);
            inflow[ma] += flux;
            inflow[mb] -= flux;
        }
    }
    for j in 0..ny - 1 {
        for i in 0..nx {
            let ma = j * nx + i;
            let mb = ma + nx;
            let tw = trans.y_face(i, j) * mobility.water_y(i, j);
            let flux = tw * (pressure.data[mb] - pressure.data[ma]);
            inflow[ma] += flux;
            inflow[mb] -= flux;
        }
    }

    // Boundary faces carry water at the cell's own mobility; there is no
    // upstream state outside the grid to take it from.
    if let BoundaryCondition::ConstantPressure(pb) = boundary {
        for j in 0..ny {
            for i in [0, nx - 1] {
                let cell = CellIndex::new(i, j);
                let g = Transmissibility::boundary_x(grid, cell);
                let lw = fluid.water_mobility(sw[cell]);
                inflow[grid.linear(cell)] += g * lw * (pb - pressure[cell]);
            }
        }
        for i in 0..nx {
            for j in [0, ny - 1] {
                let cell = CellIndex::new(i, j);
                let g = Transmissibility::boundary_y(grid, cell);
                let lw = fluid.water_mobility(sw[cell]);
                inflow[grid.linear(cell)] += g * lw * (pb - pressure[cell]);
            }
        }
    }

    for well in wells {
        let m = grid.linear(well.cell());
        match well.kind() {
            WellKind::Injector => inflow[m] += well.rate() / fluid.water_fvf(),
            WellKind::Producer => {
                let fw = fluid.fractional_flow_water(sw[well.cell()]);
                inflow[m] -= fw * well.rate() / fluid.oil_fvf();
            }
        }
    }

    let swc = fluid.relperm().swc();
    let sw_max = fluid.relperm().sw_max();
    let mut clamps = Vec::new();

    for cell in grid.cells() {
        let m = grid.linear(cell);
        let unclamped =
            sw.data[m] + CUBIC_FEET_PER_BARREL * dt * inflow[m] / grid.pore_volume(cell);
        if unclamped < swc || unclamped > sw_max {
            let clamped = unclamped.clamp(swc, sw_max);
            clamps.push(ClampedCell {
                cell,
                unclamped,
                clamped,
            });
            sw.data[m] = clamped;
        } else {
            sw.data[m] = unclamped;
        }
    }

    clamps
}

/// Advisory stability bound for the explicit update.
///
/// For each cell the total volumetric throughput (both phases, faces plus
/// completions, bbl/day) is compared against the mobile pore volume
/// `PV * (1 - sor - swc)`; the smallest turnover time over the grid is the
/// largest step the explicit scheme can be expected to tolerate. Returns
/// infinity when nothing flows.
#[allow(clippy::too_many_arguments)]
pub fn stable_dt_estimate(
    grid: &Grid2D,
    fluid: &TwoPhaseFluid,
    wells: &[Well],
    boundary: BoundaryCondition,
    trans: &Transmissibility,
    mobility: &FaceMobility,
    pressure: &Field2D,
    sw: &Field2D,
) -> f64 {
    let nx = grid.nx();
    let ny = grid.ny();

    // Total (water + oil) flux magnitude through each cell, bbl/day
    let mut throughput = vec![0.0; nx * ny];

    for j in 0..ny {
        for i in 0..nx - 1 {
            let ma = j * nx + i;
            let mb = ma + 1;
            let q = trans.x_face(i, j)
                * mobility.total_x(i, j)
                * (pressure.data[mb] - pressure.data[ma]);
            throughput[ma] += q.abs();
            throughput[mb] += q.abs();
        }
    }
    for j in 0..ny - 1 {
        for i in 0..nx {
            let ma = j * nx + i;
            let mb = ma + nx;
            let q = trans.y_face(i, j)
                * mobility.total_y(i, j)
                * (pressure.data[mb] - pressure.data[ma]);
            throughput[ma] += q.abs();
            throughput[mb] += q.abs();
        }
    }

    if let BoundaryCondition::ConstantPressure(pb) = boundary {
        for j in 0..ny {
            for i in [0, nx - 1] {
                let cell = CellIndex::new(i, j);
                let g = Transmissibility::boundary_x(grid, cell);
                let q = g * fluid.total_mobility(sw[cell]) * (pb - pressure[cell]);
                throughput[grid.linear(cell)] += q.abs();
            }
        }
        for i in 0..nx {
            for j in [0, ny - 1] {
                let cell = CellIndex::new(i, j);
                let g = Transmissibility::boundary_y(grid, cell);
                let q = g * fluid.total_mobility(sw[cell]) * (pb - pressure[cell]);
                throughput[grid.linear(cell)] += q.abs();
            }
        }
    }

    for well in wells {
        let q = match well.kind() {
            WellKind::Injector => well.rate() / fluid.water_fvf(),
            WellKind::Producer => well.rate() / fluid.oil_fvf(),
        };
        throughput[grid.linear(well.cell())] += q;
    }

    let mobile_fraction = fluid.relperm().sw_max() - fluid.relperm().swc();
    let mut dt_max = f64::INFINITY;
    for cell in grid.cells() {
        let q = throughput[grid.linear(cell)];
        if q > 0.0 {
            let mobile_pv = grid.pore_volume(cell) * mobile_fraction / CUBIC_FEET_PER_BARREL;
            dt_max = dt_max.min(mobile_pv / q);
        }
    }
    dt_max
}

// =============================================================================
// Tests
// =============================================================================
