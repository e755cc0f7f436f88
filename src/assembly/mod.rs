//! Pressure-system assembly: face conductances, upstream mobilities, and the
//! banded `A * P = b` system built each time step.

mod system;
mod transmissibility;

pub use system::PressureSystem;
pub use transmissibility::{FaceMobility, Transmissibility};

pub(crate) use transmissibility::CUBIC_FEET_PER_BARREL;
