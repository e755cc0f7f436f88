//! Reservoir grid and per-cell field storage.
//!
//! - [`Grid2D`]: validated structured grid with rock properties
//! - [`Field2D`]: dense per-cell scalar storage (pressure, saturation)

mod field;
mod grid2d;

pub use field::Field2D;
pub use grid2d::{Grid2D, GridError};
