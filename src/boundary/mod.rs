//! Outer boundary conditions.
//!
//! The condition applies uniformly to every outer edge of the grid. A
//! constant-pressure boundary acts through a half-cell connection from each
//! edge cell's center to the boundary face.

use std::fmt;

/// Boundary condition on the model's outer edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundaryCondition {
    /// Sealed boundary, no flux across outer faces.
    NoFlow,

    /// Fixed pressure (psi) on all outer faces.
    ConstantPressure(f64),
}

impl BoundaryCondition {
    /// Check if this is the sealed boundary.
    pub fn is_no_flow(&self) -> bool {
        matches!(self, BoundaryCondition::NoFlow)
    }

    /// The prescribed boundary pressure, if any.
    pub fn pressure(&self) -> Option<f64> {
        match self {
            BoundaryCondition::NoFlow => None,
            BoundaryCondition::ConstantPressure(p) => Some(*p),
        }
    }
}

impl Default for BoundaryCondition {
    fn default() -> Self {
        BoundaryCondition::NoFlow
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryCondition::NoFlow => write!(f, "no-flow"),
            BoundaryCondition::ConstantPressure(p) => {
                write!(f, "constant pressure ({} psi)", p)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_no_flow() {
        assert_eq!(BoundaryCondition::default(), BoundaryCondition::NoFlow);
        assert!(BoundaryCondition::default().is_no_flow());
    }

    #[test]
    fn test_pressure_accessor() {
        assert_eq!(BoundaryCondition::NoFlow.pressure(), None);
        assert_eq!(
            BoundaryCondition::ConstantPressure(3000.0).pressure(),
            Some(3000.0)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", BoundaryCondition::NoFlow), "no-flow");
        assert_eq!(
            format!("{}", BoundaryCondition::ConstantPressure(2500.0)),
            "constant pressure (2500 psi)"
        );
    }
}
