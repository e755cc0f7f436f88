//! Two-phase relative permeability curves.
//!
//! Water and oil relative permeability as a function of water saturation,
//! parameterized by the irreducible water saturation `swc` and residual oil
//! saturation `sor`. Both curves use the normalized mobile saturation
//!
//! `S* = (Sw - swc) / (1 - swc - sor)`
//!
//! with `kr_w = (S*)^n_w` and `kr_o = (1 - S*)^n_o` (Brooks-Corey form,
//! gas-free); `Linear` is the `n = 1` special case. Outside the mobile range
//! the immobile phase has zero relative permeability.

use super::FluidError;

/// Shape of the relative permeability curves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RelPermCurve {
    /// Straight-line curves, `kr = S*`.
    Linear,
    /// Brooks-Corey power-law curves with per-phase exponents.
    Corey { n_water: f64, n_oil: f64 },
}

impl Default for RelPermCurve {
    /// Corey curves with both exponents 2.
    fn default() -> Self {
        RelPermCurve::Corey {
            n_water: 2.0,
            n_oil: 2.0,
        }
    }
}

/// Relative permeability model with saturation endpoints.
///
/// # Example
///
/// ```
/// use nursim::fluid::{RelPerm, RelPermCurve};
///
/// let relperm = RelPerm::new(0.2, 0.2, RelPermCurve::Linear).unwrap();
///
/// // Water immobile at irreducible saturation, fully mobile at 1 - sor
/// assert_eq!(relperm.water(0.2), 0.0);
/// assert_eq!(relperm.water(0.8), 1.0);
/// assert_eq!(relperm.oil(0.2), 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelPerm {
    /// Irreducible (connate) water saturation.
    swc: f64,
    /// Residual oil saturation.
    sor: f64,
    curve: RelPermCurve,
}

impl RelPerm {
    /// Create a relative permeability model.
    ///
    /// Requires `swc, sor ∈ [0, 1)` with `swc + sor < 1` (a non-empty mobile
    /// range), and positive finite Corey exponents.
    pub fn new(swc: f64, sor: f64, curve: RelPermCurve) -> Result<Self, FluidError> {
        if !(swc.is_finite() && (0.0..1.0).contains(&swc)) {
            return Err(FluidError::InvalidSaturationEndpoint {
                name: "swc",
                value: swc,
            });
        }
        if !(sor.is_finite() && (0.0..1.0).contains(&sor)) {
            return Err(FluidError::InvalidSaturationEndpoint {
                name: "sor",
                value: sor,
            });
        }
        if swc + sor >= 1.0 {
            return Err(FluidError::EmptyMobileRange { swc, sor });
        }
        if let RelPermCurve::Corey { n_water, n_oil } = curve {
            for (name, n) in [("n_water", n_water), ("n_oil", n_oil)] {
                if !(n.is_finite() && n > 0.0) {
                    return Err(FluidError::InvalidCoreyExponent { name, value: n });
                }
            }
        }
        Ok(Self { swc, sor, curve })
    }

    /// Irreducible water saturation (lower bound for `Sw`).
    #[inline]
    pub fn swc(&self) -> f64 {
        self.swc
    }

    /// Residual oil saturation; `1 - sor` is the upper bound for `Sw`.
    #[inline]
    pub fn sor(&self) -> f64 {
        self.sor
    }

    /// Curve shape.
    #[inline]
    pub fn curve(&self) -> RelPermCurve {
        self.curve
    }

    /// Maximum water saturation, `1 - sor`.
    #[inline]
    pub fn sw_max(&self) -> f64 {
        1.0 - self.sor
    }

    /// Normalized mobile saturation `S*`, clamped to `[0, 1]`.
    #[inline]
    pub fn normalized(&self, sw: f64) -> f64 {
        ((sw - self.swc) / (1.0 - self.swc - self.sor)).clamp(0.0, 1.0)
    }

    /// Water relative permeability at water saturation `sw`.
    pub fn water(&self, sw: f64) -> f64 {
        let s = self.normalized(sw);
        match self.curve {
            RelPermCurve::Linear => s,
            RelPermCurve::Corey { n_water, .. } => s.powf(n_water),
        }
    }

    /// Oil relative permeability at water saturation `sw`.
    pub fn oil(&self, sw: f64) -> f64 {
        let s = self.normalized(sw);
        match self.curve {
            RelPermCurve::Linear => 1.0 - s,
            RelPermCurve::Corey { n_oil, .. } => (1.0 - s).powf(n_oil),
        }
    }
}

impl Default for RelPerm {
    /// `swc = 0.2`, `sor = 0.2`, default Corey curves.
    fn default() -> Self {
        Self {
            swc: 0.2,
            sor: 0.2,
            curve: RelPermCurve::default(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
