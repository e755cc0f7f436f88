//! Fluid (PVT) parameter sets.
//!
//! Two model variants, both immutable after validated construction:
//! - [`SinglePhaseFluid`]: slightly compressible single-phase oil
//! - [`TwoPhaseFluid`]: water-oil with relative permeability curves
//!
//! All quantities are in field units: viscosity in cp, formation volume
//! factor in RB/STB, compressibility in 1/psi, pressure in psi.

mod relperm;

pub use relperm::{RelPerm, RelPermCurve};

use thiserror::Error;

/// Errors from fluid model construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FluidError {
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must lie in [0, 1), got {value}")]
    InvalidSaturationEndpoint { name: &'static str, value: f64 },

    #[error("saturation endpoints leave no mobile range: swc = {swc}, sor = {sor}")]
    EmptyMobileRange { swc: f64, sor: f64 },

    #[error("Corey exponent {name} must be positive and finite, got {value}")]
    InvalidCoreyExponent { name: &'static str, value: f64 },

    #[error("initial water saturation {value} outside [{min}, {max}]")]
    InitialSaturationOutOfRange { value: f64, min: f64, max: f64 },
}

fn check_positive(name: &'static str, value: f64) -> Result<f64, FluidError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(FluidError::NonPositive { name, value })
    }
}

/// Slightly compressible single-phase fluid.
///
/// # Example
///
/// ```
/// use nursim::fluid::SinglePhaseFluid;
///
/// // 1 cp, B = 1.2 RB/STB, ct = 1e-5 /psi, initial pressure 3000 psi
/// let fluid = SinglePhaseFluid::new(1.0, 1.2, 1e-5, 3000.0).unwrap();
/// assert_eq!(fluid.initial_pressure(), 3000.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SinglePhaseFluid {
    /// Viscosity (cp).
    viscosity: f64,
    /// Formation volume factor (RB/STB).
    fvf: f64,
    /// Total compressibility (1/psi).
    total_compressibility: f64,
    /// Initial reservoir pressure (psi).
    initial_pressure: f64,
}

impl SinglePhaseFluid {
    /// Create a single-phase fluid model; all arguments must be positive.
    pub fn new(
        viscosity: f64,
        fvf: f64,
        total_compressibility: f64,
        initial_pressure: f64,
    ) -> Result<Self, FluidError> {
        Ok(Self {
            viscosity: check_positive("viscosity", viscosity)?,
            fvf: check_positive("fvf", fvf)?,
            total_compressibility: check_positive(
                "total_compressibility",
                total_compressibility,
            )?,
            initial_pressure: check_positive("initial_pressure", initial_pressure)?,
        })
    }

    /// Viscosity (cp).
    #[inline]
    pub fn viscosity(&self) -> f64 {
        self.viscosity
    }

    /// Formation volume factor (RB/STB).
    #[inline]
    pub fn fvf(&self) -> f64 {
        self.fvf
    }

    /// Total compressibility (1/psi).
    #[inline]
    pub fn total_compressibility(&self) -> f64 {
        self.total_compressibility
    }

    /// Initial reservoir pressure (psi).
    #[inline]
    pub fn initial_pressure(&self) -> f64 {
        self.initial_pressure
    }
}

/// Water-oil fluid pair with relative permeability.
///
/// The initial water saturation defaults to the irreducible saturation
/// `swc`; override it with
/// [`with_initial_water_saturation`](Self::with_initial_water_saturation).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TwoPhaseFluid {
    /// Oil viscosity (cp).
    oil_viscosity: f64,
    /// Water viscosity (cp).
    water_viscosity: f64,
    /// Oil formation volume factor (RB/STB).
    oil_fvf: f64,
    /// Water formation volume factor (RB/STB).
    water_fvf: f64,
    /// Total compressibility (1/psi).
    total_compressibility: f64,
    /// Initial reservoir pressure (psi).
    initial_pressure: f64,
    relperm: RelPerm,
    initial_water_saturation: f64,
}

impl TwoPhaseFluid {
    /// Create a two-phase fluid model; all scalars must be positive.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        oil_viscosity: f64,
        water_viscosity: f64,
        oil_fvf: f64,
        water_fvf: f64,
        total_compressibility: f64,
        initial_pressure: f64,
        relperm: RelPerm,
    ) -> Result<Self, FluidError> {
        Ok(Self {
            oil_viscosity: check_positive("oil_viscosity", oil_viscosity)?,
            water_viscosity: check_positive("water_viscosity", water_viscosity)?,
            oil_fvf: check_positive("oil_fvf", oil_fvf)?,
            water_fvf: check_positive("water_fvf", water_fvf)?,
            total_compressibility: check_positive(
                "total_compressibility",
                total_compressibility,
            )?,
            initial_pressure: check_positive("initial_pressure", initial_pressure)?,
            relperm,
            initial_water_saturation: relperm.swc(),
        })
    }

    /// Override the initial water saturation.
    ///
    /// Must lie within the mobile range `[swc, 1 - sor]`.
    pub fn with_initial_water_saturation(mut self, sw: f64) -> Result<Self, FluidError> {
        if !(sw.is_finite() && sw >= self.relperm.swc() && sw <= self.relperm.sw_max()) {
            return Err(FluidError::InitialSaturationOutOfRange {
                value: sw,
                min: self.relperm.swc(),
                max: self.relperm.sw_max(),
            });
        }
        self.initial_water_saturation = sw;
        Ok(self)
    }

    /// Oil viscosity (cp).
    #[inline]
    pub fn oil_viscosity(&self) -> f64 {
        self.oil_viscosity
    }

    /// Water viscosity (cp).
    #[inline]
    pub fn water_viscosity(&self) -> f64 {
        self.water_viscosity
    }

    /// Oil formation volume factor (RB/STB).
    #[inline]
    pub fn oil_fvf(&self) -> f64 {
        self.oil_fvf
    }

    /// Water formation volume factor (RB/STB).
    #[inline]
    pub fn water_fvf(&self) -> f64 {
        self.water_fvf
    }

    /// Total compressibility (1/psi).
    #[inline]
    pub fn total_compressibility(&self) -> f64 {
        self.total_compressibility
    }

    /// Initial reservoir pressure (psi).
    #[inline]
    pub fn initial_pressure(&self) -> f64 {
        self.initial_pressure
    }

    /// Relative permeability model.
    #[inline]
    pub fn relperm(&self) -> &RelPerm {
        &self.relperm
    }

    /// Initial water saturation.
    #[inline]
    pub fn initial_water_saturation(&self) -> f64 {
        self.initial_water_saturation
    }

    /// Water mobility `kr_w(Sw) / mu_w` (1/cp).
    #[inline]
    pub fn water_mobility(&self, sw: f64) -> f64 {
        self.relperm.water(sw) / self.water_viscosity
    }

    /// Oil mobility `kr_o(Sw) / mu_o` (1/cp).
    #[inline]
    pub fn oil_mobility(&self, sw: f64) -> f64 {
        self.relperm.oil(sw) / self.oil_viscosity
    }

    /// Total mobility `λ_w + λ_o` (1/cp).
    #[inline]
    pub fn total_mobility(&self, sw: f64) -> f64 {
        self.water_mobility(sw) + self.oil_mobility(sw)
    }

    /// Water fractional flow `λ_w / (λ_w + λ_o)` at water saturation `sw`.
    ///
    /// Zero when water is immobile (both phases immobile cannot occur inside
    /// the mobile range).
    pub fn fractional_flow_water(&self, sw: f64) -> f64 {
        let lw = self.water_mobility(sw);
        let lo = self.oil_mobility(sw);
        if lw == 0.0 {
            return 0.0;
        }
        lw / (lw + lo)
    }
}

/// Fluid model variants accepted by the simulator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FluidModel {
    SinglePhase(SinglePhaseFluid),
    TwoPhase(TwoPhaseFluid),
}

impl FluidModel {
    /// Initial reservoir pressure (psi).
    #[inline]
    pub fn initial_pressure(&self) -> f64 {
        match self {
            FluidModel::SinglePhase(f) => f.initial_pressure(),
            FluidModel::TwoPhase(f) => f.initial_pressure(),
        }
    }

    /// Total compressibility (1/psi).
    #[inline]
    pub fn total_compressibility(&self) -> f64 {
        match self {
            FluidModel::SinglePhase(f) => f.total_compressibility(),
            FluidModel::TwoPhase(f) => f.total_compressibility(),
        }
    }

    /// True for the water-oil variant.
    #[inline]
    pub fn is_two_phase(&self) -> bool {
        matches!(self, FluidModel::TwoPhase(_))
    }
}

impl From<SinglePhaseFluid> for FluidModel {
    fn from(fluid: SinglePhaseFluid) -> Self {
        FluidModel::SinglePhase(fluid)
    }
}

impl From<TwoPhaseFluid> for FluidModel {
    fn from(fluid: TwoPhaseFluid) -> Self {
        FluidModel::TwoPhase(fluid)
    }
}

// =============================================================================
// Tests
// =============================================================================
