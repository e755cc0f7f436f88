//! Well registry.
//!
//! Wells are vertical sources/sinks completed in a single cell:
//! - [`WellKind`]: producer or injector
//! - [`WellId`]: kind plus numeric suffix, displayed `P_1`, `I_2`, ...
//! - [`WellSet`]: the registry, at most one well per cell
//!
//! ID assignment uses the smallest unused suffix >= 1 for the well's kind at
//! insertion time, so removing `P_1` and adding a producer reassigns `P_1`.
//! Producers and injectors number independently.

use crate::grid::Grid2D;
use crate::types::CellIndex;
use std::fmt;
use thiserror::Error;

/// Errors from well set mutation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WellError {
    #[error("cell {cell} is already occupied by well {existing}")]
    DuplicateCell { cell: CellIndex, existing: WellId },

    #[error("no well with id {0}")]
    NotFound(WellId),

    #[error("cell {cell} lies outside the {nx} x {ny} grid")]
    OutsideGrid {
        cell: CellIndex,
        nx: usize,
        ny: usize,
    },

    #[error("rate must be non-negative and finite, got {0}")]
    InvalidRate(f64),
}

/// Producer (fluid out) or injector (fluid in).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WellKind {
    Producer,
    Injector,
}

impl WellKind {
    /// Display prefix: `P` for producers, `I` for injectors.
    #[inline]
    pub const fn prefix(self) -> &'static str {
        match self {
            WellKind::Producer => "P",
            WellKind::Injector => "I",
        }
    }

    /// Lowercase human-readable name.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            WellKind::Producer => "producer",
            WellKind::Injector => "injector",
        }
    }
}

/// Stable well identifier, e.g. `P_1` or `I_3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WellId {
    kind: WellKind,
    number: u32,
}

impl WellId {
    /// Create an identifier directly (the registry normally assigns these).
    #[inline]
    pub const fn new(kind: WellKind, number: u32) -> Self {
        Self { kind, number }
    }

    /// The well's kind.
    #[inline]
    pub const fn kind(self) -> WellKind {
        self.kind
    }

    /// Numeric suffix (>= 1 for registry-assigned ids).
    #[inline]
    pub const fn number(self) -> u32 {
        self.number
    }
}

impl fmt::Display for WellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.prefix(), self.number)
    }
}

/// A well completed in a single grid cell.
///
/// The rate is stored as a non-negative magnitude (STB/day at surface
/// conditions); the kind determines the flow direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Well {
    id: WellId,
    cell: CellIndex,
    rate: f64,
}

impl Well {
    /// Identifier assigned at insertion.
    #[inline]
    pub fn id(&self) -> WellId {
        self.id
    }

    /// Kind shorthand, `self.id().kind()`.
    #[inline]
    pub fn kind(&self) -> WellKind {
        self.id.kind
    }

    /// Completion cell.
    #[inline]
    pub fn cell(&self) -> CellIndex {
        self.cell
    }

    /// Rate magnitude (STB/day).
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Rate with the kind's sign: positive for injectors, negative for
    /// producers (STB/day).
    #[inline]
    pub fn signed_rate(&self) -> f64 {
        match self.id.kind {
            WellKind::Injector => self.rate,
            WellKind::Producer => -self.rate,
        }
    }
}

/// Registry of wells over a grid, at most one per cell.
///
/// # Example
///
/// ```
/// use nursim::types::CellIndex;
/// use nursim::wells::{WellKind, WellSet};
///
/// let mut wells = WellSet::new(10, 10);
/// let p1 = wells.add_well(WellKind::Producer, CellIndex::new(9, 9), 500.0).unwrap();
/// let i1 = wells.add_well(WellKind::Injector, CellIndex::new(0, 0), 500.0).unwrap();
///
/// assert_eq!(format!("{}", p1), "P_1");
/// assert_eq!(format!("{}", i1), "I_1");
/// ```
#[derive(Clone, Debug, Default)]
pub struct WellSet {
    nx: usize,
    ny: usize,
    wells: Vec<Well>,
}

impl WellSet {
    /// Create an empty registry for an `nx` × `ny` grid.
    pub fn new(nx: usize, ny: usize) -> Self {
        Self {
            nx,
            ny,
            wells: Vec::new(),
        }
    }

    /// Create an empty registry matching a grid's dimensions.
    pub fn for_grid(grid: &Grid2D) -> Self {
        Self::new(grid.nx(), grid.ny())
    }

    /// Grid dimensions this registry was created for.
    #[inline]
    pub fn grid_dims(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Add a well, assigning the smallest unused id suffix for its kind.
    ///
    /// Fails with [`WellError::DuplicateCell`] if the cell is occupied,
    /// [`WellError::OutsideGrid`] if the cell is out of bounds, and
    /// [`WellError::InvalidRate`] for negative or non-finite rates. On any
    /// failure the registry is unchanged.
    pub fn add_well(
        &mut self,
        kind: WellKind,
        cell: CellIndex,
        rate: f64,
    ) -> Result<WellId, WellError> {
        if cell.i >= self.nx || cell.j >= self.ny {
            return Err(WellError::OutsideGrid {
                cell,
                nx: self.nx,
                ny: self.ny,
            });
        }
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(WellError::InvalidRate(rate));
        }
        if let Some(existing) = self.well_at(cell) {
            return Err(WellError::DuplicateCell {
                cell,
                existing: existing.id(),
            });
        }

        let id = WellId::new(kind, self.next_number(kind));
        self.wells.push(Well { id, cell, rate });
        Ok(id)
    }

    /// Remove a well by id, returning it.
    pub fn remove_well(&mut self, id: WellId) -> Result<Well, WellError> {
        match self.wells.iter().position(|w| w.id == id) {
            Some(pos) => Ok(self.wells.remove(pos)),
            None => Err(WellError::NotFound(id)),
        }
    }

    /// Look up a well by id.
    pub fn get(&self, id: WellId) -> Option<&Well> {
        self.wells.iter().find(|w| w.id == id)
    }

    /// The well completed in `cell`, if any.
    pub fn well_at(&self, cell: CellIndex) -> Option<&Well> {
        self.wells.iter().find(|w| w.cell == cell)
    }

    /// All wells in insertion order.
    #[inline]
    pub fn wells(&self) -> &[Well] {
        &self.wells
    }

    /// Number of registered wells.
    #[inline]
    pub fn len(&self) -> usize {
        self.wells.len()
    }

    /// True when no wells are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    /// Iterate producers in insertion order.
    pub fn producers(&self) -> impl Iterator<Item = &Well> {
        self.wells
            .iter()
            .filter(|w| w.kind() == WellKind::Producer)
    }

    /// Iterate injectors in insertion order.
    pub fn injectors(&self) -> impl Iterator<Item = &Well> {
        self.wells
            .iter()
            .filter(|w| w.kind() == WellKind::Injector)
    }

    /// Smallest suffix >= 1 not used by any well of `kind`.
    fn next_number(&self, kind: WellKind) -> u32 {
        let mut n = 1;
        while self
            .wells
            .iter()
            .any(|w| w.id.kind == kind && w.id.number == n)
        {
            n += 1;
        }
        n
    }
}

// =============================================================================
// Tests
// =============================================================================
