//! Strongly-typed domain types for safer APIs.
//!
//! This module provides structured types to make APIs self-documenting
//! and prevent parameter mix-ups.
//!
//! # Design Philosophy
//!
//! - **Named fields over positional**: `CellIndex { i, j }` instead of bare tuples
//! - **One linearization rule**: row-major `j * nx + i`, defined once
//! - **Zero-cost abstractions**: plain `Copy` structs, no runtime overhead
//!
//! # Example
//!
//! ```
//! use nursim::types::CellIndex;
//!
//! let cell = CellIndex::new(2, 1);
//! assert_eq!(cell.to_linear(5), 7);
//! ```

mod cell;

pub use cell::CellIndex;
