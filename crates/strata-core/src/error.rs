//! Error type shared by grids and grid algorithms.
//!
//! Covers the three synchronous error families: incompatible operands,
//! invalid grid state, and domain errors on unsupported cell types.
//! Graph execution errors live in `strata-graph`.

use std::error::Error;
use std::fmt;

use crate::cell::CellKind;
use crate::point::Point;

/// Errors raised by grid construction, mutation, and algorithms.
///
/// Every variant is raised before the target grid is mutated.
#[derive(Clone, Debug, PartialEq)]
pub enum GridError {
    /// Attempted to construct a grid of side 0.
    EmptyGrid,
    /// Two grids in a binary operation have different sizes.
    SizeMismatch {
        /// Size of the target grid.
        expected: usize,
        /// Size of the operand.
        actual: usize,
    },
    /// Two grids in a binary operation have different symmetry settings.
    SymmetryMismatch {
        /// Settings of the target grid.
        expected: String,
        /// Settings of the operand.
        actual: String,
    },
    /// A coordinate is outside the grid.
    CoordOutOfBounds {
        /// The offending point.
        point: Point,
        /// Side length of the grid.
        size: usize,
    },
    /// A randomized operation was requested on a grid built without a seed.
    MissingSeed {
        /// Debug name of the grid.
        grid: String,
    },
    /// The operation is undefined for this cell type.
    UnsupportedCellType {
        /// Name of the rejected operation.
        op: &'static str,
        /// Cell type of the grid.
        kind: CellKind,
    },
    /// An argument is outside the operation's accepted range.
    InvalidArgument {
        /// Name of the rejected operation.
        op: &'static str,
        /// What went wrong.
        reason: String,
    },
    /// Integer division with a zero divisor cell.
    DivisionByZero {
        /// First zero cell of the divisor.
        point: Point,
    },
}

impl GridError {
    /// Shorthand for [`GridError::InvalidArgument`].
    pub fn invalid(op: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            op,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid size must be at least 1"),
            Self::SizeMismatch { expected, actual } => {
                write!(f, "grid size mismatch: expected {expected}, got {actual}")
            }
            Self::SymmetryMismatch { expected, actual } => {
                write!(f, "symmetry mismatch: expected {expected}, got {actual}")
            }
            Self::CoordOutOfBounds { point, size } => {
                write!(f, "coordinate {point} out of bounds for size {size}")
            }
            Self::MissingSeed { grid } => {
                write!(f, "grid '{grid}' has no random seed")
            }
            Self::UnsupportedCellType { op, kind } => {
                write!(f, "{op} is not defined for {kind} grids")
            }
            Self::InvalidArgument { op, reason } => write!(f, "{op}: {reason}"),
            Self::DivisionByZero { point } => write!(f, "division by zero at {point}"),
        }
    }
}

impl Error for GridError {}
