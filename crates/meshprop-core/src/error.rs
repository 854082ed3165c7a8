//! Error types for layer topology validation.

use std::error::Error;
use std::fmt;

/// A layer's `(shift, length)` descriptor is invalid for the mesh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopologyError {
    /// The shift is negative.
    NegativeShift {
        /// The offending shift value.
        shift: i32,
    },
    /// The length (number of active crossings) is negative.
    NegativeLength {
        /// The offending length value.
        length: i32,
    },
    /// The active crossings extend past the mesh width.
    ExceedsWidth {
        /// First element index past the last active crossing.
        end: usize,
        /// The mesh width.
        width: usize,
    },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeShift { shift } => write!(f, "shift must be >= 0, got {shift}"),
            Self::NegativeLength { length } => write!(f, "length must be >= 0, got {length}"),
            Self::ExceedsWidth { end, width } => {
                write!(f, "crossings end at element {end}, past mesh width {width}")
            }
        }
    }
}

impl Error for TopologyError {}
