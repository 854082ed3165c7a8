//! Per-layer coupling topology.
//!
//! Each layer is described by a `shift` and a `length`. The shift's parity
//! decides whether crossings couple `(2q, 2q+1)` (aligned) or
//! `(2q+1, 2q+2)` (misaligned). The active crossings are the pairs
//! `q` in `[shift/2, shift/2 + length)`; every other pair passes through
//! unchanged.
//!
//! ```text
//! shift = 2, length = 2, width = 8 (aligned)
//!   elements  0 1 | 2 3 | 4 5 | 6 7
//!   pairs      q0 |  q1 |  q2 |  q3
//!   active          ^^^   ^^^
//!
//! shift = 1, length = 3, width = 8 (misaligned)
//!   elements  0 | 1 2 | 3 4 | 5 6 | 7
//!   pairs         q0    q1    q2
//!   active        ^^^   ^^^   ^^^
//! ```

use std::ops::Range;

use crate::error::TopologyError;

/// Whether a layer's crossings start on an even or odd element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Even shift: pairs `(2q, 2q+1)`.
    Aligned,
    /// Odd shift: pairs `(2q+1, 2q+2)`, straddling lane boundaries.
    Misaligned,
}

/// Validated `(shift, length)` descriptor for one layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct LayerTopology {
    shift: usize,
    length: usize,
}

impl LayerTopology {
    /// A layer with no active crossings.
    pub const EMPTY: Self = Self {
        shift: 0,
        length: 0,
    };

    /// Build a topology from the raw bulk-memory descriptors.
    ///
    /// Width is checked separately by [`check_width`](Self::check_width),
    /// since the same topology arrays are shared across entry points.
    pub fn new(shift: i32, length: i32) -> Result<Self, TopologyError> {
        let shift = usize::try_from(shift).map_err(|_| TopologyError::NegativeShift { shift })?;
        let length =
            usize::try_from(length).map_err(|_| TopologyError::NegativeLength { length })?;
        Ok(Self { shift, length })
    }

    /// The layer's shift.
    pub fn shift(&self) -> usize {
        self.shift
    }

    /// Number of active crossings.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Pair alignment, from the shift's parity.
    pub fn alignment(&self) -> Alignment {
        if self.shift % 2 == 0 {
            Alignment::Aligned
        } else {
            Alignment::Misaligned
        }
    }

    /// Pair indices whose crossings are active.
    pub fn active_pairs(&self) -> Range<usize> {
        let first = self.shift / 2;
        first..first + self.length
    }

    /// Whether pair `q` carries an active crossing.
    pub fn is_active(&self, pair: usize) -> bool {
        self.active_pairs().contains(&pair)
    }

    /// One past the last element touched by an active crossing.
    pub fn end(&self) -> usize {
        self.shift + 2 * self.length
    }

    /// Elements coupled by pair `q` under this layer's alignment.
    pub fn pair_elements(&self, pair: usize) -> (usize, usize) {
        let first = 2 * pair + self.shift % 2;
        (first, first + 1)
    }

    /// Check that every active crossing lies inside a mesh of `width`.
    pub fn check_width(&self, width: usize) -> Result<(), TopologyError> {
        if self.end() > width {
            return Err(TopologyError::ExceedsWidth {
                end: self.end(),
                width,
            });
        }
        Ok(())
    }
}
