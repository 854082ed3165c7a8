//! A single cached layer: topology plus one coefficient block per pair.

use meshprop_core::{Alignment, LayerTopology};

/// One resident layer in the working-set cache.
///
/// Tagged with the absolute layer index it was staged for, so readers can
/// detect a stale or not-yet-filled row.
#[derive(Clone, Debug)]
pub struct LayerRow<P> {
    pub(crate) layer: Option<usize>,
    pub(crate) topology: LayerTopology,
    pub(crate) coeffs: Vec<P>,
}

impl<P: Copy> LayerRow<P> {
    /// An unfilled row with `pairs` coefficient slots set to `fill`.
    pub fn new(pairs: usize, fill: P) -> Self {
        Self {
            layer: None,
            topology: LayerTopology::EMPTY,
            coeffs: vec![fill; pairs],
        }
    }

    /// Absolute layer index this row holds, or `None` if never filled.
    pub fn layer(&self) -> Option<usize> {
        self.layer
    }

    /// Cached topology of the layer.
    pub fn topology(&self) -> LayerTopology {
        self.topology
    }

    /// Pair alignment of the layer.
    pub fn alignment(&self) -> Alignment {
        self.topology.alignment()
    }

    /// All coefficient blocks, indexed by pair.
    pub fn coeffs(&self) -> &[P] {
        &self.coeffs
    }

    /// Coefficient block for `pair`.
    #[inline]
    pub fn coeff(&self, pair: usize) -> &P {
        &self.coeffs[pair]
    }

    /// Number of pair slots in the row.
    pub fn pairs(&self) -> usize {
        self.coeffs.len()
    }
}
