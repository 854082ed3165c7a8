//! Per-lane register state and its load/store against state rows.

use std::ops::Range;

use meshprop_core::StateElem;

use crate::args::StageMode;

/// The `2K` state elements one lane owns, as `K` pairs.
///
/// Lane `t` owns elements `[2Kt, 2K(t+1))` of its group's row. Elements at
/// or past the mesh width are padding: loaded as zero, never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneState<T, const K: usize> {
    pairs: [[T; 2]; K],
}

impl<T: StateElem, const K: usize> LaneState<T, K> {
    /// All-zero state, used by groups past the end of the batch.
    pub fn zeroed() -> Self {
        Self {
            pairs: [[T::default(); 2]; K],
        }
    }

    /// Row elements owned by `lane` that lie below `width`.
    pub fn owned_range(width: usize, lane: usize) -> Range<usize> {
        let start = (2 * K * lane).min(width);
        let end = (2 * K * (lane + 1)).min(width);
        start..end
    }

    /// Load `lane`'s elements from `row`, zero-padding past `width`.
    pub fn load(row: &[T], width: usize, lane: usize) -> Self {
        let mut state = Self::zeroed();
        for (i, &value) in row[Self::owned_range(width, lane)].iter().enumerate() {
            state.pairs[i / 2][i % 2] = value;
        }
        state
    }

    /// Write the first `dst.len()` elements into `dst`, the lane's owned
    /// slice of an output row.
    pub fn store(&self, dst: &mut [T], mode: StageMode) {
        debug_assert!(dst.len() <= 2 * K);
        for (i, slot) in dst.iter_mut().enumerate() {
            let value = self.pairs[i / 2][i % 2];
            *slot = match mode {
                StageMode::Overwrite => value,
                StageMode::Accumulate => slot.accumulate(value),
            };
        }
    }

    /// The pairs, `[u_{2k}, u_{2k+1}]` for `k in 0..K`.
    pub fn pairs(&self) -> &[[T; 2]; K] {
        &self.pairs
    }

    pub(crate) fn pairs_mut(&mut self) -> &mut [[T; 2]; K] {
        &mut self.pairs
    }
}
