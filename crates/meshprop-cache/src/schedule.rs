//! Block, slot, and refill arithmetic for the working-set window.
//!
//! The sweep walks the mesh in blocks of `depth` layers. Block `b` lives
//! in tile slot `b % prefetch`. The ring is split into two halves of
//! `h = prefetch / 2` tiles:
//!
//! ```text
//! before block 0        fill blocks 0 .. 2h        (both halves)
//! before block b = k·h  fill blocks b+h .. b+2h    (half just consumed)
//! ```
//!
//! When block `b = k·h` starts, blocks `b .. b+h` were filled one refill
//! earlier and the half holding `b-h .. b` is no longer read, so the
//! refill never overwrites a tile that is still needed.

use std::ops::Range;

use smallvec::SmallVec;

use crate::config::CacheConfig;

/// Blocks staged by one refill. Inline up to four blocks (`prefetch <= 8`).
pub type RefillPlan = SmallVec<[BlockSpan; 4]>;

/// One block of consecutive layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockSpan {
    /// Block index in sweep order.
    pub index: usize,
    /// Absolute index of the block's first layer.
    pub first_layer: usize,
    /// Layers in this block (`L_blk`); short for the final block.
    pub layers: usize,
}

impl BlockSpan {
    /// Absolute layer indices covered by this block.
    pub fn layer_range(&self) -> Range<usize> {
        self.first_layer..self.first_layer + self.layers
    }
}

/// Pure window arithmetic for a mesh of `total_layers` layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSchedule {
    total_layers: usize,
    depth: usize,
    prefetch: usize,
}

impl WindowSchedule {
    /// Build the schedule. `config` must already be validated.
    pub fn new(config: &CacheConfig, total_layers: usize) -> Self {
        debug_assert!(config.validate().is_ok(), "unvalidated cache config");
        Self {
            total_layers,
            depth: config.depth,
            prefetch: config.prefetch,
        }
    }

    /// Number of blocks in the sweep.
    pub fn block_count(&self) -> usize {
        self.total_layers.div_ceil(self.depth)
    }

    /// Layer span of block `block`.
    pub fn span(&self, block: usize) -> BlockSpan {
        debug_assert!(block < self.block_count(), "block {block} out of range");
        let first_layer = block * self.depth;
        BlockSpan {
            index: block,
            first_layer,
            layers: self.depth.min(self.total_layers - first_layer),
        }
    }

    /// Tile slot holding block `block`.
    pub fn slot(&self, block: usize) -> usize {
        block % self.prefetch
    }

    /// Cache row holding layer `offset` of block `block`.
    pub fn row_index(&self, block: usize, offset: usize) -> usize {
        debug_assert!(offset < self.depth);
        self.slot(block) * self.depth + offset
    }

    /// Blocks to stage before block `block` starts, if any.
    pub fn refill(&self, block: usize) -> Option<RefillPlan> {
        let count = self.block_count();
        if block >= count {
            return None;
        }
        let half = self.prefetch / 2;
        let wanted = if block == 0 {
            0..self.prefetch
        } else if block % half == 0 {
            block + half..block + 2 * half
        } else {
            return None;
        };
        let end = wanted.end.min(count);
        if wanted.start >= end {
            return None;
        }
        Some((wanted.start..end).map(|b| self.span(b)).collect())
    }

    /// Number of refills performed over a full sweep.
    pub fn refill_count(&self) -> usize {
        (0..self.block_count())
            .filter(|&b| self.refill(b).is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn schedule(depth: usize, prefetch: usize, layers: usize) -> WindowSchedule {
        WindowSchedule::new(&CacheConfig { depth, prefetch }, layers)
    }

    #[test]
    fn empty_mesh_has_no_blocks() {
        let s = schedule(4, 2, 0);
        assert_eq!(s.block_count(), 0);
        assert!(s.refill(0).is_none());
        assert_eq!(s.refill_count(), 0);
    }

    #[test]
    fn final_block_is_short() {
        let s = schedule(4, 2, 10);
        assert_eq!(s.block_count(), 3);
        assert_eq!(s.span(0).layer_range(), 0..4);
        assert_eq!(s.span(2).layer_range(), 8..10);
        assert_eq!(s.span(2).layers, 2);
    }

    #[test]
    fn exact_multiple_has_full_final_block() {
        let s = schedule(4, 2, 8);
        assert_eq!(s.block_count(), 2);
        assert_eq!(s.span(1).layers, 4);
    }

    #[test]
    fn double_buffer_refills_alternate() {
        let s = schedule(2, 2, 9);
        // 5 blocks: fill {0,1}, then {2}, {3}, {4} one block ahead.
        let idx = |b| {
            s.refill(b)
                .map(|plan| plan.iter().map(|span| span.index).collect::<Vec<_>>())
        };
        assert_eq!(idx(0), Some(vec![0, 1]));
        assert_eq!(idx(1), Some(vec![2]));
        assert_eq!(idx(2), Some(vec![3]));
        assert_eq!(idx(3), Some(vec![4]));
        assert_eq!(idx(4), None);
        assert_eq!(s.refill_count(), 4);
    }

    #[test]
    fn wide_prefetch_refills_in_halves() {
        let s = schedule(1, 4, 7);
        let idx = |b| {
            s.refill(b)
                .map(|plan| plan.iter().map(|span| span.index).collect::<Vec<_>>())
        };
        assert_eq!(idx(0), Some(vec![0, 1, 2, 3]));
        assert_eq!(idx(1), None);
        assert_eq!(idx(2), Some(vec![4, 5]));
        assert_eq!(idx(3), None);
        assert_eq!(idx(4), Some(vec![6]));
        assert_eq!(idx(5), None);
        assert_eq!(idx(6), None);
    }

    #[test]
    fn single_block_mesh_fills_once() {
        let s = schedule(8, 2, 3);
        assert_eq!(s.block_count(), 1);
        let plan = s.refill(0).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].layers, 3);
    }

    proptest! {
        /// Simulate the ring: every block is resident (and not overwritten)
        /// when consumed, and every layer is staged exactly once.
        #[test]
        fn every_block_resident_when_consumed(
            depth in 1usize..6,
            half in 1usize..4,
            layers in 0usize..80,
        ) {
            let s = schedule(depth, 2 * half, layers);
            let mut slots: Vec<Option<usize>> = vec![None; 2 * half];
            let mut staged = vec![0usize; layers];
            for b in 0..s.block_count() {
                if let Some(plan) = s.refill(b) {
                    for span in &plan {
                        // Never evict a block that has not been consumed yet.
                        if let Some(old) = slots[s.slot(span.index)] {
                            prop_assert!(old < b, "evicted unconsumed block {}", old);
                        }
                        slots[s.slot(span.index)] = Some(span.index);
                        for l in span.layer_range() {
                            staged[l] += 1;
                        }
                    }
                }
                prop_assert_eq!(slots[s.slot(b)], Some(b));
            }
            prop_assert!(staged.iter().all(|&n| n == 1));
        }

        #[test]
        fn spans_tile_the_mesh(depth in 1usize..10, layers in 0usize..100) {
            let s = schedule(depth, 2, layers);
            let mut next = 0;
            for b in 0..s.block_count() {
                let span = s.span(b);
                prop_assert_eq!(span.first_layer, next);
                prop_assert!(span.layers >= 1 && span.layers <= depth);
                next += span.layers;
            }
            prop_assert_eq!(next, layers);
        }
    }
}
