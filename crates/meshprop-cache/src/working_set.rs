//! The shared tile ring of staged layer rows.

use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use meshprop_core::Crossing;

use crate::config::CacheConfig;
use crate::params::LayerSource;
use crate::row::LayerRow;
use crate::schedule::{BlockSpan, WindowSchedule};

/// Working-set cache shared by all lanes of one block.
///
/// Holds `prefetch * depth` rows. Every lane stages a disjoint share of
/// each refill ([`fill`](Self::fill)) and then reads any row
/// ([`row`](Self::row)). Callers separate the two phases with a block-wide
/// barrier, so a row is never read while it is being written.
pub struct WorkingSetCache<C: Crossing> {
    schedule: WindowSchedule,
    rows: Vec<RwLock<LayerRow<C::Coeffs>>>,
}

impl<C: Crossing> WorkingSetCache<C> {
    /// Allocate the ring for a `total_layers`-deep mesh whose rows carry
    /// `pairs_per_row` coefficient slots. `config` must be validated.
    pub fn new(config: &CacheConfig, total_layers: usize, pairs_per_row: usize) -> Self {
        let rows = (0..config.window_layers())
            .map(|_| RwLock::new(LayerRow::new(pairs_per_row, C::identity())))
            .collect();
        Self {
            schedule: WindowSchedule::new(config, total_layers),
            rows,
        }
    }

    /// Window arithmetic for this cache.
    pub fn schedule(&self) -> &WindowSchedule {
        &self.schedule
    }

    /// Number of resident rows.
    pub fn capacity(&self) -> usize {
        self.rows.len()
    }

    /// Stage this thread's share of `plan`.
    ///
    /// Rows of the plan are numbered consecutively across its blocks; row
    /// `j` is staged by thread `j % threads`. Calling this once for every
    /// `thread` in `0..threads` stages the whole plan exactly once.
    pub fn fill(
        &self,
        plan: &[BlockSpan],
        source: &LayerSource<'_, C>,
        thread: usize,
        threads: usize,
    ) {
        debug_assert!(thread < threads);
        let rows = plan.iter().flat_map(|span| {
            span.layer_range()
                .enumerate()
                .map(move |(offset, layer)| (span.index, offset, layer))
        });
        for (_, (block, offset, layer)) in rows.enumerate().filter(|(j, _)| j % threads == thread) {
            let index = self.schedule.row_index(block, offset);
            let mut row = self.rows[index]
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            source.stage_row(layer, &mut row);
        }
    }

    /// Read layer `offset` of block `block`.
    ///
    /// The block must be resident, i.e. staged by the most recent refill
    /// that covered it.
    pub fn row(&self, block: usize, offset: usize) -> RwLockReadGuard<'_, LayerRow<C::Coeffs>> {
        let guard = self.rows[self.schedule.row_index(block, offset)]
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        debug_assert_eq!(
            guard.layer(),
            Some(self.schedule.span(block).first_layer + offset),
            "block {block} offset {offset} not resident"
        );
        guard
    }
}

// Compile-time assertion: the cache is shared by reference across lane threads.
#[allow(dead_code)]
fn assert_shareable<C: Crossing>() {
    fn assert<T: Send + Sync>() {}
    assert::<WorkingSetCache<C>>();
}
