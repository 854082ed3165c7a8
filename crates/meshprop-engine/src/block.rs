//! One block: `groups_per_block` lane groups sharing a working-set cache.
//!
//! Each lane is a scoped OS thread. Groups past the end of the batch still
//! run (they take part in cache fills and barriers) but start from zeros
//! and store nothing.

use std::thread;

use meshprop_cache::{LayerSource, WorkingSetCache};
use meshprop_core::Crossing;
use smallvec::SmallVec;

use crate::args::StageMode;
use crate::config::KernelConfig;
use crate::error::LaunchError;
use crate::exchange::LaneExchange;
use crate::lane::{sweep, LaneContext};
use crate::staging::LaneState;
use crate::sync::{Aborted, LockstepBarrier};

/// Launch-wide inputs shared by every block.
pub(crate) struct BlockInputs<'a, C: Crossing> {
    pub config: &'a KernelConfig,
    pub source: &'a LayerSource<'a, C>,
    pub width: usize,
    pub batch: usize,
    pub u_in: &'a [C::Elem],
    pub ldu: usize,
    pub mode: StageMode,
}

/// Aborts every barrier of a block if the owning lane unwinds.
struct AbortOnUnwind<'s, T: Copy + Default> {
    block_barrier: &'s LockstepBarrier,
    exchanges: &'s [LaneExchange<T>],
}

impl<T: Copy + Default> AbortOnUnwind<'_, T> {
    fn abort_all(&self) {
        self.block_barrier.abort();
        for exchange in self.exchanges {
            exchange.abort();
        }
    }
}

impl<T: Copy + Default> Drop for AbortOnUnwind<'_, T> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.abort_all();
        }
    }
}

/// Run block `block`, writing its instances' rows into `out`.
///
/// `out` starts at row `block * groups_per_block` of `u_out` and holds
/// that block's rows (the last may be shorter than `ldu`, but never
/// shorter than `width`).
pub(crate) fn run_block<C: Crossing, const K: usize>(
    inputs: &BlockInputs<'_, C>,
    block: usize,
    out: &mut [C::Elem],
) -> Result<(), LaunchError> {
    let config = inputs.config;
    let group_width = config.group_width;
    let groups = config.groups_per_block;
    let threads = config.threads_per_block();
    let width = inputs.width;

    let cache = WorkingSetCache::<C>::new(&config.cache, inputs.source.layers(), K * group_width);
    let block_barrier = LockstepBarrier::new(threads);
    let exchanges: SmallVec<[LaneExchange<C::Elem>; 4]> =
        (0..groups).map(|_| LaneExchange::new(group_width)).collect();
    let guard = AbortOnUnwind {
        block_barrier: &block_barrier,
        exchanges: &exchanges,
    };

    // Per-lane output slices: group g, lane t -> chunk t of row g.
    let mut lane_outputs: Vec<Option<&mut [C::Elem]>> = Vec::with_capacity(threads);
    let mut rows = out.chunks_mut(inputs.ldu);
    for _ in 0..groups {
        let mut chunks = rows.next().map(|row| row[..width].chunks_mut(2 * K));
        for _ in 0..group_width {
            lane_outputs.push(chunks.as_mut().and_then(Iterator::next));
        }
    }

    thread::scope(|s| {
        let mut handles = Vec::with_capacity(threads);
        let mut spawn_error = None;
        for (index, dst) in lane_outputs.into_iter().enumerate() {
            let (group, lane) = (index / group_width, index % group_width);
            let instance = block * groups + group;
            let input = (instance < inputs.batch)
                .then(|| &inputs.u_in[instance * inputs.ldu..instance * inputs.ldu + width]);
            let ctx = LaneContext {
                cache: &cache,
                source: inputs.source,
                block_barrier: &block_barrier,
                exchange: &exchanges[group],
                lane,
                thread: index,
                threads,
            };
            let lane_guard = AbortOnUnwind {
                block_barrier: &block_barrier,
                exchanges: &exchanges,
            };
            let mode = inputs.mode;
            let spawned = thread::Builder::new()
                .name(format!("meshprop-lane-{block}-{index}"))
                .spawn_scoped(s, move || -> Result<(), Aborted> {
                    let _guard = lane_guard;
                    let mut state = match input {
                        Some(row) => LaneState::<C::Elem, K>::load(row, width, lane),
                        None => LaneState::zeroed(),
                    };
                    sweep::<C, K>(&ctx, &mut state)?;
                    if let Some(dst) = dst {
                        state.store(dst, mode);
                    }
                    Ok(())
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    guard.abort_all();
                    spawn_error = Some(LaunchError::ThreadSpawnFailed {
                        reason: format!("lane {index} of block {block}: {e}"),
                    });
                    break;
                }
            }
        }

        let mut first_panic = None;
        let mut aborted = false;
        for (index, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(Aborted)) => aborted = true,
                Err(_) => {
                    first_panic.get_or_insert(LaunchError::LanePanicked {
                        block,
                        thread: index,
                    });
                }
            }
        }
        match (spawn_error, first_panic) {
            (Some(e), _) | (None, Some(e)) => Err(e),
            (None, None) if aborted => Err(LaunchError::Aborted { block }),
            (None, None) => Ok(()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshprop_cache::{CacheConfig, LayerParams};
    use meshprop_crossings::OrthogonalCrossing;

    fn config(group_width: usize, groups_per_block: usize) -> KernelConfig {
        KernelConfig {
            cache: CacheConfig {
                depth: 2,
                prefetch: 2,
            },
            group_width,
            groups_per_block,
            worker_count: Some(1),
        }
    }

    #[test]
    fn tail_groups_store_nothing() {
        // 3 groups per block, batch of 4: block 1 holds instance 3 only.
        let width = 4;
        let ldu = 5;
        let lens = [2, 1];
        let shifts = [0, 1];
        let phases = [0.3f32, -0.4, 0.9, 0.0];
        let source = LayerParams {
            lens: &lens,
            shifts: &shifts,
            phases: &phases,
            ldp: 2,
            splitters: None,
            lds: 0,
        }
        .resolve::<OrthogonalCrossing>(2, width)
        .unwrap();
        let u_in: Vec<f32> = (0..4 * ldu).map(|i| i as f32).collect();
        let cfg = config(2, 3);
        let inputs = BlockInputs {
            config: &cfg,
            source: &source,
            width,
            batch: 4,
            u_in: &u_in,
            ldu,
            mode: StageMode::Overwrite,
        };
        // Block 1's slice of u_out: one row of `width` elements.
        let mut out = vec![-1.0f32; width];
        run_block::<OrthogonalCrossing, 1>(&inputs, 1, &mut out).unwrap();
        assert!(out.iter().all(|&v| v != -1.0));

        // Instance 3 alone in a one-group layout (block 3) agrees.
        let cfg1 = config(2, 1);
        let inputs1 = BlockInputs {
            config: &cfg1,
            ..inputs
        };
        let mut solo = vec![0.0f32; width];
        run_block::<OrthogonalCrossing, 1>(&inputs1, 3, &mut solo).unwrap();
        assert_eq!(out, solo);
    }

    #[test]
    fn padding_between_rows_is_untouched() {
        let width = 3;
        let ldu = 6;
        let source = LayerParams {
            lens: &[1],
            shifts: &[0],
            phases: &[1.0],
            ldp: 1,
            splitters: None,
            lds: 0,
        }
        .resolve::<OrthogonalCrossing>(1, width)
        .unwrap();
        let u_in = vec![1.0f32; 2 * ldu];
        let cfg = config(2, 2);
        let inputs = BlockInputs {
            config: &cfg,
            source: &source,
            width,
            batch: 2,
            u_in: &u_in,
            ldu,
            mode: StageMode::Overwrite,
        };
        let mut out = vec![7.0f32; ldu + width];
        run_block::<OrthogonalCrossing, 1>(&inputs, 0, &mut out).unwrap();
        assert_eq!(&out[width..ldu], &[7.0; 3]);
        assert_eq!(out[2], 1.0);
        assert_eq!(out[ldu + 2], 1.0);
    }
}
