//! The per-lane layer sweep.
//!
//! Every lane of a block runs [`sweep`] with the same cache and schedule,
//! so all lanes reach the same barriers in the same order:
//!
//! ```text
//! for each cache block b:
//!     refill(b)?  ── block barrier, stage own share, block barrier
//!     for each layer in b:
//!         aligned     K pair transforms, no synchronisation
//!         misaligned  K-1 intra-lane transforms
//!                     pull_from_next ── boundary transform ── pull_from_prev
//! ```

use meshprop_cache::{LayerRow, LayerSource, WorkingSetCache};
use meshprop_core::{Alignment, Crossing};

use crate::exchange::LaneExchange;
use crate::staging::LaneState;
use crate::sync::{Aborted, LockstepBarrier};

/// What one lane shares with the rest of its block.
pub(crate) struct LaneContext<'s, C: Crossing> {
    pub cache: &'s WorkingSetCache<C>,
    pub source: &'s LayerSource<'s, C>,
    pub block_barrier: &'s LockstepBarrier,
    pub exchange: &'s LaneExchange<C::Elem>,
    /// Lane index within its group.
    pub lane: usize,
    /// Lane index within the block, for cooperative fills.
    pub thread: usize,
    pub threads: usize,
}

/// Run every layer of the mesh over `state`.
pub(crate) fn sweep<C: Crossing, const K: usize>(
    ctx: &LaneContext<'_, C>,
    state: &mut LaneState<C::Elem, K>,
) -> Result<(), Aborted> {
    let schedule = ctx.cache.schedule();
    for block in 0..schedule.block_count() {
        if let Some(plan) = schedule.refill(block) {
            ctx.block_barrier.wait()?;
            ctx.cache.fill(&plan, ctx.source, ctx.thread, ctx.threads);
            ctx.block_barrier.wait()?;
        }
        for offset in 0..schedule.span(block).layers {
            let row = ctx.cache.row(block, offset);
            apply_layer::<C, K>(&row, ctx.exchange, ctx.lane, state)?;
        }
    }
    Ok(())
}

/// Apply one cached layer to `lane`'s state.
pub(crate) fn apply_layer<C: Crossing, const K: usize>(
    row: &LayerRow<C::Coeffs>,
    exchange: &LaneExchange<C::Elem>,
    lane: usize,
    state: &mut LaneState<C::Elem, K>,
) -> Result<(), Aborted> {
    let base = K * lane;
    let u = state.pairs_mut();
    match row.alignment() {
        Alignment::Aligned => {
            for (k, pair) in u.iter_mut().enumerate() {
                let (a, b) = C::matmult(row.coeff(base + k), pair[0], pair[1], true);
                *pair = [a, b];
            }
        }
        Alignment::Misaligned => {
            for k in 0..K - 1 {
                let (a, b) = C::matmult(row.coeff(base + k), u[k][1], u[k + 1][0], true);
                u[k][1] = a;
                u[k + 1][0] = b;
            }
            let partner = exchange.pull_from_next(lane, u[0][0])?;
            let participates = lane + 1 < exchange.lanes();
            let (a, b) = C::matmult(row.coeff(base + K - 1), u[K - 1][1], partner, participates);
            u[K - 1][1] = a;
            u[0][0] = exchange.pull_from_prev(lane, b)?;
        }
    }
    Ok(())
}
