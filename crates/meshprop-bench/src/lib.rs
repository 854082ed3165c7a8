//! Benchmark profiles and utilities for the meshprop kernels.
//!
//! Provides pre-built mesh profiles for benchmarking:
//!
//! - [`square_profile`]: `N` wide, `N` deep, batch of `N`
//! - [`wide_batch_profile`]: `N` wide, `N` deep, batch of 4096
//! - [`run_profile`]: one launch of an entry point over a profile

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use meshprop_core::{Crossing, StateElem};
use meshprop_engine::{
    EntryPoint, KernelConfig, LaunchArgs, LaunchError, LaunchMetrics, StageMode,
};
use meshprop_test_utils::RandomMesh;

/// Batch size of [`wide_batch_profile`].
pub const WIDE_BATCH: usize = 4096;

/// Kernel configuration used by every benchmark.
///
/// Four groups per block so each cache fill is shared.
pub fn bench_config() -> KernelConfig {
    KernelConfig {
        groups_per_block: 4,
        ..KernelConfig::default()
    }
}

/// Fully populated `n × n` mesh with a batch of `n` inputs.
pub fn square_profile<C: Crossing>(n: usize, seed: u64) -> RandomMesh<C::Elem> {
    RandomMesh::dense::<C>(seed, n, n, n)
}

/// Fully populated `n × n` mesh with a batch of [`WIDE_BATCH`] inputs.
pub fn wide_batch_profile<C: Crossing>(n: usize, seed: u64) -> RandomMesh<C::Elem> {
    RandomMesh::dense::<C>(seed, n, n, WIDE_BATCH)
}

/// Launch `entry` over `mesh`, overwriting `u_out`.
pub fn run_profile<T: StateElem>(
    entry: &dyn EntryPoint<T>,
    mesh: &RandomMesh<T>,
    u_out: &mut [T],
) -> Result<LaunchMetrics, LaunchError> {
    entry.launch(LaunchArgs {
        width: mesh.width,
        layers: mesh.layers,
        batch: mesh.batch,
        lens: &mesh.lens,
        shifts: &mesh.shifts,
        p: &mesh.phases,
        ldp: mesh.ldp,
        s: mesh.splitters.as_deref(),
        lds: mesh.lds,
        u_in: &mesh.u_in,
        u_out,
        ldu: mesh.ldu,
        mode: StageMode::Overwrite,
    })
}
