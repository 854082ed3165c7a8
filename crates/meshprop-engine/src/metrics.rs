//! Per-launch metrics.
//!
//! [`LaunchMetrics`] describes the work one launch performed. The kernel
//! carries no logging; callers that want telemetry read these counters.

/// Counters collected during a single launch.
///
/// Durations are in microseconds. Counts cover every block the launch ran,
/// including groups past the end of the batch that only take part in
/// barriers and cache fills.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LaunchMetrics {
    /// Wall-clock time for the whole launch, validation included.
    pub total_us: u64,
    /// Blocks dispatched.
    pub blocks: usize,
    /// Lane groups run (`blocks * groups_per_block`).
    pub groups: usize,
    /// Lanes per block.
    pub threads_per_block: usize,
    /// Mesh depth.
    pub layers: usize,
    /// Layers with odd shift.
    pub misaligned_layers: usize,
    /// Cache refills summed over all blocks.
    pub cache_refills: usize,
    /// Boundary exchanges (one per misaligned layer per group).
    pub boundary_exchanges: usize,
}
