//! Lock-step forward propagation kernel for crossing meshes.
//!
//! Propagates a batch of state vectors through a layered mesh of 2×2
//! crossings. Each lane thread owns `2K` contiguous elements of one
//! instance; `group_width` lanes cover an instance and exchange boundary
//! elements for misaligned layers; `groups_per_block` groups share a
//! working-set cache of layer coefficients.
//!
//! # Architecture
//!
//! ```text
//! MeshKernel::launch
//! └── dispatcher pool (crossbeam task queue, one task per block)
//!     └── run_block
//!         ├── WorkingSetCache   (one per block)
//!         ├── LockstepBarrier   (all lanes of the block)
//!         └── group × groups_per_block
//!             ├── LaneExchange  (group barrier + slots)
//!             └── lane × group_width: load → sweep → store
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod args;
mod block;
pub mod config;
pub mod error;
pub mod exchange;
pub mod kernel;
mod lane;
pub mod metrics;
pub mod registry;
pub mod staging;
pub mod sync;

pub use args::{LaunchArgs, StageMode};
pub use config::{ConfigError, KernelConfig, MAX_THREADS_PER_BLOCK};
pub use error::LaunchError;
pub use exchange::LaneExchange;
pub use kernel::MeshKernel;
pub use metrics::LaunchMetrics;
pub use registry::{standard_registry, EntryPoint, KernelRegistry, STANDARD_PAIRS_PER_LANE};
pub use staging::LaneState;
pub use sync::{Aborted, LockstepBarrier};
