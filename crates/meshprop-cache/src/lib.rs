//! Tiled working-set cache for the meshprop kernel.
//!
//! Holds a bounded lookahead window of per-layer topology and derived
//! crossing coefficients, refilled from bulk parameter arrays as the sweep
//! advances.
//!
//! # Architecture
//!
//! ```text
//! WorkingSetCache (one per block, shared by all its lanes)
//! ├── WindowSchedule   pure block/slot/refill arithmetic
//! └── rows: RwLock<LayerRow> × (prefetch × depth)
//!     ├── tile 0 ─┐
//!     ├── ...     ├── half A   ← consumed while half B is resident
//!     ├── tile h ─┘
//!     ├── ...     ─── half B   ← refilled once half A is in use
//!     └── tile 2h-1
//! ```
//!
//! Rows are staged from a [`LayerSource`], the validated view over the
//! bulk `lens`/`shifts`/`p`/`s` arrays.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod params;
pub mod row;
pub mod schedule;
pub mod working_set;

pub use config::CacheConfig;
pub use error::CacheError;
pub use params::{LayerParams, LayerSource};
pub use row::LayerRow;
pub use schedule::{BlockSpan, RefillPlan, WindowSchedule};
pub use working_set::WorkingSetCache;
