//! meshprop: forward propagation of state vectors through layered meshes
//! of 2×2 crossings.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all meshprop sub-crates. For most users, adding `meshprop` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use meshprop::prelude::*;
//!
//! // Entry points for every standard lane size of the orthogonal algebra.
//! let config = KernelConfig { group_width: 4, ..KernelConfig::default() };
//! let registry = standard_registry::<OrthogonalCrossing>(&config).unwrap();
//! let kernel = registry.for_width(6).unwrap();
//! assert_eq!(kernel.name(), "fwdprop_orth_K1");
//!
//! // Two layers: rotate (0, 1) and (2, 3), then (1, 2) across a lane boundary.
//! let u_in = [1.0f32, 0.0, 0.0, 1.0, 0.5, 0.5];
//! let mut u_out = [0.0f32; 6];
//! let metrics = kernel
//!     .launch(LaunchArgs {
//!         width: 6,
//!         layers: 2,
//!         batch: 1,
//!         lens: &[2, 1],
//!         shifts: &[0, 1],
//!         p: &[0.3, -0.7, 0.0, 1.1, 0.0, 0.0],
//!         ldp: 3,
//!         s: None,
//!         lds: 0,
//!         u_in: &u_in,
//!         u_out: &mut u_out,
//!         ldu: 6,
//!         mode: StageMode::Overwrite,
//!     })
//!     .unwrap();
//! assert_eq!(metrics.misaligned_layers, 1);
//!
//! // Rotations preserve the norm; the untouched tail passes through.
//! let norm = |v: &[f32]| v.iter().map(|x| x * x).sum::<f32>();
//! assert!((norm(&u_out) - norm(&u_in)).abs() < 1e-5);
//! assert_eq!(&u_out[4..], &[0.5, 0.5]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `meshprop-core` | State elements, the `Crossing` trait, layer topology |
//! | [`crossings`] | `meshprop-crossings` | The MZI, symmetric and orthogonal algebras |
//! | [`cache`] | `meshprop-cache` | Layer parameter views and the working-set cache |
//! | [`engine`] | `meshprop-engine` | Kernels, launch arguments, registry, metrics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// State elements, crossing trait, and layer topology (`meshprop-core`).
pub use meshprop_core as types;

/// Crossing algebras (`meshprop-crossings`).
///
/// [`crossings::MziCrossing`] for general unitary meshes,
/// [`crossings::SymmetricCrossing`] for symmetric ones, and
/// [`crossings::OrthogonalCrossing`] for real rotations.
pub use meshprop_crossings as crossings;

/// Layer parameters and the working-set cache (`meshprop-cache`).
pub use meshprop_cache as cache;

/// Forward propagation kernels (`meshprop-engine`).
///
/// [`engine::MeshKernel`] is a single entry point;
/// [`engine::KernelRegistry`] selects one by name or width.
pub use meshprop_engine as engine;

/// Common imports for typical meshprop usage.
///
/// ```rust
/// use meshprop::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use meshprop_core::{Complex32, Crossing, LayerTopology, StateElem};

    // Algebras
    pub use meshprop_crossings::{MziCrossing, OrthogonalCrossing, SymmetricCrossing};

    // Configuration
    pub use meshprop_cache::CacheConfig;

    // Engine
    pub use meshprop_engine::{
        standard_registry, ConfigError, EntryPoint, KernelConfig, KernelRegistry, LaunchArgs,
        LaunchError, LaunchMetrics, MeshKernel, StageMode,
    };
}
