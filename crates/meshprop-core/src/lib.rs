//! Core types and traits for the meshprop crossing-mesh kernel.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the abstractions shared by the rest of the workspace: the state
//! element trait, the [`Crossing`] algebra trait, per-layer topology,
//! and topology errors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod crossing;
pub mod elem;
pub mod error;
pub mod topology;

pub use crossing::Crossing;
pub use elem::StateElem;
pub use error::TopologyError;
pub use topology::{Alignment, LayerTopology};

pub use num_complex::{Complex32, Complex64};
