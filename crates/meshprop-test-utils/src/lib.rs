//! Test utilities and reference implementations for meshprop development.
//!
//! Provides seeded random mesh fixtures ([`RandomMesh`]) and a
//! double-precision sequential reference ([`reference_propagate`]) that
//! kernel outputs are checked against.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod reference;

pub use fixtures::RandomMesh;
pub use reference::{reference_propagate, relative_error, row_errors};
