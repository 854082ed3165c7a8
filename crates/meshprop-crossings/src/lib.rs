//! Crossing algebras for the meshprop kernel.
//!
//! Three interchangeable 2×2 crossing models, each a zero-sized
//! [`Crossing`](meshprop_core::Crossing) implementor:
//!
//! | Type | State | Raw `p` | Raw `s` | Cached block |
//! |------|-------|---------|---------|--------------|
//! | [`MziCrossing`] | complex | `(theta, phi)` | `(beta0, beta1)` | 4 complex |
//! | [`SymmetricCrossing`] | complex | `(theta, phi)` | unused | 3 real |
//! | [`OrthogonalCrossing`] | real | `theta` | unused | 2 real |

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod mzi;
pub mod orthogonal;
pub mod symmetric;

pub use mzi::{MziCoeffs, MziCrossing};
pub use orthogonal::{OrthogonalCoeffs, OrthogonalCrossing};
pub use symmetric::{SymmetricCoeffs, SymmetricCrossing};
