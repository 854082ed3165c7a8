//! The [`Crossing`] trait: one 2×2 coupling algebra.
//!
//! A crossing algebra fixes three things for a whole kernel build: the
//! state element type, the raw per-pair parameter layout in bulk memory,
//! and the cached coefficient block derived from it. The propagation sweep
//! only ever calls [`Crossing::matmult`], so the control skeleton is the
//! same for every algebra.

use num_complex::Complex64;
use std::fmt::Debug;

use crate::elem::StateElem;

/// A 2×2 crossing algebra, selected at compile time.
///
/// Implementors are zero-sized marker types; every method is an associated
/// function. A kernel is generic over `C: Crossing`, so each algebra gets
/// its own monomorphised hot loop with no runtime dispatch.
///
/// # Contract
///
/// - [`derive`](Crossing::derive) and [`matmult`](Crossing::matmult) MUST
///   be deterministic.
/// - `matmult(identity(), a, b, _)` MUST return `(a, b)` exactly.
/// - `matmult(_, a, b, false)` MUST return `(a, b)` exactly.
/// - [`transfer_matrix`](Crossing::transfer_matrix) MUST describe the same
///   linear map as `matmult` (used by dense reference implementations).
///
/// # Examples
///
/// A plain swap algebra on real state:
///
/// ```
/// use meshprop_core::{Complex64, Crossing};
///
/// struct Swap;
///
/// impl Crossing for Swap {
///     type Elem = f32;
///     type Coeffs = bool;
///     const NAME: &'static str = "swap";
///     const PHASE_PARAMS: usize = 1;
///     const SPLITTER_PARAMS: usize = 0;
///
///     fn identity() -> bool { false }
///     fn derive(phase: &[f32], _splitter: Option<&[f32]>) -> bool { phase[0] != 0.0 }
///     fn matmult(swap: &bool, a: f32, b: f32, participates: bool) -> (f32, f32) {
///         if *swap && participates { (b, a) } else { (a, b) }
///     }
///     fn transfer_matrix(swap: &bool) -> [[Complex64; 2]; 2] {
///         let (one, zero) = (Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0));
///         if *swap { [[zero, one], [one, zero]] } else { [[one, zero], [zero, one]] }
///     }
/// }
///
/// assert_eq!(Swap::matmult(&true, 1.0, 2.0, true), (2.0, 1.0));
/// assert_eq!(Swap::matmult(&true, 1.0, 2.0, false), (1.0, 2.0));
/// ```
pub trait Crossing: Send + Sync + 'static {
    /// State element type the algebra operates on.
    type Elem: StateElem;

    /// Cached coefficient block for one crossing.
    type Coeffs: Copy + Debug + PartialEq + Send + Sync + 'static;

    /// Short algebra name, used in entry point names.
    const NAME: &'static str;

    /// Raw `f32` values per pair in the phase parameter array `p`.
    const PHASE_PARAMS: usize;

    /// Raw `f32` values per pair in the secondary parameter array `s`.
    ///
    /// Zero means the algebra ignores `s` entirely.
    const SPLITTER_PARAMS: usize;

    /// Coefficients of the identity crossing.
    fn identity() -> Self::Coeffs;

    /// Derive the cached coefficient block for one pair.
    ///
    /// `phase` has exactly [`PHASE_PARAMS`](Crossing::PHASE_PARAMS)
    /// values. `splitter` has exactly
    /// [`SPLITTER_PARAMS`](Crossing::SPLITTER_PARAMS) values, or is `None`
    /// when the caller supplied no secondary array (treated as all zero).
    fn derive(phase: &[f32], splitter: Option<&[f32]>) -> Self::Coeffs;

    /// Apply the crossing to the pair `(a, b)`.
    ///
    /// When `participates` is false the pair is returned unchanged. Lanes
    /// still call this in lock-step so every lane follows the same path.
    fn matmult(
        coeffs: &Self::Coeffs,
        a: Self::Elem,
        b: Self::Elem,
        participates: bool,
    ) -> (Self::Elem, Self::Elem);

    /// Dense 2×2 matrix `T` with `(a', b') = T · (a, b)`.
    fn transfer_matrix(coeffs: &Self::Coeffs) -> [[Complex64; 2]; 2];
}
