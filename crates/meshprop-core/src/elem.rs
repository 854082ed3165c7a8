//! State vector element types.
//!
//! A mesh propagates either complex amplitudes ([`Complex32`]) or real
//! amplitudes (`f32`). [`StateElem`] is the small amount of arithmetic the
//! staging helpers and reference implementations need on top of `Copy`.

use num_complex::{Complex32, Complex64};
use std::fmt::Debug;

/// One element of a state vector.
///
/// Implemented for `f32` (orthogonal meshes) and [`Complex32`] (general and
/// symmetric meshes). `Default` must be the additive zero; padding lanes
/// are filled with it.
pub trait StateElem: Copy + Default + Debug + PartialEq + Send + Sync + 'static {
    /// Elementwise sum, used by accumulate-mode staging.
    fn accumulate(self, other: Self) -> Self;

    /// Widen to a double-precision complex value.
    fn to_c64(self) -> Complex64;

    /// Narrow from a double-precision complex value.
    ///
    /// Real element types drop the imaginary part.
    fn from_c64(value: Complex64) -> Self;
}

impl StateElem for f32 {
    fn accumulate(self, other: Self) -> Self {
        self + other
    }

    fn to_c64(self) -> Complex64 {
        Complex64::new(f64::from(self), 0.0)
    }

    fn from_c64(value: Complex64) -> Self {
        value.re as f32
    }
}

impl StateElem for Complex32 {
    fn accumulate(self, other: Self) -> Self {
        self + other
    }

    fn to_c64(self) -> Complex64 {
        Complex64::new(f64::from(self.re), f64::from(self.im))
    }

    fn from_c64(value: Complex64) -> Self {
        Complex32::new(value.re as f32, value.im as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_zero() {
        assert_eq!(f32::default(), 0.0);
        assert_eq!(Complex32::default(), Complex32::new(0.0, 0.0));
    }

    #[test]
    fn real_from_c64_drops_imaginary() {
        assert_eq!(f32::from_c64(Complex64::new(1.5, -2.0)), 1.5);
    }

    #[test]
    fn complex_widening_is_exact() {
        let z = Complex32::new(0.25, -3.5);
        assert_eq!(z.to_c64(), Complex64::new(0.25, -3.5));
        assert_eq!(Complex32::from_c64(z.to_c64()), z);
    }

    #[test]
    fn accumulate_adds() {
        assert_eq!(2.0f32.accumulate(0.5), 2.5);
        let sum = Complex32::new(1.0, 2.0).accumulate(Complex32::new(-1.0, 0.5));
        assert_eq!(sum, Complex32::new(0.0, 2.5));
    }
}
