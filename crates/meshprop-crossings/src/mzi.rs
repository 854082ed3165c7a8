//! General complex crossing: a Mach-Zehnder interferometer with imperfect
//! splitters.
//!
//! Raw parameters per pair are the internal phase `theta` and external
//! phase `phi` (array `p`), plus an optional splitter error pair
//! `(beta0, beta1)` (array `s`). The cached block is the full complex
//! transfer matrix:
//!
//! ```text
//! C  = cos(θ/2)       S  = sin(θ/2)
//! Cp = cos(β0 + β1)   Sp = sin(β0 + β1)
//! Cm = cos(β0 − β1)   Sm = sin(β0 − β1)
//!
//! T = e^{iθ/2} · | e^{iφ}(i·S·Cm − C·Sp)    i·C·Cp − S·Sm   |
//!                | e^{iφ}(i·C·Cp + S·Sm)   −i·S·Cm − C·Sp   |
//! ```
//!
//! With ideal splitters `(θ, φ) = (π, π)` is the bar (identity) state and
//! `θ = 0` the cross state.

use meshprop_core::{Complex32, Complex64, Crossing, StateElem};

/// Cached MZI transfer matrix, single precision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MziCoeffs {
    /// Row-major `T`: `(a', b') = T · (a, b)`.
    pub t: [[Complex32; 2]; 2],
}

/// General complex 2×2 crossing (4 complex coefficients).
#[derive(Clone, Copy, Debug, Default)]
pub struct MziCrossing;

impl MziCrossing {
    /// Double-precision transfer matrix for raw parameters.
    pub fn transfer(theta: f64, phi: f64, beta0: f64, beta1: f64) -> [[Complex64; 2]; 2] {
        let i = Complex64::i();
        let (s, c) = (theta / 2.0).sin_cos();
        let (sp, cp) = (beta0 + beta1).sin_cos();
        let (sm, cm) = (beta0 - beta1).sin_cos();
        let common = Complex64::from_polar(1.0, theta / 2.0);
        let ext = Complex64::from_polar(1.0, phi);
        [
            [
                common * ext * (i * s * cm - c * sp),
                common * (i * c * cp - s * sm),
            ],
            [
                common * ext * (i * c * cp + s * sm),
                common * (-i * s * cm - c * sp),
            ],
        ]
    }
}

impl Crossing for MziCrossing {
    type Elem = Complex32;
    type Coeffs = MziCoeffs;

    const NAME: &'static str = "mzi";
    const PHASE_PARAMS: usize = 2;
    const SPLITTER_PARAMS: usize = 2;

    fn identity() -> MziCoeffs {
        let (one, zero) = (Complex32::new(1.0, 0.0), Complex32::new(0.0, 0.0));
        MziCoeffs {
            t: [[one, zero], [zero, one]],
        }
    }

    fn derive(phase: &[f32], splitter: Option<&[f32]>) -> MziCoeffs {
        let (beta0, beta1) = match splitter {
            Some(s) => (f64::from(s[0]), f64::from(s[1])),
            None => (0.0, 0.0),
        };
        let t = Self::transfer(f64::from(phase[0]), f64::from(phase[1]), beta0, beta1);
        MziCoeffs {
            t: t.map(|row| row.map(Complex32::from_c64)),
        }
    }

    #[inline]
    fn matmult(
        coeffs: &MziCoeffs,
        a: Complex32,
        b: Complex32,
        participates: bool,
    ) -> (Complex32, Complex32) {
        if !participates {
            return (a, b);
        }
        let t = &coeffs.t;
        (t[0][0] * a + t[0][1] * b, t[1][0] * a + t[1][1] * b)
    }

    fn transfer_matrix(coeffs: &MziCoeffs) -> [[Complex64; 2]; 2] {
        coeffs.t.map(|row| row.map(StateElem::to_c64))
    }
}
