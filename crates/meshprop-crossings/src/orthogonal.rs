//! Orthogonal crossing: a plane rotation on real state.
//!
//! ```text
//! T = | c  −s |     c = cos θ, s = sin θ
//!     | s   c |
//! ```

use meshprop_core::{Complex64, Crossing};

/// Cached rotation coefficients (2 reals).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthogonalCoeffs {
    /// `cos θ`.
    pub c: f32,
    /// `sin θ`.
    pub s: f32,
}

/// Pure orthogonal 2×2 crossing (2 real coefficients, real state).
#[derive(Clone, Copy, Debug, Default)]
pub struct OrthogonalCrossing;

impl Crossing for OrthogonalCrossing {
    type Elem = f32;
    type Coeffs = OrthogonalCoeffs;

    const NAME: &'static str = "orth";
    const PHASE_PARAMS: usize = 1;
    const SPLITTER_PARAMS: usize = 0;

    fn identity() -> OrthogonalCoeffs {
        OrthogonalCoeffs { c: 1.0, s: 0.0 }
    }

    fn derive(phase: &[f32], _splitter: Option<&[f32]>) -> OrthogonalCoeffs {
        let (s, c) = f64::from(phase[0]).sin_cos();
        OrthogonalCoeffs {
            c: c as f32,
            s: s as f32,
        }
    }

    #[inline]
    fn matmult(coeffs: &OrthogonalCoeffs, a: f32, b: f32, participates: bool) -> (f32, f32) {
        if !participates {
            return (a, b);
        }
        (coeffs.c * a - coeffs.s * b, coeffs.s * a + coeffs.c * b)
    }

    fn transfer_matrix(coeffs: &OrthogonalCoeffs) -> [[Complex64; 2]; 2] {
        let c = Complex64::new(f64::from(coeffs.c), 0.0);
        let s = Complex64::new(f64::from(coeffs.s), 0.0);
        [[c, -s], [s, c]]
    }
}
