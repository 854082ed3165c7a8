//! Symmetric (reciprocal) crossing on complex state.
//!
//! The transfer matrix has equal off-diagonal entries and conjugate
//! diagonal entries, so three reals describe it completely:
//!
//! ```text
//! T = | τ     i·r |     τ = tau_re + i·tau_im
//!     | i·r   τ̄   |     |τ|² + r² = 1
//! ```
//!
//! Raw parameters per pair are `(theta, phi)`: `τ = cos θ · e^{iφ}`,
//! `r = sin θ`. `θ = 0, φ = 0` is the identity.

use meshprop_core::{Complex32, Complex64, Crossing};

/// Cached symmetric crossing coefficients (3 reals).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SymmetricCoeffs {
    /// Real part of the diagonal entry `τ`.
    pub tau_re: f32,
    /// Imaginary part of the diagonal entry `τ`.
    pub tau_im: f32,
    /// Coupling amplitude `r` of the off-diagonal entries `i·r`.
    pub r: f32,
}

/// Symmetric real-parametrised crossing (3 real coefficients).
#[derive(Clone, Copy, Debug, Default)]
pub struct SymmetricCrossing;

impl Crossing for SymmetricCrossing {
    type Elem = Complex32;
    type Coeffs = SymmetricCoeffs;

    const NAME: &'static str = "sym";
    const PHASE_PARAMS: usize = 2;
    const SPLITTER_PARAMS: usize = 0;

    fn identity() -> SymmetricCoeffs {
        SymmetricCoeffs {
            tau_re: 1.0,
            tau_im: 0.0,
            r: 0.0,
        }
    }

    fn derive(phase: &[f32], _splitter: Option<&[f32]>) -> SymmetricCoeffs {
        let (theta, phi) = (f64::from(phase[0]), f64::from(phase[1]));
        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_p, cos_p) = phi.sin_cos();
        SymmetricCoeffs {
            tau_re: (cos_t * cos_p) as f32,
            tau_im: (cos_t * sin_p) as f32,
            r: sin_t as f32,
        }
    }

    #[inline]
    fn matmult(
        coeffs: &SymmetricCoeffs,
        a: Complex32,
        b: Complex32,
        participates: bool,
    ) -> (Complex32, Complex32) {
        if !participates {
            return (a, b);
        }
        let tau = Complex32::new(coeffs.tau_re, coeffs.tau_im);
        // i·r·z = r·(−z.im + i·z.re)
        let ir_a = Complex32::new(-coeffs.r * a.im, coeffs.r * a.re);
        let ir_b = Complex32::new(-coeffs.r * b.im, coeffs.r * b.re);
        (tau * a + ir_b, ir_a + tau.conj() * b)
    }

    fn transfer_matrix(coeffs: &SymmetricCoeffs) -> [[Complex64; 2]; 2] {
        let tau = Complex64::new(f64::from(coeffs.tau_re), f64::from(coeffs.tau_im));
        let ir = Complex64::new(0.0, f64::from(coeffs.r));
        [[tau, ir], [ir, tau.conj()]]
    }
}
