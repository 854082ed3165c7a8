//! Seeded random meshes.
//!
//! Each layer gets a random shift in `0..=width-2` and a random number of active
//! crossings that fits behind it. Parameters and inputs are standard
//! normal samples.

use meshprop_core::{Complex64, Crossing, StateElem};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// A complete set of launch inputs, owned.
///
/// All fields are public so tests can build or tweak fixtures by hand.
#[derive(Clone, Debug)]
pub struct RandomMesh<T> {
    pub width: usize,
    pub layers: usize,
    pub batch: usize,
    pub lens: Vec<i32>,
    pub shifts: Vec<i32>,
    pub phases: Vec<f32>,
    pub ldp: usize,
    pub splitters: Option<Vec<f32>>,
    pub lds: usize,
    pub u_in: Vec<T>,
    pub ldu: usize,
}

/// Standard normal sample via Box-Muller (no `rand_distr` dependency).
fn gaussian(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-300);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

impl<T: StateElem> RandomMesh<T> {
    /// Random placement of crossings on every layer.
    pub fn generate<C: Crossing<Elem = T>>(
        seed: u64,
        width: usize,
        layers: usize,
        batch: usize,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut shifts = Vec::with_capacity(layers);
        let mut lens = Vec::with_capacity(layers);
        for _ in 0..layers {
            if width < 2 {
                shifts.push(0);
                lens.push(0);
                continue;
            }
            let shift = rng.random_range(0..=width - 2);
            let len = rng.random_range(0..=(width - shift) / 2);
            shifts.push(shift as i32);
            lens.push(len as i32);
        }
        Self::with_topology::<C>(&mut rng, width, batch, shifts, lens)
    }

    /// Fully populated mesh alternating aligned and misaligned layers.
    pub fn dense<C: Crossing<Elem = T>>(
        seed: u64,
        width: usize,
        layers: usize,
        batch: usize,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let shifts: Vec<i32> = (0..layers).map(|l| (l % 2) as i32).collect();
        let lens = shifts
            .iter()
            .map(|&shift| ((width - shift as usize) / 2) as i32)
            .collect();
        Self::with_topology::<C>(&mut rng, width, batch, shifts, lens)
    }

    fn with_topology<C: Crossing<Elem = T>>(
        rng: &mut ChaCha8Rng,
        width: usize,
        batch: usize,
        shifts: Vec<i32>,
        lens: Vec<i32>,
    ) -> Self {
        let layers = shifts.len();
        let pairs = width / 2;
        let ldp = pairs * C::PHASE_PARAMS;
        let phases = (0..layers * ldp).map(|_| gaussian(rng) as f32).collect();
        let (splitters, lds) = if C::SPLITTER_PARAMS > 0 {
            let lds = pairs * C::SPLITTER_PARAMS;
            let s = (0..layers * lds).map(|_| gaussian(rng) as f32).collect();
            (Some(s), lds)
        } else {
            (None, 0)
        };
        let u_in = (0..batch * width)
            .map(|_| T::from_c64(Complex64::new(gaussian(rng), gaussian(rng))))
            .collect();
        Self {
            width,
            layers,
            batch,
            lens,
            shifts,
            phases,
            ldp,
            splitters,
            lds,
            u_in,
            ldu: width,
        }
    }

    /// Re-lay the input rows with stride `ldu`, padding with `fill`.
    pub fn with_stride(mut self, ldu: usize, fill: T) -> Self {
        assert!(ldu >= self.width, "stride {ldu} below width {}", self.width);
        let mut u_in = vec![fill; self.batch * ldu];
        for i in 0..self.batch {
            u_in[i * ldu..i * ldu + self.width].copy_from_slice(self.input_row(i));
        }
        self.u_in = u_in;
        self.ldu = ldu;
        self
    }

    /// The `width` live elements of input row `i`.
    pub fn input_row(&self, i: usize) -> &[T] {
        &self.u_in[i * self.ldu..i * self.ldu + self.width]
    }

    /// Minimum length of an output buffer for this batch.
    pub fn output_len(&self) -> usize {
        match self.batch {
            0 => 0,
            b => (b - 1) * self.ldu + self.width,
        }
    }

    /// Number of layers with odd shift.
    pub fn misaligned_layers(&self) -> usize {
        self.shifts.iter().filter(|&&s| s % 2 != 0).count()
    }
}
