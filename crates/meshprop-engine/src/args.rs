//! Launch arguments.

use meshprop_cache::LayerParams;

/// How lanes write their final state into `u_out`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StageMode {
    /// Replace the destination elements.
    #[default]
    Overwrite,
    /// Add onto the existing destination elements.
    Accumulate,
}

/// Everything one launch reads and writes.
///
/// Row `i` of the state batch occupies `u_in[i*ldu .. i*ldu + width]` (and
/// likewise in `u_out`). Elements between `width` and `ldu` are never
/// touched.
#[derive(Debug)]
pub struct LaunchArgs<'a, T> {
    /// Mesh width `N`.
    pub width: usize,
    /// Mesh depth `L`.
    pub layers: usize,
    /// Number of state vectors `B`.
    pub batch: usize,
    /// Active crossings per layer (`L` entries).
    pub lens: &'a [i32],
    /// Shift per layer (`L` entries).
    pub shifts: &'a [i32],
    /// Phase parameters, row stride `ldp`.
    pub p: &'a [f32],
    /// Row stride of `p`.
    pub ldp: usize,
    /// Optional secondary parameters, row stride `lds`.
    pub s: Option<&'a [f32]>,
    /// Row stride of `s`.
    pub lds: usize,
    /// Input state batch.
    pub u_in: &'a [T],
    /// Output state batch.
    pub u_out: &'a mut [T],
    /// Row stride of `u_in` and `u_out`.
    pub ldu: usize,
    /// Output staging mode.
    pub mode: StageMode,
}

impl<'a, T> LaunchArgs<'a, T> {
    /// The layer descriptor and coefficient arrays.
    pub fn params(&self) -> LayerParams<'a> {
        LayerParams {
            lens: self.lens,
            shifts: self.shifts,
            phases: self.p,
            ldp: self.ldp,
            splitters: self.s,
            lds: self.lds,
        }
    }

    /// Minimum length of `u_in` and `u_out`, or `None` on overflow.
    pub fn required_state_len(&self) -> Option<usize> {
        match self.batch {
            0 => Some(0),
            b => (b - 1).checked_mul(self.ldu)?.checked_add(self.width),
        }
    }
}
