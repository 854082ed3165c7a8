//! Sequential double-precision reference propagation.
//!
//! Applies each layer's active crossings as a block-diagonal map, one
//! instance at a time, in `f64`. Coefficients are derived through the same
//! [`Crossing::derive`] as the kernel, then widened with
//! [`Crossing::transfer_matrix`], so the comparison isolates the sweep.

use meshprop_core::{Complex64, Crossing, LayerTopology, StateElem};

use crate::fixtures::RandomMesh;

/// Propagate every instance of `mesh`; returns one row of `width` values
/// per instance.
pub fn reference_propagate<C: Crossing>(mesh: &RandomMesh<C::Elem>) -> Vec<Vec<Complex64>> {
    (0..mesh.batch)
        .map(|i| {
            let mut x: Vec<Complex64> = mesh.input_row(i).iter().map(|v| v.to_c64()).collect();
            for layer in 0..mesh.layers {
                apply_layer::<C>(mesh, layer, &mut x);
            }
            x
        })
        .collect()
}

fn apply_layer<C: Crossing>(mesh: &RandomMesh<C::Elem>, layer: usize, x: &mut [Complex64]) {
    let topology = LayerTopology::new(mesh.shifts[layer], mesh.lens[layer])
        .expect("fixture topology is valid");
    for pair in topology.active_pairs() {
        let p0 = layer * mesh.ldp + pair * C::PHASE_PARAMS;
        let phase = &mesh.phases[p0..p0 + C::PHASE_PARAMS];
        let splitter = match (&mesh.splitters, C::SPLITTER_PARAMS) {
            (Some(s), n) if n > 0 => {
                let s0 = layer * mesh.lds + pair * n;
                Some(&s[s0..s0 + n])
            }
            _ => None,
        };
        let t = C::transfer_matrix(&C::derive(phase, splitter));
        let (a, b) = topology.pair_elements(pair);
        let (xa, xb) = (x[a], x[b]);
        x[a] = t[0][0] * xa + t[0][1] * xb;
        x[b] = t[1][0] * xa + t[1][1] * xb;
    }
}

/// `‖got − want‖ / ‖want‖`, or the absolute error when `want` is zero.
pub fn relative_error<T: StateElem>(got: &[T], want: &[Complex64]) -> f64 {
    assert_eq!(got.len(), want.len(), "length mismatch");
    let diff: f64 = got
        .iter()
        .zip(want)
        .map(|(g, w)| (g.to_c64() - w).norm_sqr())
        .sum();
    let norm: f64 = want.iter().map(|w| w.norm_sqr()).sum();
    if norm == 0.0 {
        diff.sqrt()
    } else {
        (diff / norm).sqrt()
    }
}

/// Per-instance relative error of a kernel output buffer against the
/// reference.
pub fn row_errors<C: Crossing>(mesh: &RandomMesh<C::Elem>, u_out: &[C::Elem]) -> Vec<f64> {
    reference_propagate::<C>(mesh)
        .iter()
        .enumerate()
        .map(|(i, want)| {
            let row = &u_out[i * mesh.ldu..i * mesh.ldu + mesh.width];
            relative_error(row, want)
        })
        .collect()
}
