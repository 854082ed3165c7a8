//! Bulk-memory view of per-layer descriptors and raw crossing parameters.
//!
//! [`LayerParams`] borrows the caller's arrays as-is. Resolving it against a
//! crossing algebra and a mesh width produces a [`LayerSource`], which has
//! checked every bound the cache fill will touch. After that, staging a row
//! cannot fail.

use std::marker::PhantomData;

use meshprop_core::{Alignment, Crossing, LayerTopology};

use crate::error::CacheError;
use crate::row::LayerRow;

/// Borrowed bulk arrays describing every layer of a mesh.
///
/// Layer `l`'s raw parameters for pair `q` are
/// `p[l*ldp + q*P .. l*ldp + (q+1)*P]`, with `P` the algebra's
/// [`PHASE_PARAMS`](Crossing::PHASE_PARAMS); likewise for `s` with `lds`.
#[derive(Clone, Copy, Debug)]
pub struct LayerParams<'a> {
    /// Active crossings per layer.
    pub lens: &'a [i32],
    /// Shift per layer; parity selects alignment.
    pub shifts: &'a [i32],
    /// Phase parameters, one row per layer.
    pub phases: &'a [f32],
    /// Row stride of `phases`, in `f32` elements.
    pub ldp: usize,
    /// Optional secondary (splitter) parameters, one row per layer.
    pub splitters: Option<&'a [f32]>,
    /// Row stride of `splitters`, in `f32` elements.
    pub lds: usize,
}

impl<'a> LayerParams<'a> {
    /// Validate the arrays for `layers` layers of a `width`-wide mesh under
    /// crossing algebra `C`.
    ///
    /// # Errors
    ///
    /// - [`CacheError::ShortArray`] if `lens`/`shifts` hold fewer than
    ///   `layers` entries, or a coefficient row runs past its array.
    /// - [`CacheError::Layer`] if a shift/length pair is negative or
    ///   extends past `width`.
    /// - [`CacheError::StrideTooSmall`] if a row stride cannot hold a
    ///   layer's active crossings.
    pub fn resolve<C: Crossing>(
        self,
        layers: usize,
        width: usize,
    ) -> Result<LayerSource<'a, C>, CacheError> {
        check_len("lens", self.lens.len(), layers)?;
        check_len("shifts", self.shifts.len(), layers)?;

        let mut topologies = Vec::with_capacity(layers);
        for layer in 0..layers {
            let topology = LayerTopology::new(self.shifts[layer], self.lens[layer])
                .and_then(|t| t.check_width(width).map(|()| t))
                .map_err(|reason| CacheError::Layer { layer, reason })?;

            if topology.length() > 0 {
                let pairs_end = topology.active_pairs().end;
                check_row(
                    "p",
                    self.phases.len(),
                    self.ldp,
                    layer,
                    pairs_end * C::PHASE_PARAMS,
                )?;
                if let (true, Some(s)) = (C::SPLITTER_PARAMS > 0, self.splitters) {
                    check_row("s", s.len(), self.lds, layer, pairs_end * C::SPLITTER_PARAMS)?;
                }
            }
            topologies.push(topology);
        }

        Ok(LayerSource {
            params: self,
            topologies,
            _crossing: PhantomData,
        })
    }
}

fn check_len(array: &'static str, actual: usize, required: usize) -> Result<(), CacheError> {
    if actual < required {
        return Err(CacheError::ShortArray {
            array,
            required,
            actual,
        });
    }
    Ok(())
}

fn check_row(
    array: &'static str,
    len: usize,
    stride: usize,
    layer: usize,
    extent: usize,
) -> Result<(), CacheError> {
    if extent > stride {
        return Err(CacheError::StrideTooSmall {
            array,
            stride,
            required: extent,
        });
    }
    let required = layer
        .checked_mul(stride)
        .and_then(|offset| offset.checked_add(extent))
        .unwrap_or(usize::MAX);
    check_len(array, len, required)
}

/// Validated layer parameters for crossing algebra `C`.
///
/// Shared read-only by every lane of a block during cooperative fills.
#[derive(Debug)]
pub struct LayerSource<'a, C: Crossing> {
    params: LayerParams<'a>,
    topologies: Vec<LayerTopology>,
    _crossing: PhantomData<fn() -> C>,
}

impl<C: Crossing> LayerSource<'_, C> {
    /// Number of layers.
    pub fn layers(&self) -> usize {
        self.topologies.len()
    }

    /// Validated topology of `layer`.
    pub fn topology(&self, layer: usize) -> LayerTopology {
        self.topologies[layer]
    }

    /// Count of layers with odd shift.
    pub fn misaligned_layers(&self) -> usize {
        self.topologies
            .iter()
            .filter(|t| t.alignment() == Alignment::Misaligned)
            .count()
    }

    /// Stage `layer` into `row`: topology, derived coefficients for active
    /// pairs, identity everywhere else.
    ///
    /// `row` must have at least as many pair slots as the mesh width
    /// validated in [`LayerParams::resolve`] implies.
    pub fn stage_row(&self, layer: usize, row: &mut LayerRow<C::Coeffs>) {
        let topology = self.topologies[layer];
        row.layer = Some(layer);
        row.topology = topology;
        row.coeffs.fill(C::identity());

        let splitters = if C::SPLITTER_PARAMS > 0 {
            self.params.splitters
        } else {
            None
        };
        let p_base = layer * self.params.ldp;
        let s_base = layer * self.params.lds;
        for pair in topology.active_pairs() {
            let p0 = p_base + pair * C::PHASE_PARAMS;
            let phase = &self.params.phases[p0..p0 + C::PHASE_PARAMS];
            let splitter = splitters.map(|s| {
                let s0 = s_base + pair * C::SPLITTER_PARAMS;
                &s[s0..s0 + C::SPLITTER_PARAMS]
            });
            row.coeffs[pair] = C::derive(phase, splitter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshprop_core::TopologyError;
    use meshprop_crossings::{MziCrossing, OrthogonalCrossing};

    fn params<'a>(
        lens: &'a [i32],
        shifts: &'a [i32],
        phases: &'a [f32],
        ldp: usize,
    ) -> LayerParams<'a> {
        LayerParams {
            lens,
            shifts,
            phases,
            ldp,
            splitters: None,
            lds: 0,
        }
    }

    #[test]
    fn resolve_valid_mesh() {
        let phases = vec![0.0f32; 3 * 8];
        let src = params(&[4, 3, 0], &[0, 1, 5], &phases, 8)
            .resolve::<MziCrossing>(3, 8)
            .unwrap();
        assert_eq!(src.layers(), 3);
        assert_eq!(src.misaligned_layers(), 2);
        assert_eq!(src.topology(1).active_pairs(), 0..3);
    }

    #[test]
    fn short_lens_rejected() {
        let phases = vec![0.0f32; 16];
        let err = params(&[1], &[0, 0], &phases, 8)
            .resolve::<MziCrossing>(2, 8)
            .unwrap_err();
        assert_eq!(
            err,
            CacheError::ShortArray {
                array: "lens",
                required: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn layer_past_width_rejected() {
        let phases = vec![0.0f32; 16];
        let err = params(&[4], &[1], &phases, 16)
            .resolve::<MziCrossing>(1, 8)
            .unwrap_err();
        assert_eq!(
            err,
            CacheError::Layer {
                layer: 0,
                reason: TopologyError::ExceedsWidth { end: 9, width: 8 }
            }
        );
    }

    #[test]
    fn negative_shift_rejected() {
        let phases = vec![0.0f32; 8];
        let err = params(&[0], &[-2], &phases, 8)
            .resolve::<MziCrossing>(1, 8)
            .unwrap_err();
        assert!(matches!(err, CacheError::Layer { layer: 0, .. }));
    }

    #[test]
    fn small_stride_rejected() {
        // 4 active MZI pairs need 8 floats per row.
        let phases = vec![0.0f32; 64];
        let err = params(&[4], &[0], &phases, 6)
            .resolve::<MziCrossing>(1, 8)
            .unwrap_err();
        assert_eq!(
            err,
            CacheError::StrideTooSmall {
                array: "p",
                stride: 6,
                required: 8
            }
        );
    }

    #[test]
    fn short_phase_array_rejected() {
        let phases = vec![0.0f32; 12];
        let err = params(&[4, 4], &[0, 0], &phases, 8)
            .resolve::<MziCrossing>(2, 8)
            .unwrap_err();
        assert_eq!(
            err,
            CacheError::ShortArray {
                array: "p",
                required: 16,
                actual: 12
            }
        );
    }

    #[test]
    fn short_splitter_array_rejected_only_when_used() {
        let phases = vec![0.0f32; 8];
        let splitters = vec![0.0f32; 2];
        let p = LayerParams {
            lens: &[4],
            shifts: &[0],
            phases: &phases,
            ldp: 8,
            splitters: Some(&splitters),
            lds: 8,
        };
        assert!(matches!(
            p.resolve::<MziCrossing>(1, 8),
            Err(CacheError::ShortArray { array: "s", .. })
        ));
        // Orthogonal crossings never read `s`.
        let p = LayerParams { ldp: 4, ..p };
        assert!(p.resolve::<OrthogonalCrossing>(1, 8).is_ok());
    }

    #[test]
    fn inactive_layers_need_no_coefficients() {
        let src = params(&[0, 0], &[3, 0], &[], 0)
            .resolve::<MziCrossing>(2, 8)
            .unwrap();
        let mut row = LayerRow::new(4, MziCrossing::identity());
        src.stage_row(0, &mut row);
        assert_eq!(row.layer(), Some(0));
        assert!(row.coeffs().iter().all(|c| *c == MziCrossing::identity()));
    }

    #[test]
    fn stage_row_derives_only_active_pairs() {
        // width 8, misaligned layer with crossings on pairs 1 and 2.
        let phases: Vec<f32> = (0..4).map(|q| 0.25 * q as f32).collect();
        let src = params(&[2], &[3], &phases, 4)
            .resolve::<OrthogonalCrossing>(1, 8)
            .unwrap();
        let mut row = LayerRow::new(4, OrthogonalCrossing::identity());
        src.stage_row(0, &mut row);
        assert_eq!(row.alignment(), Alignment::Misaligned);
        assert_eq!(*row.coeff(0), OrthogonalCrossing::identity());
        assert_eq!(*row.coeff(1), OrthogonalCrossing::derive(&[0.25], None));
        assert_eq!(*row.coeff(2), OrthogonalCrossing::derive(&[0.5], None));
        assert_eq!(*row.coeff(3), OrthogonalCrossing::identity());
    }

    #[test]
    fn stage_row_reads_splitters() {
        let phases = [0.3f32, 0.7, 1.1, -0.2];
        let splitters = [0.01f32, -0.02, 0.03, 0.04];
        let src = LayerParams {
            lens: &[2],
            shifts: &[0],
            phases: &phases,
            ldp: 4,
            splitters: Some(&splitters),
            lds: 4,
        }
        .resolve::<MziCrossing>(1, 4)
        .unwrap();
        let mut row = LayerRow::new(2, MziCrossing::identity());
        src.stage_row(0, &mut row);
        assert_eq!(
            *row.coeff(1),
            MziCrossing::derive(&[1.1, -0.2], Some(&[0.03, 0.04]))
        );
    }
}
