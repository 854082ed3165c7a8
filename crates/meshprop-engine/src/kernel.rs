//! [`MeshKernel`]: one compiled forward-propagation entry point.
//!
//! ```text
//!   launch()
//!     |  validate args, resolve layer params     (no threads yet)
//!     |  split u_out into per-block slices
//!     v
//!   [task_tx: unbounded] --> dispatcher 0..W     run_block()
//!                                 |                 lane threads
//!   [reply_rx] <------------------+
//! ```
//!
//! Blocks are independent; dispatchers pull block tasks until the queue
//! drains. All validation happens before the first thread is spawned.

use std::marker::PhantomData;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use meshprop_cache::WindowSchedule;
use meshprop_core::Crossing;

use crate::args::LaunchArgs;
use crate::block::{run_block, BlockInputs};
use crate::config::{ConfigError, KernelConfig};
use crate::error::LaunchError;
use crate::metrics::LaunchMetrics;

/// A block of `u_out` rows handed to a dispatcher.
struct BlockTask<'a, T> {
    index: usize,
    out: &'a mut [T],
}

/// Forward propagation for crossing algebra `C` with `K` pairs per lane.
///
/// Capacity is `2 * K * group_width` elements; any mesh width up to the
/// capacity is accepted.
///
/// # Examples
///
/// ```
/// use meshprop_crossings::OrthogonalCrossing;
/// use meshprop_engine::{KernelConfig, LaunchArgs, MeshKernel, StageMode};
///
/// let config = KernelConfig { group_width: 2, worker_count: Some(1), ..KernelConfig::default() };
/// let kernel = MeshKernel::<OrthogonalCrossing, 2>::new(config).unwrap();
/// assert_eq!(kernel.capacity(), 8);
///
/// // One aligned layer with a single quarter turn on elements (0, 1).
/// let u_in = [1.0f32, 2.0, 3.0, 4.0];
/// let mut u_out = [0.0f32; 4];
/// kernel
///     .launch(LaunchArgs {
///         width: 4,
///         layers: 1,
///         batch: 1,
///         lens: &[1],
///         shifts: &[0],
///         p: &[std::f32::consts::FRAC_PI_2],
///         ldp: 1,
///         s: None,
///         lds: 0,
///         u_in: &u_in,
///         u_out: &mut u_out,
///         ldu: 4,
///         mode: StageMode::Overwrite,
///     })
///     .unwrap();
/// assert!((u_out[0] + 2.0).abs() < 1e-6);
/// assert_eq!(&u_out[2..], &[3.0, 4.0]);
/// ```
#[derive(Debug)]
pub struct MeshKernel<C: Crossing, const K: usize> {
    config: KernelConfig,
    name: String,
    _crossing: PhantomData<fn() -> C>,
}

impl<C: Crossing, const K: usize> MeshKernel<C, K> {
    /// Validate `config` and build the entry point.
    pub fn new(config: KernelConfig) -> Result<Self, ConfigError> {
        if K == 0 {
            return Err(ConfigError::InvalidPairsPerLane { pairs: K });
        }
        config.validate()?;
        Ok(Self {
            config,
            name: format!("fwdprop_{}_K{K}", C::NAME),
            _crossing: PhantomData,
        })
    }

    /// Entry point name, `fwdprop_{algebra}_K{K}`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kernel's configuration.
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Largest mesh width this entry point can propagate.
    pub fn capacity(&self) -> usize {
        2 * K * self.config.group_width
    }

    fn check_args(&self, args: &LaunchArgs<'_, C::Elem>) -> Result<usize, LaunchError> {
        if args.width == 0 {
            return Err(LaunchError::ZeroWidth);
        }
        if args.width > self.capacity() {
            return Err(LaunchError::WidthExceedsCapacity {
                width: args.width,
                capacity: self.capacity(),
            });
        }
        if args.batch == 0 {
            return Ok(0);
        }
        if args.ldu < args.width {
            return Err(LaunchError::StateStrideTooSmall {
                ldu: args.ldu,
                width: args.width,
            });
        }
        let required = args.required_state_len().unwrap_or(usize::MAX);
        for (array, actual) in [("u_in", args.u_in.len()), ("u_out", args.u_out.len())] {
            if actual < required {
                return Err(LaunchError::ShortStateArray {
                    array,
                    required,
                    actual,
                });
            }
        }
        Ok(required)
    }

    /// Propagate `args.batch` state vectors through the mesh.
    ///
    /// # Errors
    ///
    /// Argument and parameter errors are reported before any work starts
    /// and leave `u_out` untouched. Thread failures
    /// ([`LaunchError::ThreadSpawnFailed`], [`LaunchError::LanePanicked`])
    /// may leave some rows written.
    pub fn launch(&self, args: LaunchArgs<'_, C::Elem>) -> Result<LaunchMetrics, LaunchError> {
        let start = Instant::now();
        let required = self.check_args(&args)?;
        let source = args.params().resolve::<C>(args.layers, args.width)?;

        let groups_per_block = self.config.groups_per_block;
        let blocks = args.batch.div_ceil(groups_per_block);
        let schedule = WindowSchedule::new(&self.config.cache, args.layers);
        let mut metrics = LaunchMetrics {
            total_us: 0,
            blocks,
            groups: blocks * groups_per_block,
            threads_per_block: self.config.threads_per_block(),
            layers: args.layers,
            misaligned_layers: source.misaligned_layers(),
            cache_refills: blocks * schedule.refill_count(),
            boundary_exchanges: blocks * groups_per_block * source.misaligned_layers(),
        };
        if blocks == 0 {
            metrics.total_us = start.elapsed().as_micros() as u64;
            return Ok(metrics);
        }

        let inputs = BlockInputs {
            config: &self.config,
            source: &source,
            width: args.width,
            batch: args.batch,
            u_in: args.u_in,
            ldu: args.ldu,
            mode: args.mode,
        };

        let (task_tx, task_rx) = crossbeam_channel::unbounded();
        let (reply_tx, reply_rx) = crossbeam_channel::unbounded();
        let block_rows = groups_per_block * args.ldu;
        for (index, out) in args.u_out[..required].chunks_mut(block_rows).enumerate() {
            // Cannot fail: `task_rx` is alive.
            let _ = task_tx.send(BlockTask { index, out });
        }
        drop(task_tx);

        let workers = self.config.resolved_worker_count().min(blocks);
        let spawn_error = thread::scope(|s| {
            let inputs = &inputs;
            for i in 0..workers {
                let task_rx = task_rx.clone();
                let reply_tx = reply_tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("meshprop-dispatch-{i}"))
                    .spawn_scoped(s, move || dispatch_loop::<C, K>(task_rx, reply_tx, inputs));
                if let Err(e) = spawned {
                    // Dispatchers already running drain the queue.
                    if i == 0 {
                        return Some(LaunchError::ThreadSpawnFailed {
                            reason: format!("dispatcher {i}: {e}"),
                        });
                    }
                    break;
                }
            }
            None
        });
        drop(reply_tx);
        if let Some(e) = spawn_error {
            return Err(e);
        }

        let mut first_error: Option<(usize, LaunchError)> = None;
        for (index, result) in reply_rx.try_iter() {
            if let Err(e) = result {
                match &first_error {
                    Some((seen, _)) if *seen <= index => {}
                    _ => first_error = Some((index, e)),
                }
            }
        }
        if let Some((_, e)) = first_error {
            return Err(e);
        }

        metrics.total_us = start.elapsed().as_micros() as u64;
        Ok(metrics)
    }
}

/// Dispatcher loop: run blocks until the task channel is closed.
fn dispatch_loop<C: Crossing, const K: usize>(
    task_rx: Receiver<BlockTask<'_, C::Elem>>,
    reply_tx: Sender<(usize, Result<(), LaunchError>)>,
    inputs: &BlockInputs<'_, C>,
) {
    while let Ok(task) = task_rx.recv() {
        let result = run_block::<C, K>(inputs, task.index, task.out);
        let _ = reply_tx.send((task.index, result));
    }
}

// Compile-time assertion: kernels are shared across caller threads.
#[allow(dead_code)]
fn assert_shareable<C: Crossing, const K: usize>() {
    fn assert<T: Send + Sync>() {}
    assert::<MeshKernel<C, K>>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::StageMode;
    use meshprop_cache::CacheConfig;
    use meshprop_crossings::{MziCrossing, OrthogonalCrossing};

    fn small_config() -> KernelConfig {
        KernelConfig {
            cache: CacheConfig {
                depth: 2,
                prefetch: 2,
            },
            group_width: 4,
            groups_per_block: 2,
            worker_count: Some(2),
        }
    }

    fn args<'a>(width: usize, u_in: &'a [f32], u_out: &'a mut [f32]) -> LaunchArgs<'a, f32> {
        LaunchArgs {
            width,
            layers: 0,
            batch: 1,
            lens: &[],
            shifts: &[],
            p: &[],
            ldp: 0,
            s: None,
            lds: 0,
            u_in,
            u_out,
            ldu: width,
            mode: StageMode::Overwrite,
        }
    }

    #[test]
    fn name_and_capacity() {
        let k = MeshKernel::<MziCrossing, 3>::new(small_config()).unwrap();
        assert_eq!(k.name(), "fwdprop_mzi_K3");
        assert_eq!(k.capacity(), 24);
    }

    #[test]
    fn zero_pairs_rejected() {
        let err = MeshKernel::<MziCrossing, 0>::new(small_config()).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPairsPerLane { pairs: 0 });
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = KernelConfig {
            group_width: 0,
            ..small_config()
        };
        assert!(MeshKernel::<OrthogonalCrossing, 1>::new(cfg).is_err());
    }

    #[test]
    fn zero_width_rejected() {
        let k = MeshKernel::<OrthogonalCrossing, 1>::new(small_config()).unwrap();
        let mut out = [0.0f32; 4];
        assert_eq!(
            k.launch(args(0, &[], &mut out)).unwrap_err(),
            LaunchError::ZeroWidth
        );
    }

    #[test]
    fn width_over_capacity_rejected() {
        let k = MeshKernel::<OrthogonalCrossing, 1>::new(small_config()).unwrap();
        let u_in = [0.0f32; 9];
        let mut out = [0.0f32; 9];
        assert_eq!(
            k.launch(args(9, &u_in, &mut out)).unwrap_err(),
            LaunchError::WidthExceedsCapacity {
                width: 9,
                capacity: 8
            }
        );
    }

    #[test]
    fn short_output_rejected_before_any_write() {
        let k = MeshKernel::<OrthogonalCrossing, 1>::new(small_config()).unwrap();
        let u_in = [1.0f32; 8];
        let mut out = [5.0f32; 7];
        let mut a = args(4, &u_in, &mut out);
        a.batch = 2;
        assert_eq!(
            k.launch(a).unwrap_err(),
            LaunchError::ShortStateArray {
                array: "u_out",
                required: 8,
                actual: 7
            }
        );
        assert_eq!(out, [5.0; 7]);
    }

    #[test]
    fn small_stride_rejected() {
        let k = MeshKernel::<OrthogonalCrossing, 1>::new(small_config()).unwrap();
        let u_in = [1.0f32; 8];
        let mut out = [0.0f32; 8];
        let mut a = args(4, &u_in, &mut out);
        a.batch = 2;
        a.ldu = 3;
        assert_eq!(
            k.launch(a).unwrap_err(),
            LaunchError::StateStrideTooSmall { ldu: 3, width: 4 }
        );
    }

    #[test]
    fn bad_layer_reported_as_params_error() {
        let k = MeshKernel::<OrthogonalCrossing, 1>::new(small_config()).unwrap();
        let u_in = [1.0f32; 4];
        let mut out = [0.0f32; 4];
        let mut a = args(4, &u_in, &mut out);
        a.layers = 1;
        a.lens = &[3];
        a.shifts = &[0];
        a.p = &[0.0; 3];
        a.ldp = 3;
        assert!(matches!(k.launch(a), Err(LaunchError::Params(_))));
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let k = MeshKernel::<OrthogonalCrossing, 1>::new(small_config()).unwrap();
        let mut out: [f32; 0] = [];
        let mut a = args(4, &[], &mut out);
        a.batch = 0;
        let m = k.launch(a).unwrap();
        assert_eq!(m.blocks, 0);
        assert_eq!(m.groups, 0);
    }

    #[test]
    fn zero_layers_copies_input() {
        let k = MeshKernel::<OrthogonalCrossing, 1>::new(small_config()).unwrap();
        let u_in: Vec<f32> = (0..15).map(|i| i as f32).collect();
        let mut out = vec![0.0f32; 15];
        let mut a = args(5, &u_in, &mut out);
        a.batch = 3;
        let m = k.launch(a).unwrap();
        assert_eq!(out, u_in);
        assert_eq!(m.blocks, 2);
        assert_eq!(m.groups, 4);
        assert_eq!(m.cache_refills, 0);
    }

    #[test]
    fn metrics_count_work() {
        let k = MeshKernel::<OrthogonalCrossing, 1>::new(small_config()).unwrap();
        let u_in = vec![1.0f32; 5 * 8];
        let mut out = vec![0.0f32; 5 * 8];
        let shifts = [0, 1, 0, 1, 1];
        let lens = [4, 3, 4, 3, 0];
        let p = vec![0.5f32; 5 * 4];
        let m = k
            .launch(LaunchArgs {
                width: 8,
                layers: 5,
                batch: 5,
                lens: &lens,
                shifts: &shifts,
                p: &p,
                ldp: 4,
                s: None,
                lds: 0,
                u_in: &u_in,
                u_out: &mut out,
                ldu: 8,
                mode: StageMode::Overwrite,
            })
            .unwrap();
        assert_eq!(m.blocks, 3);
        assert_eq!(m.groups, 6);
        assert_eq!(m.threads_per_block, 8);
        assert_eq!(m.layers, 5);
        assert_eq!(m.misaligned_layers, 3);
        // depth 2 over 5 layers: 3 cache blocks, refills before blocks 0 and 1.
        assert_eq!(m.cache_refills, 3 * 2);
        assert_eq!(m.boundary_exchanges, 6 * 3);
    }
}
