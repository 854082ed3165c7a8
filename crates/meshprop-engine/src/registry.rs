//! Named entry points, one per (algebra, pairs per lane) build.
//!
//! Each [`MeshKernel<C, K>`] is a separately monomorphised kernel. A
//! [`KernelRegistry`] erases `K` behind [`EntryPoint`] so callers can pick
//! a kernel by name or by the mesh width they need.

use indexmap::IndexMap;
use meshprop_core::{Crossing, StateElem};

use crate::args::LaunchArgs;
use crate::config::{ConfigError, KernelConfig};
use crate::error::LaunchError;
use crate::kernel::MeshKernel;
use crate::metrics::LaunchMetrics;

/// Pairs-per-lane values built by [`standard_registry`].
///
/// At the default group width of 32 these cover widths 64 to 1024.
pub const STANDARD_PAIRS_PER_LANE: [usize; 10] = [1, 2, 3, 4, 5, 6, 8, 10, 12, 16];

/// A launchable kernel over state elements `T`.
pub trait EntryPoint<T: StateElem>: Send + Sync {
    /// Unique entry point name.
    fn name(&self) -> &str;

    /// Pairs owned by each lane (`K`).
    fn pairs_per_lane(&self) -> usize;

    /// Largest mesh width accepted.
    fn capacity(&self) -> usize;

    /// Run one launch. See [`MeshKernel::launch`].
    fn launch(&self, args: LaunchArgs<'_, T>) -> Result<LaunchMetrics, LaunchError>;
}

impl<C: Crossing, const K: usize> EntryPoint<C::Elem> for MeshKernel<C, K> {
    fn name(&self) -> &str {
        MeshKernel::name(self)
    }

    fn pairs_per_lane(&self) -> usize {
        K
    }

    fn capacity(&self) -> usize {
        MeshKernel::capacity(self)
    }

    fn launch(&self, args: LaunchArgs<'_, C::Elem>) -> Result<LaunchMetrics, LaunchError> {
        MeshKernel::launch(self, args)
    }
}

/// Insertion-ordered collection of entry points.
pub struct KernelRegistry<T: StateElem> {
    entries: IndexMap<String, Box<dyn EntryPoint<T>>>,
}

impl<T: StateElem> KernelRegistry<T> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Add an entry point under its own name.
    pub fn register(&mut self, entry: Box<dyn EntryPoint<T>>) -> Result<(), ConfigError> {
        let name = entry.name().to_string();
        if self.entries.contains_key(&name) {
            return Err(ConfigError::DuplicateEntryPoint { name });
        }
        self.entries.insert(name, entry);
        Ok(())
    }

    /// Look up an entry point by name.
    pub fn get(&self, name: &str) -> Option<&dyn EntryPoint<T>> {
        self.entries.get(name).map(|e| e.as_ref())
    }

    /// The smallest-capacity entry point that fits a mesh of `width`.
    ///
    /// Ties go to the entry registered first.
    pub fn for_width(&self, width: usize) -> Option<&dyn EntryPoint<T>> {
        self.entries
            .values()
            .filter(|e| e.capacity() >= width)
            .min_by_key(|e| e.capacity())
            .map(|e| e.as_ref())
    }

    /// Entry point names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entry points.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: StateElem> Default for KernelRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! register_pairs {
    ($registry:expr, $crossing:ty, $config:expr, [$($k:literal),* $(,)?]) => {
        $(
            $registry.register(Box::new(MeshKernel::<$crossing, $k>::new($config.clone())?))?;
        )*
    };
}

/// Registry of every [`STANDARD_PAIRS_PER_LANE`] build of algebra `C`.
///
/// `K` is a const generic, so the list is spelled out again below; the two
/// must stay in the same order.
pub fn standard_registry<C: Crossing>(
    config: &KernelConfig,
) -> Result<KernelRegistry<C::Elem>, ConfigError> {
    let mut registry = KernelRegistry::new();
    register_pairs!(registry, C, config, [1, 2, 3, 4, 5, 6, 8, 10, 12, 16]);
    Ok(registry)
}
