//! Kernel configuration, validation, and error types.
//!
//! [`KernelConfig`] fixes everything about a kernel build that is not a
//! type parameter: the cache window, the lane-group geometry, and the
//! dispatcher pool size. [`validate()`](KernelConfig::validate) runs once,
//! when a [`MeshKernel`](crate::kernel::MeshKernel) is constructed.

use std::error::Error;
use std::fmt;

use meshprop_cache::{CacheConfig, CacheError};

// ── KernelConfig ───────────────────────────────────────────────────

/// Upper bound on lanes per block (`group_width * groups_per_block`).
pub const MAX_THREADS_PER_BLOCK: usize = 1024;

/// Configuration for a [`MeshKernel`](crate::kernel::MeshKernel).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelConfig {
    /// Working-set cache window. Default: depth 8, prefetch 2.
    pub cache: CacheConfig,
    /// Lanes per lock-step group. Default: 32.
    pub group_width: usize,
    /// Groups sharing one block and one cache. Default: 1.
    pub groups_per_block: usize,
    /// Number of dispatcher threads running blocks concurrently. `None` =
    /// auto-detect (`available_parallelism / 2`, clamped to `[2, 16]`).
    pub worker_count: Option<usize>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            group_width: 32,
            groups_per_block: 1,
            worker_count: None,
        }
    }
}

impl KernelConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()?;
        if self.group_width == 0 {
            return Err(ConfigError::InvalidGroupWidth {
                group_width: self.group_width,
            });
        }
        if self.groups_per_block == 0 {
            return Err(ConfigError::InvalidGroupsPerBlock {
                groups_per_block: self.groups_per_block,
            });
        }
        match self.group_width.checked_mul(self.groups_per_block) {
            Some(threads) if threads <= MAX_THREADS_PER_BLOCK => Ok(()),
            _ => Err(ConfigError::BlockTooLarge {
                threads: self.group_width.saturating_mul(self.groups_per_block),
                max: MAX_THREADS_PER_BLOCK,
            }),
        }
    }

    /// Lanes per block.
    pub fn threads_per_block(&self) -> usize {
        self.group_width * self.groups_per_block
    }

    /// Resolve the actual dispatcher count, applying auto-detection if
    /// `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4);
                (cpus / 2).clamp(2, 16)
            }
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building kernels or registries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Cache configuration is invalid.
    Cache(CacheError),
    /// Lane group width is zero.
    InvalidGroupWidth {
        /// The configured width.
        group_width: usize,
    },
    /// Groups per block is zero.
    InvalidGroupsPerBlock {
        /// The configured count.
        groups_per_block: usize,
    },
    /// Lanes per block exceed [`MAX_THREADS_PER_BLOCK`].
    BlockTooLarge {
        /// Requested lanes per block (saturated on overflow).
        threads: usize,
        /// The upper bound.
        max: usize,
    },
    /// A kernel was instantiated with zero pairs per lane.
    InvalidPairsPerLane {
        /// The compile-time `K`.
        pairs: usize,
    },
    /// An entry point with this name is already registered.
    DuplicateEntryPoint {
        /// The conflicting name.
        name: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache(e) => write!(f, "cache: {e}"),
            Self::InvalidGroupWidth { group_width } => {
                write!(f, "group_width must be >= 1, got {group_width}")
            }
            Self::InvalidGroupsPerBlock { groups_per_block } => {
                write!(f, "groups_per_block must be >= 1, got {groups_per_block}")
            }
            Self::BlockTooLarge { threads, max } => {
                write!(f, "{threads} lanes per block exceeds maximum of {max}")
            }
            Self::InvalidPairsPerLane { pairs } => {
                write!(f, "pairs per lane must be >= 1, got {pairs}")
            }
            Self::DuplicateEntryPoint { name } => {
                write!(f, "entry point '{name}' is already registered")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Cache(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CacheError> for ConfigError {
    fn from(e: CacheError) -> Self {
        Self::Cache(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = KernelConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.threads_per_block(), 32);
    }

    #[test]
    fn cache_errors_propagate() {
        let cfg = KernelConfig {
            cache: CacheConfig {
                depth: 4,
                prefetch: 3,
            },
            ..KernelConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::Cache(CacheError::InvalidPrefetch { prefetch: 3 })
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn zero_group_width_rejected() {
        let cfg = KernelConfig {
            group_width: 0,
            ..KernelConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidGroupWidth { group_width: 0 })
        );
    }

    #[test]
    fn zero_groups_rejected() {
        let cfg = KernelConfig {
            groups_per_block: 0,
            ..KernelConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidGroupsPerBlock { .. })
        ));
    }

    #[test]
    fn oversized_block_rejected() {
        let cfg = KernelConfig {
            group_width: 32,
            groups_per_block: 33,
            ..KernelConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::BlockTooLarge {
                threads: 1056,
                max: 1024
            })
        );
        let cfg = KernelConfig {
            group_width: usize::MAX,
            groups_per_block: 2,
            ..KernelConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::BlockTooLarge { threads: usize::MAX, .. })
        ));
    }

    #[test]
    fn worker_count_clamped() {
        let mut cfg = KernelConfig {
            worker_count: Some(0),
            ..KernelConfig::default()
        };
        assert_eq!(cfg.resolved_worker_count(), 1);
        cfg.worker_count = Some(500);
        assert_eq!(cfg.resolved_worker_count(), 64);
        cfg.worker_count = None;
        let auto = cfg.resolved_worker_count();
        assert!((2..=16).contains(&auto));
    }
}
