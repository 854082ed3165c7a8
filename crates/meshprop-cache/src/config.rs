//! Working-set cache configuration.

use crate::error::CacheError;

/// Configuration for the working-set cache.
///
/// Fixed per kernel build; validated once by [`validate`](Self::validate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Layers per tile (`L0`). Each block of the sweep covers one tile.
    ///
    /// Default: 8. Must be at least 1.
    pub depth: usize,

    /// Tiles resident at once (`nL`). `depth * prefetch` layers are
    /// pretouched on the first fill.
    ///
    /// Default: 2. Must be even and at least 2, so the ring splits into
    /// two equal halves that alternate between prefetch and consumption.
    pub prefetch: usize,
}

impl CacheConfig {
    /// Default tile depth.
    pub const DEFAULT_DEPTH: usize = 8;

    /// Default prefetch multiplier.
    pub const DEFAULT_PREFETCH: usize = 2;

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.depth == 0 {
            return Err(CacheError::InvalidDepth { depth: self.depth });
        }
        if self.prefetch < 2 || self.prefetch % 2 != 0 {
            return Err(CacheError::InvalidPrefetch {
                prefetch: self.prefetch,
            });
        }
        Ok(())
    }

    /// Total rows held by the cache (`depth * prefetch`).
    pub fn window_layers(&self) -> usize {
        self.depth * self.prefetch
    }

    /// Tiles per half of the ring.
    pub fn half(&self) -> usize {
        self.prefetch / 2
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            depth: Self::DEFAULT_DEPTH,
            prefetch: Self::DEFAULT_PREFETCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = CacheConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.window_layers(), 16);
        assert_eq!(cfg.half(), 1);
    }

    #[test]
    fn zero_depth_rejected() {
        let cfg = CacheConfig {
            depth: 0,
            ..CacheConfig::default()
        };
        assert_eq!(cfg.validate(), Err(CacheError::InvalidDepth { depth: 0 }));
    }

    #[test]
    fn odd_prefetch_rejected() {
        let cfg = CacheConfig {
            prefetch: 3,
            ..CacheConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(CacheError::InvalidPrefetch { prefetch: 3 })
        );
    }

    #[test]
    fn zero_prefetch_rejected() {
        let cfg = CacheConfig {
            prefetch: 0,
            ..CacheConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(CacheError::InvalidPrefetch { prefetch: 0 })
        ));
    }
}
