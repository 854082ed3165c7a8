//! Cache-specific error types.

use std::error::Error;
use std::fmt;

use meshprop_core::TopologyError;

/// Errors from cache configuration or bulk parameter validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// Tile depth is zero.
    InvalidDepth {
        /// The configured depth.
        depth: usize,
    },
    /// Prefetch multiplier is zero or odd.
    InvalidPrefetch {
        /// The configured multiplier.
        prefetch: usize,
    },
    /// A bulk array is shorter than the mesh requires.
    ShortArray {
        /// Which array (`"lens"`, `"shifts"`, `"p"`, `"s"`).
        array: &'static str,
        /// Minimum length required.
        required: usize,
        /// Actual length supplied.
        actual: usize,
    },
    /// A coefficient row stride cannot hold the layer's active crossings.
    StrideTooSmall {
        /// Which array (`"p"` or `"s"`).
        array: &'static str,
        /// The supplied row stride.
        stride: usize,
        /// Minimum stride required.
        required: usize,
    },
    /// A layer's topology descriptor is invalid.
    Layer {
        /// Index of the offending layer.
        layer: usize,
        /// The underlying topology error.
        reason: TopologyError,
    },
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDepth { depth } => write!(f, "cache depth must be >= 1, got {depth}"),
            Self::InvalidPrefetch { prefetch } => {
                write!(f, "prefetch multiplier must be even and >= 2, got {prefetch}")
            }
            Self::ShortArray {
                array,
                required,
                actual,
            } => write!(
                f,
                "array '{array}' has {actual} elements, at least {required} required"
            ),
            Self::StrideTooSmall {
                array,
                stride,
                required,
            } => write!(
                f,
                "row stride of '{array}' is {stride}, at least {required} required"
            ),
            Self::Layer { layer, reason } => write!(f, "layer {layer}: {reason}"),
        }
    }
}

impl Error for CacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Layer { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
