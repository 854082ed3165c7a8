//! Launch error types.

use std::error::Error;
use std::fmt;

use meshprop_cache::CacheError;

/// Errors returned by [`MeshKernel::launch`](crate::kernel::MeshKernel::launch).
///
/// Every argument check runs before any thread starts; only the last three
/// variants can occur once lanes are running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchError {
    /// Mesh width is zero.
    ZeroWidth,
    /// Mesh width exceeds the entry point's capacity.
    WidthExceedsCapacity {
        /// Requested width.
        width: usize,
        /// `2 * K * group_width`.
        capacity: usize,
    },
    /// A state buffer is too short for the batch.
    ShortStateArray {
        /// `"u_in"` or `"u_out"`.
        array: &'static str,
        /// Minimum length required.
        required: usize,
        /// Actual length supplied.
        actual: usize,
    },
    /// State row stride is smaller than the width.
    StateStrideTooSmall {
        /// Supplied row stride.
        ldu: usize,
        /// Mesh width.
        width: usize,
    },
    /// Layer descriptors or coefficient arrays are invalid.
    Params(CacheError),
    /// A lane or dispatcher thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
    /// A lane thread panicked.
    LanePanicked {
        /// Block the lane belonged to.
        block: usize,
        /// Lane index within the block.
        thread: usize,
    },
    /// A block's barriers were aborted with no failing lane recorded.
    Aborted {
        /// The affected block.
        block: usize,
    },
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroWidth => write!(f, "mesh width must be >= 1"),
            Self::WidthExceedsCapacity { width, capacity } => {
                write!(f, "mesh width {width} exceeds entry point capacity {capacity}")
            }
            Self::ShortStateArray {
                array,
                required,
                actual,
            } => write!(
                f,
                "state array '{array}' has {actual} elements, at least {required} required"
            ),
            Self::StateStrideTooSmall { ldu, width } => {
                write!(f, "state stride {ldu} is smaller than mesh width {width}")
            }
            Self::Params(e) => write!(f, "parameters: {e}"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::LanePanicked { block, thread } => {
                write!(f, "lane {thread} of block {block} panicked")
            }
            Self::Aborted { block } => write!(f, "block {block} aborted"),
        }
    }
}

impl Error for LaunchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Params(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CacheError> for LaunchError {
    fn from(e: CacheError) -> Self {
        Self::Params(e)
    }
}
