//! Container error types.

use std::error::Error;
use std::fmt;

use vessel_growth::GrowthError;
use vessel_mmap::MapError;

/// Errors reported by container operations.
///
/// Every operation that returns one of these leaves the container exactly as
/// it was before the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VecError {
    /// An element index past the end.
    OutOfBounds {
        /// The offending index.
        index: usize,
        /// Length of the container.
        len: usize,
    },
    /// A range that is reversed or extends past the end.
    InvalidRange {
        /// First index of the range.
        start: usize,
        /// One past the last index of the range.
        end: usize,
        /// Length of the container.
        len: usize,
    },
    /// A fixed-capacity container cannot hold the requested number of elements.
    CapacityExceeded {
        /// Number of elements the operation needs.
        requested: usize,
        /// Fixed capacity of the container.
        capacity: usize,
    },
    /// The element count or its byte size does not fit in memory.
    CapacityOverflow,
    /// The global allocator returned no memory.
    AllocFailed {
        /// Size of the failed request in bytes.
        bytes: usize,
    },
    /// The growth policy could not produce a capacity.
    Growth(GrowthError),
    /// The memory-mapped allocator failed.
    Map(MapError),
}

impl fmt::Display for VecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::InvalidRange { start, end, len } => {
                write!(f, "range {start}..{end} invalid for length {len}")
            }
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "capacity exceeded: {requested} elements requested, capacity {capacity}"
                )
            }
            Self::CapacityOverflow => write!(f, "capacity overflow"),
            Self::AllocFailed { bytes } => write!(f, "allocation of {bytes} bytes failed"),
            Self::Growth(e) => write!(f, "growth policy failed: {e}"),
            Self::Map(e) => write!(f, "mapped allocation failed: {e}"),
        }
    }
}

impl Error for VecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Growth(e) => Some(e),
            Self::Map(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GrowthError> for VecError {
    fn from(e: GrowthError) -> Self {
        Self::Growth(e)
    }
}

impl From<MapError> for VecError {
    fn from(e: MapError) -> Self {
        match e {
            MapError::SizeOverflow { .. } => Self::CapacityOverflow,
            other => Self::Map(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_chains_wrapped_errors() {
        let e = VecError::from(GrowthError::Overflow {
            current: 1,
            required: 2,
        });
        assert!(e.source().is_some());
        assert!(VecError::CapacityOverflow.source().is_none());
    }

    #[test]
    fn size_overflow_maps_to_capacity_overflow() {
        assert_eq!(
            VecError::from(MapError::SizeOverflow { elements: 9 }),
            VecError::CapacityOverflow
        );
    }

    #[test]
    fn display_mentions_indices() {
        let e = VecError::OutOfBounds { index: 4, len: 2 };
        assert_eq!(e.to_string(), "index 4 out of bounds for length 2");
    }
}
