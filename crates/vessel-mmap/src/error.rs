//! Mapping error types.

use std::error::Error;
use std::fmt;
use std::io;

/// Errors from the memory-mapped allocator.
///
/// `os_error` fields carry the raw `errno` reported by the kernel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapError {
    /// The kernel refused to create a mapping.
    MapFailed {
        /// Size of the requested mapping in bytes.
        bytes: usize,
        /// Raw OS error code.
        os_error: i32,
    },
    /// The kernel could neither extend a mapping in place nor, when allowed,
    /// move it.
    ExtendFailed {
        /// Size the mapping should have grown to, in bytes.
        bytes: usize,
        /// Raw OS error code.
        os_error: i32,
    },
    /// The kernel refused to release a mapping.
    UnmapFailed {
        /// Size of the mapping in bytes.
        bytes: usize,
        /// Raw OS error code.
        os_error: i32,
    },
    /// `reallocate` was asked for fewer elements than the allocation holds.
    ShrinkRequested {
        /// Elements currently allocated.
        current: usize,
        /// Elements requested.
        requested: usize,
    },
    /// The byte size of the request does not fit in `usize`.
    SizeOverflow {
        /// Number of elements requested.
        elements: usize,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MapFailed { bytes, os_error } => write!(
                f,
                "mmap of {bytes} bytes failed: {}",
                io::Error::from_raw_os_error(*os_error)
            ),
            Self::ExtendFailed { bytes, os_error } => write!(
                f,
                "extending mapping to {bytes} bytes failed: {}",
                io::Error::from_raw_os_error(*os_error)
            ),
            Self::UnmapFailed { bytes, os_error } => write!(
                f,
                "munmap of {bytes} bytes failed: {}",
                io::Error::from_raw_os_error(*os_error)
            ),
            Self::ShrinkRequested { current, requested } => write!(
                f,
                "reallocate cannot shrink: {current} elements allocated, {requested} requested"
            ),
            Self::SizeOverflow { elements } => {
                write!(f, "byte size of {elements} elements overflows usize")
            }
        }
    }
}

impl Error for MapError {}
