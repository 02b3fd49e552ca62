//! Memory-mapped element allocator with in-place growth.
//!
//! [`MmapAllocator`] takes element storage straight from the operating
//! system's virtual memory facility instead of the process heap. Its
//! distinguishing operation is [`reallocate`](MmapAllocator::reallocate):
//! the kernel is asked to extend the existing mapping in place, so growing
//! a large buffer usually copies nothing at all.
//!
//! # Architecture
//!
//! ```text
//! MmapAllocator<T>   element slots, eager default construction, rollback
//! └── sys            page-granular byte mappings
//!     ├── map / unmap
//!     ├── extend_in_place   (Linux: mremap without MAYMOVE)
//!     ├── relocate          (Linux: mremap MAYMOVE)
//!     └── trim
//! ```
//!
//! Every slot an allocation covers is live: `allocate(n)` default-constructs
//! all `n` slots and `reallocate` constructs the added ones. Capacity comes
//! in whole pages ([`MmapAllocator::capacity_for`]).
//!
//! # Fork safety
//!
//! Mappings are private and anonymous. After `fork` the child sees a
//! copy-on-write snapshot; pointers obtained before the fork must not be
//! handed back to the allocator in the other process.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

#[cfg(not(unix))]
compile_error!("vessel-mmap requires a Unix virtual memory API (mmap/munmap)");

pub mod allocator;
pub mod config;
pub mod error;
pub mod sys;

pub use allocator::MmapAllocator;
pub use config::MapConfig;
pub use error::MapError;
