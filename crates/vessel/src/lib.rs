//! Vessel: array containers with pluggable growth and storage.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Vessel sub-crates. For most users, adding `vessel` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use vessel::prelude::*;
//!
//! // A heap array that grows by 16 slots at a time.
//! let mut a = DynArray::<u32, _>::with_policy(Linear::new(16).unwrap());
//! a.extend_from_slice(&[1, 2, 3]).unwrap();
//! a.insert_n(1, 2, &9).unwrap();
//! assert_eq!(a.as_slice(), [1, 9, 9, 2, 3]);
//! assert_eq!(a.capacity(), 16);
//!
//! // An inline array refuses to outgrow its slots.
//! let mut s = StaticArray::<u8, 2>::new();
//! s.push(1).unwrap();
//! s.push(2).unwrap();
//! assert!(matches!(s.push(3), Err(VecError::CapacityExceeded { .. })));
//!
//! // A mapped array keeps default values in every unused slot.
//! let mut r = RemapArray::<u64>::with_len(4).unwrap();
//! r[0] = 7;
//! r.truncate(1);
//! r.resize_default(4).unwrap();
//! assert_eq!(r.as_slice(), [7, 0, 0, 0]);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for items not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`mem`] | `vessel-mem` | `Element` traits and bulk construct/copy/fill primitives |
//! | [`growth`] | `vessel-growth` | Growth policies and their configuration |
//! | [`mmap`] | `vessel-mmap` | Page-granular anonymous-mapping allocator |
//! | [`vec`] | `vessel-vec` | `DynArray`, `StaticArray`, `RemapArray` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Element capabilities and bulk memory primitives (`vessel-mem`).
///
/// The [`mem::Element`] trait describes how a type may be constructed,
/// copied and destroyed; the free functions pick the cheapest strategy
/// from it.
pub use vessel_mem as mem;

/// Capacity growth policies (`vessel-growth`).
///
/// Provides the [`growth::GrowthPolicy`] trait, the concrete policies and
/// [`growth::GrowthConfig`] for choosing one at runtime.
pub use vessel_growth as growth;

/// Memory-mapped allocation (`vessel-mmap`).
///
/// [`mmap::MmapAllocator`] hands out page-rounded regions and grows them in
/// place when the kernel allows it.
pub use vessel_mmap as mmap;

/// Array containers (`vessel-vec`).
pub use vessel_vec as vec;

/// Common imports for typical Vessel usage.
///
/// ```rust
/// use vessel::prelude::*;
/// ```
pub mod prelude {
    // Containers
    pub use vessel_vec::{DynArray, RemapArray, StaticArray, VecError};

    // Growth
    pub use vessel_growth::{
        AnyPolicy, BinarySearch, Exponential, GrowthConfig, GrowthError, GrowthPolicy, Linear,
        Switch,
    };

    // Elements
    pub use vessel_mem::Element;

    // Mapped storage
    pub use vessel_mmap::{MapConfig, MapError, MmapAllocator};
}
