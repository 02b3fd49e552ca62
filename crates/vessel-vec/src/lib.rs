//! Dynamic, fixed-capacity and memory-mapped array containers.
//!
//! Three containers share one interface and differ in where their slots
//! live:
//!
//! | Container | Storage | Capacity | Unused slots |
//! |-----------|---------|----------|--------------|
//! | [`DynArray`] | global heap | chosen by a [`GrowthPolicy`] | uninitialized |
//! | [`StaticArray`] | inline `[T; N]` | fixed `N` | uninitialized |
//! | [`RemapArray`] | anonymous mapping | policy, rounded to pages | default values |
//!
//! All three dereference to `[T]`, so slice methods (indexing, iteration,
//! `first`/`last`, sorting, searching) work directly on them.
//!
//! # Failure semantics
//!
//! Precondition violations and allocation failures are returned as
//! [`VecError`], and a call that returns `Err` leaves the container
//! unchanged. A panic raised by an element's `Clone` or `Default` while a
//! container is running a bulk operation destroys whatever that operation
//! had constructed so far and restores the container's length before the
//! panic propagates; nothing leaks and nothing is dropped twice.
//!
//! # Reference stability
//!
//! Any operation that changes the capacity may move the buffer. The borrow
//! checker already prevents holding references across such calls; raw
//! pointers from [`DynArray::as_ptr`] and friends must be re-fetched.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod dynamic;
pub mod error;
pub mod iter;
mod raw;
pub mod remap;
pub mod static_array;

pub use dynamic::DynArray;
pub use error::VecError;
pub use iter::{IntoIter, StaticIntoIter};
pub use remap::RemapArray;
pub use static_array::StaticArray;
pub use vessel_growth::GrowthPolicy;

/// Slice-backed trait impls for a container with `as_slice`/`as_mut_slice`.
///
/// Comparison, ordering and hashing are element-wise and lexicographic,
/// exactly as for `[T]`.
macro_rules! slice_like {
    ([$($gen:tt)*] $ty:ty) => {
        impl<$($gen)*> ::std::ops::Deref for $ty {
            type Target = [T];

            #[inline]
            fn deref(&self) -> &[T] {
                self.as_slice()
            }
        }

        impl<$($gen)*> ::std::ops::DerefMut for $ty {
            #[inline]
            fn deref_mut(&mut self) -> &mut [T] {
                self.as_mut_slice()
            }
        }

        impl<$($gen)*> AsRef<[T]> for $ty {
            fn as_ref(&self) -> &[T] {
                self.as_slice()
            }
        }

        impl<$($gen)*> AsMut<[T]> for $ty {
            fn as_mut(&mut self) -> &mut [T] {
                self.as_mut_slice()
            }
        }

        impl<$($gen)*> ::std::fmt::Debug for $ty
        where
            T: ::std::fmt::Debug,
        {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_list().entries(self.as_slice()).finish()
            }
        }

        impl<$($gen)*> PartialEq for $ty
        where
            T: PartialEq,
        {
            fn eq(&self, other: &Self) -> bool {
                self.as_slice() == other.as_slice()
            }
        }

        impl<$($gen)*> Eq for $ty where T: Eq {}

        impl<$($gen)*> PartialOrd for $ty
        where
            T: PartialOrd,
        {
            fn partial_cmp(&self, other: &Self) -> Option<::std::cmp::Ordering> {
                self.as_slice().partial_cmp(other.as_slice())
            }
        }

        impl<$($gen)*> Ord for $ty
        where
            T: Ord,
        {
            fn cmp(&self, other: &Self) -> ::std::cmp::Ordering {
                self.as_slice().cmp(other.as_slice())
            }
        }

        impl<$($gen)*> ::std::hash::Hash for $ty
        where
            T: ::std::hash::Hash,
        {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                ::std::hash::Hash::hash(self.as_slice(), state)
            }
        }

        impl<'a, $($gen)*> IntoIterator for &'a $ty {
            type Item = &'a T;
            type IntoIter = ::std::slice::Iter<'a, T>;

            fn into_iter(self) -> Self::IntoIter {
                self.as_slice().iter()
            }
        }

        impl<'a, $($gen)*> IntoIterator for &'a mut $ty {
            type Item = &'a mut T;
            type IntoIter = ::std::slice::IterMut<'a, T>;

            fn into_iter(self) -> Self::IntoIter {
                self.as_mut_slice().iter_mut()
            }
        }
    };
}

pub(crate) use slice_like;
