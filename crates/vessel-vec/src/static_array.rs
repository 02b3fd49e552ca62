//! Fixed-capacity array with inline storage.

use std::mem::{self, ManuallyDrop, MaybeUninit};
use std::ops::RangeBounds;
use std::ptr;
use std::slice;

use vessel_mem::raw::umove_n;
use vessel_mem::{construct, destroy, hybrid_ufill, opt_ufill, ucopy, Element};

use crate::error::VecError;
use crate::iter::StaticIntoIter;
use crate::raw::{self, capacity_failure};

/// An array of at most `N` elements stored inline, without a heap allocation.
///
/// Offers the same operations as [`DynArray`](crate::DynArray) except
/// those that change capacity. An operation that would need more than `N`
/// slots returns [`VecError::CapacityExceeded`] and changes nothing.
///
/// ```
/// use vessel_vec::{StaticArray, VecError};
///
/// let mut a = StaticArray::<i32, 10>::new();
/// for i in 0..10 {
///     a.push(i).unwrap();
/// }
/// assert_eq!(a.len(), 10);
/// assert_eq!(
///     a.push(10),
///     Err(VecError::CapacityExceeded { requested: 11, capacity: 10 })
/// );
/// ```
pub struct StaticArray<T, const N: usize> {
    buf: [MaybeUninit<T>; N],
    len: usize,
}

impl<T, const N: usize> StaticArray<T, N> {
    /// An empty array.
    pub const fn new() -> Self {
        Self {
            buf: [const { MaybeUninit::uninit() }; N],
            len: 0,
        }
    }

    /// An empty array, checking that `capacity` fits.
    pub fn with_capacity(capacity: usize) -> Result<Self, VecError> {
        if capacity > N {
            return Err(VecError::CapacityExceeded {
                requested: capacity,
                capacity: N,
            });
        }
        Ok(Self::new())
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if there are no live elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` if every slot is live.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// The fixed capacity `N`.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    fn base(&mut self) -> *mut T {
        self.buf.as_mut_ptr().cast::<T>()
    }

    /// The live elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are live.
        unsafe { slice::from_raw_parts(self.buf.as_ptr().cast::<T>(), self.len) }
    }

    /// The live elements, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len;
        // SAFETY: the first `len` slots are live.
        unsafe { slice::from_raw_parts_mut(self.base(), len) }
    }

    /// Pointer to the first slot.
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr().cast::<T>()
    }

    /// Mutable pointer to the first slot.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.base()
    }

    /// Checked access.
    pub fn at(&self, index: usize) -> Result<&T, VecError> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(VecError::OutOfBounds { index, len })
    }

    /// Checked mutable access.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, VecError> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(VecError::OutOfBounds { index, len })
    }

    fn check_room(&self, additional: usize) -> Result<(), VecError> {
        match self.len.checked_add(additional) {
            Some(requested) if requested <= N => Ok(()),
            Some(requested) => Err(VecError::CapacityExceeded {
                requested,
                capacity: N,
            }),
            None => Err(VecError::CapacityOverflow),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), VecError> {
        if index > self.len {
            return Err(VecError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(())
    }

    /// Append `value`.
    pub fn push(&mut self, value: T) -> Result<(), VecError> {
        self.check_room(1)?;
        let len = self.len;
        self.buf[len].write(value);
        self.len += 1;
        Ok(())
    }

    /// Append the value produced by `make`, constructed in its slot.
    /// `make` does not run when the array is full.
    pub fn emplace(&mut self, make: impl FnOnce() -> T) -> Result<&mut T, VecError> {
        self.check_room(1)?;
        let len = self.len;
        let slot: *mut T = self.buf[len].write(make());
        self.len += 1;
        // SAFETY: the slot is live and inside `self`.
        Ok(unsafe { &mut *slot })
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was live and is no longer counted.
        Some(unsafe { self.buf[self.len].assume_init_read() })
    }

    /// Insert `value` at `index`, shifting later elements up.
    pub fn insert(&mut self, index: usize, value: T) -> Result<&mut T, VecError> {
        self.check_index(index)?;
        self.check_room(1)?;
        let base = self.base();
        // SAFETY: room for one more slot; `index <= len`.
        unsafe {
            raw::insert_with(base, &mut self.len, index, 1, |slots| {
                slots[0].write(value);
            });
        }
        Ok(&mut self.as_mut_slice()[index])
    }

    /// Remove and return the element at `index`, shifting later ones down.
    pub fn remove(&mut self, index: usize) -> Result<T, VecError> {
        if index >= self.len {
            return Err(VecError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        let base = self.base();
        // SAFETY: `index < len`.
        Ok(unsafe { raw::take_at(base, &mut self.len, index) })
    }

    /// Destroy the elements in `range` and close the gap.
    pub fn erase(&mut self, range: impl RangeBounds<usize>) -> Result<(), VecError> {
        let (start, end) = raw::resolve_range(range, self.len)?;
        let base = self.base();
        // SAFETY: the range was checked against `len`.
        unsafe { raw::erase_range(base, &mut self.len, start, end) };
        Ok(())
    }

    /// Destroy every element from `len` on.
    pub fn truncate(&mut self, len: usize) {
        let base = self.base();
        // SAFETY: `buf` holds `self.len` live values.
        unsafe { raw::truncate(base, &mut self.len, len) };
    }

    /// Destroy every element.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Exchange contents with `other`.
    pub fn swap_with(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<T: Element + Clone, const N: usize> StaticArray<T, N> {
    /// `len` clones of `value`.
    pub fn from_elem(len: usize, value: &T) -> Result<Self, VecError> {
        let mut out = Self::with_capacity(len)?;
        let live = opt_ufill(&mut out.buf[..len], value);
        out.len = live.len();
        Ok(out)
    }

    /// Clones of the values in `src`.
    pub fn from_slice(src: &[T]) -> Result<Self, VecError> {
        let mut out = Self::with_capacity(src.len())?;
        let live = ucopy(src, &mut out.buf[..src.len()]);
        out.len = live.len();
        Ok(out)
    }

    /// Insert `count` clones of `value` at `index`.
    pub fn insert_n(&mut self, index: usize, count: usize, value: &T) -> Result<&mut [T], VecError> {
        self.check_index(index)?;
        self.check_room(count)?;
        let base = self.base();
        // SAFETY: room for `count` more slots; `index <= len`.
        unsafe {
            raw::insert_with(base, &mut self.len, index, count, |slots| {
                hybrid_ufill(slots, value);
            });
        }
        Ok(&mut self.as_mut_slice()[index..index + count])
    }

    /// Insert clones of the values in `src` at `index`.
    pub fn insert_slice(&mut self, index: usize, src: &[T]) -> Result<&mut [T], VecError> {
        self.check_index(index)?;
        self.check_room(src.len())?;
        let base = self.base();
        // SAFETY: room for `src.len()` more slots; `index <= len`.
        unsafe {
            raw::insert_with(base, &mut self.len, index, src.len(), |slots| {
                ucopy(src, slots);
            });
        }
        Ok(&mut self.as_mut_slice()[index..index + src.len()])
    }

    /// Append clones of the values in `src`.
    pub fn extend_from_slice(&mut self, src: &[T]) -> Result<(), VecError> {
        self.insert_slice(self.len, src).map(|_| ())
    }

    /// Truncate to `len`, or append clones of `value` up to `len`.
    pub fn resize(&mut self, len: usize, value: &T) -> Result<(), VecError> {
        if len <= self.len {
            self.truncate(len);
            return Ok(());
        }
        self.insert_n(self.len, len - self.len, value).map(|_| ())
    }

    /// Construct `count` new elements with `fill`, then let them replace the
    /// current contents.
    ///
    /// The new elements go into the free slots after the live ones when they
    /// fit there, otherwise into a second inline array. If `fill` panics the
    /// array is left exactly as it was.
    fn assign_with(
        &mut self,
        count: usize,
        fill: impl FnOnce(&mut [MaybeUninit<T>]),
    ) -> Result<(), VecError> {
        if count > N {
            return Err(VecError::CapacityExceeded {
                requested: count,
                capacity: N,
            });
        }
        let old = self.len;
        let base = self.base();
        if N - old >= count {
            // SAFETY: `[old, old + count)` is free.
            unsafe {
                raw::insert_with(base, &mut self.len, old, count, fill);
                raw::erase_range(base, &mut self.len, 0, old);
            }
            return Ok(());
        }
        let mut staged = Self::new();
        let staged_base = staged.base();
        // SAFETY: `count <= N` free slots.
        unsafe { raw::insert_with(staged_base, &mut staged.len, 0, count, fill) };
        drop(mem::replace(self, staged));
        Ok(())
    }

    /// Replace the contents with clones of `src`.
    ///
    /// All clones are made before any current element is destroyed, so a
    /// panicking `Clone` leaves the array unchanged.
    pub fn assign_slice(&mut self, src: &[T]) -> Result<(), VecError> {
        self.assign_with(src.len(), |slots| {
            ucopy(src, slots);
        })
    }

    /// Replace the contents with `len` clones of `value`.
    pub fn assign_n(&mut self, len: usize, value: &T) -> Result<(), VecError> {
        self.assign_with(len, |slots| {
            hybrid_ufill(slots, value);
        })
    }
}

impl<T: Element + Default, const N: usize> StaticArray<T, N> {
    /// `len` default values.
    pub fn with_len(len: usize) -> Result<Self, VecError> {
        let mut out = Self::new();
        out.resize_default(len)?;
        Ok(out)
    }

    /// Truncate to `len`, or append default values up to `len`.
    pub fn resize_default(&mut self, len: usize) -> Result<(), VecError> {
        if len <= self.len {
            self.truncate(len);
            return Ok(());
        }
        self.check_room(len - self.len)?;
        let start = self.len;
        construct(&mut self.buf[start..len]);
        self.len = len;
        Ok(())
    }
}

impl<T, const N: usize> Drop for StaticArray<T, N> {
    fn drop(&mut self) {
        let live = self.as_mut_slice();
        // SAFETY: the live prefix is never used again.
        unsafe { destroy(live) };
    }
}

impl<T, const N: usize> Default for StaticArray<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element + Clone, const N: usize> Clone for StaticArray<T, N> {
    fn clone(&self) -> Self {
        let mut out = Self::new();
        let live = ucopy(self.as_slice(), &mut out.buf[..self.len]);
        out.len = live.len();
        out
    }
}

impl<T, const N: usize> Extend<T> for StaticArray<T, N> {
    /// # Panics
    ///
    /// Panics if the iterator yields more elements than fit.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            if let Err(e) = self.push(value) {
                capacity_failure(e);
            }
        }
    }
}

impl<T, const N: usize, const K: usize> From<[T; K]> for StaticArray<T, N> {
    /// Fails to compile when `K > N`.
    fn from(values: [T; K]) -> Self {
        const { assert!(K <= N, "array does not fit in the StaticArray") };
        let mut out = Self::new();
        let values = ManuallyDrop::new(values);
        // SAFETY: `K <= N` slots; the source is never dropped, so each value
        // moves exactly once.
        unsafe { umove_n(values.as_ptr(), K, out.base()) };
        out.len = K;
        out
    }
}

impl<T, const N: usize> IntoIterator for StaticArray<T, N> {
    type Item = T;
    type IntoIter = StaticIntoIter<T, N>;

    fn into_iter(self) -> StaticIntoIter<T, N> {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the storage moves out once.
        let buf = unsafe { ptr::read(&this.buf) };
        StaticIntoIter::new(buf, this.len)
    }
}

crate::slice_like!([T, const N: usize] StaticArray<T, N>);

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use vessel_test_utils::{census, fail_after, reset_census, Tracked};

    #[test]
    fn eleventh_push_fails() {
        let mut a = StaticArray::<i32, 10>::new();
        for i in 0..10 {
            a.push(i).unwrap();
        }
        assert_eq!(a.len(), 10);
        assert!(a.is_full());
        assert_eq!(
            a.push(10),
            Err(VecError::CapacityExceeded {
                requested: 11,
                capacity: 10,
            })
        );
        assert_eq!(a.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn overflowing_bulk_operations_change_nothing() {
        let mut a = StaticArray::<String, 4>::from_slice(&["a".into(), "b".into()]).unwrap();
        assert!(a.insert_n(1, 3, &"x".into()).is_err());
        assert!(a.insert_slice(0, &["1".into(), "2".into(), "3".into()]).is_err());
        assert!(a.resize(5, &"y".into()).is_err());
        assert!(a.assign_n(5, &"z".into()).is_err());
        assert_eq!(a.as_slice(), &["a", "b"]);
    }

    #[test]
    fn with_capacity_checks_bound() {
        assert!(StaticArray::<u8, 3>::with_capacity(3).is_ok());
        assert_eq!(
            StaticArray::<u8, 3>::with_capacity(4).err(),
            Some(VecError::CapacityExceeded {
                requested: 4,
                capacity: 3,
            })
        );
    }

    #[test]
    fn insert_erase_remove() {
        let mut a = StaticArray::<u32, 8>::from([1, 4]);
        a.insert_slice(1, &[2, 3]).unwrap();
        a.insert(4, 5).unwrap();
        assert_eq!(a.as_slice(), &[1, 2, 3, 4, 5]);
        a.erase(1..3).unwrap();
        assert_eq!(a.remove(1), Ok(4));
        assert_eq!(a.as_slice(), &[1, 5]);
    }

    #[test]
    fn from_elem_and_defaults() {
        let a = StaticArray::<u16, 40>::from_elem(33, &0x0a0b).unwrap();
        assert!(a.iter().all(|&v| v == 0x0a0b));
        let mut b = StaticArray::<String, 4>::with_len(2).unwrap();
        b.resize_default(4).unwrap();
        assert!(b.iter().all(String::is_empty));
        assert!(StaticArray::<u8, 2>::with_len(3).is_err());
    }

    #[test]
    fn clone_and_compare() {
        let a = StaticArray::<Vec<u8>, 3>::from([vec![1], vec![2, 2]]);
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(b.capacity(), 3);
        assert_eq!(format!("{b:?}"), "[[1], [2, 2]]");
    }

    #[test]
    fn emplace_respects_capacity() {
        let mut a = StaticArray::<String, 1>::new();
        a.emplace(|| "one".into()).unwrap();
        let mut ran = false;
        assert!(a
            .emplace(|| {
                ran = true;
                String::new()
            })
            .is_err());
        assert!(!ran);
    }

    #[test]
    fn failed_assign_leaves_contents() {
        reset_census();
        let mut a = StaticArray::<Tracked, 8>::new();
        for v in 0..4 {
            a.push(Tracked::new(v)).unwrap();
        }
        let src: Vec<Tracked> = (10..16).map(Tracked::new).collect();
        // Six new elements do not fit after four live ones.
        fail_after(2);
        let result = catch_unwind(AssertUnwindSafe(|| a.assign_slice(&src)));
        assert!(result.is_err());
        assert_eq!(a.iter().map(Tracked::value).collect::<Vec<_>>(), [0, 1, 2, 3]);
        assert_eq!(census().live, 10);

        // Three do.
        fail_after(1);
        let result = catch_unwind(AssertUnwindSafe(|| a.assign_n(3, &src[5])));
        assert!(result.is_err());
        assert_eq!(a.iter().map(Tracked::value).collect::<Vec<_>>(), [0, 1, 2, 3]);
        assert_eq!(census().live, 10);

        a.assign_slice(&src).unwrap();
        assert_eq!(a.iter().map(Tracked::value).collect::<Vec<_>>(), [10, 11, 12, 13, 14, 15]);
        assert_eq!(census().live, 12);
    }

    #[test]
    fn assign_shrinks_and_grows() {
        let mut a = StaticArray::<i8, 6>::from([1, 2, 3]);
        a.assign_slice(&[7]).unwrap();
        assert_eq!(a.as_slice(), &[7]);
        a.assign_n(6, &-1).unwrap();
        assert_eq!(a.as_slice(), &[-1; 6]);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn never_exceeds_capacity(values in prop::collection::vec(any::<u8>(), 0..40)) {
                let mut a = StaticArray::<u8, 16>::new();
                for (i, &v) in values.iter().enumerate() {
                    let pushed = a.push(v);
                    prop_assert_eq!(pushed.is_ok(), i < 16);
                }
                prop_assert_eq!(a.len(), values.len().min(16));
                prop_assert_eq!(a.as_slice(), &values[..a.len()]);
            }
        }
    }
}
