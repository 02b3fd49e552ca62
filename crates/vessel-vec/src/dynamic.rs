//! Heap-backed growable array.

use std::mem::{self, ManuallyDrop, MaybeUninit};
use std::ops::RangeBounds;
use std::ptr;
use std::slice;

use vessel_growth::{Exponential, GrowthPolicy};
use vessel_mem::raw::{destroy_n, umove_n, uninit_slots};
use vessel_mem::{construct, destroy, hybrid_ufill, opt_ufill, ucopy, Element};

use crate::error::VecError;
use crate::iter::IntoIter;
use crate::raw::{self, capacity_failure, RawBuf};

/// A contiguous growable array whose growth is decided by a [`GrowthPolicy`].
///
/// Slots `[0, len)` hold live values, slots `[len, capacity)` are
/// uninitialized. Bulk operations go through the `vessel-mem` primitives, so
/// element types that declare themselves trivial in their [`Element`]
/// profile are copied, filled and constructed with byte operations.
///
/// Capacity only changes when `len` would exceed it (to the policy's
/// answer), on [`reserve`](Self::reserve) (to exactly the amount asked for)
/// and on [`shrink_to_fit`](Self::shrink_to_fit). Any change moves the
/// buffer and invalidates outstanding pointers into it.
///
/// ```
/// use vessel_vec::DynArray;
///
/// let mut a = DynArray::with_capacity(1).unwrap();
/// let mut seen = Vec::new();
/// for i in 0..5 {
///     a.push(i).unwrap();
///     seen.push(a.capacity());
/// }
/// assert_eq!(seen, [1, 2, 4, 4, 8]);
/// ```
pub struct DynArray<T, G = Exponential> {
    buf: RawBuf<T>,
    len: usize,
    policy: G,
}

impl<T> DynArray<T, Exponential> {
    /// An empty array with the default doubling policy. Does not allocate.
    pub fn new() -> Self {
        Self::with_policy(Exponential::default())
    }

    /// An empty array with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Result<Self, VecError> {
        Self::with_capacity_and_policy(capacity, Exponential::default())
    }
}

impl<T: Element + Default> DynArray<T, Exponential> {
    /// `len` default values.
    pub fn with_len(len: usize) -> Result<Self, VecError> {
        let mut out = Self::with_capacity(len)?;
        out.resize_default(len)?;
        Ok(out)
    }
}

impl<T: Element + Clone> DynArray<T, Exponential> {
    /// `len` clones of `value`.
    pub fn from_elem(len: usize, value: &T) -> Result<Self, VecError> {
        let mut out = Self::with_capacity(len)?;
        // SAFETY: `len` slots are allocated, none is live.
        unsafe {
            raw::insert_with(out.buf.ptr(), &mut out.len, 0, len, |slots| {
                opt_ufill(slots, value);
            });
        }
        Ok(out)
    }

    /// Clones of the values in `src`.
    pub fn from_slice(src: &[T]) -> Result<Self, VecError> {
        let mut out = Self::with_capacity(src.len())?;
        out.extend_from_slice(src)?;
        Ok(out)
    }
}

impl<T, G> DynArray<T, G> {
    /// An empty array growing by `policy`. Does not allocate.
    pub fn with_policy(policy: G) -> Self {
        Self {
            buf: RawBuf::new(),
            len: 0,
            policy,
        }
    }

    /// An empty array growing by `policy` with room for exactly `capacity`
    /// elements.
    pub fn with_capacity_and_policy(capacity: usize, policy: G) -> Result<Self, VecError> {
        let mut out = Self::with_policy(policy);
        out.buf.resize_to(capacity)?;
        Ok(out)
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

    /// Number of allocated slots. `usize::MAX` for zero-sized types.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The growth policy.
    pub fn policy(&self) -> &G {
        &self.policy
    }

    /// The live elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are live.
        unsafe { slice::from_raw_parts(self.buf.ptr(), self.len) }
    }

    /// The live elements, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: the first `len` slots are live.
        unsafe { slice::from_raw_parts_mut(self.buf.ptr(), self.len) }
    }

    /// Pointer to the first slot. Dangling while nothing is allocated.
    pub fn as_ptr(&self) -> *const T {
        self.buf.ptr()
    }

    /// Mutable pointer to the first slot.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.ptr()
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
}

impl<T, G: GrowthPolicy> DynArray<T, G> {
    /// Make room for `additional` more elements, growing by the policy.
    fn grow_for(&mut self, additional: usize) -> Result<(), VecError> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(VecError::CapacityOverflow)?;
        let cap = self.buf.capacity();
        if required <= cap {
            return Ok(());
        }
        let new_cap = self.policy.next_capacity(cap, required)?.max(required);
        self.buf.resize_to(new_cap)
    }

    /// Grow the capacity to exactly `capacity` if it is currently smaller.
    ///
    /// Unlike `Vec::reserve` the argument is a total, not an increment.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), VecError> {
        if capacity > self.buf.capacity() {
            self.buf.resize_to(capacity)?;
        }
        Ok(())
    }

    /// Shrink the capacity to the length.
    pub fn shrink_to_fit(&mut self) -> Result<(), VecError> {
        if self.buf.capacity() > self.len {
            self.buf.resize_to(self.len)?;
        }
        Ok(())
    }

    /// Append `value`.
    pub fn push(&mut self, value: T) -> Result<(), VecError> {
        self.grow_for(1)?;
        // SAFETY: slot `len` is allocated and uninitialized.
        unsafe { self.buf.ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Append the value produced by `make`, constructed directly in its
    /// slot. Growth happens before `make` runs.
    pub fn emplace(&mut self, make: impl FnOnce() -> T) -> Result<&mut T, VecError> {
        self.grow_for(1)?;
        // SAFETY: slot `len` is allocated and uninitialized.
        let slot = unsafe {
            let slot = self.buf.ptr().add(self.len);
            slot.write(make());
            &mut *slot
        };
        self.len += 1;
        Ok(slot)
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was live and is no longer counted.
        Some(unsafe { ptr::read(self.buf.ptr().add(self.len)) })
    }

    /// Insert `value` at `index`, shifting later elements up.
    pub fn insert(&mut self, index: usize, value: T) -> Result<&mut T, VecError> {
        if index > self.len {
            return Err(VecError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        self.grow_for(1)?;
        // SAFETY: room for one more slot; `index <= len`.
        unsafe {
            raw::insert_with(self.buf.ptr(), &mut self.len, index, 1, |slots| {
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
        // SAFETY: `index < len`.
        Ok(unsafe { raw::take_at(self.buf.ptr(), &mut self.len, index) })
    }

    /// Destroy the elements in `range` and close the gap.
    pub fn erase(&mut self, range: impl RangeBounds<usize>) -> Result<(), VecError> {
        let (start, end) = raw::resolve_range(range, self.len)?;
        // SAFETY: the range was checked against `len`.
        unsafe { raw::erase_range(self.buf.ptr(), &mut self.len, start, end) };
        Ok(())
    }

    /// Destroy every element from `len` on. Capacity is kept.
    pub fn truncate(&mut self, len: usize) {
        // SAFETY: `buf` holds `self.len` live values.
        unsafe { raw::truncate(self.buf.ptr(), &mut self.len, len) };
    }

    /// Destroy every element. Capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Exchange contents, capacities and policies with `other`.
    pub fn swap_with(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<T: Element + Clone, G: GrowthPolicy> DynArray<T, G> {
    /// Insert `count` clones of `value` at `index`.
    pub fn insert_n(&mut self, index: usize, count: usize, value: &T) -> Result<&mut [T], VecError> {
        if index > self.len {
            return Err(VecError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        self.grow_for(count)?;
        // SAFETY: room for `count` more slots; `index <= len`.
        unsafe {
            raw::insert_with(self.buf.ptr(), &mut self.len, index, count, |slots| {
                hybrid_ufill(slots, value);
            });
        }
        Ok(&mut self.as_mut_slice()[index..index + count])
    }

    /// Insert clones of the values in `src` at `index`.
    pub fn insert_slice(&mut self, index: usize, src: &[T]) -> Result<&mut [T], VecError> {
        if index > self.len {
            return Err(VecError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        self.grow_for(src.len())?;
        // SAFETY: room for `src.len()` more slots; `index <= len`.
        unsafe {
            raw::insert_with(self.buf.ptr(), &mut self.len, index, src.len(), |slots| {
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
    /// The new elements go into the spare slots after the live ones when
    /// they fit there, otherwise into a fresh buffer. If `fill` panics the
    /// array is left exactly as it was.
    fn assign_with(
        &mut self,
        count: usize,
        fill: impl FnOnce(&mut [MaybeUninit<T>]),
    ) -> Result<(), VecError> {
        let cap = self.buf.capacity();
        let old = self.len;
        if cap - old >= count {
            // SAFETY: `[old, old + count)` is allocated and uninitialized.
            unsafe {
                raw::insert_with(self.buf.ptr(), &mut self.len, old, count, fill);
                raw::erase_range(self.buf.ptr(), &mut self.len, 0, old);
            }
            return Ok(());
        }
        let new_cap = if count <= cap {
            cap
        } else {
            self.policy.next_capacity(cap, count)?.max(count)
        };
        let mut staged = RawBuf::new();
        staged.resize_to(new_cap)?;
        // SAFETY: the staged buffer holds `new_cap >= count` slots.
        fill(unsafe { uninit_slots(staged.ptr(), count) });
        let retired = mem::replace(&mut self.buf, staged);
        let retired_len = mem::replace(&mut self.len, count);
        // SAFETY: the retired buffer's live prefix is never used again; the
        // buffer is released when `retired` drops.
        unsafe { destroy_n(retired.ptr(), retired_len) };
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

impl<T: Element + Default, G: GrowthPolicy> DynArray<T, G> {
    /// Truncate to `len`, or append default values up to `len`.
    pub fn resize_default(&mut self, len: usize) -> Result<(), VecError> {
        if len <= self.len {
            self.truncate(len);
            return Ok(());
        }
        let end = self.len;
        let count = len - end;
        self.grow_for(count)?;
        // SAFETY: room for `count` more slots, appended at the end.
        unsafe {
            raw::insert_with(self.buf.ptr(), &mut self.len, end, count, |slots| {
                construct(slots);
            });
        }
        Ok(())
    }
}

impl<T, G> Drop for DynArray<T, G> {
    fn drop(&mut self) {
        // SAFETY: the first `len` slots are live and never used again; the
        // buffer itself is released by `RawBuf`.
        unsafe { destroy(slice::from_raw_parts_mut(self.buf.ptr(), self.len)) };
    }
}

impl<T, G: Default> Default for DynArray<T, G> {
    fn default() -> Self {
        Self {
            buf: RawBuf::new(),
            len: 0,
            policy: G::default(),
        }
    }
}

impl<T: Element + Clone, G: GrowthPolicy + Clone> Clone for DynArray<T, G> {
    /// A copy with capacity equal to the length.
    fn clone(&self) -> Self {
        let mut out = Self::with_policy(self.policy.clone());
        if let Err(e) = out
            .reserve(self.len)
            .and_then(|()| out.extend_from_slice(self))
        {
            capacity_failure(e);
        }
        out
    }
}

impl<T, G: GrowthPolicy> Extend<T> for DynArray<T, G> {
    /// # Panics
    ///
    /// Panics if the array cannot grow.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        if let Err(e) = self.grow_for(iter.size_hint().0) {
            capacity_failure(e);
        }
        for value in iter {
            if let Err(e) = self.push(value) {
                capacity_failure(e);
            }
        }
    }
}

impl<T> FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}

impl<T, const K: usize> From<[T; K]> for DynArray<T> {
    fn from(values: [T; K]) -> Self {
        let mut out = Self::new();
        if let Err(e) = out.reserve(K) {
            capacity_failure(e);
        }
        let values = ManuallyDrop::new(values);
        // SAFETY: `K` slots are allocated; the source is never dropped, so
        // each value moves exactly once.
        unsafe { umove_n(values.as_ptr(), K, out.buf.ptr()) };
        out.len = K;
        out
    }
}

impl<T, G> IntoIterator for DynArray<T, G> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the buffer moves out once and
        // the policy is dropped exactly once here.
        unsafe {
            let buf = ptr::read(&this.buf);
            ptr::drop_in_place(&mut this.policy);
            IntoIter::new(buf, this.len)
        }
    }
}

crate::slice_like!([T, G] DynArray<T, G>);
