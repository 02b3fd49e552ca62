//! Growable array over memory-mapped storage.

use std::mem;
use std::ops::RangeBounds;
use std::ptr::{self, NonNull};
use std::slice;

use log::{trace, warn};
use vessel_growth::{Exponential, GrowthPolicy};
use vessel_mem::{copy, fill, Element};
use vessel_mmap::{MapConfig, MmapAllocator};

use crate::dynamic::DynArray;
use crate::error::VecError;
use crate::raw::{self, capacity_failure};

/// A growable array whose buffer comes from [`MmapAllocator`].
///
/// Growth asks the kernel to extend the mapping in place, so a large array
/// usually grows without copying. Capacity is always a whole number of
/// pages' worth of elements.
///
/// Unlike [`DynArray`](crate::DynArray), every slot up to the capacity holds
/// a live value: slots past the length are default-constructed when the
/// mapping grows, and removed elements are replaced by defaults. This is why
/// the element type must implement `Default`. For trivially constructible
/// types the defaults cost nothing, since fresh pages are already zero.
///
/// A panicking `Clone` or `Default` can leave an unused slot holding a
/// stale value; such slots are re-defaulted before they are exposed by
/// [`resize_default`](Self::resize_default).
pub struct RemapArray<T: Element + Default, G = Exponential> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
    /// Slots from here to `cap` hold untouched defaults.
    pristine: usize,
    policy: G,
    alloc: MmapAllocator<T>,
}

// SAFETY: the array uniquely owns its mapping, like `Box<[T]>`.
unsafe impl<T: Element + Default + Send, G: Send> Send for RemapArray<T, G> {}
// SAFETY: shared access only hands out `&T`.
unsafe impl<T: Element + Default + Sync, G: Sync> Sync for RemapArray<T, G> {}

impl<T: Element + Default> RemapArray<T, Exponential> {
    /// An empty array with the default doubling policy. Does not map.
    pub fn new() -> Self {
        Self::with_policy(Exponential::default())
    }

    /// An empty array with room for at least `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Result<Self, VecError> {
        let mut out = Self::new();
        out.reserve(capacity)?;
        Ok(out)
    }

    /// `len` default values.
    pub fn with_len(len: usize) -> Result<Self, VecError> {
        let mut out = Self::with_capacity(len)?;
        out.resize_default(len)?;
        Ok(out)
    }
}

impl<T: Element + Default + Clone> RemapArray<T, Exponential> {
    /// `len` clones of `value`.
    pub fn from_elem(len: usize, value: &T) -> Result<Self, VecError> {
        let mut out = Self::with_capacity(len)?;
        out.resize(len, value)?;
        Ok(out)
    }

    /// Clones of the values in `src`.
    pub fn from_slice(src: &[T]) -> Result<Self, VecError> {
        let mut out = Self::with_capacity(src.len())?;
        out.extend_from_slice(src)?;
        Ok(out)
    }
}

impl<T: Element + Default, G> RemapArray<T, G> {
    /// An empty array growing by `policy`. Does not map.
    pub fn with_policy(policy: G) -> Self {
        Self::with_map_config(policy, MapConfig::default())
    }

    /// An empty array growing by `policy`, mapping with `config`.
    pub fn with_map_config(policy: G, config: MapConfig) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            pristine: 0,
            policy,
            alloc: MmapAllocator::with_config(config),
        }
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

    /// Number of constructed slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// The growth policy.
    pub fn policy(&self) -> &G {
        &self.policy
    }

    /// The allocator and its configuration.
    pub fn allocator(&self) -> &MmapAllocator<T> {
        &self.alloc
    }

    /// The live elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are live.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The live elements, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: the first `len` slots are live.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Pointer to the first slot.
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Every constructed slot, including the unused ones.
    fn slots(&mut self) -> &mut [T] {
        // SAFETY: all `cap` slots are live.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.cap) }
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

impl<T: Element + Default, G: GrowthPolicy> RemapArray<T, G> {
    fn remap(&mut self, new_cap: usize) -> Result<(), VecError> {
        // SAFETY: `ptr` and `cap` describe the current allocation.
        self.ptr = unsafe { self.alloc.reallocate(self.ptr, self.cap, new_cap)? };
        trace!("remapped from {} to {new_cap} slots", self.cap);
        self.cap = new_cap;
        Ok(())
    }

    fn grow_for(&mut self, additional: usize) -> Result<(), VecError> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(VecError::CapacityOverflow)?;
        if required <= self.cap {
            return Ok(());
        }
        let wanted = self.policy.next_capacity(self.cap, required)?.max(required);
        let new_cap = self.alloc.capacity_for(wanted)?;
        self.remap(new_cap)
    }

    /// Slots below `end` may be written with non-default values.
    fn dirty_up_to(&mut self, end: usize) {
        self.pristine = self.pristine.max(end);
    }

    /// Replace the unused slots `[from, to)` with defaults.
    fn reset(&mut self, from: usize, to: usize) {
        if T::TRIVIALLY_CONSTRUCTIBLE && T::TRIVIALLY_DESTRUCTIBLE {
            // SAFETY: zero bytes are the default and nothing needs dropping.
            unsafe { ptr::write_bytes(self.ptr.as_ptr().add(from), 0, to - from) };
        } else {
            for slot in &mut self.slots()[from..to] {
                *slot = T::default();
            }
        }
        if self.pristine == to {
            self.pristine = from;
        }
    }

    /// Grow the capacity to hold at least `capacity` elements, rounded up to
    /// whole pages.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), VecError> {
        if capacity > self.cap {
            let new_cap = self.alloc.capacity_for(capacity)?;
            self.remap(new_cap)?;
        }
        Ok(())
    }

    /// Append `value`.
    pub fn push(&mut self, value: T) -> Result<(), VecError> {
        self.grow_for(1)?;
        let len = self.len;
        self.dirty_up_to(len + 1);
        self.slots()[len] = value;
        self.len += 1;
        Ok(())
    }

    /// Append the value produced by `make`. Growth happens before `make`
    /// runs.
    pub fn emplace(&mut self, make: impl FnOnce() -> T) -> Result<&mut T, VecError> {
        self.grow_for(1)?;
        let value = make();
        let len = self.len;
        self.dirty_up_to(len + 1);
        self.len += 1;
        let slot = &mut self.slots()[len];
        *slot = value;
        Ok(slot)
    }

    /// Remove and return the last element, leaving a default in its slot.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let fresh = T::default();
        self.len -= 1;
        let len = self.len;
        let value = mem::replace(&mut self.slots()[len], fresh);
        if self.pristine == len + 1 {
            self.pristine = len;
        }
        Some(value)
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
        let len = self.len;
        self.dirty_up_to(len + 1);
        let slots = self.slots();
        slots[len] = value;
        slots[index..=len].rotate_right(1);
        self.len += 1;
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
        let fresh = T::default();
        let len = self.len;
        self.as_mut_slice()[index..].rotate_left(1);
        self.len -= 1;
        let value = mem::replace(&mut self.slots()[len - 1], fresh);
        if self.pristine == len {
            self.pristine = len - 1;
        }
        Ok(value)
    }

    /// Remove the elements in `range`, shifting later ones down.
    pub fn erase(&mut self, range: impl RangeBounds<usize>) -> Result<(), VecError> {
        let (start, end) = raw::resolve_range(range, self.len)?;
        let len = self.len;
        self.as_mut_slice()[start..].rotate_left(end - start);
        self.len -= end - start;
        self.reset(self.len, len);
        Ok(())
    }

    /// Remove every element from `len` on. Capacity is kept.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let old = mem::replace(&mut self.len, len);
        self.reset(len, old);
    }

    /// Remove every element. Capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Truncate to `len`, or append default values up to `len`.
    pub fn resize_default(&mut self, len: usize) -> Result<(), VecError> {
        if len <= self.len {
            self.truncate(len);
            return Ok(());
        }
        self.grow_for(len - self.len)?;
        let stale_end = self.pristine.min(len);
        if stale_end > self.len {
            self.reset(self.len, stale_end);
        }
        self.len = len;
        self.dirty_up_to(len);
        Ok(())
    }

    /// Exchange contents, capacities, policies and allocators with `other`.
    pub fn swap_with(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<T: Element + Default + Clone, G: GrowthPolicy> RemapArray<T, G> {
    /// Write clones of `src` into the unused slots and rotate them to
    /// `index`.
    fn splice_in(&mut self, index: usize, count: usize, write: impl FnOnce(&mut [T])) {
        let len = self.len;
        self.dirty_up_to(len + count);
        let slots = self.slots();
        write(&mut slots[len..len + count]);
        slots[index..len + count].rotate_right(count);
        self.len += count;
    }

    /// Insert `count` clones of `value` at `index`.
    pub fn insert_n(&mut self, index: usize, count: usize, value: &T) -> Result<&mut [T], VecError> {
        if index > self.len {
            return Err(VecError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        self.grow_for(count)?;
        self.splice_in(index, count, |dst| fill(dst, value));
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
        self.splice_in(index, src.len(), |dst| copy(src, dst));
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

    /// Move the values of `staged` into the leading slots and make them the
    /// whole contents. The capacity must already cover them.
    fn commit(&mut self, staged: DynArray<T>) {
        let count = staged.len();
        let old = self.len;
        self.dirty_up_to(count);
        for (slot, value) in self.slots()[..count].iter_mut().zip(staged) {
            *slot = value;
        }
        self.len = count;
        if old > count {
            self.reset(count, old);
        }
    }

    /// Replace the contents with clones of `src`.
    ///
    /// Clones are staged in a separate buffer before any current element is
    /// replaced, so a panicking `Clone` leaves the array unchanged. Trivially
    /// copyable types are copied in place.
    pub fn assign_slice(&mut self, src: &[T]) -> Result<(), VecError> {
        self.grow_for(src.len().saturating_sub(self.len))?;
        if T::TRIVIALLY_COPYABLE {
            let common = self.len.min(src.len());
            copy(&src[..common], &mut self.as_mut_slice()[..common]);
            self.truncate(common);
            return self.extend_from_slice(&src[common..]);
        }
        let staged = DynArray::from_slice(src)?;
        self.commit(staged);
        Ok(())
    }

    /// Replace the contents with `len` clones of `value`.
    pub fn assign_n(&mut self, len: usize, value: &T) -> Result<(), VecError> {
        self.grow_for(len.saturating_sub(self.len))?;
        if T::TRIVIALLY_COPYABLE {
            let common = self.len.min(len);
            fill(&mut self.as_mut_slice()[..common], value);
            return self.resize(len, value);
        }
        let staged = DynArray::from_elem(len, value)?;
        self.commit(staged);
        Ok(())
    }
}

impl<T: Element + Default, G> Drop for RemapArray<T, G> {
    fn drop(&mut self) {
        // SAFETY: `ptr` and `cap` describe the current allocation, which is
        // never used again.
        if let Err(e) = unsafe { self.alloc.deallocate(self.ptr, self.cap) } {
            warn!("releasing RemapArray storage failed: {e}");
        }
    }
}

impl<T: Element + Default, G: Default> Default for RemapArray<T, G> {
    fn default() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            pristine: 0,
            policy: G::default(),
            alloc: MmapAllocator::new(),
        }
    }
}

impl<T: Element + Default + Clone, G: GrowthPolicy + Clone> Clone for RemapArray<T, G> {
    fn clone(&self) -> Self {
        let mut out = Self::with_map_config(self.policy.clone(), self.alloc.config().clone());
        if let Err(e) = out
            .reserve(self.len)
            .and_then(|()| out.extend_from_slice(self))
        {
            capacity_failure(e);
        }
        out
    }
}

impl<T: Element + Default, G: GrowthPolicy> Extend<T> for RemapArray<T, G> {
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

impl<T: Element + Default, const K: usize> From<[T; K]> for RemapArray<T> {
    fn from(values: [T; K]) -> Self {
        let mut out = Self::new();
        out.extend(values);
        out
    }
}

crate::slice_like!([T: Element + Default, G] RemapArray<T, G>);

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use vessel_test_utils::{census, fail_after, reset_census, Tracked};

    fn page_slots<T>() -> usize {
        MmapAllocator::<T>::new().capacity_for(1).unwrap()
    }

    #[test]
    fn capacity_is_page_rounded() {
        let mut a = RemapArray::<u64>::new();
        assert_eq!(a.capacity(), 0);
        a.push(1).unwrap();
        assert_eq!(a.capacity(), page_slots::<u64>());
    }

    #[test]
    fn growth_across_pages_keeps_values() {
        let n = page_slots::<u32>() * 3 + 5;
        let mut a = RemapArray::new();
        for i in 0..n as u32 {
            a.push(i).unwrap();
        }
        assert_eq!(a.len(), n);
        assert!(a.iter().enumerate().all(|(i, &v)| v as usize == i));
    }

    #[test]
    fn unused_slots_hold_defaults() {
        let mut a = RemapArray::<String>::with_capacity(4).unwrap();
        a.push("a".into()).unwrap();
        a.push("b".into()).unwrap();
        a.truncate(1);
        a.resize_default(3).unwrap();
        assert_eq!(a.as_slice(), &["a", "", ""]);
    }

    #[test]
    fn insert_remove_erase() {
        let mut a = RemapArray::from([1i32, 5]);
        a.insert_slice(1, &[2, 4]).unwrap();
        a.insert(2, 3).unwrap();
        assert_eq!(a.as_slice(), &[1, 2, 3, 4, 5]);
        assert_eq!(a.remove(0), Ok(1));
        a.erase(1..3).unwrap();
        assert_eq!(a.as_slice(), &[2, 5]);
        a.resize_default(4).unwrap();
        assert_eq!(a.as_slice(), &[2, 5, 0, 0]);
    }

    #[test]
    fn insert_n_and_pop() {
        let mut a = RemapArray::from_elem(2, &"x".to_string()).unwrap();
        a.insert_n(1, 3, &"y".to_string()).unwrap();
        assert_eq!(a.as_slice(), &["x", "y", "y", "y", "x"]);
        assert_eq!(a.pop().as_deref(), Some("x"));
        a.resize_default(5).unwrap();
        assert_eq!(a[4], "");
    }

    #[test]
    fn reserve_rounds_up_and_never_shrinks() {
        let mut a = RemapArray::<u8>::new();
        a.reserve(10).unwrap();
        let cap = a.capacity();
        assert!(cap >= 10);
        a.reserve(1).unwrap();
        assert_eq!(a.capacity(), cap);
    }

    #[test]
    fn pinned_config_still_grows() {
        let mut a = RemapArray::with_map_config(Exponential::default(), MapConfig::pinned());
        for i in 0..10u64 {
            match a.push(i) {
                Ok(()) => {}
                // Pinned growth fails when the neighbouring pages are taken.
                Err(VecError::Map(_)) => return,
                Err(e) => panic!("unexpected error {e}"),
            }
        }
        assert_eq!(a.len(), 10);
    }

    #[test]
    fn failed_assign_leaves_contents() {
        reset_census();
        let mut a = RemapArray::<Tracked>::new();
        for v in 0..4 {
            a.push(Tracked::new(v)).unwrap();
        }
        let src: Vec<Tracked> = (10..16).map(Tracked::new).collect();
        fail_after(2);
        let result = catch_unwind(AssertUnwindSafe(|| a.assign_slice(&src)));
        assert!(result.is_err());
        assert_eq!(a.iter().map(Tracked::value).collect::<Vec<_>>(), [0, 1, 2, 3]);
        fail_after(0);
        let result = catch_unwind(AssertUnwindSafe(|| a.assign_n(2, &src[0])));
        assert!(result.is_err());
        assert_eq!(a.iter().map(Tracked::value).collect::<Vec<_>>(), [0, 1, 2, 3]);

        a.assign_n(2, &src[0]).unwrap();
        assert_eq!(a.iter().map(Tracked::value).collect::<Vec<_>>(), [10, 10]);
        a.resize_default(4).unwrap();
        assert_eq!(a.iter().map(Tracked::value).collect::<Vec<_>>(), [10, 10, 0, 0]);
        assert_eq!(census().live, a.capacity() as isize + 6);
    }

    #[test]
    fn assign_trivial_values() {
        let mut a = RemapArray::from([1u32, 2, 3, 4]);
        a.assign_slice(&[5, 6]).unwrap();
        assert_eq!(a.as_slice(), &[5, 6]);
        a.assign_n(6, &9).unwrap();
        assert_eq!(a.as_slice(), &[9; 6]);
        a.truncate(0);
        a.resize_default(3).unwrap();
        assert_eq!(a.as_slice(), &[0; 3]);
    }

    #[test]
    fn clone_and_compare() {
        let a = RemapArray::from_slice(&[3u8, 1, 4]).unwrap();
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(format!("{b:?}"), "[3, 1, 4]");
    }
}
