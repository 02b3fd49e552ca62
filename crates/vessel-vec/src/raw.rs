//! Buffer plumbing shared by the containers.
//!
//! [`RawBuf`] owns a heap allocation and nothing else: it never reads or
//! drops elements. The free functions edit a run of live values in place
//! given its base pointer and a mutable length, keeping the length
//! consistent if user code panics halfway.

use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::ops::{Bound, RangeBounds};
use std::ptr::{self, NonNull};

use log::trace;
use vessel_mem::raw::{destroy_n, relocate, uninit_slots};

use crate::error::VecError;

/// Heap allocation of `cap` slots of `T`.
///
/// Zero-sized types never allocate and report a capacity of `usize::MAX`.
pub(crate) struct RawBuf<T> {
    ptr: NonNull<T>,
    cap: usize,
    _owns: PhantomData<T>,
}

// SAFETY: `RawBuf` uniquely owns its allocation, like `Box<[T]>`.
unsafe impl<T: Send> Send for RawBuf<T> {}
// SAFETY: shared access hands out nothing but the pointer value.
unsafe impl<T: Sync> Sync for RawBuf<T> {}

impl<T> RawBuf<T> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    pub(crate) const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: if Self::IS_ZST { usize::MAX } else { 0 },
            _owns: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    /// Change the allocation to exactly `new_cap` slots.
    ///
    /// The bytes of the first `min(cap, new_cap)` slots are carried over; the
    /// caller must not hold live values past `new_cap`. Growth always moves
    /// to a fresh block; shrinking may stay in place. On `Err` the old
    /// allocation is untouched.
    pub(crate) fn resize_to(&mut self, new_cap: usize) -> Result<(), VecError> {
        if Self::IS_ZST || new_cap == self.cap {
            return Ok(());
        }
        let new_layout = Layout::array::<T>(new_cap).map_err(|_| VecError::CapacityOverflow)?;
        let old_cap = self.cap;
        if new_cap == 0 {
            self.release();
        } else if new_cap > old_cap {
            // SAFETY: `new_layout` has non-zero size.
            let raw = unsafe { alloc::alloc(new_layout) };
            let fresh = NonNull::new(raw.cast::<T>()).ok_or(VecError::AllocFailed {
                bytes: new_layout.size(),
            })?;
            // SAFETY: distinct blocks; the old one holds `old_cap` slots and
            // was allocated with `self.layout()`.
            unsafe {
                ptr::copy_nonoverlapping(self.ptr.as_ptr(), fresh.as_ptr(), old_cap);
                if old_cap > 0 {
                    alloc::dealloc(self.ptr.as_ptr().cast(), self.layout());
                }
            }
            self.ptr = fresh;
        } else {
            // SAFETY: the old layout is the one this buffer was allocated
            // with and `new_layout` has non-zero size.
            let raw = unsafe {
                alloc::realloc(self.ptr.as_ptr().cast(), self.layout(), new_layout.size())
            };
            self.ptr = NonNull::new(raw.cast::<T>()).ok_or(VecError::AllocFailed {
                bytes: new_layout.size(),
            })?;
        }
        self.cap = new_cap;
        trace!("buffer resized from {old_cap} to {new_cap} slots");
        Ok(())
    }

    fn layout(&self) -> Layout {
        // SAFETY: the same layout was validated by `Layout::array` when the
        // buffer was allocated.
        unsafe {
            Layout::from_size_align_unchecked(self.cap * mem::size_of::<T>(), mem::align_of::<T>())
        }
    }

    fn release(&mut self) {
        if !Self::IS_ZST && self.cap > 0 {
            // SAFETY: allocated by `resize_to` with this layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast(), self.layout()) };
            self.ptr = NonNull::dangling();
            self.cap = 0;
        }
    }
}

impl<T> Drop for RawBuf<T> {
    fn drop(&mut self) {
        self.release();
    }
}

/// A hole of `count` slots at `index` with `tail` live values after it.
///
/// Dropping the guard closes the hole by shifting the tail down and
/// records the resulting length.
struct Gap<'a, T> {
    base: *mut T,
    index: usize,
    count: usize,
    tail: usize,
    len: &'a mut usize,
}

impl<T> Gap<'_, T> {
    /// The hole was filled: keep it and record the grown length.
    fn commit(self) {
        *self.len = self.index + self.count + self.tail;
        mem::forget(self);
    }
}

impl<T> Drop for Gap<'_, T> {
    fn drop(&mut self) {
        // SAFETY: the tail sits `count` slots past the hole inside the buffer.
        unsafe {
            relocate(
                self.base.add(self.index + self.count),
                self.base.add(self.index),
                self.tail,
            );
        }
        *self.len = self.index + self.tail;
    }
}

/// Open `count` slots at `index`, let `fill` construct all of them, and
/// grow `*len` by `count`.
///
/// If `fill` panics it must have destroyed whatever it constructed; the
/// tail is shifted back and `*len` is restored.
///
/// # Safety
///
/// `base` must hold `*len` live values and have room for `*len + count`
/// slots; `index <= *len`.
pub(crate) unsafe fn insert_with<T>(
    base: *mut T,
    len: &mut usize,
    index: usize,
    count: usize,
    fill: impl FnOnce(&mut [MaybeUninit<T>]),
) {
    debug_assert!(index <= *len);
    let tail = *len - index;
    // SAFETY: forwarded to the caller; the ranges lie inside the buffer.
    unsafe { relocate(base.add(index), base.add(index + count), tail) };
    *len = index;
    let gap = Gap {
        base,
        index,
        count,
        tail,
        len,
    };
    // SAFETY: the hole holds no live values.
    fill(unsafe { uninit_slots(base.add(index), count) });
    gap.commit();
}

/// Destroy the values in `[start, end)` and close the hole.
///
/// # Safety
///
/// `base` must hold `*len` live values and `start <= end <= *len`.
pub(crate) unsafe fn erase_range<T>(base: *mut T, len: &mut usize, start: usize, end: usize) {
    debug_assert!(start <= end && end <= *len);
    let tail = *len - end;
    *len = start;
    let _gap = Gap {
        base,
        index: start,
        count: end - start,
        tail,
        len,
    };
    // SAFETY: the range is live and the guard closes it even if a
    // destructor panics.
    unsafe { destroy_n(base.add(start), end - start) };
}

/// Destroy every value from `n` on. No-op if `n >= *len`.
///
/// # Safety
///
/// `base` must hold `*len` live values.
pub(crate) unsafe fn truncate<T>(base: *mut T, len: &mut usize, n: usize) {
    if n >= *len {
        return;
    }
    let old = mem::replace(len, n);
    // SAFETY: `[n, old)` is live and no longer counted.
    unsafe { destroy_n(base.add(n), old - n) };
}

/// Move the value at `index` out and close the hole.
///
/// # Safety
///
/// `base` must hold `*len` live values and `index < *len`.
pub(crate) unsafe fn take_at<T>(base: *mut T, len: &mut usize, index: usize) -> T {
    debug_assert!(index < *len);
    // SAFETY: forwarded to the caller; the slot is live and the tail shift
    // makes it uncounted.
    unsafe {
        let value = ptr::read(base.add(index));
        relocate(base.add(index + 1), base.add(index), *len - index - 1);
        *len -= 1;
        value
    }
}

/// Panic for a growth failure inside a trait method that cannot return it.
#[cold]
#[track_caller]
pub(crate) fn capacity_failure(e: VecError) -> ! {
    panic!("container growth failed: {e}")
}

/// Resolve `range` against a length into `(start, end)`.
pub(crate) fn resolve_range(
    range: impl RangeBounds<usize>,
    len: usize,
) -> Result<(usize, usize), VecError> {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };
    if start > end || end > len {
        return Err(VecError::InvalidRange { start, end, len });
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn raw_buf_grows_and_shrinks() {
        let mut buf = RawBuf::<u32>::new();
        assert_eq!(buf.capacity(), 0);
        buf.resize_to(4).unwrap();
        // SAFETY: four slots allocated.
        unsafe {
            for i in 0..4 {
                buf.ptr().add(i).write(i as u32);
            }
        }
        buf.resize_to(64).unwrap();
        // SAFETY: the first four slots were carried over.
        assert_eq!(unsafe { *buf.ptr().add(3) }, 3);
        buf.resize_to(0).unwrap();
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn growth_never_reuses_the_block() {
        let mut buf = RawBuf::<u64>::new();
        buf.resize_to(1).unwrap();
        for cap in [2usize, 4, 1 << 10, 1 << 16, 1 << 20] {
            let before = buf.ptr();
            // SAFETY: slot 0 is allocated.
            unsafe { before.write(cap as u64) };
            buf.resize_to(cap).unwrap();
            assert_ne!(buf.ptr(), before, "grew to {cap} in place");
            // SAFETY: slot 0 was carried over.
            assert_eq!(unsafe { *buf.ptr() }, cap as u64);
        }
    }

    #[test]
    fn zero_sized_buffers_are_unbounded() {
        let mut buf = RawBuf::<()>::new();
        assert_eq!(buf.capacity(), usize::MAX);
        buf.resize_to(3).unwrap();
        assert_eq!(buf.capacity(), usize::MAX);
    }

    #[test]
    fn layout_overflow_is_reported() {
        let mut buf = RawBuf::<u64>::new();
        assert_eq!(buf.resize_to(usize::MAX), Err(VecError::CapacityOverflow));
    }

    #[test]
    fn insert_with_opens_and_commits() {
        let mut storage = [1u8, 2, 3, 0, 0];
        let mut len = 3;
        // SAFETY: five slots, three live, inserting two at index 1.
        unsafe {
            insert_with(storage.as_mut_ptr(), &mut len, 1, 2, |slots| {
                slots[0].write(8);
                slots[1].write(9);
            });
        }
        assert_eq!(len, 5);
        assert_eq!(storage, [1, 8, 9, 2, 3]);
    }

    #[test]
    fn insert_with_restores_tail_on_panic() {
        let mut storage = [1u8, 2, 3, 0];
        let mut len = 3;
        let base = storage.as_mut_ptr();
        let result = catch_unwind(AssertUnwindSafe(|| {
            // SAFETY: four slots, three live, inserting one at index 0.
            unsafe { insert_with(base, &mut len, 0, 1, |_| panic!("fill failed")) };
        }));
        assert!(result.is_err());
        assert_eq!(len, 3);
        assert_eq!(&storage[..3], &[1, 2, 3]);
    }

    #[test]
    fn erase_range_closes_hole() {
        let mut storage = [1u8, 2, 3, 4, 5];
        let mut len = 5;
        // SAFETY: five live values.
        unsafe { erase_range(storage.as_mut_ptr(), &mut len, 1, 3) };
        assert_eq!(len, 3);
        assert_eq!(&storage[..3], &[1, 4, 5]);
    }

    #[test]
    fn take_at_shifts_down() {
        let mut storage = [7u16, 8, 9];
        let mut len = 3;
        // SAFETY: three live values.
        let v = unsafe { take_at(storage.as_mut_ptr(), &mut len, 0) };
        assert_eq!(v, 7);
        assert_eq!(len, 2);
        assert_eq!(&storage[..2], &[8, 9]);
    }

    #[test]
    fn ranges_resolve_against_length() {
        assert_eq!(resolve_range(.., 4), Ok((0, 4)));
        assert_eq!(resolve_range(1..=2, 4), Ok((1, 3)));
        assert_eq!(resolve_range(4..4, 4), Ok((4, 4)));
        assert_eq!(
            resolve_range(3..5, 4),
            Err(VecError::InvalidRange {
                start: 3,
                end: 5,
                len: 4,
            })
        );
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = resolve_range(3..1, 4);
        assert!(reversed.is_err());
    }
}
