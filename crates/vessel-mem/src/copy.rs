//! Copying and moving element ranges.
//!
//! Rust moves are always bitwise, so [`umove`] and [`move_assign`] never run
//! user code and cannot fail. Copies go through `Clone` unless the element is
//! trivially copyable, in which case the whole range is one `memcpy`.

use std::mem::MaybeUninit;
use std::ptr;

use crate::construct::{assume_init_mut, destroy};
use crate::guard::InitGuard;
use crate::profile::Element;

/// Copy-assign `src` over the live values in `dst`.
///
/// # Panics
///
/// Panics if the lengths differ. A panicking `Clone` leaves the slots before
/// it assigned and the rest untouched; every slot stays live.
pub fn copy<T: Element + Clone>(src: &[T], dst: &mut [T]) {
    assert_eq!(
        src.len(),
        dst.len(),
        "copy: source has {} elements, destination {}",
        src.len(),
        dst.len()
    );
    if T::TRIVIALLY_COPYABLE {
        // SAFETY: equal lengths, distinct borrows, and the profile allows a
        // byte copy over values with no drop glue.
        unsafe { ptr::copy_nonoverlapping(src.as_ptr(), dst.as_mut_ptr(), src.len()) };
        return;
    }
    dst.clone_from_slice(src);
}

/// Copy-construct `src` into the uninitialized `dst`.
///
/// # Panics
///
/// Panics if the lengths differ. If a `Clone` panics, the clones already
/// written are destroyed before unwinding continues.
pub fn ucopy<'d, T: Element + Clone>(src: &[T], dst: &'d mut [MaybeUninit<T>]) -> &'d mut [T] {
    assert_eq!(
        src.len(),
        dst.len(),
        "ucopy: source has {} elements, destination {}",
        src.len(),
        dst.len()
    );
    if T::TRIVIALLY_COPYABLE {
        // SAFETY: equal lengths, distinct borrows, and a byte copy is a valid clone.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), dst.as_mut_ptr().cast::<T>(), src.len());
            return assume_init_mut(dst);
        }
    }
    let mut guard = InitGuard::new(dst);
    for value in src {
        guard.push(value.clone());
    }
    guard.finish()
}

/// Move-construct `dst.len()` values read from `src` into the uninitialized `dst`.
///
/// # Safety
///
/// `src` must point to `dst.len()` live values that do not overlap `dst`.
/// Ownership moves to `dst`: the source slots are logically uninitialized
/// afterwards and must not be dropped.
pub unsafe fn umove<T>(src: *const T, dst: &mut [MaybeUninit<T>]) -> &mut [T] {
    // SAFETY: forwarded to the caller.
    unsafe {
        ptr::copy_nonoverlapping(src, dst.as_mut_ptr().cast::<T>(), dst.len());
        assume_init_mut(dst)
    }
}

/// Move-assign `dst.len()` values read from `src` over the live values in `dst`.
///
/// The previous values of `dst` are destroyed first.
///
/// # Safety
///
/// Same contract as [`umove`]. If destroying an old value panics, the source
/// values are leaked rather than dropped twice.
pub unsafe fn move_assign<T>(src: *const T, dst: &mut [T]) {
    // SAFETY: forwarded to the caller.
    unsafe {
        destroy(dst);
        ptr::copy_nonoverlapping(src, dst.as_mut_ptr(), dst.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::ManuallyDrop;

    #[test]
    fn copy_trivial_overwrites_destination() {
        let src = [1u32, 2, 3];
        let mut dst = [0u32; 3];
        copy(&src, &mut dst);
        assert_eq!(dst, src);
    }

    #[test]
    fn copy_non_trivial_clones_each_value() {
        let src = vec!["a".to_string(), "b".to_string()];
        let mut dst = vec![String::new(), "old".to_string()];
        copy(&src, &mut dst);
        assert_eq!(dst, src);
    }

    #[test]
    #[should_panic(expected = "copy: source has 2 elements, destination 3")]
    fn copy_length_mismatch_panics() {
        copy(&[1u8, 2], &mut [0u8; 3]);
    }

    #[test]
    fn ucopy_constructs_in_place() {
        let src = vec![vec![1u8], vec![2, 3]];
        let mut slots: [MaybeUninit<Vec<u8>>; 2] = [const { MaybeUninit::uninit() }; 2];
        let live = ucopy(&src, &mut slots);
        assert_eq!(live, &src[..]);
        // SAFETY: not used afterwards.
        unsafe { destroy(live) };
    }

    #[test]
    fn umove_transfers_ownership() {
        let src = ManuallyDrop::new(["x".to_string(), "y".to_string()]);
        let mut slots: [MaybeUninit<String>; 2] = [const { MaybeUninit::uninit() }; 2];
        // SAFETY: `src` is wrapped in ManuallyDrop so the values move exactly once.
        let live = unsafe { umove(src.as_ptr(), &mut slots) };
        assert_eq!(live, &["x".to_string(), "y".to_string()]);
        // SAFETY: not used afterwards.
        unsafe { destroy(live) };
    }

    #[test]
    fn move_assign_replaces_old_values() {
        let src = ManuallyDrop::new(["new".to_string()]);
        let mut dst = ["old".to_string()];
        // SAFETY: `src` is never dropped.
        unsafe { move_assign(src.as_ptr(), &mut dst) };
        assert_eq!(dst[0], "new");
    }
}
