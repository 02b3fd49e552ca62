//! Filling element ranges with copies of one value.
//!
//! Three families, each in a live (`fill`) and an uninitialized (`ufill`)
//! flavour:
//!
//! - **Naive** ([`fill`], [`ufill`]): one clone per slot, or one `memset`
//!   when the value of a trivially copyable type is a repeated byte.
//! - **Doubling** ([`opt_fill`], [`opt_ufill`]): clone the value into the
//!   first slot, then keep copying the filled prefix into the region right
//!   after it, doubling the prefix each round. Trivially copyable types need
//!   one `Clone` plus `O(log n)` `memcpy` calls; other types clone slot by
//!   slot from the prefix, since duplicating owned resources byte-wise would
//!   be unsound.
//! - **Hybrid** ([`hybrid_fill`], [`hybrid_ufill`]): naive below
//!   [`HYBRID_FILL_THRESHOLD`] slots, doubling above it.
//!
//! Every variant leaves `dst` holding exactly `dst.len()` values equal to
//! `value`.

use std::mem::{self, MaybeUninit};
use std::ptr;
use std::slice;

use crate::construct::assume_init_mut;
use crate::guard::InitGuard;
use crate::profile::Element;

/// Below this many slots the hybrid fills use the naive algorithm.
pub const HYBRID_FILL_THRESHOLD: usize = 32;

/// The byte every byte of `value` equals, if there is one.
///
/// Only meaningful for trivially copyable types, which have no padding.
fn repeated_byte<T: Element>(value: &T) -> Option<u8> {
    debug_assert!(T::TRIVIALLY_COPYABLE);
    let size = mem::size_of::<T>();
    if size == 0 {
        return None;
    }
    // SAFETY: trivially copyable types have every byte initialized.
    let bytes = unsafe { slice::from_raw_parts((value as *const T).cast::<u8>(), size) };
    let first = bytes[0];
    bytes.iter().all(|&b| b == first).then_some(first)
}

/// Bitwise-copy `value` into each of the `len` slots starting at `base`.
///
/// # Safety
///
/// `T` must be trivially copyable and `base` valid for `len` writes.
unsafe fn splat<T: Element>(base: *mut T, len: usize, value: &T) {
    // SAFETY: forwarded to the caller.
    unsafe {
        if let Some(byte) = repeated_byte(value) {
            ptr::write_bytes(base.cast::<u8>(), byte, len * mem::size_of::<T>());
            return;
        }
        for i in 0..len {
            ptr::copy_nonoverlapping(value, base.add(i), 1);
        }
    }
}

/// Double the filled prefix of `[base, base + len)` until it covers the range.
///
/// # Safety
///
/// `T` must be trivially copyable, `base` valid for `len` slots, and the
/// first `filled >= 1` slots initialized.
unsafe fn double_bitwise<T>(base: *mut T, len: usize, mut filled: usize) {
    while filled < len {
        let chunk = filled.min(len - filled);
        // SAFETY: `[0, chunk)` and `[filled, filled + chunk)` are disjoint and in bounds.
        unsafe { ptr::copy_nonoverlapping(base, base.add(filled), chunk) };
        filled += chunk;
    }
}

/// Assign a clone of `value` to every slot of `dst`.
pub fn fill<T: Element + Clone>(dst: &mut [T], value: &T) {
    if T::TRIVIALLY_COPYABLE {
        // SAFETY: trivially copyable values have no drop glue to skip.
        unsafe { splat(dst.as_mut_ptr(), dst.len(), value) };
        return;
    }
    for slot in dst.iter_mut() {
        slot.clone_from(value);
    }
}

/// Construct a clone of `value` in every slot of the uninitialized `dst`.
///
/// If a `Clone` panics, the clones already written are destroyed.
pub fn ufill<'d, T: Element + Clone>(dst: &'d mut [MaybeUninit<T>], value: &T) -> &'d mut [T] {
    if T::TRIVIALLY_COPYABLE {
        // SAFETY: every slot is written before the range is declared live.
        unsafe {
            splat(dst.as_mut_ptr().cast::<T>(), dst.len(), value);
            return assume_init_mut(dst);
        }
    }
    let mut guard = InitGuard::new(dst);
    while guard.remaining() > 0 {
        guard.push(value.clone());
    }
    guard.finish()
}

/// Doubling fill over live values.
pub fn opt_fill<T: Element + Clone>(dst: &mut [T], value: &T) {
    let len = dst.len();
    if len == 0 {
        return;
    }
    if T::TRIVIALLY_COPYABLE {
        dst[0] = value.clone();
        // SAFETY: the first slot is filled and the type is trivially copyable.
        unsafe { double_bitwise(dst.as_mut_ptr(), len, 1) };
        return;
    }
    dst[0].clone_from(value);
    let mut filled = 1;
    while filled < len {
        let chunk = filled.min(len - filled);
        let (head, tail) = dst.split_at_mut(filled);
        tail[..chunk].clone_from_slice(&head[..chunk]);
        filled += chunk;
    }
}

/// Doubling fill into uninitialized slots.
///
/// If a `Clone` panics, the clones already written are destroyed.
pub fn opt_ufill<'d, T: Element + Clone>(
    dst: &'d mut [MaybeUninit<T>],
    value: &T,
) -> &'d mut [T] {
    let len = dst.len();
    if len == 0 {
        // SAFETY: an empty range is trivially initialized.
        return unsafe { assume_init_mut(dst) };
    }
    if T::TRIVIALLY_COPYABLE {
        dst[0].write(value.clone());
        // SAFETY: the first slot is filled and the type is trivially copyable;
        // doubling then initializes the rest.
        unsafe {
            double_bitwise(dst.as_mut_ptr().cast::<T>(), len, 1);
            return assume_init_mut(dst);
        }
    }
    let mut guard = InitGuard::new(dst);
    guard.push(value.clone());
    while guard.remaining() > 0 {
        let chunk = guard.initialized().min(guard.remaining());
        for i in 0..chunk {
            let next = guard.live()[i].clone();
            guard.push(next);
        }
    }
    guard.finish()
}

/// [`fill`] for short ranges, [`opt_fill`] for long ones.
pub fn hybrid_fill<T: Element + Clone>(dst: &mut [T], value: &T) {
    if dst.len() < HYBRID_FILL_THRESHOLD {
        fill(dst, value);
    } else {
        opt_fill(dst, value);
    }
}

/// [`ufill`] for short ranges, [`opt_ufill`] for long ones.
pub fn hybrid_ufill<'d, T: Element + Clone>(
    dst: &'d mut [MaybeUninit<T>],
    value: &T,
) -> &'d mut [T] {
    if dst.len() < HYBRID_FILL_THRESHOLD {
        ufill(dst, value)
    } else {
        opt_ufill(dst, value)
    }
}
