//! Pointer-and-count and pointer-range forms of the primitives.
//!
//! Thin wrappers for callers that manage raw buffers: each builds the slice
//! the safe form expects and forwards to it. No bounds are checked.

use std::mem::MaybeUninit;
use std::ptr;
use std::slice;

use crate::profile::Element;

/// Reborrow `n` uninitialized slots starting at `ptr`.
///
/// # Safety
///
/// `ptr` must be valid for `n` writes and not aliased for `'a`.
#[inline]
pub unsafe fn uninit_slots<'a, T>(ptr: *mut T, n: usize) -> &'a mut [MaybeUninit<T>] {
    // SAFETY: forwarded to the caller.
    unsafe { slice::from_raw_parts_mut(ptr.cast::<MaybeUninit<T>>(), n) }
}

/// Reborrow `n` live values starting at `ptr`.
///
/// # Safety
///
/// `ptr` must point to `n` live values not aliased for `'a`.
#[inline]
pub unsafe fn live_slots<'a, T>(ptr: *mut T, n: usize) -> &'a mut [T] {
    // SAFETY: forwarded to the caller.
    unsafe { slice::from_raw_parts_mut(ptr, n) }
}

/// Number of slots in `[begin, end)`.
///
/// # Safety
///
/// Both pointers must come from the same allocation with `begin <= end`.
#[inline]
pub unsafe fn span<T>(begin: *const T, end: *const T) -> usize {
    // SAFETY: forwarded to the caller.
    let n = unsafe { end.offset_from(begin) };
    debug_assert!(n >= 0, "range end precedes begin");
    n as usize
}

/// [`construct`](fn@crate::construct) over `n` slots at `ptr`.
///
/// # Safety
///
/// `ptr` must be valid for `n` writes of uninitialized memory.
pub unsafe fn construct_n<T: Element + Default>(ptr: *mut T, n: usize) {
    // SAFETY: forwarded to the caller.
    crate::construct(unsafe { uninit_slots(ptr, n) });
}

/// [`construct`](fn@crate::construct) over `[begin, end)`.
///
/// # Safety
///
/// See [`construct_n`] and [`span`].
pub unsafe fn construct_range<T: Element + Default>(begin: *mut T, end: *mut T) {
    // SAFETY: forwarded to the caller.
    unsafe { construct_n(begin, span(begin, end)) }
}

/// [`destroy`](fn@crate::destroy) over `n` live values at `ptr`.
///
/// # Safety
///
/// `ptr` must point to `n` live values that are not used again.
pub unsafe fn destroy_n<T>(ptr: *mut T, n: usize) {
    // SAFETY: forwarded to the caller.
    unsafe { crate::destroy(live_slots(ptr, n)) }
}

/// [`destroy`](fn@crate::destroy) over `[begin, end)`.
///
/// # Safety
///
/// See [`destroy_n`] and [`span`].
pub unsafe fn destroy_range<T>(begin: *mut T, end: *mut T) {
    // SAFETY: forwarded to the caller.
    unsafe { destroy_n(begin, span(begin, end)) }
}

/// [`copy`](fn@crate::copy) of `n` values from `src` over the live values
/// at `dst`.
///
/// # Safety
///
/// `src` and `dst` must each point to `n` live values; the ranges must not
/// overlap.
pub unsafe fn copy_n<T: Element + Clone>(src: *const T, n: usize, dst: *mut T) {
    // SAFETY: forwarded to the caller.
    unsafe { crate::copy(slice::from_raw_parts(src, n), live_slots(dst, n)) };
}

/// [`copy`](fn@crate::copy) of `[begin, end)` over the live values at `dst`.
///
/// # Safety
///
/// See [`copy_n`] and [`span`].
pub unsafe fn copy_range<T: Element + Clone>(begin: *const T, end: *const T, dst: *mut T) {
    // SAFETY: forwarded to the caller.
    unsafe { copy_n(begin, span(begin, end), dst) }
}

/// [`ucopy`](crate::ucopy) of `n` values from `src` into `dst`.
///
/// # Safety
///
/// `src` must point to `n` live values, `dst` to `n` uninitialized slots,
/// and the two ranges must not overlap.
pub unsafe fn ucopy_n<T: Element + Clone>(src: *const T, n: usize, dst: *mut T) {
    // SAFETY: forwarded to the caller.
    unsafe { crate::ucopy(slice::from_raw_parts(src, n), uninit_slots(dst, n)) };
}

/// [`ucopy`](crate::ucopy) of `[begin, end)` into `dst`.
///
/// # Safety
///
/// See [`ucopy_n`] and [`span`].
pub unsafe fn ucopy_range<T: Element + Clone>(begin: *const T, end: *const T, dst: *mut T) {
    // SAFETY: forwarded to the caller.
    unsafe { ucopy_n(begin, span(begin, end), dst) }
}

/// [`move_assign`](crate::move_assign) of `n` values from `src` over the
/// live values at `dst`.
///
/// # Safety
///
/// See [`crate::move_assign`]; `dst` must point to `n` live values.
pub unsafe fn move_assign_n<T>(src: *const T, n: usize, dst: *mut T) {
    // SAFETY: forwarded to the caller.
    unsafe { crate::move_assign(src, live_slots(dst, n)) };
}

/// [`move_assign`](crate::move_assign) of `[begin, end)` over the live
/// values at `dst`.
///
/// # Safety
///
/// See [`move_assign_n`] and [`span`].
pub unsafe fn move_assign_range<T>(begin: *const T, end: *const T, dst: *mut T) {
    // SAFETY: forwarded to the caller.
    unsafe { move_assign_n(begin, span(begin, end), dst) }
}

/// [`umove`](crate::umove) of `n` values from `src` into `dst`.
///
/// # Safety
///
/// See [`crate::umove`].
pub unsafe fn umove_n<T>(src: *const T, n: usize, dst: *mut T) {
    // SAFETY: forwarded to the caller.
    unsafe { crate::umove(src, uninit_slots(dst, n)) };
}

/// [`umove`](crate::umove) of `[begin, end)` into `dst`.
///
/// # Safety
///
/// See [`umove_n`] and [`span`].
pub unsafe fn umove_range<T>(begin: *const T, end: *const T, dst: *mut T) {
    // SAFETY: forwarded to the caller.
    unsafe { umove_n(begin, span(begin, end), dst) }
}

/// Move `n` live values from `src` to `dst` where the ranges may overlap.
///
/// Used to shift a tail inside one buffer. Afterwards the slots of `src`
/// not covered by `dst` are logically uninitialized.
///
/// # Safety
///
/// `src` must point to `n` live values and `dst` be valid for `n` writes.
pub unsafe fn relocate<T>(src: *const T, dst: *mut T, n: usize) {
    // SAFETY: forwarded to the caller; `ptr::copy` tolerates overlap.
    unsafe { ptr::copy(src, dst, n) }
}

/// Count and range forms of a fill over live values.
macro_rules! live_fill_forms {
    ($(($fill:ident, $n:ident, $range:ident)),* $(,)?) => {
        $(
            #[doc = concat!("[`", stringify!($fill), "`](fn@crate::", stringify!($fill), ") over `n` live values at `ptr`.")]
            ///
            /// # Safety
            ///
            /// `ptr` must point to `n` live values.
            pub unsafe fn $n<T: Element + Clone>(ptr: *mut T, n: usize, value: &T) {
                // SAFETY: forwarded to the caller.
                crate::$fill(unsafe { live_slots(ptr, n) }, value);
            }

            #[doc = concat!("[`", stringify!($fill), "`](fn@crate::", stringify!($fill), ") over the live values in `[begin, end)`.")]
            ///
            /// # Safety
            ///
            #[doc = concat!("See [`", stringify!($n), "`] and [`span`].")]
            pub unsafe fn $range<T: Element + Clone>(begin: *mut T, end: *mut T, value: &T) {
                // SAFETY: forwarded to the caller.
                unsafe { $n(begin, span(begin, end), value) }
            }
        )*
    };
}

/// Count and range forms of a fill into uninitialized slots.
macro_rules! uninit_fill_forms {
    ($(($fill:ident, $n:ident, $range:ident)),* $(,)?) => {
        $(
            #[doc = concat!("[`", stringify!($fill), "`](fn@crate::", stringify!($fill), ") over `n` slots at `ptr`.")]
            ///
            /// # Safety
            ///
            /// `ptr` must be valid for `n` writes of uninitialized memory.
            pub unsafe fn $n<T: Element + Clone>(ptr: *mut T, n: usize, value: &T) {
                // SAFETY: forwarded to the caller.
                crate::$fill(unsafe { uninit_slots(ptr, n) }, value);
            }

            #[doc = concat!("[`", stringify!($fill), "`](fn@crate::", stringify!($fill), ") over `[begin, end)`.")]
            ///
            /// # Safety
            ///
            #[doc = concat!("See [`", stringify!($n), "`] and [`span`].")]
            pub unsafe fn $range<T: Element + Clone>(begin: *mut T, end: *mut T, value: &T) {
                // SAFETY: forwarded to the caller.
                unsafe { $n(begin, span(begin, end), value) }
            }
        )*
    };
}

live_fill_forms!(
    (fill, fill_n, fill_range),
    (opt_fill, opt_fill_n, opt_fill_range),
    (hybrid_fill, hybrid_fill_n, hybrid_fill_range),
);

uninit_fill_forms!(
    (ufill, ufill_n, ufill_range),
    (opt_ufill, opt_ufill_n, opt_ufill_range),
    (hybrid_ufill, hybrid_ufill_n, hybrid_ufill_range),
);
