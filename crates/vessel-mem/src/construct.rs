//! Default construction and destruction of element ranges.

use std::mem::{self, MaybeUninit};
use std::ptr;

use crate::guard::InitGuard;
use crate::profile::Element;

/// Default-construct every slot of `dst`, left to right.
///
/// Trivially constructible types are zeroed with a single `memset`; all other
/// types call `T::default()` once per slot. If a `default()` call panics the
/// slots constructed so far are destroyed and `dst` is uninitialized again.
pub fn construct<T: Element + Default>(dst: &mut [MaybeUninit<T>]) -> &mut [T] {
    if T::TRIVIALLY_CONSTRUCTIBLE {
        // SAFETY: the profile guarantees that zero bytes form `T::default()`.
        unsafe {
            ptr::write_bytes(dst.as_mut_ptr(), 0, dst.len());
            return assume_init_mut(dst);
        }
    }
    let mut guard = InitGuard::new(dst);
    while guard.remaining() > 0 {
        guard.push(T::default());
    }
    guard.finish()
}

/// Destroy every value in `live`, left to right.
///
/// A no-op for trivially destructible types. Unlike the other primitives it
/// does not require an [`Element`] profile, so containers can drop elements
/// of any type; [`Element::TRIVIALLY_DESTRUCTIBLE`] is derived from the same
/// drop-glue check.
///
/// # Safety
///
/// The values must not be used or destroyed again afterwards; the memory is
/// logically uninitialized when this returns.
pub unsafe fn destroy<T>(live: &mut [T]) {
    if mem::needs_drop::<T>() {
        // SAFETY: the caller hands over ownership of every value in `live`.
        unsafe { ptr::drop_in_place(live) };
    }
}

/// Reinterpret a fully initialized uninit slice as a live slice.
///
/// # Safety
///
/// Every slot of `slots` must hold a live value.
#[inline]
pub(crate) unsafe fn assume_init_mut<T>(slots: &mut [MaybeUninit<T>]) -> &mut [T] {
    // SAFETY: `MaybeUninit<T>` has the layout of `T` and the caller vouches
    // for initialization.
    unsafe { &mut *(slots as *mut [MaybeUninit<T>] as *mut [T]) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    thread_local! {
        static DEFAULTS: Cell<usize> = const { Cell::new(0) };
    }

    #[derive(Debug, PartialEq)]
    struct Seven(u32);

    impl Default for Seven {
        fn default() -> Self {
            DEFAULTS.with(|d| d.set(d.get() + 1));
            Seven(7)
        }
    }

    // SAFETY: conservative defaults.
    unsafe impl Element for Seven {}

    #[test]
    fn trivial_construct_zeroes_without_calling_default() {
        let mut slots = [MaybeUninit::<u64>::new(0xdead_beef); 6];
        let live = construct(&mut slots);
        assert_eq!(live, &[0; 6]);
    }

    #[test]
    fn non_trivial_construct_calls_default_per_slot() {
        DEFAULTS.with(|d| d.set(0));
        let mut slots: [MaybeUninit<Seven>; 3] = [const { MaybeUninit::uninit() }; 3];
        let live = construct(&mut slots);
        assert_eq!(live, &[Seven(7), Seven(7), Seven(7)]);
        assert_eq!(DEFAULTS.with(Cell::get), 3);
    }

    #[test]
    fn construct_empty_range_is_noop() {
        let mut slots: [MaybeUninit<String>; 0] = [];
        assert!(construct(&mut slots).is_empty());
    }

    #[test]
    fn destroy_releases_owned_values() {
        let mut slots: [MaybeUninit<String>; 2] = [const { MaybeUninit::uninit() }; 2];
        let live = construct(&mut slots);
        live[0].push_str("heap");
        live[1].push_str("allocated");
        // SAFETY: values are not touched again.
        unsafe { destroy(live) };
    }
}
