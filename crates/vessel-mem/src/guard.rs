//! Partial-construction rollback.
//!
//! [`InitGuard`] walks an uninitialized range front to back, counting how
//! many slots hold live values. If it is dropped before [`InitGuard::finish`]
//! (i.e. a constructor panicked and the stack is unwinding), it destroys
//! exactly the slots it counted.

use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::ptr;

/// Scoped guard that destroys the constructed prefix of a range on unwind.
pub struct InitGuard<'a, T> {
    base: *mut T,
    len: usize,
    initialized: usize,
    _slots: PhantomData<&'a mut [MaybeUninit<T>]>,
}

impl<'a, T> InitGuard<'a, T> {
    /// Start guarding `slots`, none of which is initialized yet.
    pub fn new(slots: &'a mut [MaybeUninit<T>]) -> Self {
        Self {
            base: slots.as_mut_ptr().cast::<T>(),
            len: slots.len(),
            initialized: 0,
            _slots: PhantomData,
        }
    }

    /// Write `value` into the next uninitialized slot.
    ///
    /// # Panics
    ///
    /// Panics if every slot is already initialized.
    #[inline]
    pub fn push(&mut self, value: T) {
        assert!(
            self.initialized < self.len,
            "InitGuard overflow: {} slots already initialized",
            self.len
        );
        // SAFETY: `initialized < len`, so the slot lies inside the guarded range
        // and holds no live value.
        unsafe { self.base.add(self.initialized).write(value) };
        self.initialized += 1;
    }

    /// Number of slots constructed so far.
    pub fn initialized(&self) -> usize {
        self.initialized
    }

    /// Number of slots still uninitialized.
    pub fn remaining(&self) -> usize {
        self.len - self.initialized
    }

    /// Pointer to the first slot.
    pub fn base(&self) -> *mut T {
        self.base
    }

    /// The already-constructed prefix.
    pub fn live(&self) -> &[T] {
        // SAFETY: the first `initialized` slots hold live values.
        unsafe { std::slice::from_raw_parts(self.base, self.initialized) }
    }

    /// Record `n` more slots as initialized after the caller wrote them
    /// directly (for example with a bulk byte copy).
    ///
    /// # Safety
    ///
    /// Slots `[initialized, initialized + n)` must hold live values and must
    /// lie inside the guarded range.
    pub unsafe fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining());
        self.initialized += n;
    }

    /// Disarm the guard and hand back the constructed prefix.
    pub fn finish(self) -> &'a mut [T] {
        let live = ptr::slice_from_raw_parts_mut(self.base, self.initialized);
        mem::forget(self);
        // SAFETY: the prefix is initialized and borrowed for `'a`.
        unsafe { &mut *live }
    }
}

impl<T> Drop for InitGuard<'_, T> {
    fn drop(&mut self) {
        if mem::needs_drop::<T>() {
            // SAFETY: exactly the first `initialized` slots are live, and the
            // guard is the only owner of them until `finish`.
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                    self.base,
                    self.initialized,
                ));
            }
        }
    }
}
