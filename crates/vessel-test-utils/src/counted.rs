//! Trivially copyable element with a counted `Clone`.

use std::cell::Cell;

use vessel_mem::Element;

thread_local! {
    static CLONES: Cell<usize> = const { Cell::new(0) };
}

/// A `u64` whose explicit clones are counted per thread.
///
/// Declared trivially copyable, so bulk primitives may duplicate it with
/// `memcpy` and skip `Clone` entirely; the counter shows how often they
/// did not.
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct CountedCopy(pub u64);

impl CountedCopy {
    /// Clones performed on this thread since the last reset.
    pub fn clones() -> usize {
        CLONES.with(Cell::get)
    }

    pub fn reset_clones() {
        CLONES.with(|c| c.set(0));
    }
}

impl Clone for CountedCopy {
    fn clone(&self) -> Self {
        CLONES.with(|c| c.set(c.get() + 1));
        Self(self.0)
    }
}

// SAFETY: a transparent `u64`: no padding, no drop glue, a clone equal to a
// bit copy apart from the counter, and zero as its default.
unsafe impl Element for CountedCopy {
    const TRIVIALLY_COPYABLE: bool = true;
    const TRIVIALLY_CONSTRUCTIBLE: bool = true;
}
