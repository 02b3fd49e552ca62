//! Lifecycle-counting element type.

use std::cell::Cell;
use std::fmt;

use vessel_mem::Element;

/// Per-thread lifecycle counters for [`Tracked`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Census {
    /// Instances currently alive.
    pub live: isize,
    /// Instances created by `new`, `default` or `clone`.
    pub constructions: usize,
    /// Instances created by `clone`.
    pub clones: usize,
    /// Instances dropped.
    pub drops: usize,
}

thread_local! {
    static CENSUS: Cell<Census> = const {
        Cell::new(Census { live: 0, constructions: 0, clones: 0, drops: 0 })
    };
    static FAIL_COUNTDOWN: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Snapshot of this thread's counters.
pub fn census() -> Census {
    CENSUS.with(Cell::get)
}

/// Zero this thread's counters and disarm any pending failure.
pub fn reset_census() {
    CENSUS.with(|c| c.set(Census::default()));
    disarm();
}

/// Let `n` more constructions succeed, then panic on the next one.
///
/// The failure fires once; afterwards constructions succeed again.
pub fn fail_after(n: usize) {
    FAIL_COUNTDOWN.with(|f| f.set(Some(n)));
}

/// Cancel a pending [`fail_after`].
pub fn disarm() {
    FAIL_COUNTDOWN.with(|f| f.set(None));
}

fn record_construction(clone: bool) {
    let fire = FAIL_COUNTDOWN.with(|f| match f.get() {
        Some(0) => {
            f.set(None);
            true
        }
        Some(n) => {
            f.set(Some(n - 1));
            false
        }
        None => false,
    });
    if fire {
        panic!("injected construction failure");
    }
    CENSUS.with(|c| {
        let mut s = c.get();
        s.live += 1;
        s.constructions += 1;
        if clone {
            s.clones += 1;
        }
        c.set(s);
    });
}

/// Element with a full, observable lifecycle.
///
/// Compares, orders and hashes by its payload.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tracked {
    value: u64,
}

impl Tracked {
    pub fn new(value: u64) -> Self {
        record_construction(false);
        Self { value }
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

impl Default for Tracked {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        record_construction(true);
        Self { value: self.value }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        CENSUS.with(|c| {
            let mut s = c.get();
            s.live -= 1;
            s.drops += 1;
            c.set(s);
        });
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracked({})", self.value)
    }
}

impl From<u64> for Tracked {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

// SAFETY: every flag keeps its conservative default.
unsafe impl Element for Tracked {}
