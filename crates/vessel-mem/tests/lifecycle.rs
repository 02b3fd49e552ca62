//! Integration test: element lifecycle accounting across the primitives.
//!
//! Uses the instrumented element types to check that the bulk paths make the
//! promised number of user calls, and that a panicking constructor in the
//! middle of a range leaves nothing alive.

use std::mem::MaybeUninit;
use std::panic::{catch_unwind, AssertUnwindSafe};

use vessel_mem::{
    construct, destroy, fill, hybrid_ufill, opt_fill, opt_ufill, ucopy, ufill, umove,
    HYBRID_FILL_THRESHOLD,
};
use vessel_test_utils::{census, fail_after, reset_census, CountedCopy, Tracked};

fn slots<T>(n: usize) -> Vec<MaybeUninit<T>> {
    (0..n).map(|_| MaybeUninit::uninit()).collect()
}

// ── Construction counts ─────────────────────────────────────────────

#[test]
fn trivially_copyable_fills_clone_once() {
    for n in [1usize, 2, 5, 64, 1000] {
        let mut buf = vec![CountedCopy(0); n];
        CountedCopy::reset_clones();
        opt_fill(&mut buf, &CountedCopy(0x0102_0304));
        assert_eq!(CountedCopy::clones(), 1, "n = {n}");
        assert!(buf.iter().all(|v| v.0 == 0x0102_0304));
    }
}

#[test]
fn trivially_copyable_ucopy_never_clones() {
    let src: Vec<CountedCopy> = (0..100).map(CountedCopy).collect();
    let mut dst = slots::<CountedCopy>(100);
    CountedCopy::reset_clones();
    let live = ucopy(&src, &mut dst);
    assert_eq!(CountedCopy::clones(), 0);
    assert_eq!(live, &src[..]);
}

#[test]
fn repeated_byte_fill_skips_clone() {
    let mut buf = vec![CountedCopy(1); 10];
    CountedCopy::reset_clones();
    fill(&mut buf, &CountedCopy(0));
    assert_eq!(CountedCopy::clones(), 0);
    assert!(buf.iter().all(|v| v.0 == 0));
}

#[test]
fn non_trivial_ufill_constructs_exactly_n() {
    reset_census();
    let value = Tracked::new(5);
    let mut dst = slots::<Tracked>(37);
    let live = ufill(&mut dst, &value);
    assert_eq!(census().clones, 37);
    assert!(live.iter().all(|t| t.value() == 5));
    // SAFETY: not used afterwards.
    unsafe { destroy(live) };
    drop(value);
    assert_eq!(census().live, 0);
}

#[test]
fn opt_ufill_matches_naive_for_tracked() {
    reset_census();
    let value = Tracked::new(8);
    let mut a = slots::<Tracked>(HYBRID_FILL_THRESHOLD * 3);
    let mut b = slots::<Tracked>(HYBRID_FILL_THRESHOLD * 3);
    let naive = ufill(&mut a, &value);
    let doubled = hybrid_ufill(&mut b, &value);
    assert_eq!(naive, doubled);
    // SAFETY: not used afterwards.
    unsafe {
        destroy(naive);
        destroy(doubled);
    }
    drop(value);
    assert_eq!(census().live, 0);
}

#[test]
fn construct_calls_default_per_slot() {
    reset_census();
    let mut dst = slots::<Tracked>(12);
    let live = construct(&mut dst);
    assert_eq!(census().constructions, 12);
    assert!(live.iter().all(|t| t.value() == 0));
    // SAFETY: not used afterwards.
    unsafe { destroy(live) };
    assert_eq!(census().drops, 12);
}

#[test]
fn umove_runs_no_user_code() {
    reset_census();
    let src = std::mem::ManuallyDrop::new(vec![Tracked::new(1), Tracked::new(2)]);
    let before = census();
    let mut dst = slots::<Tracked>(2);
    // SAFETY: the source vector is never dropped, so each value moves once.
    let live = unsafe { umove(src.as_ptr(), &mut dst) };
    assert_eq!(census(), before);
    assert_eq!(live[1].value(), 2);
    // SAFETY: not used afterwards.
    unsafe { destroy(live) };
    assert_eq!(census().live, 0);
    // Release the source buffer without dropping the moved-out values.
    let mut src = std::mem::ManuallyDrop::into_inner(src);
    // SAFETY: its values were moved out above.
    unsafe { src.set_len(0) };
}

// ── Rollback on panic ───────────────────────────────────────────────

#[test]
fn panicking_default_rolls_back_construct() {
    reset_census();
    let mut dst = slots::<Tracked>(10);
    fail_after(6);
    let result = catch_unwind(AssertUnwindSafe(|| {
        construct(&mut dst);
    }));
    assert!(result.is_err());
    let c = census();
    assert_eq!(c.constructions, 6);
    assert_eq!(c.drops, 6);
    assert_eq!(c.live, 0);
}

#[test]
fn panicking_clone_rolls_back_ucopy() {
    reset_census();
    let src: Vec<Tracked> = (0..8).map(Tracked::new).collect();
    let mut dst = slots::<Tracked>(8);
    fail_after(3);
    let result = catch_unwind(AssertUnwindSafe(|| {
        ucopy(&src, &mut dst);
    }));
    assert!(result.is_err());
    assert_eq!(census().live, 8);
    drop(src);
    assert_eq!(census().live, 0);
}

#[test]
fn panicking_clone_rolls_back_opt_ufill() {
    for k in [0usize, 1, 4, 20] {
        reset_census();
        let value = Tracked::new(3);
        let mut dst = slots::<Tracked>(50);
        fail_after(k);
        let result = catch_unwind(AssertUnwindSafe(|| {
            opt_ufill(&mut dst, &value);
        }));
        assert!(result.is_err(), "k = {k}");
        assert_eq!(census().live, 1, "k = {k}");
    }
}
