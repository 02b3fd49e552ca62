//! Compile-time capability profile of element types.
//!
//! [`Element`] answers three questions about a type, each as an associated
//! `const`: can it be copied as raw bytes, can it be default-initialised by
//! zeroing, and does dropping it do anything. The primitives in this crate
//! branch on those constants; after monomorphization only one branch
//! survives, so the query costs nothing at run time.

use std::mem;

/// Capability profile consulted by every memory primitive.
///
/// Implementing the trait with no items declares a type with a non-trivial
/// lifecycle: every copy calls `Clone`, every default construction calls
/// `Default`. Setting a flag to `true` opts into the bulk byte paths.
///
/// # Safety
///
/// - `TRIVIALLY_COPYABLE = true` requires that `Clone::clone` produces a value
///   indistinguishable from a bitwise copy of `self` (side effects such as
///   test instrumentation are tolerated, but the primitives may skip them),
///   that the type has no drop glue, and that it contains no padding or
///   otherwise uninitialized bytes.
/// - `TRIVIALLY_CONSTRUCTIBLE = true` requires that the all-zero bit pattern
///   is a valid value of the type and equals `Default::default()`.
/// - `TRIVIALLY_DESTRUCTIBLE` is derived from the type's drop glue and must
///   not be overridden to `true` for a type that has any.
pub unsafe trait Element: Sized {
    /// `Clone` is a bitwise copy; bulk copies may use `memcpy`.
    const TRIVIALLY_COPYABLE: bool = false;

    /// `Default` is all-zero bytes; bulk construction may use `memset`.
    const TRIVIALLY_CONSTRUCTIBLE: bool = false;

    /// Dropping the value has no effect; bulk destruction is a no-op.
    ///
    /// A derived query: [`destroy`](fn@crate::destroy) accepts types with no
    /// profile and branches on [`mem::needs_drop`], which agrees with this
    /// flag for every sound implementation.
    const TRIVIALLY_DESTRUCTIBLE: bool = !mem::needs_drop::<Self>();
}

macro_rules! plain_old_data {
    ($($ty:ty),* $(,)?) => {
        $(
            // SAFETY: primitive with no padding whose clone is a bit copy and
            // whose default value is all-zero bytes.
            unsafe impl Element for $ty {
                const TRIVIALLY_COPYABLE: bool = true;
                const TRIVIALLY_CONSTRUCTIBLE: bool = true;
            }
        )*
    };
}

plain_old_data!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char, (),
);

// SAFETY: shared references are `Copy` and pointer-sized with no padding.
// They have no default value, so they are not trivially constructible.
unsafe impl<T: ?Sized> Element for &T {
    const TRIVIALLY_COPYABLE: bool = true;
}

// SAFETY: every flag keeps its conservative default.
unsafe impl Element for String {}
// SAFETY: every flag keeps its conservative default.
unsafe impl<T> Element for Vec<T> {}
// SAFETY: every flag keeps its conservative default.
unsafe impl<T: ?Sized> Element for Box<T> {}
// SAFETY: every flag keeps its conservative default.
unsafe impl<T> Element for Option<T> {}

// SAFETY: an array has no padding between elements, so it inherits its
// element's profile; `[T; N]::default()` is `N` copies of `T::default()`.
unsafe impl<T: Element, const N: usize> Element for [T; N] {
    const TRIVIALLY_COPYABLE: bool = T::TRIVIALLY_COPYABLE;
    const TRIVIALLY_CONSTRUCTIBLE: bool = T::TRIVIALLY_CONSTRUCTIBLE;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Named {
        _name: String,
    }

    // SAFETY: conservative defaults.
    unsafe impl Element for Named {}

    #[test]
    fn primitives_are_fully_trivial() {
        assert!(u32::TRIVIALLY_COPYABLE);
        assert!(u32::TRIVIALLY_CONSTRUCTIBLE);
        assert!(u32::TRIVIALLY_DESTRUCTIBLE);
        assert!(f64::TRIVIALLY_CONSTRUCTIBLE);
        assert!(char::TRIVIALLY_COPYABLE);
    }

    #[test]
    fn owning_types_are_not_trivial() {
        assert!(!String::TRIVIALLY_COPYABLE);
        assert!(!String::TRIVIALLY_CONSTRUCTIBLE);
        assert!(!String::TRIVIALLY_DESTRUCTIBLE);
        assert!(!<Vec<u8>>::TRIVIALLY_DESTRUCTIBLE);
    }

    #[test]
    fn destructibility_is_derived_from_drop_glue() {
        assert!(!Named::TRIVIALLY_DESTRUCTIBLE);
        assert!(<Option<u8>>::TRIVIALLY_DESTRUCTIBLE);
        assert!(!<Option<u8>>::TRIVIALLY_COPYABLE);
    }

    fn agrees_with_drop_glue<T: Element>() -> bool {
        T::TRIVIALLY_DESTRUCTIBLE == !mem::needs_drop::<T>()
    }

    #[test]
    fn destructibility_matches_what_destroy_checks() {
        assert!(agrees_with_drop_glue::<u64>());
        assert!(agrees_with_drop_glue::<String>());
        assert!(agrees_with_drop_glue::<Named>());
        assert!(agrees_with_drop_glue::<[Box<u8>; 3]>());
        assert!(agrees_with_drop_glue::<Option<Vec<u8>>>());
    }

    #[test]
    fn arrays_inherit_element_profile() {
        assert!(<[u16; 4]>::TRIVIALLY_COPYABLE);
        assert!(<[u16; 4]>::TRIVIALLY_CONSTRUCTIBLE);
        assert!(!<[String; 2]>::TRIVIALLY_COPYABLE);
        assert!(!<[String; 2]>::TRIVIALLY_DESTRUCTIBLE);
    }

    #[test]
    fn references_copy_but_do_not_construct() {
        assert!(<&str>::TRIVIALLY_COPYABLE);
        assert!(!<&str>::TRIVIALLY_CONSTRUCTIBLE);
        assert!(<&str>::TRIVIALLY_DESTRUCTIBLE);
    }
}
