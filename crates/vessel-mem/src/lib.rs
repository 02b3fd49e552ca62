//! Type-dispatched bulk memory primitives for Vessel containers.
//!
//! Free functions that construct, destroy, copy, move and fill ranges of
//! element slots. Each primitive picks its algorithm from the element's
//! [`Element`] profile at compile time: a trivially copyable type is copied
//! with one `memcpy`, a trivially constructible type is default-initialised
//! with one `memset`, and everything else goes element by element.
//!
//! # Live and uninitialized ranges
//!
//! ```text
//! &mut [MaybeUninit<T>]  ──construct / ucopy / umove / ufill──▶  &mut [T]
//!        ▲                                                          │
//!        └──────────────────────── destroy ◀────────────────────────┘
//! ```
//!
//! Functions with a `u` prefix write into uninitialized memory and return the
//! range they brought to life. Functions without it assign over live values.
//! The [`raw`] module carries the same operations in pointer-and-count and
//! pointer-range forms for callers that manage their own buffers.
//!
//! # Failure atomicity
//!
//! A panicking `Default` or `Clone` in the middle of a constructing operation
//! destroys every slot that operation already constructed before the panic
//! continues unwinding (see [`InitGuard`]). The destination is left fully
//! uninitialized again; nothing leaks and nothing is dropped twice.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod construct;
pub mod copy;
pub mod fill;
pub mod guard;
pub mod profile;
pub mod raw;

pub use construct::{construct, destroy};
pub use copy::{copy, move_assign, ucopy, umove};
pub use fill::{
    fill, hybrid_fill, hybrid_ufill, opt_fill, opt_ufill, ufill, HYBRID_FILL_THRESHOLD,
};
pub use guard::InitGuard;
pub use profile::Element;
