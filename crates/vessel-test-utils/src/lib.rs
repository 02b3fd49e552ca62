//! Instrumented element types and seeded generators for Vessel tests.
//!
//! - [`Tracked`]: an element with a non-trivial lifecycle that records every
//!   construction, clone and drop in a per-thread [`Census`], and can be told
//!   to panic on a later construction ([`fail_after`]).
//! - [`CountedCopy`]: a trivially copyable element whose `Clone` is counted,
//!   for asserting that bulk paths skip per-element calls.
//! - [`ValueSource`]: a seedable generator of values and of random container
//!   operation scripts ([`Op`]) for comparing containers against `Vec`.

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod counted;
mod source;
mod tracked;

pub use counted::CountedCopy;
pub use source::{Op, ValueSource};
pub use tracked::{census, disarm, fail_after, reset_census, Census, Tracked};
