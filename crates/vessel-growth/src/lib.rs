//! Capacity growth policies for Vessel dynamic arrays.
//!
//! A [`GrowthPolicy`] decides how large a buffer becomes when a container
//! runs out of room. Policies are stateless value types: the same
//! `(current, required)` pair always yields the same answer, and the answer
//! is never below either input.
//!
//! | Policy | Rule |
//! |--------|------|
//! | [`Linear`] | add a fixed step until the requirement is met |
//! | [`Exponential`] | multiply by a fixed factor, starting from `max(current, 1)` |
//! | [`BinarySearch`] | smallest entry of an ascending capacity table |
//! | [`Switch`] | [`Linear`] below a threshold, [`Exponential`] from it on |
//!
//! [`GrowthConfig`] describes any of them as plain data and builds an
//! [`AnyPolicy`] for callers that pick a policy at run time.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod binary_search;
pub mod config;
pub mod error;
pub mod exponential;
pub mod linear;
pub mod policy;
pub mod switch;

pub use binary_search::BinarySearch;
pub use config::{AnyPolicy, GrowthConfig};
pub use error::GrowthError;
pub use exponential::Exponential;
pub use linear::Linear;
pub use policy::GrowthPolicy;
pub use switch::Switch;
