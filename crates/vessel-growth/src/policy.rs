//! The growth policy contract.

use crate::error::GrowthError;

/// Maps `(current capacity, required minimum)` to a new capacity.
///
/// Implementations must be deterministic and, whenever they return `Ok(c)`,
/// satisfy `c >= required` and `c >= current`. When `required <= current`
/// no growth is needed and every policy in this crate returns `current`.
pub trait GrowthPolicy {
    /// Capacity to grow to so that at least `required` slots are available.
    fn next_capacity(&self, current: usize, required: usize) -> Result<usize, GrowthError>;
}

impl<P: GrowthPolicy + ?Sized> GrowthPolicy for &P {
    fn next_capacity(&self, current: usize, required: usize) -> Result<usize, GrowthError> {
        (**self).next_capacity(current, required)
    }
}

impl<P: GrowthPolicy + ?Sized> GrowthPolicy for Box<P> {
    fn next_capacity(&self, current: usize, required: usize) -> Result<usize, GrowthError> {
        (**self).next_capacity(current, required)
    }
}
