//! Hybrid linear/exponential growth.

use crate::error::GrowthError;
use crate::exponential::Exponential;
use crate::linear::Linear;
use crate::policy::GrowthPolicy;

/// [`Linear`] growth for small arrays, [`Exponential`] growth for large ones.
///
/// While the required size is below `threshold` the linear policy decides,
/// which avoids doubling a handful of elements into a mostly empty buffer.
/// From the threshold on the exponential policy keeps `push` amortized
/// constant time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Switch {
    threshold: usize,
    linear: Linear,
    exponential: Exponential,
}

impl Switch {
    /// Default size at which exponential growth takes over.
    pub const DEFAULT_THRESHOLD: usize = 256;

    /// Combine two policies around `threshold`.
    pub fn new(threshold: usize, linear: Linear, exponential: Exponential) -> Self {
        Self {
            threshold,
            linear,
            exponential,
        }
    }

    /// Size at which exponential growth takes over.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// The policy used below the threshold.
    pub fn linear(&self) -> &Linear {
        &self.linear
    }

    /// The policy used from the threshold on.
    pub fn exponential(&self) -> &Exponential {
        &self.exponential
    }
}

impl Default for Switch {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_THRESHOLD,
            Linear::default(),
            Exponential::default(),
        )
    }
}

impl GrowthPolicy for Switch {
    fn next_capacity(&self, current: usize, required: usize) -> Result<usize, GrowthError> {
        if required < self.threshold {
            self.linear.next_capacity(current, required)
        } else {
            self.exponential.next_capacity(current, required)
        }
    }
}
