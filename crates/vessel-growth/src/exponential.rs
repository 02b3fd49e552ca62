//! Multiplicative growth.

use crate::error::GrowthError;
use crate::policy::GrowthPolicy;

/// Multiplies the capacity by `numer / denom` until the requirement is met.
///
/// Growth starts from `max(current, 1)` and every round adds at least one
/// slot, so small fractional factors still make progress. With the default
/// factor of 2 an array that starts at capacity 1 sees `1, 2, 4, 4, 8` over
/// its first five pushes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Exponential {
    numer: usize,
    denom: usize,
}

impl Exponential {
    /// Default factor numerator (factor 2).
    pub const DEFAULT_NUMER: usize = 2;

    /// Default factor denominator.
    pub const DEFAULT_DENOM: usize = 1;

    /// Create a policy growing by the factor `numer / denom`.
    ///
    /// Returns `Err(GrowthError::InvalidConfig)` unless `numer > denom > 0`.
    pub fn new(numer: usize, denom: usize) -> Result<Self, GrowthError> {
        if denom == 0 || numer <= denom {
            return Err(GrowthError::InvalidConfig {
                reason: format!("growth factor {numer}/{denom} must be greater than 1"),
            });
        }
        Ok(Self { numer, denom })
    }

    /// The factor as `(numerator, denominator)`.
    pub fn factor(&self) -> (usize, usize) {
        (self.numer, self.denom)
    }

    fn scale(&self, cap: usize) -> Option<usize> {
        let grown = cap as u128 * self.numer as u128 / self.denom as u128;
        let grown = usize::try_from(grown).ok()?;
        Some(grown.max(cap.checked_add(1)?))
    }
}

impl Default for Exponential {
    fn default() -> Self {
        Self {
            numer: Self::DEFAULT_NUMER,
            denom: Self::DEFAULT_DENOM,
        }
    }
}

impl GrowthPolicy for Exponential {
    fn next_capacity(&self, current: usize, required: usize) -> Result<usize, GrowthError> {
        if required <= current {
            return Ok(current);
        }
        let mut cap = current.max(1);
        while cap < required {
            cap = self
                .scale(cap)
                .ok_or(GrowthError::Overflow { current, required })?;
        }
        Ok(cap)
    }
}
