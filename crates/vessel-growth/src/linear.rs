//! Fixed-increment growth.

use crate::error::GrowthError;
use crate::policy::GrowthPolicy;

/// Grows by whole multiples of a fixed step.
///
/// The result is the smallest `current + k * step` that reaches the
/// requirement, computed directly rather than by iteration. Linear growth
/// wastes at most `step - 1` slots but costs `O(n / step)` reallocations to
/// reach `n` elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Linear {
    step: usize,
}

impl Linear {
    /// Default increment in elements.
    pub const DEFAULT_STEP: usize = 16;

    /// Create a linear policy adding `step` slots at a time.
    ///
    /// Returns `Err(GrowthError::InvalidConfig)` if `step` is zero.
    pub fn new(step: usize) -> Result<Self, GrowthError> {
        if step == 0 {
            return Err(GrowthError::InvalidConfig {
                reason: "linear step must be at least 1".into(),
            });
        }
        Ok(Self { step })
    }

    /// The configured increment.
    pub fn step(&self) -> usize {
        self.step
    }
}

impl Default for Linear {
    fn default() -> Self {
        Self {
            step: Self::DEFAULT_STEP,
        }
    }
}

impl GrowthPolicy for Linear {
    fn next_capacity(&self, current: usize, required: usize) -> Result<usize, GrowthError> {
        if required <= current {
            return Ok(current);
        }
        let steps = (required - current).div_ceil(self.step);
        steps
            .checked_mul(self.step)
            .and_then(|grow| current.checked_add(grow))
            .ok_or(GrowthError::Overflow { current, required })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_in_whole_steps() {
        let p = Linear::new(10).unwrap();
        assert_eq!(p.next_capacity(0, 1).unwrap(), 10);
        assert_eq!(p.next_capacity(10, 11).unwrap(), 20);
        assert_eq!(p.next_capacity(10, 35).unwrap(), 40);
        assert_eq!(p.next_capacity(3, 13).unwrap(), 13);
    }

    #[test]
    fn no_growth_when_requirement_met() {
        let p = Linear::default();
        assert_eq!(p.next_capacity(50, 20).unwrap(), 50);
        assert_eq!(p.next_capacity(50, 50).unwrap(), 50);
    }

    #[test]
    fn zero_step_rejected() {
        assert!(matches!(
            Linear::new(0),
            Err(GrowthError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn overflow_reported() {
        let p = Linear::new(1 << 20).unwrap();
        let result = p.next_capacity(usize::MAX - 5, usize::MAX);
        assert_eq!(
            result,
            Err(GrowthError::Overflow {
                current: usize::MAX - 5,
                required: usize::MAX,
            })
        );
    }

    #[test]
    fn step_one_is_exact_fit() {
        let p = Linear::new(1).unwrap();
        assert_eq!(p.next_capacity(7, 100).unwrap(), 100);
    }
}
