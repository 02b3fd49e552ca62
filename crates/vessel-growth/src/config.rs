//! Growth policy configuration.
//!
//! [`GrowthConfig`] is the data form of a policy, for code that chooses
//! one at run time (benchmark matrices, settings files). [`build`] checks
//! the parameters and yields an [`AnyPolicy`].
//!
//! [`build`]: GrowthConfig::build

use crate::binary_search::BinarySearch;
use crate::error::GrowthError;
use crate::exponential::Exponential;
use crate::linear::Linear;
use crate::policy::GrowthPolicy;
use crate::switch::Switch;

/// Declarative description of a growth policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GrowthConfig {
    /// [`Linear`] growth by `step` slots.
    Linear {
        /// Increment in elements. Must be at least 1.
        step: usize,
    },
    /// [`Exponential`] growth by `numer / denom`.
    Exponential {
        /// Factor numerator.
        numer: usize,
        /// Factor denominator. `numer > denom > 0` is required.
        denom: usize,
    },
    /// [`BinarySearch`] growth over an explicit table.
    BinarySearch {
        /// Strictly ascending, non-zero capacities.
        table: Vec<usize>,
    },
    /// [`Switch`] between linear and exponential growth.
    Switch {
        /// Size at which exponential growth takes over.
        threshold: usize,
        /// Linear increment below the threshold.
        step: usize,
        /// Exponential factor numerator.
        numer: usize,
        /// Exponential factor denominator.
        denom: usize,
    },
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self::Exponential {
            numer: Exponential::DEFAULT_NUMER,
            denom: Exponential::DEFAULT_DENOM,
        }
    }
}

impl GrowthConfig {
    /// Validate the parameters and construct the policy.
    pub fn build(&self) -> Result<AnyPolicy, GrowthError> {
        Ok(match self {
            Self::Linear { step } => AnyPolicy::Linear(Linear::new(*step)?),
            Self::Exponential { numer, denom } => {
                AnyPolicy::Exponential(Exponential::new(*numer, *denom)?)
            }
            Self::BinarySearch { table } => {
                AnyPolicy::BinarySearch(BinarySearch::new(table.clone())?)
            }
            Self::Switch {
                threshold,
                step,
                numer,
                denom,
            } => AnyPolicy::Switch(Switch::new(
                *threshold,
                Linear::new(*step)?,
                Exponential::new(*numer, *denom)?,
            )),
        })
    }
}

/// A growth policy chosen at run time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnyPolicy {
    /// See [`Linear`].
    Linear(Linear),
    /// See [`Exponential`].
    Exponential(Exponential),
    /// See [`BinarySearch`].
    BinarySearch(BinarySearch),
    /// See [`Switch`].
    Switch(Switch),
}

impl Default for AnyPolicy {
    fn default() -> Self {
        Self::Exponential(Exponential::default())
    }
}

impl GrowthPolicy for AnyPolicy {
    fn next_capacity(&self, current: usize, required: usize) -> Result<usize, GrowthError> {
        match self {
            Self::Linear(p) => p.next_capacity(current, required),
            Self::Exponential(p) => p.next_capacity(current, required),
            Self::BinarySearch(p) => p.next_capacity(current, required),
            Self::Switch(p) => p.next_capacity(current, required),
        }
    }
}
