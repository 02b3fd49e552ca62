//! Growth policy error types.

use std::error::Error;
use std::fmt;

/// Errors reported by growth policies and their constructors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GrowthError {
    /// The next capacity does not fit in `usize`.
    Overflow {
        /// Capacity before growth.
        current: usize,
        /// Minimum capacity asked for.
        required: usize,
    },
    /// A [`BinarySearch`](crate::BinarySearch) table has no entry large enough.
    TableExhausted {
        /// Minimum capacity asked for.
        required: usize,
        /// Largest capacity in the table.
        largest: usize,
    },
    /// A policy was configured with parameters that violate its contract.
    InvalidConfig {
        /// Description of the violated constraint.
        reason: String,
    },
}

impl fmt::Display for GrowthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow { current, required } => {
                write!(
                    f,
                    "capacity overflow growing from {current} to at least {required}"
                )
            }
            Self::TableExhausted { required, largest } => {
                write!(
                    f,
                    "capacity table exhausted: required {required}, largest entry {largest}"
                )
            }
            Self::InvalidConfig { reason } => write!(f, "invalid growth policy: {reason}"),
        }
    }
}

impl Error for GrowthError {}
