//! Table-driven growth.

use std::sync::Arc;

use crate::error::GrowthError;
use crate::policy::GrowthPolicy;

/// Picks the smallest capacity from an ascending table that meets the requirement.
///
/// The lookup is a binary search, so large tables cost `O(log n)` per
/// growth. Asking for more than the last entry fails with
/// [`GrowthError::TableExhausted`]: the table is also a hard size limit.
///
/// The table is reference counted so cloning a policy (and therefore a
/// container that holds one) never copies it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BinarySearch {
    table: Arc<[usize]>,
}

impl BinarySearch {
    /// Create a policy over `table`.
    ///
    /// Returns `Err(GrowthError::InvalidConfig)` if the table is empty, not
    /// strictly ascending, or starts at zero.
    pub fn new(table: impl Into<Vec<usize>>) -> Result<Self, GrowthError> {
        let table = table.into();
        if table.is_empty() {
            return Err(GrowthError::InvalidConfig {
                reason: "capacity table is empty".into(),
            });
        }
        if table[0] == 0 {
            return Err(GrowthError::InvalidConfig {
                reason: "capacity table must not contain 0".into(),
            });
        }
        if let Some(pos) = table.windows(2).position(|w| w[0] >= w[1]) {
            return Err(GrowthError::InvalidConfig {
                reason: format!(
                    "capacity table not strictly ascending at index {}: {} >= {}",
                    pos + 1,
                    table[pos],
                    table[pos + 1]
                ),
            });
        }
        Ok(Self {
            table: table.into(),
        })
    }

    /// Table of every power of two representable in `usize`.
    pub fn powers_of_two() -> Self {
        let table: Vec<usize> = (0..usize::BITS).map(|shift| 1usize << shift).collect();
        Self {
            table: table.into(),
        }
    }

    /// Table of Fibonacci numbers `1, 2, 3, 5, 8, …` up to the largest that
    /// fits in `usize`; growth by roughly the golden ratio.
    pub fn fibonacci() -> Self {
        let mut table = vec![1usize, 2];
        while let Some(next) = table[table.len() - 2].checked_add(table[table.len() - 1]) {
            table.push(next);
        }
        Self {
            table: table.into(),
        }
    }

    /// The capacity table.
    pub fn table(&self) -> &[usize] {
        &self.table
    }

    /// Largest capacity this policy can produce.
    pub fn largest(&self) -> usize {
        // Constructors reject empty tables.
        self.table[self.table.len() - 1]
    }
}

impl Default for BinarySearch {
    fn default() -> Self {
        Self::powers_of_two()
    }
}

impl GrowthPolicy for BinarySearch {
    fn next_capacity(&self, current: usize, required: usize) -> Result<usize, GrowthError> {
        if required <= current {
            return Ok(current);
        }
        let idx = self.table.partition_point(|&cap| cap < required);
        self.table
            .get(idx)
            .copied()
            .ok_or(GrowthError::TableExhausted {
                required,
                largest: self.largest(),
            })
    }
}
