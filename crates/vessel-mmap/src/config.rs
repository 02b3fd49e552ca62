//! Allocator configuration parameters.

/// Configuration for [`MmapAllocator`](crate::MmapAllocator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapConfig {
    /// Pre-fault every page when a mapping is created (`MAP_POPULATE` on
    /// Linux; ignored elsewhere).
    ///
    /// Default: `false`. Pages are faulted in on first touch.
    pub populate: bool,

    /// Whether growth may move the mapping when the kernel cannot extend it
    /// in place.
    ///
    /// Default: `true`. With `false`, a growth that would relocate fails with
    /// [`MapError::ExtendFailed`](crate::MapError::ExtendFailed) and leaves the
    /// allocation untouched, so addresses stay stable for its whole life.
    pub allow_relocation: bool,
}

impl MapConfig {
    /// Configuration with default values.
    pub fn new() -> Self {
        Self {
            populate: false,
            allow_relocation: true,
        }
    }

    /// Configuration that never moves a mapping.
    pub fn pinned() -> Self {
        Self {
            allow_relocation: false,
            ..Self::new()
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_relocation() {
        let config = MapConfig::default();
        assert!(config.allow_relocation);
        assert!(!config.populate);
    }

    #[test]
    fn pinned_forbids_relocation() {
        assert!(!MapConfig::pinned().allow_relocation);
    }
}
