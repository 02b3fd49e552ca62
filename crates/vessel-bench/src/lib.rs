//! Workloads shared by the Vessel benchmarks.
//!
//! - [`workload`]: seeded element values
//! - [`insert_positions`]: seeded insertion indices valid for a growing array
//! - [`policy_matrix`]: the named growth policies every container is measured with

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use vessel_growth::{AnyPolicy, BinarySearch, GrowthConfig};

/// Element counts the size-parameterised benchmarks sweep over.
pub const SIZES: [usize; 4] = [16, 256, 4096, 65_536];

/// `len` values drawn from a generator seeded with `seed`.
pub fn workload(len: usize, seed: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.random()).collect()
}

/// `count` insertion indices; the `i`-th is at most `i`, so applying them in
/// order to an initially empty array never goes out of bounds.
pub fn insert_positions(count: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|i| rng.random_range(0..=i)).collect()
}

/// Growth policies under comparison, with display names.
///
/// Only parameter sets [`GrowthConfig::build`] accepts are listed.
pub fn policy_matrix() -> Vec<(&'static str, AnyPolicy)> {
    let configs = [
        ("exponential_2", GrowthConfig::default()),
        ("exponential_1.5", GrowthConfig::Exponential { numer: 3, denom: 2 }),
        ("linear_64", GrowthConfig::Linear { step: 64 }),
        (
            "switch_256",
            GrowthConfig::Switch {
                threshold: 256,
                step: 32,
                numer: 2,
                denom: 1,
            },
        ),
        (
            "fibonacci",
            GrowthConfig::BinarySearch {
                table: BinarySearch::fibonacci().table().to_vec(),
            },
        ),
    ];
    configs
        .into_iter()
        .filter_map(|(name, config)| config.build().ok().map(|p| (name, p)))
        .collect()
}
