//! Benchmark problems.

mod dectiger;
mod firefighting;
mod random;

pub use dectiger::*;
pub use firefighting::*;
pub use random::*;

use crate::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Problems the solver knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Problem {
    /// two agents in front of two doors, one hiding a tiger
    #[cfg_attr(feature = "cli", value(name = "dectiger"))]
    DecTiger,
    /// agents fighting fires along a row of houses
    #[cfg_attr(feature = "cli", value(name = "firefighting"))]
    FireFighting,
    /// randomly generated model of a given shape
    Random,
}

impl Problem {
    /// build the model. fire fighting is sized by `brigade`, random
    /// problems by `shape` and draw from their own RNG seeded with `seed`.
    pub fn build(&self, shape: &Shape, brigade: &Brigade, storage: Storage, seed: u64) -> anyhow::Result<DecPomdp> {
        match self {
            Self::DecTiger => dectiger(storage),
            Self::FireFighting => firefighting(brigade, storage),
            Self::Random => random(&mut SmallRng::seed_from_u64(seed), shape, storage),
        }
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecTiger => write!(f, "dectiger"),
            Self::FireFighting => write!(f, "firefighting"),
            Self::Random => write!(f, "random"),
        }
    }
}
