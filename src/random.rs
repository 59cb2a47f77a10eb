//! Seeded randomness.
//!
//! Every randomized decision in the crate (construction skips, crossover
//! points, mutation, roulette draws, edge-fixing samples) takes a caller
//! supplied `R: Rng`. This module only builds the default generator, so a
//! fixed seed replays a whole run.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Creates a deterministic generator from `seed`.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a generator from `seed`, or from OS entropy when `None`.
pub fn rng_from_option(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}
