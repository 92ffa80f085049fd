//! Deterministic random number generators.
//!
//! The engine never owns a generator. Callers seed one per run and, when
//! sub-populations are processed in parallel, derive one independent
//! generator per unit so results do not depend on scheduling.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Create a generator from a seed
pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Derive `count` independent generators from a parent seed.
///
/// Every derived generator shares the parent key and runs on its own
/// ChaCha stream, so unit `k` always sees the same sequence for a given
/// parent seed.
pub fn derive(parent_seed: u64, count: usize) -> Vec<ChaCha8Rng> {
    debug!("Deriving {} generators from seed {}", count, parent_seed);

    (0..count)
        .map(|unit| {
            let mut rng = ChaCha8Rng::seed_from_u64(parent_seed);
            rng.set_stream(unit as u64 + 1);
            rng
        })
        .collect()
}
