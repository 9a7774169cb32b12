//! Seedable random source for stray actions and tie-breaking.

pub use rand::Rng;
use rand::SeedableRng;
pub use rand_chacha::ChaCha8Rng;

use crate::utils::env::{self, VarError};

static ENV_RNG_SEED: &str = "SEED";

/// Seed taken from the `SEED` environment variable, if set.
pub fn env_seed() -> Result<Option<u64>, VarError> {
    env::var_opt::<_, u64>(ENV_RNG_SEED)
}

/// A generator seeded with `seed`, falling back to `SEED` and then to entropy.
pub fn seeded_rng(seed: Option<u64>) -> Result<ChaCha8Rng, VarError> {
    let seed = match seed {
        Some(seed) => Some(seed),
        None => env_seed()?,
    };
    Ok(match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    })
}
