//! Engine configuration shared by the caller and player sessions.

use rand::{rngs::StdRng, SeedableRng};

/// Tunables for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// RNG seed for reproducible draws and tickets. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
    /// How many times the generator retries a row whose column ran dry.
    pub max_row_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            max_row_attempts: 16,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Set the row retry budget (at least one attempt).
    pub fn with_max_row_attempts(mut self, attempts: u32) -> Self {
        self.max_row_attempts = attempts.max(1);
        self
    }

    /// Build the RNG this configuration asks for.
    pub fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        }
    }
}
