use rand::Rng;
use tracing::warn;

use crate::game_engine::{
    error::{EngineError, EngineResult},
    models::MAX_NUMBER,
};

/// The caller's bag of numbers 1–90, drawn without replacement.
///
/// `remaining` and `drawn` always partition 1..=90; `drawn` keeps draw order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberPool {
    remaining: Vec<u8>,
    drawn: Vec<u8>,
}

impl Default for NumberPool {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberPool {
    /// A full pool with nothing drawn.
    pub fn new() -> Self {
        NumberPool {
            remaining: (1..=MAX_NUMBER).collect(),
            drawn: Vec::new(),
        }
    }

    /// Rebuild a pool from a previous draw order. Out-of-range values and
    /// repeats are skipped with a warning; the first occurrence wins.
    pub fn from_drawn(drawn: &[u8]) -> Self {
        let mut pool = Self::new();
        for &n in drawn {
            match pool.remaining.iter().position(|&r| r == n) {
                Some(idx) => {
                    pool.remaining.remove(idx);
                    pool.drawn.push(n);
                }
                None => warn!(number = n, "skipping repeated or out-of-range drawn number"),
            }
        }
        pool
    }

    /// Draw one number uniformly from what is left.
    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> EngineResult<u8> {
        if self.remaining.is_empty() {
            return Err(EngineError::EmptyPool);
        }
        let idx = rng.gen_range(0..self.remaining.len());
        let number = self.remaining.remove(idx);
        self.drawn.push(number);
        Ok(number)
    }

    /// Undrawn numbers, ascending.
    pub fn remaining(&self) -> &[u8] {
        &self.remaining
    }

    /// Drawn numbers in draw order.
    pub fn drawn_so_far(&self) -> &[u8] {
        &self.drawn
    }

    pub fn is_drawn(&self, number: u8) -> bool {
        self.drawn.contains(&number)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn last_drawn(&self) -> Option<u8> {
        self.drawn.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn ninety_draws_empty_the_pool() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut pool = NumberPool::new();
        let all: Vec<u8> = (0..90).map(|_| pool.draw(&mut rng).unwrap()).collect();

        let unique: HashSet<u8> = all.iter().copied().collect();
        assert_eq!(unique.len(), 90);
        assert!(all.iter().all(|n| (1..=90).contains(n)));
        assert!(pool.is_empty());
        assert_eq!(pool.draw(&mut rng), Err(EngineError::EmptyPool));
        assert_eq!(pool.drawn_so_far().len(), 90);
    }

    #[test]
    fn pool_is_deterministic_with_seed() {
        let make = |seed: u64| -> Vec<u8> {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut pool = NumberPool::new();
            (0..10).map(|_| pool.draw(&mut rng).unwrap()).collect()
        };
        assert_eq!(make(99), make(99));
        assert_ne!(make(99), make(100));
    }

    #[test]
    fn from_drawn_skips_repeats_and_strays() {
        let pool = NumberPool::from_drawn(&[7, 0, 14, 7, 91, 21]);
        assert_eq!(pool.drawn_so_far(), &[7, 14, 21]);
        assert_eq!(pool.remaining().len(), 87);
        assert!(!pool.remaining().contains(&14));
        assert_eq!(pool.last_drawn(), Some(21));
    }

    #[test]
    fn draws_are_not_skewed_to_one_end() {
        // First draw over many seeds should land in both halves regularly.
        let low = (0..400u64)
            .filter(|&seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                NumberPool::new().draw(&mut rng).unwrap() <= 45
            })
            .count();
        assert!((120..=280).contains(&low), "low-half first draws: {low}/400");
    }

    proptest! {
        #[test]
        fn drawn_and_remaining_partition_the_deck(seed in any::<u64>(), draws in 0usize..=90) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut pool = NumberPool::new();
            for _ in 0..draws {
                pool.draw(&mut rng).unwrap();
                prop_assert_eq!(pool.drawn_so_far().len() + pool.remaining().len(), 90);
            }
            let drawn: HashSet<u8> = pool.drawn_so_far().iter().copied().collect();
            prop_assert_eq!(drawn.len(), draws);
            prop_assert!(pool.remaining().iter().all(|n| !drawn.contains(n)));
        }
    }
}
