//! A seedable random source, injected wherever the spec calls for randomness
//! (time-slot sampling, the scheduler's 50-attempt fallback, reminder
//! ordering) so tests can reproduce schedules deterministically.
//!
//! Grounded in spec.md §9 "Randomness" and the seeded-RNG testing idiom used
//! by `guwidoe-GroupMixer`'s solver (`rand_chacha::ChaCha8Rng` behind a
//! `rand::Rng` dev-dependency).

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Anything that can hand out uniformly distributed values; implemented for
/// both the process-wide RNG and a fixed-seed RNG used in tests.
pub trait RandomSource: Send + Sync {
    /// Uniform integer in `[0, bound)`. Panics if `bound == 0`.
    fn gen_range(&self, bound: usize) -> usize;
}

/// Non-deterministic source backed by the thread-local CSPRNG, wrapped in a
/// mutex so it can be shared behind `Arc<dyn RandomSource>`.
pub struct SystemRandom(std::sync::Mutex<StdRng>);

impl Default for SystemRandom {
    fn default() -> Self {
        Self(std::sync::Mutex::new(StdRng::from_os_rng()))
    }
}

impl RandomSource for SystemRandom {
    fn gen_range(&self, bound: usize) -> usize {
        use rand::Rng;
        let mut rng = self.0.lock().expect("random source mutex poisoned");
        rng.random_range(0..bound)
    }
}

/// Deterministic, seedable source for reproducible tests.
pub struct SeededRandom(std::sync::Mutex<ChaCha8Rng>);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(std::sync::Mutex::new(ChaCha8Rng::seed_from_u64(seed)))
    }
}

impl RandomSource for SeededRandom {
    fn gen_range(&self, bound: usize) -> usize {
        use rand::Rng;
        let mut rng = self.0.lock().expect("random source mutex poisoned");
        rng.random_range(0..bound)
    }
}
