//! Table randomness for the games of chance.
//!
//! RULE: nothing in the core calls a platform RNG directly. Every
//! draw flows through a TableRng so tests can seed the stream and
//! replay rounds exactly. Draws are uniform and independent; they do
//! not need to be cryptographically secure.

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct TableRng {
    inner: Pcg64Mcg,
}

impl TableRng {
    /// Deterministic stream for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Entropy-seeded stream for production play.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::thread_rng().gen())
    }

    /// Roll a u64 in [0, n).
    fn below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// One roulette pocket, 0..=36.
    pub fn roulette_pocket(&mut self) -> u8 {
        self.below(37) as u8
    }

    /// One die face, 1..=6. Each call is an independent draw.
    pub fn die(&mut self) -> u8 {
        self.below(6) as u8 + 1
    }
}
