//! Game identifier generation.
//!
//! Ids are the hex SHA-256 digest of 32 bytes drawn from a ChaCha20 CSPRNG,
//! truncated to the configured length.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

pub const MIN_ID_LENGTH: usize = 4;
/// Length of a full hex SHA-256 digest
pub const MAX_ID_LENGTH: usize = 64;

#[derive(Debug)]
pub struct GameIdGenerator {
    rng: ChaCha20Rng,
    length: usize,
}

impl GameIdGenerator {
    pub fn new(length: usize) -> Self {
        Self::with_rng(ChaCha20Rng::from_entropy(), length)
    }

    /// Deterministic generator for tests.
    pub fn seeded(seed: u64, length: usize) -> Self {
        Self::with_rng(ChaCha20Rng::seed_from_u64(seed), length)
    }

    fn with_rng(rng: ChaCha20Rng, length: usize) -> Self {
        Self {
            rng,
            length: length.clamp(MIN_ID_LENGTH, MAX_ID_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn next_id(&mut self) -> String {
        let mut seed = [0u8; 32];
        self.rng.fill_bytes(&mut seed);
        let digest = Sha256::digest(seed);
        let mut id = hex::encode(digest);
        id.truncate(self.length);
        id
    }
}
