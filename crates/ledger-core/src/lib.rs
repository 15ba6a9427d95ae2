pub mod block;
pub mod chain;
pub mod constants;
pub mod error;
pub mod mine;
pub mod pool;
pub mod strategy;

pub use block::{Block, BlockRecord, Solution};
pub use chain::{Chain, ChainConfig};
pub use error::MiningError;
pub use mine::{MiningRace, MiningReport};
pub use pool::{RayonPool, TaskHandle, WorkerPool};
pub use strategy::{DifficultyScaled, Fixed, WorkerCountStrategy};

use sha2::{Digest, Sha256};

/// SHA-256 of `bytes`, lowercase hex encoded.
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub mod pow {
    /// True when the first `difficulty` characters of `hash` are all `'0'`.
    pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
        let d = difficulty as usize;
        hash.len() >= d && hash.as_bytes()[..d].iter().all(|c| *c == b'0')
    }

    pub fn count_leading_zeros(hash: &str) -> u32 {
        hash.bytes().take_while(|c| *c == b'0').count() as u32
    }
}
