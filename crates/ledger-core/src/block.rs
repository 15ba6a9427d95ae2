use crate::{digest, error::Result, mine::MiningRace, MiningError};
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, OnceLock,
};

#[derive(Clone, Debug, PartialEq, Eq)]
struct BlockHeader {
    index: u64,
    timestamp: u64,
    data: Vec<u8>,
    previous_hash: String,
}

impl BlockHeader {
    fn preimage(&self, nonce: u64) -> Vec<u8> {
        let mut bytes = format!("{}{}", self.index, self.timestamp).into_bytes();
        bytes.extend_from_slice(&self.data);
        bytes.extend_from_slice(nonce.to_string().as_bytes());
        bytes.extend_from_slice(self.previous_hash.as_bytes());
        bytes
    }
}

/// The winning nonce together with the digest it produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub nonce: u64,
    pub hash: String,
}

/// State shared by every task racing on the same block.
#[derive(Debug, Default)]
struct MiningState {
    nonce: AtomicU64,
    /// Race gate: won by exactly one task.
    claimed: AtomicBool,
    /// Published after `solution` is written.
    solved: AtomicBool,
    solution: OnceLock<Solution>,
}

/// A ledger entry: immutable identity fields plus the mining state that the
/// racing workers mutate concurrently.
#[derive(Debug)]
pub struct Block {
    header: Arc<BlockHeader>,
    state: Arc<MiningState>,
}

impl Block {
    /// Creates an unsolved block. The timestamp is the index so that runs are
    /// reproducible.
    pub fn new(index: u64, data: impl Into<Vec<u8>>) -> Self {
        Self {
            header: Arc::new(BlockHeader {
                index,
                timestamp: index,
                data: data.into(),
                previous_hash: String::new(),
            }),
            state: Arc::default(),
        }
    }

    pub fn index(&self) -> u64 {
        self.header.index
    }

    pub fn timestamp(&self) -> u64 {
        self.header.timestamp
    }

    pub fn data(&self) -> &[u8] {
        &self.header.data
    }

    pub fn previous_hash(&self) -> &str {
        &self.header.previous_hash
    }

    /// Current value of the shared nonce counter. Once the race is over this is
    /// the number of candidates tried, not the winning nonce.
    pub fn nonce(&self) -> u64 {
        self.state.nonce.load(Ordering::Relaxed)
    }

    /// True once the winning hash is stored. A `true` here always comes
    /// with `hash()` returning `Some`.
    pub fn is_solved(&self) -> bool {
        self.state.solved.load(Ordering::Acquire)
    }

    /// True as soon as a task has won the race, possibly before its hash is
    /// published.
    pub(crate) fn is_claimed(&self) -> bool {
        self.state.claimed.load(Ordering::Acquire)
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.state.solution.get()
    }

    /// The mined hash, or `None` while the block is unsolved.
    pub fn hash(&self) -> Option<&str> {
        self.solution().map(|s| s.hash.as_str())
    }

    /// Digest of the block contents for an explicit nonce. Does not touch the
    /// shared counter.
    pub fn digest_at(&self, nonce: u64) -> String {
        digest(&self.header.preimage(nonce))
    }

    /// Advances the shared nonce by one and returns the post-increment value
    /// with its digest. Safe to call from many threads at once: each caller
    /// gets a distinct nonce.
    pub fn compute_candidate_digest(&self) -> (u64, String) {
        let nonce = self.state.nonce.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        (nonce, self.digest_at(nonce))
    }

    /// Mines the block with a fresh race sized for `difficulty` and returns
    /// the stored hash.
    pub fn mine(&self, difficulty: u32) -> Result<String> {
        let race = MiningRace::new(difficulty)?;
        Ok(race.mine(self)?.hash)
    }

    pub fn record(&self) -> Option<BlockRecord> {
        let solution = self.solution()?;
        Some(BlockRecord {
            index: self.index(),
            timestamp: self.timestamp(),
            data: String::from_utf8_lossy(self.data()).into_owned(),
            previous_hash: self.previous_hash().to_owned(),
            nonce: solution.nonce,
            hash: solution.hash.clone(),
        })
    }

    /// Links the block to its predecessor. Only valid before mining starts.
    pub(crate) fn set_previous_hash(&mut self, previous_hash: &str) -> Result<()> {
        if self.is_claimed() {
            return Err(MiningError::AlreadyMined {
                index: self.index(),
            });
        }
        Arc::make_mut(&mut self.header).previous_hash = previous_hash.to_owned();
        Ok(())
    }

    /// Flips the claim flag false -> true. Only the caller that wins the
    /// exchange stores its solution and then publishes `solved`; everyone
    /// else gets `false`.
    pub(crate) fn try_claim(&self, solution: Solution) -> bool {
        if self
            .state
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        // sole winner, the cell is still empty
        let _ = self.state.solution.set(solution);
        self.state.solved.store(true, Ordering::Release);
        true
    }

    /// Another handle onto the same block, for handing to a worker task.
    pub(crate) fn share(&self) -> Block {
        Block {
            header: Arc::clone(&self.header),
            state: Arc::clone(&self.state),
        }
    }
}

/// Serializable snapshot of a mined block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub index: u64,
    pub timestamp: u64,
    pub data: String,
    pub previous_hash: String,
    pub nonce: u64,
    pub hash: String,
}
