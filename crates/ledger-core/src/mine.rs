use crate::{
    block::{Block, Solution},
    constants::HASH_HEX_SIZE,
    error::{MiningError, Result},
    pool::{RayonPool, TaskHandle, WorkerPool},
    pow::meets_difficulty,
    strategy::{hardware_threads, DifficultyScaled, WorkerCountStrategy},
};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Outcome of one race.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MiningReport {
    pub hash: String,
    /// Nonce that produced `hash`.
    pub nonce: u64,
    /// Tasks fanned out. Zero when the block was already solved.
    pub workers: usize,
    /// Counter value once every task stopped, i.e. candidates tried.
    pub attempts: u64,
    pub elapsed: Duration,
}

/// Fans a proof-of-work search for one block out across a worker pool. The
/// first task to find a digest with `difficulty` leading zeros claims the
/// block; the others notice the solved flag and return.
pub struct MiningRace<P: WorkerPool = RayonPool> {
    pool: P,
    difficulty: u32,
}

impl MiningRace<RayonPool> {
    pub fn new(difficulty: u32) -> Result<Self> {
        Self::with_strategy(difficulty, &DifficultyScaled::default())
    }

    /// Sizes the pool with `strategy` for this machine, clamped to
    /// `[1, hardware_threads]`.
    pub fn with_strategy<S>(difficulty: u32, strategy: &S) -> Result<Self>
    where
        S: WorkerCountStrategy + ?Sized,
    {
        let hardware = hardware_threads();
        let workers = strategy
            .worker_count(difficulty, hardware)
            .clamp(1, hardware.max(1));
        debug!(difficulty, hardware, workers, "sizing mining pool");
        Ok(Self::with_pool(difficulty, RayonPool::new(workers)?))
    }
}

impl<P: WorkerPool> MiningRace<P> {
    pub fn with_pool(difficulty: u32, pool: P) -> Self {
        if difficulty as usize > HASH_HEX_SIZE {
            warn!(
                difficulty,
                max = HASH_HEX_SIZE,
                "difficulty exceeds digest length, mining will never finish"
            );
        }
        Self { pool, difficulty }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn workers(&self) -> usize {
        self.pool.worker_count()
    }

    /// Runs the race on `block` and returns once every task has stopped, so
    /// the stored hash is final by the time this returns.
    pub fn mine(&self, block: &Block) -> Result<MiningReport> {
        if let Some(solution) = block.solution() {
            return Ok(MiningReport {
                hash: solution.hash.clone(),
                nonce: solution.nonce,
                workers: 0,
                attempts: block.nonce(),
                elapsed: Duration::ZERO,
            });
        }

        let workers = self.pool.worker_count().max(1);
        debug!(
            index = block.index(),
            difficulty = self.difficulty,
            "running using {workers} threads"
        );

        let start = Instant::now();
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let block = block.share();
                let difficulty = self.difficulty;
                self.pool.submit(move || search(&block, difficulty))
            })
            .collect();

        let mut totals = Vec::with_capacity(workers);
        let mut failure = None;
        for handle in handles {
            match handle.wait() {
                Ok(()) => totals.push(start.elapsed()),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        let solution = block.solution().cloned().ok_or(MiningError::WorkerLost)?;
        let elapsed = start.elapsed();
        let avg = totals.iter().sum::<Duration>() / totals.len().max(1) as u32;
        info!(
            index = block.index(),
            nonce = solution.nonce,
            attempts = block.nonce(),
            avg_task_us = avg.as_micros() as u64,
            "block mined: {} in {} microseconds",
            solution.hash,
            elapsed.as_micros()
        );

        Ok(MiningReport {
            hash: solution.hash,
            nonce: solution.nonce,
            workers,
            attempts: block.nonce(),
            elapsed,
        })
    }
}

/// Body of every racing task: poll the flag, try one nonce, claim on success.
fn search(block: &Block, difficulty: u32) {
    while !block.is_claimed() {
        let (nonce, hash) = block.compute_candidate_digest();
        if meets_difficulty(&hash, difficulty)
            && !block.is_claimed()
            && block.try_claim(Solution { nonce, hash })
        {
            trace!(index = block.index(), nonce, "claimed block");
        }
    }
}
