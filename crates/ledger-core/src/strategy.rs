//! Worker-count heuristics for the mining race.
//!
//! A strategy maps `(difficulty, hardware_threads)` to the number of tasks to
//! fan out. The race clamps whatever a strategy returns to
//! `[1, hardware_threads]`.

use crate::constants::{MAX_DIFFICULTY, MIN_WORKERS, RESERVED_THREADS};

pub trait WorkerCountStrategy: Send + Sync {
    fn worker_count(&self, difficulty: u32, hardware_threads: usize) -> usize;
}

impl<F> WorkerCountStrategy for F
where
    F: Fn(u32, usize) -> usize + Send + Sync,
{
    fn worker_count(&self, difficulty: u32, hardware_threads: usize) -> usize {
        self(difficulty, hardware_threads)
    }
}

/// Logical CPUs available to this process.
pub fn hardware_threads() -> usize {
    num_cpus::get()
}

/// Few workers for easy targets, the whole machine (minus the orchestrating
/// thread) once the difficulty reaches 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultyScaled {
    pub max_difficulty: u32,
    pub minimum: usize,
    pub reserved: usize,
}

impl Default for DifficultyScaled {
    fn default() -> Self {
        Self {
            max_difficulty: MAX_DIFFICULTY,
            minimum: MIN_WORKERS,
            reserved: RESERVED_THREADS,
        }
    }
}

impl WorkerCountStrategy for DifficultyScaled {
    fn worker_count(&self, difficulty: u32, hardware_threads: usize) -> usize {
        let ceiling = hardware_threads.saturating_sub(self.reserved).max(1);
        let wanted = if difficulty == 0 {
            self.minimum
        } else {
            let dynamic = (self.minimum + self.max_difficulty as usize)
                .saturating_sub((self.max_difficulty / difficulty) as usize);
            if difficulty < 2 {
                dynamic
            } else {
                dynamic.max(ceiling)
            }
        };
        wanted.clamp(1, ceiling)
    }
}

/// Always the same count, bounded by the hardware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fixed(pub usize);

impl WorkerCountStrategy for Fixed {
    fn worker_count(&self, _difficulty: u32, hardware_threads: usize) -> usize {
        self.0.clamp(1, hardware_threads.max(1))
    }
}
