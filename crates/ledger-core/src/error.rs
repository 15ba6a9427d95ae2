use thiserror::Error;

#[derive(Debug, Error)]
pub enum MiningError {
    /// The worker pool could not spawn its threads.
    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),

    /// A mining task ended without reporting completion (it panicked).
    #[error("mining task exited without completing")]
    WorkerLost,

    /// A solved block cannot be linked to a new predecessor.
    #[error("block {index} is already mined and cannot be relinked")]
    AlreadyMined { index: u64 },
}

pub type Result<T> = std::result::Result<T, MiningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_mined_message() {
        let err = MiningError::AlreadyMined { index: 4 };
        assert_eq!(
            err.to_string(),
            "block 4 is already mined and cannot be relinked"
        );
    }

    #[test]
    fn worker_lost_message() {
        assert_eq!(
            MiningError::WorkerLost.to_string(),
            "mining task exited without completing"
        );
    }
}
