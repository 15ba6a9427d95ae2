pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const DEFAULT_DIFFICULTY: u32 = 3;
pub const GENESIS_DATA: &str = "Genesis Block";

// worker-count heuristic
pub const MAX_DIFFICULTY: u32 = 6;
pub const MIN_WORKERS: usize = 2;
pub const RESERVED_THREADS: usize = 1;
