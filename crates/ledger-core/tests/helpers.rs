#![allow(dead_code)]

use ledger_core::{pow::meets_difficulty, Block, Chain, WorkerPool};
use rand::{distributions::Alphanumeric, rngs::StdRng, Rng, SeedableRng};

pub fn random_payloads(seed: u64, count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let len = rng.gen_range(0..64);
            (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect()
        })
        .collect()
}

pub fn assert_mined(block: &Block, difficulty: u32) {
    let solution = block.solution().expect("block should be solved");
    assert!(block.is_solved());
    assert!(
        meets_difficulty(&solution.hash, difficulty),
        "{} does not have {difficulty} leading zeros",
        solution.hash
    );
    assert_eq!(block.digest_at(solution.nonce), solution.hash);
}

pub fn assert_linked<P: WorkerPool>(chain: &Chain<P>) {
    let blocks = chain.blocks();
    assert_eq!(blocks[0].index(), 0);
    assert_eq!(blocks[0].previous_hash(), "");
    for i in 1..blocks.len() {
        assert_eq!(
            blocks[i].previous_hash(),
            blocks[i - 1].hash().expect("mined"),
            "link broken at {i}"
        );
    }
}
