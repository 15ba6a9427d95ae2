mod helpers;

use helpers::{assert_mined, random_payloads};
use ledger_core::{strategy::hardware_threads, Block, MiningRace, RayonPool};

#[test]
fn test_worker_counts_never_corrupt_block() -> anyhow::Result<()> {
    let many = hardware_threads().max(4);
    for workers in [1, 2, many] {
        let race = MiningRace::with_pool(3, RayonPool::new(workers)?);
        for round in 0..5 {
            let block = Block::new(round, "same payload");
            let report = race.mine(&block)?;
            assert_eq!(report.workers, workers);
            assert_mined(&block, 3);
            // flag never flips back and the hash never changes
            for _ in 0..10 {
                assert!(block.is_solved());
                assert_eq!(block.hash(), Some(report.hash.as_str()));
            }
        }
    }
    Ok(())
}

#[test]
fn test_identity_fields_are_deterministic() -> anyhow::Result<()> {
    let race = MiningRace::with_pool(2, RayonPool::new(4)?);
    let a = Block::new(9, "payload");
    let b = Block::new(9, "payload");
    race.mine(&a)?;
    race.mine(&b)?;
    assert_eq!(a.index(), b.index());
    assert_eq!(a.data(), b.data());
    assert_eq!(a.timestamp(), b.timestamp());
    assert_mined(&a, 2);
    assert_mined(&b, 2);
    Ok(())
}

#[test]
fn test_full_hardware_race_terminates() -> anyhow::Result<()> {
    let race = MiningRace::new(4)?;
    let block = Block::new(1, "hard");
    let report = race.mine(&block)?;
    assert!(report.hash.starts_with("0000"));
    assert_mined(&block, 4);
    Ok(())
}

#[test]
fn test_block_mine_entry_point() -> anyhow::Result<()> {
    for (i, payload) in random_payloads(7, 10).into_iter().enumerate() {
        let block = Block::new(i as u64, payload);
        let hash = block.mine(2)?;
        assert_eq!(block.hash(), Some(hash.as_str()));
        assert_mined(&block, 2);
    }
    Ok(())
}
