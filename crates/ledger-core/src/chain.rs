use crate::{
    block::{Block, BlockRecord},
    constants::{DEFAULT_DIFFICULTY, GENESIS_DATA},
    error::Result,
    mine::MiningRace,
    pool::{RayonPool, WorkerPool},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Leading zero characters required of every block hash.
    pub difficulty: u32,
    pub genesis_data: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            genesis_data: GENESIS_DATA.to_string(),
        }
    }
}

/// Append-only sequence of mined blocks. Never empty: the genesis block is
/// mined when the chain is built.
pub struct Chain<P: WorkerPool = RayonPool> {
    race: MiningRace<P>,
    blocks: Vec<Block>,
}

impl Chain<RayonPool> {
    pub fn new(config: ChainConfig) -> Result<Self> {
        let race = MiningRace::new(config.difficulty)?;
        Self::with_race(race, &config.genesis_data)
    }
}

impl<P: WorkerPool> Chain<P> {
    pub fn with_pool(config: ChainConfig, pool: P) -> Result<Self> {
        let race = MiningRace::with_pool(config.difficulty, pool);
        Self::with_race(race, &config.genesis_data)
    }

    fn with_race(race: MiningRace<P>, genesis_data: &str) -> Result<Self> {
        let genesis = Block::new(0, genesis_data);
        let report = race.mine(&genesis)?;
        info!(hash = %report.hash, workers = race.workers(), "genesis block mined");
        Ok(Self {
            race,
            blocks: vec![genesis],
        })
    }

    pub fn difficulty(&self) -> u32 {
        self.race.difficulty()
    }

    /// Links `candidate` to the current tip, mines it and appends it.
    pub fn append(&mut self, mut candidate: Block) -> Result<&Block> {
        let expected = self.blocks.len() as u64;
        if candidate.index() != expected {
            warn!(index = candidate.index(), expected, "appending block out of sequence");
        }

        let previous = self.last().hash().unwrap_or_default().to_owned();
        candidate.set_previous_hash(&previous)?;
        let report = self.race.mine(&candidate)?;
        info!(
            index = candidate.index(),
            nonce = report.nonce,
            workers = report.workers,
            "appended block {}",
            report.hash
        );

        self.blocks.push(candidate);
        Ok(self.last())
    }

    /// Unmined candidate that would extend the chain by one.
    pub fn next_block(&self, data: impl Into<Vec<u8>>) -> Block {
        Block::new(self.blocks.len() as u64, data)
    }

    pub fn last(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn records(&self) -> Vec<BlockRecord> {
        self.blocks.iter().filter_map(Block::record).collect()
    }
}

impl<'a, P: WorkerPool> IntoIterator for &'a Chain<P> {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pow::meets_difficulty, MiningError};

    fn config(difficulty: u32) -> ChainConfig {
        ChainConfig {
            difficulty,
            ..Default::default()
        }
    }

    #[test]
    fn default_config_example() {
        let config = ChainConfig::default();
        assert_eq!(config.difficulty, 3);
        assert_eq!(config.genesis_data, "Genesis Block");
    }

    #[test]
    fn genesis_block_example() {
        let chain = Chain::new(config(1)).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_empty());

        let genesis = chain.last();
        assert_eq!(genesis.index(), 0);
        assert_eq!(genesis.timestamp(), 0);
        assert_eq!(genesis.data(), b"Genesis Block");
        assert_eq!(genesis.previous_hash(), "");
        assert!(meets_difficulty(genesis.hash().unwrap(), 1));
    }

    #[test]
    fn append_links_to_previous_hash() {
        let mut chain = Chain::with_pool(config(2), RayonPool::new(2).unwrap()).unwrap();
        let genesis_hash = chain.last().hash().unwrap().to_owned();

        let block = chain.append(Block::new(1, "Block 1 Data")).unwrap();
        assert_eq!(block.previous_hash(), genesis_hash);
        assert!(meets_difficulty(block.hash().unwrap(), 2));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn five_appends_make_six_linked_blocks() {
        let mut chain = Chain::new(config(2)).unwrap();
        for i in 1..=5 {
            let candidate = chain.next_block(format!("Block {i} Data"));
            assert_eq!(candidate.index(), i);
            chain.append(candidate).unwrap();
        }
        assert_eq!(chain.len(), 6);
        for pair in chain.blocks().windows(2) {
            assert_eq!(pair[1].previous_hash(), pair[0].hash().unwrap());
        }
        for (i, block) in chain.iter().enumerate() {
            assert_eq!(block.index(), i as u64);
            assert!(meets_difficulty(block.hash().unwrap(), 2));
        }
    }

    #[test]
    fn already_mined_candidate_is_rejected() {
        let mut chain = Chain::new(config(1)).unwrap();
        let candidate = chain.next_block("premined");
        candidate.mine(1).unwrap();

        let err = chain.append(candidate).unwrap_err();
        assert!(matches!(err, MiningError::AlreadyMined { index: 1 }));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn records_cover_every_block() {
        let mut chain = Chain::new(config(1)).unwrap();
        chain.append(chain.next_block("one")).unwrap();
        let records = chain.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data, "Genesis Block");
        assert_eq!(records[1].previous_hash, records[0].hash);
    }

    #[test]
    fn difficulty_comes_from_config() {
        let chain = Chain::new(config(0)).unwrap();
        assert_eq!(chain.difficulty(), 0);
        assert!(chain.get(0).is_some());
        assert!(chain.get(1).is_none());
    }
}
