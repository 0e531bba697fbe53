use crate::block::{now_millis, Block};
use crate::config::ChainConfig;
use crate::error::{Result, ValidationError};
use crate::mine::MiningLimits;
use crate::transaction::{Address, Amount, Balance, Transaction};
use serde::Serialize;
use tracing::{debug, info, warn};

/// The ledger: mined blocks plus the queue of transactions waiting for the next block.
///
/// One owner drives a `Chain` through `&mut self`; concurrent callers must wrap it in a lock so
/// that mining (take pending, mine, append) and reads never interleave.
#[derive(Clone, Debug, Serialize)]
pub struct Chain {
    pub(crate) blocks: Vec<Block>,
    pending_transactions: Vec<Transaction>,
    difficulty: u32,
    mining_reward: Amount,
    #[serde(skip)]
    verify_genesis: bool,
}

impl Chain {
    pub fn new(difficulty: u32, mining_reward: Amount) -> Result<Self> {
        Self::with_config(ChainConfig::new(difficulty, mining_reward))
    }

    pub fn with_config(config: ChainConfig) -> Result<Self> {
        config.validate()?;
        let genesis = Self::create_genesis_block();
        info!(
            "Chain created: genesis {} (difficulty {}, reward {})",
            genesis.hash(),
            config.difficulty,
            config.mining_reward
        );
        Ok(Self {
            blocks: vec![genesis],
            pending_transactions: Vec::new(),
            difficulty: config.difficulty,
            mining_reward: config.mining_reward,
            verify_genesis: config.verify_genesis,
        })
    }

    fn create_genesis_block() -> Block {
        Block::genesis(now_millis())
    }

    pub fn latest_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("chain always holds its genesis block")
    }

    /// Queue a transaction for the next block. Nothing is validated.
    pub fn submit_transaction(&mut self, transaction: Transaction) {
        debug!("Pending transaction: {}", transaction);
        self.pending_transactions.push(transaction);
    }

    pub fn submit(&mut self, from: impl Into<Address>, to: impl Into<Address>, amount: Amount) {
        self.submit_transaction(Transaction::new(from, to, amount));
    }

    /// Pack every pending transaction into a block, mine it, append it, and queue the reward
    /// for `reward_address`. Blocks until proof-of-work succeeds.
    pub fn mine_pending_transactions(&mut self, reward_address: impl Into<Address>) -> &Block {
        let mut block = self.next_block();
        block.mine(self.difficulty);
        self.append(block, reward_address.into())
    }

    /// Bounded variant of [`Chain::mine_pending_transactions`]. When a limit stops the search
    /// nothing is appended and the pending queue is left as it was.
    pub fn mine_pending_transactions_with(
        &mut self,
        reward_address: impl Into<Address>,
        limits: &MiningLimits,
    ) -> Result<&Block> {
        let mut block = self.next_block();
        if let Err(err) = block.mine_with(self.difficulty, limits) {
            warn!("Mining abandoned: {}", err);
            self.pending_transactions = block.transactions;
            return Err(err.into());
        }
        Ok(self.append(block, reward_address.into()))
    }

    fn next_block(&mut self) -> Block {
        let previous_hash = self.latest_block().hash().to_owned();
        let transactions = std::mem::take(&mut self.pending_transactions);
        Block::new(now_millis(), transactions, previous_hash)
    }

    fn append(&mut self, block: Block, reward_address: Address) -> &Block {
        info!(
            "Block {} appended with {} transactions",
            self.blocks.len(),
            block.transactions().len()
        );
        self.blocks.push(block);
        // Anything still pending here is dropped, not carried over.
        self.pending_transactions = vec![Transaction::reward(reward_address, self.mining_reward)];
        self.latest_block()
    }

    /// Replays every mined transaction. Pending transactions do not count.
    pub fn balance_of(&self, address: &str) -> Balance {
        self.blocks
            .iter()
            .flat_map(|block| block.transactions())
            .fold(0, |mut balance, tx| {
                if tx.from() == Some(address) {
                    balance -= Balance::from(tx.amount());
                }
                if tx.to() == address {
                    balance += Balance::from(tx.amount());
                }
                balance
            })
    }

    pub fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }

    /// Walks the chain and returns the first broken block.
    ///
    /// Every block after genesis must carry its own recomputed hash and point at its
    /// predecessor's stored hash. Genesis itself is only rehashed when the chain was built with
    /// `verify_genesis`.
    pub fn verify(&self) -> std::result::Result<(), ValidationError> {
        let result = self.walk();
        if let Err(err) = &result {
            warn!("Chain validation failed: {}", err);
        }
        result
    }

    fn walk(&self) -> std::result::Result<(), ValidationError> {
        if self.verify_genesis {
            let genesis = &self.blocks[0];
            let computed = genesis.compute_hash();
            if genesis.hash() != computed {
                return Err(ValidationError::GenesisMismatch {
                    stored: genesis.hash().to_owned(),
                    computed,
                });
            }
        }

        for (i, pair) in self.blocks.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            let index = i + 1;

            let computed = current.compute_hash();
            if current.hash() != computed {
                return Err(ValidationError::HashMismatch {
                    index,
                    stored: current.hash().to_owned(),
                    computed,
                });
            }
            if current.previous_hash() != previous.hash() {
                return Err(ValidationError::BrokenLink {
                    index,
                    expected: previous.hash().to_owned(),
                    found: current.previous_hash().to_owned(),
                });
            }
        }
        Ok(())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Index of the latest block; 0 when only genesis exists.
    pub fn height(&self) -> usize {
        self.blocks.len() - 1
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending_transactions
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn mining_reward(&self) -> Amount {
        self.mining_reward
    }

    pub fn verifies_genesis(&self) -> bool {
        self.verify_genesis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_DIFFICULTY;
    use crate::encoding::meets_difficulty;
    use crate::error::{ChainError, MiningError};
    use crate::tamper;

    fn two_block_chain() -> Chain {
        let mut chain = Chain::new(1, 100).unwrap();
        chain.submit("A", "B", 100);
        chain.submit("B", "A", 50);
        chain.mine_pending_transactions("M");
        chain
    }

    #[test]
    fn genesis_block_example() {
        let chain = Chain::new(2, 100).unwrap();
        assert_eq!(chain.height(), 0);
        let genesis = chain.latest_block();
        assert_eq!(genesis.previous_hash(), "0");
        assert!(genesis.transactions().is_empty());
        assert_eq!(genesis.nonce(), 0);
        assert!(chain.pending_transactions().is_empty());
        assert!(chain.is_valid());
    }

    #[test]
    fn rejects_unreachable_difficulty() {
        assert!(matches!(
            Chain::new(65, 1),
            Err(ChainError::DifficultyTooHigh { .. })
        ));
    }

    #[test]
    fn reference_scenario() {
        let mut chain = Chain::new(1, 100).unwrap();
        chain.submit_transaction(Transaction::new("A", "B", 100));
        chain.submit_transaction(Transaction::new("B", "A", 50));
        assert_eq!(chain.balance_of("A"), 0);
        assert_eq!(chain.balance_of("B"), 0);

        chain.mine_pending_transactions("M");
        assert_eq!(chain.balance_of("A"), -50);
        assert_eq!(chain.balance_of("B"), 50);
        assert_eq!(chain.balance_of("M"), 0);
        assert_eq!(
            chain.pending_transactions(),
            &[Transaction::reward("M", 100)]
        );

        chain.mine_pending_transactions("M");
        assert_eq!(chain.balance_of("M"), 100);
        assert_eq!(chain.balance_of("A"), -50);
        assert_eq!(chain.height(), 2);
        assert!(chain.is_valid());
    }

    #[test]
    fn mined_block_links_and_meets_difficulty() {
        let mut chain = Chain::new(2, 10).unwrap();
        let genesis_hash = chain.latest_block().hash().to_owned();
        chain.submit("x", "y", 1);
        let block = chain.mine_pending_transactions("m");
        assert_eq!(block.previous_hash(), genesis_hash);
        assert!(meets_difficulty(block.hash(), 2));
        assert_eq!(block.hash(), block.compute_hash());
        assert_eq!(block.transactions(), &[Transaction::new("x", "y", 1)]);
    }

    #[test]
    fn empty_pending_still_mines_a_block() {
        let mut chain = Chain::new(1, 100).unwrap();
        let block = chain.mine_pending_transactions("M");
        assert!(block.transactions().is_empty());
        assert_eq!(chain.height(), 1);
        assert!(chain.is_valid());
    }

    #[test]
    fn pending_queue_is_replaced_by_reward() {
        let mut chain = Chain::new(0, 7).unwrap();
        chain.submit("a", "b", 1);
        chain.mine_pending_transactions("m1");
        chain.mine_pending_transactions("m2");
        // m1's reward landed in block 2, m2's is waiting.
        assert_eq!(chain.blocks()[2].transactions(), &[Transaction::reward("m1", 7)]);
        assert_eq!(chain.pending_transactions(), &[Transaction::reward("m2", 7)]);
        assert_eq!(chain.balance_of("m1"), 7);
        assert_eq!(chain.balance_of("m2"), 0);
    }

    #[test]
    fn unknown_address_has_zero_balance() {
        let chain = two_block_chain();
        assert_eq!(chain.balance_of("nobody"), 0);
        assert_eq!(chain.balance_of(""), 0);
    }

    #[test]
    fn self_transfer_nets_to_zero() {
        let mut chain = Chain::new(0, 0).unwrap();
        chain.submit("A", "A", 30);
        chain.mine_pending_transactions("M");
        assert_eq!(chain.balance_of("A"), 0);
    }

    #[test]
    fn valid_after_many_mines() {
        let mut chain = Chain::new(1, 5).unwrap();
        for i in 0..6 {
            chain.submit(format!("u{i}"), format!("u{}", i + 1), i);
            chain.mine_pending_transactions("M");
        }
        assert_eq!(chain.height(), 6);
        assert_eq!(chain.verify(), Ok(()));
        assert_eq!(chain.balance_of("M"), 25);
    }

    #[test]
    fn tampered_transactions_invalidate_chain() {
        let mut chain = two_block_chain();
        assert!(chain.is_valid());
        let block = tamper::block_mut(&mut chain, 1).unwrap();
        tamper::set_transactions(block, vec![Transaction::new("B", "A", 1_000)]);
        assert!(!chain.is_valid());
        assert!(matches!(
            chain.verify(),
            Err(ValidationError::HashMismatch { index: 1, .. })
        ));
        // The replay still reads the forged data; validity is the only guard.
        assert_eq!(chain.balance_of("A"), 1_000);
    }

    #[test]
    fn tampered_previous_hash_invalidates_chain() {
        let mut chain = two_block_chain();
        let block = tamper::block_mut(&mut chain, 1).unwrap();
        tamper::set_previous_hash(block, "deadbeef");
        assert!(!chain.is_valid());
    }

    #[test]
    fn remined_tampered_block_breaks_the_next_link() {
        let mut chain = two_block_chain();
        chain.mine_pending_transactions("M");
        let block = tamper::block_mut(&mut chain, 1).unwrap();
        tamper::set_transactions(block, Vec::new());
        block.mine(1);
        assert_eq!(
            chain.verify().map_err(|e| e.index()),
            Err(2),
            "block 2 still points at the old hash of block 1"
        );
    }

    #[test]
    fn tampered_stored_hash_fails_own_check() {
        let mut chain = two_block_chain();
        chain.mine_pending_transactions("M");
        let block = tamper::block_mut(&mut chain, 1).unwrap();
        tamper::set_hash(block, "0".repeat(64));
        assert!(matches!(
            chain.verify(),
            Err(ValidationError::HashMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn genesis_self_hash_is_not_checked_by_default() {
        let mut chain = Chain::new(0, 1).unwrap();
        let genesis = tamper::block_mut(&mut chain, 0).unwrap();
        tamper::set_timestamp(genesis, 1);
        assert!(chain.is_valid());

        // Once a block links to genesis the stale hash is still what it points at.
        chain.mine_pending_transactions("M");
        assert!(chain.is_valid());
    }

    #[test]
    fn genesis_self_hash_checked_when_configured() {
        let config = ChainConfig {
            verify_genesis: true,
            ..ChainConfig::new(0, 1)
        };
        let mut chain = Chain::with_config(config).unwrap();
        assert!(chain.verifies_genesis());
        assert!(chain.is_valid());

        let genesis = tamper::block_mut(&mut chain, 0).unwrap();
        tamper::set_timestamp(genesis, 1);
        assert!(matches!(
            chain.verify(),
            Err(ValidationError::GenesisMismatch { .. })
        ));
    }

    #[test]
    fn bounded_mining_failure_restores_pending() {
        let mut chain = Chain::new(MAX_DIFFICULTY, 100).unwrap();
        chain.submit("A", "B", 10);
        let before = chain.pending_transactions().to_vec();

        let err = chain
            .mine_pending_transactions_with("M", &MiningLimits::default().with_max_attempts(3))
            .unwrap_err();
        assert!(matches!(
            err,
            ChainError::Mining(MiningError::AttemptsExhausted { attempts: 3, .. })
        ));
        assert_eq!(chain.height(), 0);
        assert_eq!(chain.pending_transactions(), before.as_slice());
        assert!(chain.is_valid());
    }

    #[test]
    fn bounded_mining_success_appends() {
        let mut chain = Chain::new(1, 100).unwrap();
        chain.submit("A", "B", 10);
        let block = chain
            .mine_pending_transactions_with("M", &MiningLimits::unbounded())
            .unwrap();
        assert_eq!(block.transactions().len(), 1);
        assert_eq!(chain.height(), 1);
        assert_eq!(chain.pending_transactions(), &[Transaction::reward("M", 100)]);
    }

    #[test]
    fn chain_serializes_blocks_and_pending() {
        let chain = two_block_chain();
        let value = serde_json::to_value(&chain).unwrap();
        assert_eq!(value["blocks"].as_array().unwrap().len(), 2);
        assert_eq!(value["pending_transactions"][0]["to"], "M");
        assert_eq!(value["difficulty"], 1);
        assert!(value.get("verify_genesis").is_none());
    }
}
