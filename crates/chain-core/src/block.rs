use crate::constants::{GENESIS_PREVIOUS_HASH, PROGRESS_INTERVAL};
use crate::encoding::{digest_hex, encode_block, meets_difficulty};
use crate::error::MiningError;
use crate::mine::{expected_attempts, MiningLimits, MiningStats};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, trace};

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// A batch of transactions linked to its predecessor by hash.
///
/// `hash` and `nonce` only change through [`Block::mine`] / [`Block::mine_with`]. The stored hash
/// is trusted until somebody recomputes it, which is how [`crate::Chain::is_valid`] spots edits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub(crate) timestamp: u64,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) previous_hash: String,
    pub(crate) hash: String,
    pub(crate) nonce: u64,
}

impl Block {
    /// Unmined block: `nonce` is 0 and `hash` is computed from that state.
    pub fn new(
        timestamp: u64,
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
    ) -> Self {
        let mut block = Self {
            timestamp,
            transactions,
            previous_hash: previous_hash.into(),
            hash: String::new(),
            nonce: 0,
        };
        block.hash = block.compute_hash();
        block
    }

    /// Empty block with the sentinel previous hash.
    pub fn genesis(timestamp: u64) -> Self {
        Self::new(timestamp, Vec::new(), GENESIS_PREVIOUS_HASH)
    }

    pub fn compute_hash(&self) -> String {
        digest_hex(&encode_block(
            &self.previous_hash,
            self.timestamp,
            &self.transactions,
            self.nonce,
        ))
    }

    /// Search forward from the current nonce until the hash has `difficulty` leading zeros.
    /// Blocks the caller; there is no way out except success.
    pub fn mine(&mut self, difficulty: u32) -> MiningStats {
        match self.search(difficulty, |_, _| Ok::<(), Infallible>(())) {
            Ok(stats) => stats,
            Err(never) => match never {},
        }
    }

    /// Like [`Block::mine`] but stops with an error once `limits` are hit. The block keeps the
    /// nonce it reached, with a matching hash, so a later call resumes from there.
    pub fn mine_with(
        &mut self,
        difficulty: u32,
        limits: &MiningLimits,
    ) -> Result<MiningStats, MiningError> {
        self.search(difficulty, |attempts, started| {
            limits.check(attempts, started, difficulty)
        })
    }

    fn search<E>(
        &mut self,
        difficulty: u32,
        mut keep_going: impl FnMut(u64, Instant) -> Result<(), E>,
    ) -> Result<MiningStats, E> {
        debug!(
            "Mining from nonce {} at difficulty {} (~{} hashes expected)",
            self.nonce,
            difficulty,
            expected_attempts(difficulty)
        );
        let started = Instant::now();
        // Refresh first so a stale stored hash never passes for a mined one.
        self.hash = self.compute_hash();
        let mut attempts = 1u64;

        while !meets_difficulty(&self.hash, difficulty) {
            keep_going(attempts, started)?;
            self.nonce = self.nonce.wrapping_add(1);
            self.hash = self.compute_hash();
            attempts += 1;
            if attempts % PROGRESS_INTERVAL == 0 {
                trace!(attempts, nonce = self.nonce, difficulty, "mining");
            }
        }

        let elapsed = started.elapsed();
        info!(
            "Block mined: {} (nonce {}, {} attempts, {:?})",
            self.hash, self.nonce, attempts, elapsed
        );
        Ok(MiningStats {
            nonce: self.nonce,
            attempts,
            elapsed,
        })
    }

    /// Stored hash is current and satisfies `difficulty`.
    pub fn is_mined(&self, difficulty: u32) -> bool {
        self.hash == self.compute_hash() && meets_difficulty(&self.hash, difficulty)
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }
}
