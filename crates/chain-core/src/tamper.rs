//! Deliberate corruption of mined blocks, for exercising [`crate::Chain::verify`].
//!
//! None of these setters touch the stored hash unless asked to, so each edit leaves a block
//! whose hash no longer matches its contents. Only compiled with the `tamper` feature.

use crate::block::Block;
use crate::chain::Chain;
use crate::transaction::Transaction;

pub fn block_mut(chain: &mut Chain, index: usize) -> Option<&mut Block> {
    chain.blocks.get_mut(index)
}

pub fn set_transactions(block: &mut Block, transactions: Vec<Transaction>) {
    block.transactions = transactions;
}

pub fn set_previous_hash(block: &mut Block, previous_hash: impl Into<String>) {
    block.previous_hash = previous_hash.into();
}

pub fn set_timestamp(block: &mut Block, timestamp: u64) {
    block.timestamp = timestamp;
}

pub fn set_nonce(block: &mut Block, nonce: u64) {
    block.nonce = nonce;
}

pub fn set_hash(block: &mut Block, hash: impl Into<String>) {
    block.hash = hash.into();
}
