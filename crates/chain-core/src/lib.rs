//! Single-process proof-of-work ledger.
//!
//! A [`Chain`] owns a sequence of hash-linked [`Block`]s and a queue of pending
//! [`Transaction`]s. Mining packs the queue into a block, searches for a nonce whose SHA-256 hex
//! digest starts with `difficulty` zeros, appends the block and queues a reward for the miner.
//! Balances are replayed from the mined blocks on every query.
//!
//! ```
//! use chain_core::Chain;
//!
//! let mut chain = Chain::new(1, 100).unwrap();
//! chain.submit("alice", "bob", 30);
//! chain.mine_pending_transactions("miner");
//! assert_eq!(chain.balance_of("bob"), 30);
//! assert_eq!(chain.balance_of("miner"), 0);
//! assert!(chain.is_valid());
//! ```

pub mod block;
pub mod chain;
pub mod config;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod mine;
#[cfg(any(test, feature = "tamper"))]
pub mod tamper;
pub mod transaction;

pub use block::{now_millis, Block};
pub use chain::Chain;
pub use config::ChainConfig;
pub use error::{ChainError, MiningError, Result, ValidationError};
pub use mine::{MiningLimits, MiningStats};
pub use transaction::{Address, Amount, Balance, Transaction};
