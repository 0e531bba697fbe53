use std::time::Duration;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ChainError>;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("difficulty {difficulty} exceeds the maximum of {max} hex characters")]
    DifficultyTooHigh { difficulty: u32, max: u32 },

    #[error("invalid chain config: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Mining(#[from] MiningError),
}

/// Reasons a bounded proof-of-work search stopped before finding a valid hash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiningError {
    #[error("gave up after {attempts} attempts without meeting difficulty {difficulty}")]
    AttemptsExhausted { attempts: u64, difficulty: u32 },

    #[error("timed out after {elapsed:?} ({attempts} attempts) at difficulty {difficulty}")]
    TimedOut {
        attempts: u64,
        elapsed: Duration,
        difficulty: u32,
    },

    #[error("cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },
}

/// First integrity failure found while walking the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("block {index}: stored hash {stored} does not match recomputed {computed}")]
    HashMismatch {
        index: usize,
        stored: String,
        computed: String,
    },

    #[error("block {index}: previous hash {found} does not match predecessor hash {expected}")]
    BrokenLink {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("genesis block: stored hash {stored} does not match recomputed {computed}")]
    GenesisMismatch { stored: String, computed: String },
}

impl ValidationError {
    /// Index of the block that failed the check.
    pub fn index(&self) -> usize {
        match self {
            ValidationError::HashMismatch { index, .. } => *index,
            ValidationError::BrokenLink { index, .. } => *index,
            ValidationError::GenesisMismatch { .. } => 0,
        }
    }
}
