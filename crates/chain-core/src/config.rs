use crate::constants::{DEFAULT_DIFFICULTY, DEFAULT_MINING_REWARD, MAX_DIFFICULTY};
use crate::error::{ChainError, Result};
use crate::transaction::Amount;
use serde::{Deserialize, Serialize};

/// Chain parameters. Every field is optional in serialized form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainConfig {
    /// Leading hex zeros required in a block hash.
    pub difficulty: u32,
    /// Amount paid to the reward address after each mined block.
    pub mining_reward: Amount,
    /// Also recompute the genesis block's own hash during validation.
    pub verify_genesis: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            mining_reward: DEFAULT_MINING_REWARD,
            verify_genesis: false,
        }
    }
}

impl ChainConfig {
    pub fn new(difficulty: u32, mining_reward: Amount) -> Self {
        Self {
            difficulty,
            mining_reward,
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// A difficulty longer than the hex digest can never be met and would mine forever.
    pub fn validate(&self) -> Result<()> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(ChainError::DifficultyTooHigh {
                difficulty: self.difficulty,
                max: MAX_DIFFICULTY,
            });
        }
        Ok(())
    }
}
