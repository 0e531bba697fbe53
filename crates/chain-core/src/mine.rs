use crate::error::MiningError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Bounds on a proof-of-work search. The default is unbounded: mining runs until it succeeds.
#[derive(Clone, Debug, Default)]
pub struct MiningLimits {
    /// Maximum number of hashes computed in one call, the starting nonce included.
    pub max_attempts: Option<u64>,
    /// Wall-clock budget for one call.
    pub timeout: Option<Duration>,
    /// Set to `true` from another thread to stop the search.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl MiningLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_attempts.is_none() && self.timeout.is_none() && self.cancel.is_none()
    }

    /// Called before each additional hash; `attempts` hashes have been computed so far.
    pub(crate) fn check(
        &self,
        attempts: u64,
        started: Instant,
        difficulty: u32,
    ) -> Result<(), MiningError> {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(MiningError::Cancelled { attempts });
            }
        }
        if let Some(max_attempts) = self.max_attempts {
            if attempts >= max_attempts {
                return Err(MiningError::AttemptsExhausted {
                    attempts,
                    difficulty,
                });
            }
        }
        if let Some(timeout) = self.timeout {
            let elapsed = started.elapsed();
            if elapsed >= timeout {
                return Err(MiningError::TimedOut {
                    attempts,
                    elapsed,
                    difficulty,
                });
            }
        }
        Ok(())
    }
}

/// Outcome of a successful proof-of-work search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MiningStats {
    pub nonce: u64,
    pub attempts: u64,
    pub elapsed: Duration,
}

/// Expected number of hashes to meet `difficulty` leading hex zeros.
pub fn expected_attempts(difficulty: u32) -> u128 {
    16u128.saturating_pow(difficulty)
}
