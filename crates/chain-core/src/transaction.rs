use serde::{Deserialize, Serialize};
use std::fmt;

pub type Address = String;
pub type Amount = u64;
/// Replayed balances are signed: nothing stops an address from spending more than it received.
pub type Balance = i128;

/// A transfer of `amount` from `from` to `to`. `from == None` marks a mining reward.
///
/// No validation happens here. Solvency, signatures and duplicates are not checked anywhere in
/// this crate, so a transaction is simply a record of intent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    from: Option<Address>,
    to: Address,
    amount: Amount,
}

impl Transaction {
    pub fn new(from: impl Into<Address>, to: impl Into<Address>, amount: Amount) -> Self {
        Self {
            from: Some(from.into()),
            to: to.into(),
            amount,
        }
    }

    /// System-issued transaction crediting `to`.
    pub fn reward(to: impl Into<Address>, amount: Amount) -> Self {
        Self {
            from: None,
            to: to.into(),
            amount,
        }
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn is_reward(&self) -> bool {
        self.from.is_none()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.from {
            Some(from) => write!(f, "{from} -> {}: {}", self.to, self.amount),
            None => write!(f, "reward -> {}: {}", self.to, self.amount),
        }
    }
}
