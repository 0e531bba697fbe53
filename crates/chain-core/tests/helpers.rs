use chain_core::{Amount, Balance, Transaction};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashMap;

pub const ADDRESSES: [&str; 5] = ["alice", "bob", "carol", "dave", "erin"];

pub fn random_transactions(seed: u64, count: usize) -> Vec<Transaction> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let from = ADDRESSES[rng.gen_range(0..ADDRESSES.len())];
            let to = ADDRESSES[rng.gen_range(0..ADDRESSES.len())];
            let amount: Amount = rng.gen_range(0..1_000);
            Transaction::new(from, to, amount)
        })
        .collect()
}

/// Balances computed directly from a list of transactions.
pub fn expected_balances<'a>(
    txs: impl IntoIterator<Item = &'a Transaction>,
) -> HashMap<String, Balance> {
    let mut balances = HashMap::new();
    for tx in txs {
        if let Some(from) = tx.from() {
            *balances.entry(from.to_owned()).or_insert(0) -= Balance::from(tx.amount());
        }
        *balances.entry(tx.to().to_owned()).or_insert(0) += Balance::from(tx.amount());
    }
    balances
}
