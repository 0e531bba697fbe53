//! Canonical byte encoding of block contents and the hash built on top of it.
//!
//! Version 1 layout, all integers little-endian, every string prefixed with its byte length:
//!
//! ```text
//! version:u8 | previous_hash:str | timestamp:u64 | tx_count:u64 | tx* | nonce:u64
//! tx = from_tag:u8 (0 reward, 1 sender) | [from:str] | to:str | amount:u64
//! ```
//!
//! The digest is SHA-256 rendered as 64 lowercase hex characters. Difficulty counts leading
//! `'0'` characters of that rendering, so each step multiplies the expected work by 16.

use crate::constants::ENCODING_VERSION;
use crate::transaction::Transaction;
use sha2::{Digest, Sha256};

pub fn encode_block(
    previous_hash: &str,
    timestamp: u64,
    transactions: &[Transaction],
    nonce: u64,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(33 + previous_hash.len() + transactions.len() * 64);
    bytes.push(ENCODING_VERSION);
    put_str(&mut bytes, previous_hash);
    bytes.extend_from_slice(&timestamp.to_le_bytes());
    bytes.extend_from_slice(&(transactions.len() as u64).to_le_bytes());
    for tx in transactions {
        encode_transaction(&mut bytes, tx);
    }
    bytes.extend_from_slice(&nonce.to_le_bytes());
    bytes
}

fn encode_transaction(bytes: &mut Vec<u8>, tx: &Transaction) {
    match tx.from() {
        Some(from) => {
            bytes.push(1);
            put_str(bytes, from);
        }
        None => bytes.push(0),
    }
    put_str(bytes, tx.to());
    bytes.extend_from_slice(&tx.amount().to_le_bytes());
}

fn put_str(bytes: &mut Vec<u8>, s: &str) {
    bytes.extend_from_slice(&(s.len() as u64).to_le_bytes());
    bytes.extend_from_slice(s.as_bytes());
}

pub fn digest_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn count_leading_zero_chars(hash: &str) -> u32 {
    hash.bytes().take_while(|b| *b == b'0').count() as u32
}

/// True when the first `difficulty` characters of `hash` are all `'0'`.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    count_leading_zero_chars(hash) >= difficulty
}
