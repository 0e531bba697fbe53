pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const MAX_DIFFICULTY: u32 = HASH_HEX_SIZE as u32;
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const ENCODING_VERSION: u8 = 1;
pub const DEFAULT_DIFFICULTY: u32 = 5;
pub const DEFAULT_MINING_REWARD: u64 = 100;
/// Attempts between two `trace` progress events while mining.
pub const PROGRESS_INTERVAL: u64 = 100_000;
