use anyhow::{Context, Result};
use chain_core::{tamper, Chain, ChainConfig, MiningLimits, Transaction};
use clap::Parser;
use std::{fs, path::PathBuf, time::Duration};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "chain-demo")]
#[command(about = "Drive an in-memory proof-of-work chain through a sample session")]
struct Args {
    /// JSON chain config; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Leading hex zeros required per block hash
    #[arg(long)]
    difficulty: Option<u32>,

    /// Reward queued for the miner after each block
    #[arg(long)]
    reward: Option<u64>,

    /// Also rehash the genesis block when validating
    #[arg(long)]
    verify_genesis: bool,

    /// Give up mining a block after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Give up mining a block after this many hashes
    #[arg(long)]
    max_attempts: Option<u64>,

    /// Address credited with mining rewards
    #[arg(long, default_value = "miner-address")]
    miner: String,

    /// Print the whole chain as JSON at the end
    #[arg(long)]
    dump: bool,
}

impl Args {
    fn chain_config(&self) -> Result<ChainConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                ChainConfig::from_json_str(&raw)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => ChainConfig::default(),
        };
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(reward) = self.reward {
            config.mining_reward = reward;
        }
        config.verify_genesis |= self.verify_genesis;
        Ok(config)
    }

    fn mining_limits(&self) -> MiningLimits {
        let mut limits = MiningLimits::unbounded();
        if let Some(secs) = self.timeout_secs {
            limits = limits.with_timeout(Duration::from_secs(secs));
        }
        if let Some(max) = self.max_attempts {
            limits = limits.with_max_attempts(max);
        }
        limits
    }
}

fn print_balances(chain: &Chain, miner: &str) {
    for address in ["address1", "address2", miner] {
        println!("  balance of {address}: {}", chain.balance_of(address));
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = args.chain_config()?;
    let limits = args.mining_limits();
    let mut chain = Chain::with_config(config)?;

    println!("Submitting transactions...");
    chain.submit_transaction(Transaction::new("address1", "address2", 100));
    chain.submit_transaction(Transaction::new("address2", "address1", 50));
    print_balances(&chain, &args.miner);

    for round in 1..=2 {
        println!("Mining round {round}...");
        let block = chain.mine_pending_transactions_with(args.miner.as_str(), &limits)?;
        info!("Tip is now {}", block.hash());
        print_balances(&chain, &args.miner);
    }

    println!("Chain valid? {}", chain.is_valid());

    if let Some(block) = tamper::block_mut(&mut chain, 1) {
        println!("Rewriting block 1 without re-mining...");
        tamper::set_transactions(block, vec![Transaction::new("address2", "address1", 1_000)]);
    }
    match chain.verify() {
        Ok(()) => println!("Chain valid? true"),
        Err(err) => println!("Chain valid? false ({err})"),
    }

    if args.dump {
        println!("{}", serde_json::to_string_pretty(&chain)?);
    }
    Ok(())
}
