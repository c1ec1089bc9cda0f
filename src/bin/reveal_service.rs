// Reveal watcher daemon
//
// Watches DungeonMaster for commitments nearing their reveal deadline and
// submits the reveal transactions before expiry.

use anyhow::{bail, Context, Result};
use clap::Parser;
use dungeon_ops::addresses::{self, ContractName};
use dungeon_ops::chain::{resolve_rpc_url, ChainConnector, ChainProfile};
use dungeon_ops::config::OpsConfig;
use dungeon_ops::reveal::{RevealService, SystemClock};
use std::env;
use std::path::PathBuf;

/// DungeonDelvers commit-reveal watcher
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to dungeon-ops.json
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Address source file; defaults to the contracts repo's
    /// deployments/latest.json
    #[clap(short, long)]
    source: Option<PathBuf>,

    /// Override the polling interval in seconds
    #[clap(long)]
    interval: Option<u64>,

    /// Override the lead window in seconds
    #[clap(long)]
    lead: Option<u64>,

    /// Run a single tick and exit
    #[clap(long)]
    once: bool,

    /// Run against BSC testnet
    #[clap(long)]
    testnet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let mut config = OpsConfig::load(args.config.as_deref())?;
    if let Some(interval) = args.interval {
        config.reveal.interval_secs = interval;
    }
    if let Some(lead) = args.lead {
        config.reveal.lead_secs = lead;
    }

    let default_source = config.paths.contracts.join("deployments/latest.json");
    let source = args.source.as_deref().unwrap_or(&default_source);
    let loaded = addresses::load(source)?;
    for warning in &loaded.warnings {
        log::warn!("{warning}");
    }
    let Some(dungeon_master) = loaded.set.get(ContractName::DungeonMaster) else {
        bail!("no DungeonMaster address in {}", source.display());
    };

    let profile = if args.testnet {
        ChainProfile::bsc_testnet()
    } else {
        ChainProfile::bsc()
    };
    let rpc_url = resolve_rpc_url(config.rpc_url.as_deref(), &profile);
    let key = env::var("PRIVATE_KEY").context("PRIVATE_KEY is required to submit reveals")?;
    let connector = ChainConnector::new(&rpc_url, profile)?.with_signer(&key)?;

    let mut service = RevealService::new(connector, dungeon_master, config.reveal.clone());
    if args.once {
        service.run_tick(&SystemClock).await
    } else {
        service.run().await
    }
}
