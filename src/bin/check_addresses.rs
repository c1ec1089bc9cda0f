// Address set diagnostic
//
// Parses any supported address source and prints what it holds, flagging
// malformed entries, duplicates and missing contracts.

use anyhow::Result;
use clap::Parser;
use dungeon_ops::addresses::{self, format_address};
use std::path::PathBuf;

/// Inspect a contract address source
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Env or JSON address source
    source: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let loaded = addresses::load(&args.source)?;

    if let Some(version) = &loaded.set.meta.version {
        println!("Deployment version: {version}");
    }
    if let Some(chain_id) = loaded.set.meta.chain_id {
        println!("Chain id: {chain_id}");
    }
    println!();

    for (name, address) in loaded.set.iter() {
        println!("✅ {:<18} {}", name.key(), format_address(address));
    }
    for warning in &loaded.warnings {
        println!("❌ {warning}");
    }
    for (address, names) in loaded.set.duplicate_addresses() {
        let names: Vec<String> = names.iter().map(ToString::to_string).collect();
        println!(
            "⚠️  duplicate address {} used by {}",
            format_address(address),
            names.join(", ")
        );
    }
    for name in loaded.missing() {
        println!("⚠️  {} missing", name.key());
    }

    println!(
        "\n{} present, {} missing, {} malformed",
        loaded.set.len(),
        loaded.missing().len(),
        loaded.warnings.len()
    );
    Ok(())
}
