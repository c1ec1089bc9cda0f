// DungeonDelvers Ops CLI
//
// Main entry point: config sync, ABI copying, contract wiring and wiring
// verification, driven by the canonical address set.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dungeon_ops::addresses::{self, format_address, LoadedAddresses};
use dungeon_ops::chain::{resolve_rpc_url, BscScanClient, ChainConnector, ChainProfile, ChainRegistry};
use dungeon_ops::config::OpsConfig;
use dungeon_ops::sync::{self, abi, SyncAction, TargetKind};
use dungeon_ops::verify::WiringVerifier;
use dungeon_ops::wiring::{edges_for_version, WiringOrchestrator};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TargetArg {
    Frontend,
    Backend,
    Subgraph,
}

impl From<TargetArg> for TargetKind {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Frontend => TargetKind::Frontend,
            TargetArg::Backend => TargetKind::Backend,
            TargetArg::Subgraph => TargetKind::Subgraph,
        }
    }
}

/// DungeonDelvers operational tooling
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Path to dungeon-ops.json
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Propagate the canonical addresses into consumer projects
    Sync {
        /// Address source file (env or JSON); defaults to the contracts
        /// repo's deployments/latest.json
        #[clap(short, long)]
        source: Option<PathBuf>,

        /// Only sync one consumer project
        #[clap(short, long, value_enum)]
        target: Option<TargetArg>,

        /// Report what would change without writing
        #[clap(long)]
        check_only: bool,
    },

    /// Copy compiled-contract ABIs into consumer projects
    Abis,

    /// Wire deployed contracts together with setter calls
    Wire {
        #[clap(short, long)]
        source: Option<PathBuf>,

        /// Deployment version (defaults to the configured one)
        #[clap(short, long)]
        version: Option<String>,

        /// Read state and report, submit nothing
        #[clap(long)]
        dry_run: bool,

        /// Run against BSC testnet
        #[clap(long)]
        testnet: bool,
    },

    /// Read back on-chain wiring and compare against the canonical set
    Verify {
        #[clap(short, long)]
        source: Option<PathBuf>,

        #[clap(short, long)]
        version: Option<String>,

        /// Also write the report as JSON
        #[clap(short, long)]
        output: Option<PathBuf>,

        #[clap(long)]
        testnet: bool,
    },

    /// Check source verification status of each contract on the explorer
    Verified {
        #[clap(short, long)]
        source: Option<PathBuf>,

        #[clap(long)]
        testnet: bool,
    },

    /// Write a default config file
    Config {
        #[clap(short, long, default_value = "dungeon-ops.json")]
        output: PathBuf,
    },

    /// Restore a synced file from its newest backup
    Rollback {
        /// The synced file to restore
        file: PathBuf,
    },

    /// Delete old backups of a synced file, keeping the newest ones
    PruneBackups {
        /// The synced file whose backups should be pruned
        file: PathBuf,

        #[clap(long, default_value_t = 3)]
        keep: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = OpsConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Sync {
            source,
            target,
            check_only,
        } => {
            let loaded = load_addresses(&config, source.as_deref())?;
            let outcomes = sync::sync_all(
                &config,
                &loaded.set,
                check_only,
                target.map(TargetKind::from),
            )?;

            let mut pending = 0usize;
            for outcome in &outcomes {
                match &outcome.action {
                    SyncAction::Updated { backup } => {
                        println!("✅ {} updated", outcome.path.display());
                        if let Some(backup) = backup {
                            log::info!("backup at {}", backup.display());
                        }
                    }
                    SyncAction::Unchanged => {
                        println!("✅ {} unchanged", outcome.path.display())
                    }
                    SyncAction::WouldUpdate => {
                        pending += 1;
                        println!("🔍 {} would change", outcome.path.display())
                    }
                    SyncAction::Skipped { reason } => {
                        println!("⚠️  {} skipped: {}", outcome.path.display(), reason)
                    }
                }
            }
            if check_only && pending > 0 {
                bail!("{pending} file(s) out of sync");
            }
            Ok(())
        }

        Commands::Abis => {
            let jobs = abi::default_jobs(&config.paths);
            let summary = abi::copy_abis(&jobs)?;
            println!(
                "✅ {} ABIs copied, {} artifacts missing",
                summary.copied.len(),
                summary.skipped.len()
            );
            Ok(())
        }

        Commands::Wire {
            source,
            version,
            dry_run,
            testnet,
        } => {
            let loaded = load_addresses(&config, source.as_deref())?;
            let version = version.unwrap_or_else(|| config.version.clone());
            let edges = edges_for_version(&version)
                .with_context(|| format!("no wiring table for version {version}"))?;

            let connector = build_connector(&config, testnet, !dry_run, loaded.set.meta.chain_id)?;
            check_chain(&connector).await?;
            let orchestrator = WiringOrchestrator::new(&connector, &loaded.set, edges, dry_run);
            let summary = orchestrator.run().await;
            print!("{}", summary.render_text());

            if summary.has_failures() {
                bail!("{} edge(s) failed", summary.failed());
            }
            Ok(())
        }

        Commands::Verify {
            source,
            version,
            output,
            testnet,
        } => {
            let loaded = load_addresses(&config, source.as_deref())?;
            let version = version.unwrap_or_else(|| config.version.clone());
            let edges = edges_for_version(&version)
                .with_context(|| format!("no wiring table for version {version}"))?;

            let connector = build_connector(&config, testnet, false, loaded.set.meta.chain_id)?;
            let verifier = WiringVerifier::new(&connector, &loaded.set, edges);
            let report = verifier.run(&version).await;
            print!("{}", report.render_text());

            if let Some(path) = output {
                // A directory output gets a timestamped file name
                let path = if path.is_dir() {
                    report.timestamped_path(&path)
                } else {
                    path
                };
                report.save_to_file(&path)?;
                println!("Report saved to {}", path.display());
            }
            if !report.passed() {
                bail!(
                    "verification found {} mismatch(es), {} error(s)",
                    report.incorrect.len(),
                    report.errors.len()
                );
            }
            Ok(())
        }

        Commands::Verified { source, testnet } => {
            let loaded = load_addresses(&config, source.as_deref())?;
            let profile = profile_for(testnet, loaded.set.meta.chain_id);
            let api_key = env::var("BSCSCAN_API_KEY")
                .context("BSCSCAN_API_KEY is required to query the explorer")?;
            let client = BscScanClient::new(api_key, &profile.explorer_api);

            let mut unverified = 0usize;
            for (name, address) in loaded.set.iter() {
                let address = format_address(address);
                match client.is_verified(&address).await {
                    Ok(true) => println!("✅ {:<18} verified", name.key()),
                    Ok(false) => {
                        unverified += 1;
                        println!("❌ {:<18} source not verified ({address})", name.key());
                    }
                    Err(err) => {
                        unverified += 1;
                        println!("⚠️  {:<18} {err:#}", name.key());
                    }
                }
            }
            if unverified > 0 {
                bail!("{unverified} contract(s) unverified or unreachable");
            }
            Ok(())
        }

        Commands::Config { output } => {
            OpsConfig::default().save_to_file(&output)?;
            println!("Default configuration saved to {}", output.display());
            Ok(())
        }

        Commands::Rollback { file } => match sync::restore_backup(&file)? {
            Some(backup) => {
                println!("✅ {} restored from {}", file.display(), backup.display());
                Ok(())
            }
            None => bail!("no backups found for {}", file.display()),
        },

        Commands::PruneBackups { file, keep } => {
            let deleted = sync::prune_backups(&file, keep)?;
            println!("✅ {} backup(s) deleted", deleted.len());
            Ok(())
        }
    }
}

/// Load the address source, surfacing soft warnings on the way
fn load_addresses(config: &OpsConfig, source: Option<&Path>) -> Result<LoadedAddresses> {
    let default_path = config.paths.contracts.join("deployments/latest.json");
    let path = source.unwrap_or(&default_path);
    let loaded = addresses::load(path)?;

    for warning in &loaded.warnings {
        println!("⚠️  {warning}");
    }
    for (address, names) in loaded.set.duplicate_addresses() {
        let names: Vec<String> = names.iter().map(ToString::to_string).collect();
        println!(
            "⚠️  {} share one address: {}",
            names.join(", "),
            format_address(address)
        );
    }
    if loaded.set.is_empty() {
        bail!("no contract addresses found in {}", path.display());
    }
    Ok(loaded)
}

/// Pick the chain profile: the source's chain id wins, then the flag
fn profile_for(testnet: bool, meta_chain_id: Option<u64>) -> ChainProfile {
    meta_chain_id
        .and_then(|id| ChainRegistry::new().get(id).cloned())
        .unwrap_or_else(|| {
            if testnet {
                ChainProfile::bsc_testnet()
            } else {
                ChainProfile::bsc()
            }
        })
}

/// Build the connector, attaching a signer when the run needs one
fn build_connector(
    config: &OpsConfig,
    testnet: bool,
    need_signer: bool,
    meta_chain_id: Option<u64>,
) -> Result<ChainConnector> {
    let profile = profile_for(testnet, meta_chain_id);
    let rpc_url = resolve_rpc_url(config.rpc_url.as_deref(), &profile);
    log::info!("using {} via {}", profile.name, rpc_url);
    let connector = ChainConnector::new(&rpc_url, profile)?;

    match env::var("PRIVATE_KEY") {
        Ok(key) => connector.with_signer(&key),
        Err(_) if need_signer => bail!("PRIVATE_KEY is required for this command"),
        Err(_) => Ok(connector),
    }
}

/// Refuse to submit against a node on the wrong chain
async fn check_chain(connector: &ChainConnector) -> Result<()> {
    let reported = connector.chain_id().await?;
    let expected = connector.profile().chain_id;
    if reported != expected {
        bail!("RPC node reports chain {reported}, expected {expected}");
    }
    Ok(())
}
