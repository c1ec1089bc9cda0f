// Reveal service loop
//
// Polls DungeonMaster for unrevealed commitments and submits reveals for
// the ones entering the lead window. Ticks run to completion inside one
// task and missed ticks are delayed, so two iterations can never overlap.

use super::{Clock, RevealTracker, SystemClock};
use crate::chain::{minimal_abi, rpc_call, ChainConnector};
use crate::config::RevealSettings;
use anyhow::{anyhow, Context, Result};
use ethers::abi::Abi;
use ethers::types::{Address, U256};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

fn dungeon_master_abi() -> Result<Abi> {
    minimal_abi(&[
        "function nextCommitmentId() view returns (uint256)".to_string(),
        "function getCommitment(uint256) view returns (address player, uint256 deadline, bool revealed)"
            .to_string(),
        "function reveal(uint256)".to_string(),
    ])
}

/// Watcher over DungeonMaster's commit-reveal queue
pub struct RevealService {
    connector: ChainConnector,
    dungeon_master: Address,
    settings: RevealSettings,
    tracker: RevealTracker,
    /// First commitment id the next scan starts from
    next_to_scan: u64,
}

impl RevealService {
    pub fn new(connector: ChainConnector, dungeon_master: Address, settings: RevealSettings) -> Self {
        let tracker = RevealTracker::new(settings.lead_secs);
        Self {
            connector,
            dungeon_master,
            settings,
            tracker,
            next_to_scan: 0,
        }
    }

    /// Run forever on the configured interval
    pub async fn run(&mut self) -> Result<()> {
        let mut ticker = tokio::time::interval(Duration::from_secs(self.settings.interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!(
            "reveal service watching {} every {}s (lead {}s)",
            crate::addresses::format_address(self.dungeon_master),
            self.settings.interval_secs,
            self.settings.lead_secs
        );

        loop {
            ticker.tick().await;
            if let Err(err) = self.run_tick(&SystemClock).await {
                log::error!("reveal tick failed: {err:#}");
            }
        }
    }

    /// One full poll-and-act pass
    pub async fn run_tick(&mut self, clock: &dyn Clock) -> Result<()> {
        self.scan_commitments().await?;

        let due = self.tracker.advance(clock.now());
        for id in due {
            match self.submit_reveal(id).await {
                Ok(tx) => {
                    log::info!("revealed commitment {id} (tx {tx:?})");
                    self.tracker.mark_acted(id);
                }
                // Leave the item tracked; the next tick retries it
                Err(err) => log::warn!("reveal of commitment {id} failed: {err:#}"),
            }
        }

        let finished = self.tracker.remove_finished();
        if finished > 0 {
            log::debug!("dropped {finished} finished commitments, {} tracked", self.tracker.len());
        }
        Ok(())
    }

    /// Pull new commitments into the tracker, bounded by max_scan per tick
    async fn scan_commitments(&mut self) -> Result<()> {
        let abi = dungeon_master_abi()?;
        let reader = self.connector.read_contract(self.dungeon_master, abi);

        let next: U256 = rpc_call(
            "nextCommitmentId",
            reader.method::<_, U256>("nextCommitmentId", ())?.call(),
        )
        .await
        .context("failed to read the commitment counter")?;
        let next = next.as_u64();

        let start = self.next_to_scan.max(next.saturating_sub(self.settings.max_scan));
        for id in start..next {
            let (player, deadline, revealed): (Address, U256, bool) = rpc_call(
                "getCommitment",
                reader
                    .method::<_, (Address, U256, bool)>("getCommitment", U256::from(id))?
                    .call(),
            )
            .await
            .with_context(|| format!("failed to read commitment {id}"))?;

            if player.is_zero() || revealed {
                continue;
            }
            self.tracker.upsert(id, deadline.as_u64());
        }
        self.next_to_scan = self.next_to_scan.max(next);
        Ok(())
    }

    /// Submit and confirm one reveal transaction
    async fn submit_reveal(&self, id: u64) -> Result<ethers::types::H256> {
        let abi = dungeon_master_abi()?;
        let writer = self.connector.write_contract(self.dungeon_master, abi)?;
        let call = writer.method::<_, ()>("reveal", U256::from(id))?;
        let pending = rpc_call("reveal", call.send()).await?;
        let receipt = rpc_call("reveal confirmation", pending)
            .await?
            .ok_or_else(|| anyhow!("transaction dropped from the mempool"))?;
        Ok(receipt.transaction_hash)
    }
}
