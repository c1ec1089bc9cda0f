// Connection setup orchestrator
//
// Wires deployed contracts together by submitting the setter calls from the
// active version's edge table. Writes are strictly serialized (one
// confirmation awaited before the next submission) to avoid nonce
// collisions. A failing edge is recorded and the run continues; operators
// re-run and inspect the summary.

mod edges;

pub use edges::{edges_for_version, ConnectionEdge, EDGES_V1_2, EDGES_V1_3};

use crate::addresses::{format_address, ContractAddressSet, ContractName};
use crate::chain::{minimal_abi, rpc_call, ChainConnector};
use anyhow::{anyhow, Result};
use ethers::types::{Address, H256};

/// Pure decision for one edge, given everything read from the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDecision {
    /// Signer is not the contract owner; skip without submitting
    NotOwner,

    /// Getter already returns the target address; nothing to do
    AlreadySet,

    /// Setter should be submitted
    Submit,
}

/// Decide what to do with an edge.
///
/// `signer` is `None` on key-less dry runs, where the owner check is
/// skipped.
pub fn decide(
    owner: Address,
    signer: Option<Address>,
    current: Address,
    target: Address,
) -> EdgeDecision {
    if let Some(signer) = signer {
        if owner != signer {
            return EdgeDecision::NotOwner;
        }
    }
    if current == target {
        return EdgeDecision::AlreadySet;
    }
    EdgeDecision::Submit
}

/// What happened to one edge during a run
#[derive(Debug, Clone)]
pub enum EdgeOutcome {
    /// Setter submitted and confirmed
    Wired { tx_hash: H256 },

    /// Already pointing at the target; re-runs are no-ops
    AlreadySet,

    /// Dry run: the setter would have been submitted
    WouldSubmit,

    /// Source or target address absent from the set
    SkippedMissing { missing: ContractName },

    /// Owner pre-check failed
    SkippedNotOwner { owner: Address },

    /// Submission or read failed; the run continued
    Failed { error: String },
}

/// Result for one edge
#[derive(Debug, Clone)]
pub struct EdgeResult {
    pub edge: ConnectionEdge,
    pub outcome: EdgeOutcome,
}

/// Summary of a wiring run
#[derive(Debug, Default)]
pub struct WiringSummary {
    pub results: Vec<EdgeResult>,
}

impl WiringSummary {
    pub fn wired(&self) -> usize {
        self.count(|o| matches!(o, EdgeOutcome::Wired { .. }))
    }

    pub fn already_set(&self) -> usize {
        self.count(|o| matches!(o, EdgeOutcome::AlreadySet))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EdgeOutcome::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&EdgeOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    /// Operator-facing run report
    pub fn render_text(&self) -> String {
        let mut output = String::new();
        for result in &self.results {
            let line = match &result.outcome {
                EdgeOutcome::Wired { tx_hash } => {
                    format!("✅ {} wired (tx {:?})", result.edge.describe(), tx_hash)
                }
                EdgeOutcome::AlreadySet => {
                    format!("✅ {} already set", result.edge.describe())
                }
                EdgeOutcome::WouldSubmit => {
                    format!("🔍 {} would submit", result.edge.describe())
                }
                EdgeOutcome::SkippedMissing { missing } => {
                    format!(
                        "⚠️  {} skipped: no address for {}",
                        result.edge.describe(),
                        missing
                    )
                }
                EdgeOutcome::SkippedNotOwner { owner } => {
                    format!(
                        "⚠️  {} skipped: owner is {}",
                        result.edge.describe(),
                        format_address(*owner)
                    )
                }
                EdgeOutcome::Failed { error } => {
                    format!("❌ {} failed: {}", result.edge.describe(), error)
                }
            };
            output.push_str(&line);
            output.push('\n');
        }
        output.push_str(&format!(
            "\n{} wired, {} already set, {} failed, {} total\n",
            self.wired(),
            self.already_set(),
            self.failed(),
            self.results.len()
        ));
        output
    }
}

/// Runs the setter calls for one version's edge table
pub struct WiringOrchestrator<'a> {
    connector: &'a ChainConnector,
    set: &'a ContractAddressSet,
    edges: &'static [ConnectionEdge],
    dry_run: bool,
}

impl<'a> WiringOrchestrator<'a> {
    pub fn new(
        connector: &'a ChainConnector,
        set: &'a ContractAddressSet,
        edges: &'static [ConnectionEdge],
        dry_run: bool,
    ) -> Self {
        Self {
            connector,
            set,
            edges,
            dry_run,
        }
    }

    /// Process every edge in table order
    pub async fn run(&self) -> WiringSummary {
        let mut summary = WiringSummary::default();
        for edge in self.edges {
            let outcome = self.process_edge(edge).await;
            match &outcome {
                EdgeOutcome::Failed { error } => {
                    log::error!("{}: {}", edge.describe(), error)
                }
                EdgeOutcome::Wired { tx_hash } => {
                    log::info!("{}: tx {:?}", edge.describe(), tx_hash)
                }
                _ => log::debug!("{}: {:?}", edge.describe(), outcome),
            }
            summary.results.push(EdgeResult {
                edge: *edge,
                outcome,
            });
        }
        summary
    }

    async fn process_edge(&self, edge: &ConnectionEdge) -> EdgeOutcome {
        let Some(source_addr) = self.set.get(edge.source) else {
            return EdgeOutcome::SkippedMissing {
                missing: edge.source,
            };
        };
        let Some(target_addr) = self.set.get(edge.target) else {
            return EdgeOutcome::SkippedMissing {
                missing: edge.target,
            };
        };

        match self.try_edge(edge, source_addr, target_addr).await {
            Ok(outcome) => outcome,
            Err(err) => EdgeOutcome::Failed {
                error: format!("{err:#}"),
            },
        }
    }

    async fn try_edge(
        &self,
        edge: &ConnectionEdge,
        source_addr: Address,
        target_addr: Address,
    ) -> Result<EdgeOutcome> {
        let abi = minimal_abi(&edge.abi_signatures())?;
        let reader = self.connector.read_contract(source_addr, abi.clone());

        let owner: Address =
            rpc_call("owner()", reader.method::<_, Address>("owner", ())?.call()).await?;
        let current: Address = rpc_call(
            edge.getter,
            reader.method::<_, Address>(edge.getter, ())?.call(),
        )
        .await?;

        match decide(owner, self.connector.signer_address(), current, target_addr) {
            EdgeDecision::NotOwner => Ok(EdgeOutcome::SkippedNotOwner { owner }),
            EdgeDecision::AlreadySet => Ok(EdgeOutcome::AlreadySet),
            EdgeDecision::Submit if self.dry_run => Ok(EdgeOutcome::WouldSubmit),
            EdgeDecision::Submit => {
                let writer = self.connector.write_contract(source_addr, abi)?;
                let call = writer.method::<_, ()>(edge.setter, target_addr)?;
                let pending = rpc_call(edge.setter, call.send()).await?;
                let receipt = rpc_call("confirmation", pending)
                    .await?
                    .ok_or_else(|| anyhow!("transaction dropped from the mempool"))?;
                Ok(EdgeOutcome::Wired {
                    tx_hash: receipt.transaction_hash,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    #[test]
    fn test_owner_mismatch_skips() {
        // Signer is not the owner: no transaction, regardless of state
        let decision = decide(addr(1), Some(addr(2)), addr(0), addr(9));
        assert_eq!(decision, EdgeDecision::NotOwner);
    }

    #[test]
    fn test_already_wired_is_noop() {
        let decision = decide(addr(1), Some(addr(1)), addr(9), addr(9));
        assert_eq!(decision, EdgeDecision::AlreadySet);
    }

    #[test]
    fn test_submit_when_owner_and_stale() {
        let decision = decide(addr(1), Some(addr(1)), addr(0), addr(9));
        assert_eq!(decision, EdgeDecision::Submit);
    }

    #[test]
    fn test_keyless_dry_run_skips_owner_check() {
        let decision = decide(addr(1), None, addr(0), addr(9));
        assert_eq!(decision, EdgeDecision::Submit);
    }
}
