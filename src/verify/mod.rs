// Wiring verification
//
// Reads back every getter from the active edge table and compares it
// against the canonical address set. Only reports; remediation is always
// an explicit re-run of the wiring command.

use crate::addresses::{format_address, ContractAddressSet};
use crate::chain::retry::{retry_with_backoff, Backoff};
use crate::chain::{minimal_abi, rpc_call, ChainConnector};
use crate::wiring::ConnectionEdge;
use anyhow::Result;
use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Case-insensitive address comparison.
///
/// On-chain getters and config files disagree on checksum casing; equality
/// is decided on the hex digits alone.
pub fn addresses_match(expected: &str, actual: &str) -> bool {
    expected.eq_ignore_ascii_case(actual)
}

/// One getter read-back, expected versus actual
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeCheck {
    /// `DungeonCore.setHeroContract(Hero)`
    pub edge: String,

    /// Getter that was read
    pub getter: String,

    /// Address the canonical set expects
    pub expected: String,

    /// Address the chain returned
    pub actual: String,
}

/// A getter that could not be read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeError {
    pub edge: String,
    pub error: String,
}

/// Full verification run result
#[derive(Debug, Serialize, Deserialize)]
pub struct VerificationReport {
    /// When the verification ran
    pub timestamp: DateTime<Utc>,

    /// Version whose edge table was checked
    pub version: String,

    /// Getters matching the canonical set
    pub correct: Vec<EdgeCheck>,

    /// Getters disagreeing with the canonical set
    pub incorrect: Vec<EdgeCheck>,

    /// Getters that could not be read
    pub errors: Vec<EdgeError>,

    /// Edges skipped because the set has no address for them
    pub skipped: Vec<String>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.incorrect.is_empty() && self.errors.is_empty()
    }

    /// Format the report as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Format the report as plain text
    pub fn render_text(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Wiring verification ({}) at {}\n\n",
            self.version, self.timestamp
        ));

        for check in &self.correct {
            output.push_str(&format!("✅ {} -> {}\n", check.edge, check.actual));
        }
        for check in &self.incorrect {
            output.push_str(&format!(
                "❌ {}: expected {}, on-chain {}\n",
                check.edge, check.expected, check.actual
            ));
        }
        for error in &self.errors {
            output.push_str(&format!("⚠️  {}: {}\n", error.edge, error.error));
        }
        for edge in &self.skipped {
            output.push_str(&format!("⚠️  {} skipped: address missing from set\n", edge));
        }

        output.push_str(&format!(
            "\n{} correct, {} incorrect, {} errors, {} skipped\n",
            self.correct.len(),
            self.incorrect.len(),
            self.errors.len(),
            self.skipped.len()
        ));
        output
    }

    /// Save the report as JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut content = self.to_json()?;
        content.push('\n');
        fs::write(path, content)?;
        Ok(())
    }

    /// Default report file name for a run directory
    pub fn timestamped_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!(
            "verification-{}.json",
            self.timestamp.format("%Y%m%d-%H%M%S")
        ))
    }
}

/// Read-and-compare pass over one version's edge table
pub struct WiringVerifier<'a> {
    connector: &'a ChainConnector,
    set: &'a ContractAddressSet,
    edges: &'static [ConnectionEdge],
}

impl<'a> WiringVerifier<'a> {
    pub fn new(
        connector: &'a ChainConnector,
        set: &'a ContractAddressSet,
        edges: &'static [ConnectionEdge],
    ) -> Self {
        Self {
            connector,
            set,
            edges,
        }
    }

    pub async fn run(&self, version: &str) -> VerificationReport {
        let mut report = VerificationReport {
            timestamp: Utc::now(),
            version: version.to_string(),
            correct: Vec::new(),
            incorrect: Vec::new(),
            errors: Vec::new(),
            skipped: Vec::new(),
        };

        for edge in self.edges {
            let (Some(source_addr), Some(target_addr)) =
                (self.set.get(edge.source), self.set.get(edge.target))
            else {
                report.skipped.push(edge.describe());
                continue;
            };

            match self.read_getter(edge, source_addr).await {
                Ok(actual) => {
                    let check = EdgeCheck {
                        edge: edge.describe(),
                        getter: edge.getter.to_string(),
                        expected: format_address(target_addr),
                        actual: format_address(actual),
                    };
                    if addresses_match(&check.expected, &check.actual) {
                        report.correct.push(check);
                    } else {
                        report.incorrect.push(check);
                    }
                }
                Err(err) => report.errors.push(EdgeError {
                    edge: edge.describe(),
                    error: format!("{err:#}"),
                }),
            }
        }

        report
    }

    /// Read one getter, retrying transient RPC failures under backoff
    async fn read_getter(&self, edge: &ConnectionEdge, source_addr: Address) -> Result<Address> {
        let abi = minimal_abi(&edge.abi_signatures())?;
        let reader = self.connector.read_contract(source_addr, abi);
        retry_with_backoff(Backoff::default(), edge.getter, || async {
            rpc_call(
                edge.getter,
                reader.method::<_, Address>(edge.getter, ())?.call(),
            )
            .await
        })
        .await
    }
}
