// Chain access for DungeonDelvers Ops
//
// This module provides the RPC connector used by the wiring, verification
// and reveal flows. Every contract handle is built from a minimal
// human-readable ABI; full artifacts never enter the binary.

mod bscscan;
mod registry;
pub mod retry;

pub use bscscan::BscScanClient;
pub use registry::{ChainProfile, ChainRegistry};

use anyhow::{anyhow, bail, Context, Result};
use ethers::abi::{parse_abi, Abi};
use ethers::contract::Contract;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Ceiling on any single RPC call
pub const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Signing client type used for setter submissions
pub type WriteClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Interface to the BSC network
pub struct ChainConnector {
    provider: Provider<Http>,
    signer: Option<WriteClient>,
    signer_address: Option<Address>,
    profile: ChainProfile,
}

impl ChainConnector {
    /// Create a read-only connector
    pub fn new(rpc_url: &str, profile: ChainProfile) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .with_context(|| format!("invalid RPC URL {rpc_url}"))?;
        Ok(Self {
            provider,
            signer: None,
            signer_address: None,
            profile,
        })
    }

    /// Attach a signer from a raw private key (`PRIVATE_KEY`)
    pub fn with_signer(mut self, private_key: &str) -> Result<Self> {
        let wallet: LocalWallet = private_key
            .trim()
            .trim_start_matches("0x")
            .parse()
            .context("PRIVATE_KEY is not a valid secp256k1 key")?;
        let wallet = wallet.with_chain_id(self.profile.chain_id);
        self.signer_address = Some(wallet.address());
        self.signer = Some(SignerMiddleware::new(self.provider.clone(), wallet));
        Ok(self)
    }

    /// Address of the attached signer, if any
    pub fn signer_address(&self) -> Option<Address> {
        self.signer_address
    }

    pub fn profile(&self) -> &ChainProfile {
        &self.profile
    }

    /// Read-only contract handle
    pub fn read_contract(&self, address: Address, abi: Abi) -> Contract<Provider<Http>> {
        Contract::new(address, abi, Arc::new(self.provider.clone()))
    }

    /// Signing contract handle; fails when no signer is attached
    pub fn write_contract(&self, address: Address, abi: Abi) -> Result<Contract<WriteClient>> {
        let signer = self
            .signer
            .clone()
            .ok_or_else(|| anyhow!("no signer configured; set PRIVATE_KEY"))?;
        Ok(Contract::new(address, abi, Arc::new(signer)))
    }

    /// Chain id reported by the node
    pub async fn chain_id(&self) -> Result<u64> {
        let id = rpc_call("eth_chainId", self.provider.get_chainid()).await?;
        Ok(id.as_u64())
    }
}

/// Build an ABI from human-readable function signatures
pub fn minimal_abi(signatures: &[String]) -> Result<Abi> {
    let refs: Vec<&str> = signatures.iter().map(String::as_str).collect();
    parse_abi(&refs).map_err(|err| anyhow!("invalid minimal ABI: {err}"))
}

/// Resolve the RPC endpoint: config value, then BSC_RPC_URL, then the
/// chain's public node
pub fn resolve_rpc_url(configured: Option<&str>, profile: &ChainProfile) -> String {
    configured
        .map(str::to_string)
        .or_else(|| std::env::var("BSC_RPC_URL").ok())
        .unwrap_or_else(|| profile.default_rpc.clone())
}

/// Await an RPC future under the global timeout.
///
/// A hung provider surfaces as an error here instead of stalling the whole
/// run.
pub async fn rpc_call<T, E, F>(what: &str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    match tokio::time::timeout(RPC_TIMEOUT, fut).await {
        Ok(result) => result.map_err(|err| anyhow::Error::new(err).context(format!("{what} failed"))),
        Err(_) => bail!("{what} timed out after {}s", RPC_TIMEOUT.as_secs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_abi_parses_signatures() {
        let abi = minimal_abi(&[
            "function owner() view returns (address)".to_string(),
            "function setHeroContract(address)".to_string(),
        ])
        .unwrap();
        assert!(abi.function("owner").is_ok());
        assert!(abi.function("setHeroContract").is_ok());
    }

    #[test]
    fn test_minimal_abi_rejects_garbage() {
        assert!(minimal_abi(&["not a signature".to_string()]).is_err());
    }

    #[test]
    fn test_resolve_rpc_url_prefers_configured() {
        let profile = ChainProfile::bsc();
        let url = resolve_rpc_url(Some("http://localhost:8545"), &profile);
        assert_eq!(url, "http://localhost:8545");
    }
}
