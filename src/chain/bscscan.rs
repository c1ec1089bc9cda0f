// BscScan API client
//
// Used by diagnostics to check whether a deployed contract has verified
// source on the explorer. Never on the critical path of a sync or wiring
// run.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// BscScan API client
pub struct BscScanClient {
    api_key: String,
    api_base: String,
    client: Client,
}

#[derive(Debug, Serialize, Deserialize)]
struct ExplorerResponse {
    status: String,
    message: String,
    result: String,
}

impl BscScanClient {
    /// Create a new client against an explorer API base URL
    pub fn new(api_key: String, api_base: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            api_base: api_base.to_string(),
            client,
        }
    }

    /// Fetch the verified ABI for a contract.
    ///
    /// Fails when the contract has no verified source.
    pub async fn get_contract_abi(&self, address: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.api_base)
            .query(&[
                ("module", "contract"),
                ("action", "getabi"),
                ("address", address),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("explorer API request failed: {}", response.status()));
        }

        let parsed: ExplorerResponse = response.json().await?;
        if parsed.status != "1" {
            return Err(anyhow!(
                "explorer API error for {}: {} ({})",
                address,
                parsed.message,
                parsed.result
            ));
        }
        Ok(parsed.result)
    }

    /// Whether the contract's source is verified on the explorer
    pub async fn is_verified(&self, address: &str) -> Result<bool> {
        match self.get_contract_abi(address).await {
            Ok(_) => Ok(true),
            Err(err) if err.to_string().contains("not verified") => Ok(false),
            Err(err) => Err(err),
        }
    }
}
