// Chain profiles
//
// Configurations for the chains the tooling runs against. BSC mainnet is
// the production chain; the testnet profile exists for rehearsal runs.

use std::collections::HashMap;

/// Chain configuration
#[derive(Debug, Clone)]
pub struct ChainProfile {
    /// Chain ID
    pub chain_id: u64,

    /// Chain name
    pub name: String,

    /// Average block time in seconds
    pub block_time: u64,

    /// Native currency symbol
    pub currency_symbol: String,

    /// Explorer API base URL (BscScan-compatible)
    pub explorer_api: String,

    /// Default public RPC endpoint
    pub default_rpc: String,
}

impl ChainProfile {
    /// BSC mainnet configuration
    pub fn bsc() -> Self {
        Self {
            chain_id: 56,
            name: "BNB Smart Chain".to_string(),
            block_time: 3,
            currency_symbol: "BNB".to_string(),
            explorer_api: "https://api.bscscan.com/api".to_string(),
            default_rpc: "https://bsc-dataseed1.binance.org".to_string(),
        }
    }

    /// BSC testnet configuration
    pub fn bsc_testnet() -> Self {
        Self {
            chain_id: 97,
            name: "BNB Smart Chain Testnet".to_string(),
            block_time: 3,
            currency_symbol: "tBNB".to_string(),
            explorer_api: "https://api-testnet.bscscan.com/api".to_string(),
            default_rpc: "https://data-seed-prebsc-1-s1.binance.org:8545".to_string(),
        }
    }
}

/// Registry for looking up chain profiles
pub struct ChainRegistry {
    profiles: HashMap<u64, ChainProfile>,
}

impl ChainRegistry {
    /// Create a registry with the default profiles
    pub fn new() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(56, ChainProfile::bsc());
        profiles.insert(97, ChainProfile::bsc_testnet());
        Self { profiles }
    }

    /// Get a profile by chain ID
    pub fn get(&self, chain_id: u64) -> Option<&ChainProfile> {
        self.profiles.get(&chain_id)
    }

    /// Add or update a profile
    pub fn add(&mut self, profile: ChainProfile) {
        self.profiles.insert(profile.chain_id, profile);
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = ChainRegistry::new();
        assert_eq!(registry.get(56).unwrap().currency_symbol, "BNB");
        assert_eq!(registry.get(97).unwrap().chain_id, 97);
        assert!(registry.get(1).is_none());
    }
}
