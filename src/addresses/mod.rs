// Canonical contract addresses for DungeonDelvers Ops
//
// This module defines the logical contract names, the canonical address set
// produced by a deployment, and the validation rules shared by every reader
// and formatter.

mod source;

pub use source::*;

use ethers::types::Address;
use ethers::utils::to_checksum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Logical names of the deployed DungeonDelvers contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContractName {
    Hero,
    Relic,
    Party,
    DungeonMaster,
    DungeonCore,
    VrfManager,
    Oracle,
    AltarOfAscension,
    PlayerVault,
    PlayerProfile,
    VipStaking,
    Marketplace,
}

impl ContractName {
    /// All known contracts, in canonical order
    pub const ALL: [ContractName; 12] = [
        ContractName::Hero,
        ContractName::Relic,
        ContractName::Party,
        ContractName::DungeonMaster,
        ContractName::DungeonCore,
        ContractName::VrfManager,
        ContractName::Oracle,
        ContractName::AltarOfAscension,
        ContractName::PlayerVault,
        ContractName::PlayerProfile,
        ContractName::VipStaking,
        ContractName::Marketplace,
    ];

    /// Canonical env key (`HERO`, `DUNGEONCORE`, ...)
    pub fn key(&self) -> &'static str {
        match self {
            ContractName::Hero => "HERO",
            ContractName::Relic => "RELIC",
            ContractName::Party => "PARTY",
            ContractName::DungeonMaster => "DUNGEONMASTER",
            ContractName::DungeonCore => "DUNGEONCORE",
            ContractName::VrfManager => "VRFMANAGER",
            ContractName::Oracle => "ORACLE",
            ContractName::AltarOfAscension => "ALTAROFASCENSION",
            ContractName::PlayerVault => "PLAYERVAULT",
            ContractName::PlayerProfile => "PLAYERPROFILE",
            ContractName::VipStaking => "VIPSTAKING",
            ContractName::Marketplace => "MARKETPLACE",
        }
    }

    /// Key used by the master config JSON (`HERO_ADDRESS`, ...)
    pub fn master_key(&self) -> String {
        format!("{}_ADDRESS", self.key())
    }

    /// Solidity-style contract name (`Hero`, `DungeonCore`, ...), as used by
    /// artifact files and subgraph data sources
    pub fn artifact_name(&self) -> &'static str {
        match self {
            ContractName::Hero => "Hero",
            ContractName::Relic => "Relic",
            ContractName::Party => "Party",
            ContractName::DungeonMaster => "DungeonMaster",
            ContractName::DungeonCore => "DungeonCore",
            ContractName::VrfManager => "VRFManager",
            ContractName::Oracle => "Oracle",
            ContractName::AltarOfAscension => "AltarOfAscension",
            ContractName::PlayerVault => "PlayerVault",
            ContractName::PlayerProfile => "PlayerProfile",
            ContractName::VipStaking => "VIPStaking",
            ContractName::Marketplace => "Marketplace",
        }
    }

    /// Resolve a key as it may appear in an env file or master config.
    ///
    /// Accepts the canonical key in any case, with or without an `_ADDRESS`
    /// suffix. Unknown keys return `None` so unrelated settings in shared
    /// files are never misread as contract addresses.
    pub fn from_key(key: &str) -> Option<Self> {
        let upper = key.to_ascii_uppercase();
        let trimmed = upper.strip_suffix("_ADDRESS").unwrap_or(&upper);
        Self::ALL.iter().copied().find(|name| name.key() == trimmed)
    }
}

impl std::fmt::Display for ContractName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.artifact_name())
    }
}

/// Errors produced while reading an address source
#[derive(Debug, Error)]
pub enum AddressError {
    /// Value is not a 0x-prefixed 40-hex-digit address
    #[error("malformed address for {key}: {value}")]
    Malformed { key: String, value: String },

    /// The file shape matched none of the supported source formats
    #[error("unsupported address source format: {0}")]
    UnsupportedFormat(String),
}

/// Check that a value is a well-formed `0x`-prefixed 20-byte hex address
pub fn is_well_formed(value: &str) -> bool {
    value.len() == 42
        && value.starts_with("0x")
        && value[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse a single address value, rejecting anything not well-formed
pub fn parse_address(key: &str, value: &str) -> Result<Address, AddressError> {
    let trimmed = value.trim();
    if !is_well_formed(trimmed) {
        return Err(AddressError::Malformed {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Address::from_str(trimmed).map_err(|_| AddressError::Malformed {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Render an address in EIP-55 checksum form
pub fn format_address(address: Address) -> String {
    to_checksum(&address, None)
}

/// Deployment metadata carried alongside the address set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentMeta {
    /// Version label of the deployment (e.g. `v1.3`)
    pub version: Option<String>,

    /// When the deployment was made
    pub deployed_at: Option<DateTime<Utc>>,

    /// First block consumers should index from
    pub start_block: Option<u64>,

    /// Chain the deployment lives on
    pub chain_id: Option<u64>,
}

/// Canonical mapping of logical contract name to deployed address for one
/// deployment.
///
/// Produced once per deployment event and read-only afterward; partial sets
/// are valid (several flows operate on NFT contracts only).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractAddressSet {
    entries: BTreeMap<ContractName, Address>,
    /// Metadata of the deployment that produced this set
    pub meta: DeploymentMeta,
}

impl ContractAddressSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: ContractName, address: Address) {
        self.entries.insert(name, address);
    }

    pub fn get(&self, name: ContractName) -> Option<Address> {
        self.entries.get(&name).copied()
    }

    pub fn contains(&self, name: ContractName) -> bool {
        self.entries.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in canonical name order
    pub fn iter(&self) -> impl Iterator<Item = (ContractName, Address)> + '_ {
        self.entries.iter().map(|(name, addr)| (*name, *addr))
    }

    /// Contracts from the canonical list that are absent from this set
    pub fn missing(&self) -> Vec<ContractName> {
        ContractName::ALL
            .iter()
            .copied()
            .filter(|name| !self.entries.contains_key(name))
            .collect()
    }

    /// Groups of distinct logical names sharing one address.
    ///
    /// A non-empty result violates the address-uniqueness invariant; callers
    /// report it as a warning, never as a fatal error.
    pub fn duplicate_addresses(&self) -> Vec<(Address, Vec<ContractName>)> {
        let mut by_address: BTreeMap<Address, Vec<ContractName>> = BTreeMap::new();
        for (name, address) in self.iter() {
            by_address.entry(address).or_default().push(name);
        }
        by_address
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .collect()
    }
}
