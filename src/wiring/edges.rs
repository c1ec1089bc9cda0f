// Versioned connection tables
//
// One explicit table per deployment version. Setup and verification consume
// the same table, so the version-to-edge mapping lives in exactly one
// place.

use crate::addresses::ContractName;

/// A required on-chain setter call wiring one contract's reference to
/// another's address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionEdge {
    /// Contract whose setter is called
    pub source: ContractName,

    /// Setter function name, `fn(address)`
    pub setter: &'static str,

    /// Getter function name, `fn() view returns (address)`
    pub getter: &'static str,

    /// Contract whose address is written
    pub target: ContractName,
}

impl ConnectionEdge {
    const fn new(
        source: ContractName,
        setter: &'static str,
        getter: &'static str,
        target: ContractName,
    ) -> Self {
        Self {
            source,
            setter,
            getter,
            target,
        }
    }

    /// Minimal human-readable ABI covering this edge plus the owner check
    pub fn abi_signatures(&self) -> Vec<String> {
        vec![
            format!("function {}(address)", self.setter),
            format!("function {}() view returns (address)", self.getter),
            "function owner() view returns (address)".to_string(),
        ]
    }

    /// `DungeonCore.setHeroContract(Hero)`
    pub fn describe(&self) -> String {
        format!("{}.{}({})", self.source, self.setter, self.target)
    }
}

use ContractName::*;

/// Wiring for the v1.3 deployment: the DungeonCore hub references every
/// module, satellites point back at the core, and the VRF consumers know
/// the manager.
pub const EDGES_V1_3: &[ConnectionEdge] = &[
    // Hub references
    ConnectionEdge::new(DungeonCore, "setHeroContract", "heroContractAddress", Hero),
    ConnectionEdge::new(DungeonCore, "setRelicContract", "relicContractAddress", Relic),
    ConnectionEdge::new(DungeonCore, "setPartyContract", "partyContractAddress", Party),
    ConnectionEdge::new(DungeonCore, "setDungeonMaster", "dungeonMasterAddress", DungeonMaster),
    ConnectionEdge::new(DungeonCore, "setOracle", "oracleAddress", Oracle),
    ConnectionEdge::new(DungeonCore, "setVrfManager", "vrfManagerAddress", VrfManager),
    ConnectionEdge::new(
        DungeonCore,
        "setAltarOfAscension",
        "altarOfAscensionAddress",
        AltarOfAscension,
    ),
    ConnectionEdge::new(DungeonCore, "setPlayerVault", "playerVaultAddress", PlayerVault),
    ConnectionEdge::new(DungeonCore, "setPlayerProfile", "playerProfileAddress", PlayerProfile),
    ConnectionEdge::new(DungeonCore, "setVipStaking", "vipStakingAddress", VipStaking),
    // Satellites back to the core
    ConnectionEdge::new(Hero, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(Relic, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(Party, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(DungeonMaster, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(AltarOfAscension, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(PlayerVault, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(PlayerProfile, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(VipStaking, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(Marketplace, "setDungeonCore", "dungeonCore", DungeonCore),
    // VRF consumers
    ConnectionEdge::new(Hero, "setVrfManager", "vrfManager", VrfManager),
    ConnectionEdge::new(Relic, "setVrfManager", "vrfManager", VrfManager),
    ConnectionEdge::new(DungeonMaster, "setVrfManager", "vrfManager", VrfManager),
    ConnectionEdge::new(AltarOfAscension, "setVrfManager", "vrfManager", VrfManager),
];

/// Wiring for the v1.2 deployment, which predates the marketplace and VIP
/// staking modules.
pub const EDGES_V1_2: &[ConnectionEdge] = &[
    ConnectionEdge::new(DungeonCore, "setHeroContract", "heroContractAddress", Hero),
    ConnectionEdge::new(DungeonCore, "setRelicContract", "relicContractAddress", Relic),
    ConnectionEdge::new(DungeonCore, "setPartyContract", "partyContractAddress", Party),
    ConnectionEdge::new(DungeonCore, "setDungeonMaster", "dungeonMasterAddress", DungeonMaster),
    ConnectionEdge::new(DungeonCore, "setOracle", "oracleAddress", Oracle),
    ConnectionEdge::new(DungeonCore, "setVrfManager", "vrfManagerAddress", VrfManager),
    ConnectionEdge::new(
        DungeonCore,
        "setAltarOfAscension",
        "altarOfAscensionAddress",
        AltarOfAscension,
    ),
    ConnectionEdge::new(DungeonCore, "setPlayerVault", "playerVaultAddress", PlayerVault),
    ConnectionEdge::new(DungeonCore, "setPlayerProfile", "playerProfileAddress", PlayerProfile),
    ConnectionEdge::new(Hero, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(Relic, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(Party, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(DungeonMaster, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(AltarOfAscension, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(PlayerVault, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(PlayerProfile, "setDungeonCore", "dungeonCore", DungeonCore),
    ConnectionEdge::new(Hero, "setVrfManager", "vrfManager", VrfManager),
    ConnectionEdge::new(Relic, "setVrfManager", "vrfManager", VrfManager),
    ConnectionEdge::new(DungeonMaster, "setVrfManager", "vrfManager", VrfManager),
    ConnectionEdge::new(AltarOfAscension, "setVrfManager", "vrfManager", VrfManager),
];

/// Look up the edge table for a version label (`v1.3` or `1.3`)
pub fn edges_for_version(version: &str) -> Option<&'static [ConnectionEdge]> {
    match version.trim().trim_start_matches('v') {
        "1.3" => Some(EDGES_V1_3),
        "1.2" => Some(EDGES_V1_2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_lookup() {
        assert!(edges_for_version("v1.3").is_some());
        assert!(edges_for_version("1.2").is_some());
        assert!(edges_for_version("v0.9").is_none());
    }

    #[test]
    fn test_no_self_edges_and_no_duplicate_setters() {
        for table in [EDGES_V1_3, EDGES_V1_2] {
            let mut seen = std::collections::BTreeSet::new();
            for edge in table {
                assert_ne!(edge.source, edge.target, "{}", edge.describe());
                assert!(
                    seen.insert((edge.source, edge.setter)),
                    "duplicate setter {}",
                    edge.describe()
                );
            }
        }
    }

    #[test]
    fn test_abi_signatures_cover_owner_check() {
        let edge = &EDGES_V1_3[0];
        let signatures = edge.abi_signatures();
        assert!(signatures.iter().any(|s| s.contains("owner()")));
        assert!(signatures.iter().any(|s| s.contains("setHeroContract(address)")));
    }
}
