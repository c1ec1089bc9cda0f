// Backend JSON config formatter
//
// Merges the address set into the metadata server's config object under
// `contracts.<NAME>.address`, preserving every unrelated field the config
// already carries. The written shape is the deployment-record shape, so the
// address source reader can load the result back.

use crate::addresses::{format_address, ContractAddressSet};
use anyhow::{bail, Result};
use serde_json::{json, Map, Value};

/// Merge the set into existing backend config JSON content.
pub fn merge_backend_config(existing: &str, set: &ContractAddressSet) -> Result<String> {
    let trimmed = existing.trim();
    let mut root: Value = if trimmed.is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str(trimmed)?
    };

    if !root.is_object() {
        bail!("backend config root is not a JSON object");
    }

    if let Some(version) = &set.meta.version {
        root["version"] = json!(version);
    }
    if let Some(chain_id) = set.meta.chain_id {
        root["chainId"] = json!(chain_id);
    }

    let contracts = root
        .as_object_mut()
        .expect("checked above")
        .entry("contracts")
        .or_insert_with(|| Value::Object(Map::new()));
    if !contracts.is_object() {
        bail!("`contracts` in backend config is not a JSON object");
    }

    for (name, address) in set.iter() {
        let entry = contracts
            .as_object_mut()
            .expect("checked above")
            .entry(name.key())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            bail!("`contracts.{}` in backend config is not an object", name.key());
        }
        entry["address"] = json!(format_address(address));
        if let Some(start_block) = set.meta.start_block {
            entry["startBlock"] = json!(start_block);
        }
    }

    let mut rendered = serde_json::to_string_pretty(&root)?;
    rendered.push('\n');
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addresses::{from_json_value, ContractName};
    use ethers::types::Address;

    #[test]
    fn test_merge_preserves_unrelated_fields() {
        let existing = r#"{
  "port": 3001,
  "ipfsGateway": "https://ipfs.io",
  "contracts": {
    "HERO": { "address": "0x0000000000000000000000000000000000000001", "label": "nft" }
  }
}"#;
        let mut set = ContractAddressSet::new();
        set.meta.version = Some("v1.3".to_string());
        set.insert(ContractName::Hero, Address::from_low_u64_be(0xbeef));
        set.insert(ContractName::Oracle, Address::from_low_u64_be(0xcafe));

        let merged = merge_backend_config(existing, &set).unwrap();
        let value: Value = serde_json::from_str(&merged).unwrap();

        assert_eq!(value["port"], json!(3001));
        assert_eq!(value["ipfsGateway"], json!("https://ipfs.io"));
        assert_eq!(value["contracts"]["HERO"]["label"], json!("nft"));
        assert_eq!(value["version"], json!("v1.3"));
        assert!(value["contracts"]["ORACLE"]["address"]
            .as_str()
            .unwrap()
            .to_lowercase()
            .ends_with("cafe"));
    }

    #[test]
    fn test_round_trips_through_reader() {
        let mut set = ContractAddressSet::new();
        set.insert(ContractName::Hero, Address::from_low_u64_be(7));

        let merged = merge_backend_config("", &set).unwrap();
        let value: Value = serde_json::from_str(&merged).unwrap();
        let loaded = from_json_value(&value).unwrap();
        assert_eq!(loaded.set.get(ContractName::Hero), set.get(ContractName::Hero));
    }

    #[test]
    fn test_non_object_root_rejected() {
        let set = ContractAddressSet::new();
        assert!(merge_backend_config("[1, 2]", &set).is_err());
    }
}
